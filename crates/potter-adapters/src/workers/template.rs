//! Template-driven workers.
//!
//! All three render through the configured [`TemplateRenderer`], pass the
//! result through the [`Formatter`] keyed on the output path, and stage the
//! file. Nested ports requested by a template are always rendered, never run.
//!
//! [`TemplateRenderer`]: potter_core::application::ports::TemplateRenderer
//! [`Formatter`]: potter_core::application::ports::Formatter

use std::path::Path;

use potter_core::{
    application::{DispatchMode, Worker, WorkerCall},
    domain::{RelativePath, worker_names},
    error::PotterResult,
};
use tracing::info;

use super::relative_files;

/// Render template `name` (already interpolated) for this call.
fn render_template(call: &WorkerCall<'_>, name: &str) -> PotterResult<String> {
    let (_, source) = call.template_source(name)?;
    call.services()
        .renderer
        .render(name, &source, &call.template_vars(), call)
}

/// Render `name` and stage it at `destination`.
fn write_rendered(call: &WorkerCall<'_>, name: &str, destination: &Path) -> PotterResult<()> {
    let services = call.services();
    let content = render_template(call, name)?;
    let content = services.formatter.format(destination, content)?;

    info!("[create] {}", destination.display());
    services.filesystem.write(destination, content.as_bytes())
}

/// `template` → `output`. As a render target, returns the rendered template.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateBasedWorker;

impl Worker for TemplateBasedWorker {
    fn name(&self) -> &str {
        worker_names::TEMPLATE_BASED
    }

    fn mode(&self) -> DispatchMode {
        DispatchMode::Render
    }

    fn do_work(&self, call: &WorkerCall<'_>) -> PotterResult<()> {
        let rule = call.rule();
        let template = call.require("template", rule.template.as_ref())?;
        let output = call.require("output", rule.output.as_ref())?;
        write_rendered(call, &call.interpolate(template)?, &call.output_path(output)?)
    }

    fn render(&self, call: &WorkerCall<'_>) -> PotterResult<String> {
        let template = call.require("template", call.rule().template.as_ref())?;
        render_template(call, &call.interpolate(template)?)
    }
}

/// Each `{template, output}` pair of `template-batch`, in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateBatchWorker;

impl Worker for TemplateBatchWorker {
    fn name(&self) -> &str {
        worker_names::TEMPLATE_BATCH
    }

    fn mode(&self) -> DispatchMode {
        DispatchMode::Render
    }

    fn do_work(&self, call: &WorkerCall<'_>) -> PotterResult<()> {
        let batch = call.require("template-batch", call.rule().template_batch.as_ref())?;
        for item in batch {
            write_rendered(
                call,
                &call.interpolate(&item.template)?,
                &call.output_path(&item.output)?,
            )?;
        }
        Ok(())
    }
}

/// Every template below `templates/<path>`, rendered to the same relative
/// path below `output`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePathWorker;

impl Worker for TemplatePathWorker {
    fn name(&self) -> &str {
        worker_names::TEMPLATE_PATH
    }

    fn mode(&self) -> DispatchMode {
        DispatchMode::Render
    }

    fn do_work(&self, call: &WorkerCall<'_>) -> PotterResult<()> {
        let mapping = call.require("template-path", call.rule().template_path.as_ref())?;
        let base = RelativePath::new(call.interpolate(&mapping.path)?)?;
        let templates = base.under(&call.context().params().template_path);
        let output_root = call.output_path(&mapping.output)?;

        for relative in relative_files(call, &templates)? {
            let name = base.join(relative.as_path())?;
            write_rendered(call, &name.to_string(), &relative.under(&output_root))?;
        }
        Ok(())
    }
}
