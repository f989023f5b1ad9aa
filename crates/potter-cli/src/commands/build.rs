//! `potter build <type>`: run the metadata build pass.

use std::sync::Arc;

use potter_adapters::JsonDocumentSource;
use potter_core::application::{BuildService, GeneratorPackage};
use tracing::instrument;

use crate::{
    cli::{BuildArgs, OutputFormat},
    commands::{installed_package, project_root},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(kind = %args.kind))]
pub fn execute(args: BuildArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let root = project_root()?;
    let package = installed_package(&config.generators.home, &args.kind)?;

    let service = BuildService::new(Arc::new(JsonDocumentSource::new()));
    let report = service.build(&root, &args.kind, package.builders()?)?;

    if output.format() == OutputFormat::Json {
        output.json(&serde_json::json!({
            "output": report.output,
            "builders": report.builders_run,
            "keys": report.keys,
        }))?;
        return Ok(());
    }

    output.success(&format!(
        "Built {} ({} builder(s), keys: {})",
        report.output.display(),
        report.builders_run,
        report.keys.join(", ")
    ))?;
    Ok(())
}
