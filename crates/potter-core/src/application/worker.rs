//! The worker contract and the per-dispatch call handle.
//!
//! Workers are stateless and shared across the whole run. Everything a
//! single dispatch needs (context, resolved rule, port parameters, dispatch
//! mode) travels in a [`WorkerCall`] instead of being stored on the worker.

use crate::application::ApplicationError;
use crate::application::context::{CommitPolicy, ExecutionContext, Services};
use crate::application::port::{Port, PortParams, ResolvedRule};
use crate::application::ports::PortHook;
use crate::domain::{
    DomainError, Entity, PropertyRef, RelativePath, Rule, Scope, Selector, interpolate,
};
use crate::error::PotterResult;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which path nested `invoke` calls from a worker take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Child ports run with side effects (`Port::invoke`).
    Effect,
    /// Child ports only render (`Port::render`); results are concatenated.
    Render,
}

/// A unit of generation behavior.
///
/// Implementors override [`do_work`](Worker::do_work) for side effects,
/// [`render`](Worker::render) for text, or both.
pub trait Worker: Send + Sync {
    /// Registry key. Rules name workers by this string.
    fn name(&self) -> &str;

    /// Dispatch mode of nested invokes when reached through `Port::invoke`.
    ///
    /// Template-driven workers return [`DispatchMode::Render`] so that
    /// content requested from a template never mutates the filesystem.
    fn mode(&self) -> DispatchMode {
        DispatchMode::Effect
    }

    fn do_work(&self, _call: &WorkerCall<'_>) -> PotterResult<()> {
        Ok(())
    }

    fn render(&self, _call: &WorkerCall<'_>) -> PotterResult<String> {
        Ok(String::new())
    }

    /// Side-effecting entry point: `do_work`, then commit staged writes.
    fn run(&self, call: &WorkerCall<'_>) -> PotterResult<()> {
        self.do_work(call)?;
        call.commit()
    }
}

/// Everything one worker invocation can see.
#[derive(Debug, Clone, Copy)]
pub struct WorkerCall<'a> {
    ctx: &'a ExecutionContext,
    port: &'a str,
    rule: &'a Rule,
    params: PortParams<'a>,
    mode: DispatchMode,
}

impl<'a> WorkerCall<'a> {
    pub fn new(
        ctx: &'a ExecutionContext,
        port: &'a str,
        resolved: ResolvedRule<'a>,
        mode: DispatchMode,
    ) -> Self {
        Self {
            ctx,
            port,
            rule: resolved.rule,
            params: resolved.params,
            mode,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn context(&self) -> &'a ExecutionContext {
        self.ctx
    }

    pub fn services(&self) -> &'a Services {
        self.ctx.services()
    }

    pub fn port(&self) -> &'a str {
        self.port
    }

    pub fn rule(&self) -> &'a Rule {
        self.rule
    }

    pub fn params(&self) -> &PortParams<'a> {
        &self.params
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn selector(&self) -> Selector<'a> {
        self.params.item
    }

    /// Set only on entity-specialized ports.
    pub fn entity(&self) -> Option<&'a Entity> {
        self.params.entity
    }

    /// Set only on property-specialized ports.
    pub fn property(&self) -> Option<PropertyRef<'a>> {
        self.params.property
    }

    pub fn entities(&self) -> &'a [Entity] {
        self.ctx.entities()
    }

    pub fn input(&self) -> &'a Value {
        self.ctx.input()
    }

    pub fn configuration(&self) -> Option<&'a Value> {
        self.rule.configuration.as_ref()
    }

    /// A payload field the worker cannot do without.
    pub fn require<T>(&self, field: &'static str, value: Option<&'a T>) -> Result<&'a T, DomainError> {
        value.ok_or_else(|| DomainError::MissingRuleField {
            port: self.rule.port.clone(),
            field,
        })
    }

    // ── Values ───────────────────────────────────────────────────────────────

    pub fn scope(&self) -> Scope<'a> {
        let run = self.ctx.params();
        Scope::new(self.params.item, &run.input, &run.params, self.ctx.metadata())
            .with_config(self.configuration())
    }

    /// Substitute `${...}` placeholders in a rule string.
    pub fn interpolate(&self, text: &str) -> PotterResult<String> {
        Ok(interpolate(text, &self.scope())?)
    }

    /// The variable map handed to the template renderer.
    ///
    /// Generator params are spread at the top level first; the reserved keys
    /// (`metadata`, `entities`, `config`, `input`, `params`, and the port's
    /// `item` / `entity` / `property`) are set afterwards and win.
    pub fn template_vars(&self) -> Value {
        let run = self.ctx.params();
        let mut vars = match &run.params {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        vars.insert("metadata".into(), self.ctx.metadata().clone());
        vars.insert("entities".into(), self.ctx.model().to_value());
        vars.insert(
            "config".into(),
            self.configuration()
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
        );
        vars.insert("input".into(), run.input.clone());
        vars.insert("params".into(), run.params.clone());
        vars.extend(self.params.to_map());
        Value::Object(vars)
    }

    // ── Paths ────────────────────────────────────────────────────────────────

    /// Absolute output path for a (possibly templated) relative path.
    pub fn output_path(&self, raw: &str) -> PotterResult<PathBuf> {
        let relative = RelativePath::new(self.interpolate(raw)?)?;
        Ok(relative.under(&self.ctx.params().destination_root))
    }

    /// A file shipped with the generator, e.g. `files/<name>` or `zip/<name>`.
    pub fn generator_file(&self, subdir: &str, name: &str) -> PotterResult<PathBuf> {
        let relative = RelativePath::new(name)?;
        Ok(relative.under(&self.ctx.params().generator_root.join(subdir)))
    }

    /// Find a template, project-local first, then the generator's.
    pub fn template_source(&self, name: &str) -> PotterResult<(PathBuf, String)> {
        let relative = RelativePath::new(name)?;
        let run = self.ctx.params();
        let fs = &self.services().filesystem;

        let candidates = [
            relative.under(&run.local_template_path),
            relative.under(&run.template_path),
        ];
        for candidate in &candidates {
            if fs.exists(candidate) {
                debug!(template = name, path = %candidate.display(), "template located");
                let source = fs.read_to_string(candidate)?;
                return Ok((candidate.clone(), source));
            }
        }

        Err(ApplicationError::TemplateNotFound {
            name: name.to_string(),
            searched: candidates.to_vec(),
        }
        .into())
    }

    pub fn destination_root(&self) -> &'a Path {
        &self.ctx.params().destination_root
    }

    // ── Nested dispatch ──────────────────────────────────────────────────────

    /// Invoke a child port. Effect-mode calls return an empty string;
    /// render-mode calls return the child's text.
    pub fn invoke(&self, port: &str, selector: Selector<'_>) -> PotterResult<String> {
        match self.mode {
            DispatchMode::Effect => {
                Port::invoke(self.ctx, port, selector)?;
                Ok(String::new())
            }
            DispatchMode::Render => Port::render(self.ctx, port, selector),
        }
    }

    /// Invoke `port` for every selector in order; render results are
    /// concatenated.
    pub fn invoke_loop<'s>(
        &self,
        port: &str,
        selectors: impl IntoIterator<Item = Selector<'s>>,
    ) -> PotterResult<String> {
        let mut out = String::new();
        for selector in selectors {
            out.push_str(&self.invoke(port, selector)?);
        }
        Ok(out)
    }

    /// Flush staged writes if the run commits per worker.
    pub fn commit(&self) -> PotterResult<()> {
        if self.ctx.params().commit_policy == CommitPolicy::PerWorker {
            let written = self.services().filesystem.commit()?;
            self.ctx.record_commit(written);
        }
        Ok(())
    }

    /// Flush staged writes regardless of the commit policy.
    ///
    /// Workers call this before starting a process or extracting an archive
    /// into the destination, so the external side sees everything generated
    /// so far. Under [`CommitPolicy::EndOfRun`] this moves the barrier
    /// forward: output staged before the flush survives a later failure.
    pub fn flush(&self) -> PotterResult<()> {
        let fs = &self.services().filesystem;
        let pending = fs.pending();
        if pending == 0 {
            return Ok(());
        }
        debug!(port = self.port, pending, policy = %self.ctx.params().commit_policy, "flushing staged writes");
        let written = fs.commit()?;
        self.ctx.record_commit(written);
        Ok(())
    }
}

impl PortHook for WorkerCall<'_> {
    fn render_port(&self, port: &str, target: Option<&str>) -> PotterResult<String> {
        let ctx = self.ctx;
        let item = self.params.item;
        let missing = |what: &str| ApplicationError::RenderingFailed {
            reason: format!("{{{{> {port} {what}}}}} needs a selector with {what}, got {item}"),
        };

        match target.unwrap_or("item") {
            "item" => Port::render(ctx, port, item),
            "none" => Port::render(ctx, port, Selector::None),
            "entity" => {
                let entity = item.owning_entity().ok_or_else(|| missing("entity"))?;
                Port::render(ctx, port, Selector::Entity(entity))
            }
            "property" => {
                let property = item.property_ref().ok_or_else(|| missing("property"))?;
                Port::render(ctx, port, Selector::Property(property))
            }
            "entities" => {
                let mut out = String::new();
                for entity in ctx.entities() {
                    out.push_str(&Port::render(ctx, port, Selector::Entity(entity))?);
                }
                Ok(out)
            }
            "properties" => {
                let entity = item.owning_entity().ok_or_else(|| missing("properties"))?;
                let mut out = String::new();
                for property in entity.properties() {
                    out.push_str(&Port::render(ctx, port, Selector::property(entity, property))?);
                }
                Ok(out)
            }
            other => Err(ApplicationError::RenderingFailed {
                reason: format!("unknown port target '{other}' in {{{{> {port} {other}}}}}"),
            }
            .into()),
        }
    }
}
