//! Generator orchestration.
//!
//! ```text
//! Idle ──build_context──► ContextBuilt ──root port──► Dispatching ──► Flushed ──► Done
//! ```
//!
//! The context is assembled from three levels: built-in (API) workers and
//! rules, the generator package, and the local project. Dispatch starts at
//! the root port `generator`. Any error aborts the run; a generator instance
//! is never reused.

use crate::application::ApplicationError;
use crate::application::context::{CommitPolicy, ExecutionContext, RunParams, Services};
use crate::application::port::Port;
use crate::application::ports::DocumentSource;
use crate::application::services::builder::MetadataBuilder;
use crate::application::worker::Worker;
use crate::domain::{Level, ROOT_PORT, Rule, Selector};
use crate::error::PotterResult;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// A generator package: rules, templates and files for one project type.
pub trait GeneratorPackage: Send + Sync {
    fn name(&self) -> &str;

    /// Package directory; `files/`, `zip/` and `templates/` live under it.
    fn root(&self) -> &Path;

    fn templates_dir(&self) -> PathBuf {
        self.root().join("templates")
    }

    /// Extra parameters exposed to workers, derived from the run input.
    fn params(&self, _input: &Value) -> Value {
        Value::Object(Map::new())
    }

    /// Workers the package contributes on top of the built-in set.
    fn workers(&self) -> Vec<Arc<dyn Worker>> {
        Vec::new()
    }

    /// Generator-level rules. Defaults to `<root>/rules.json`; a missing file
    /// means no rules.
    fn rules(&self, documents: &dyn DocumentSource) -> PotterResult<Vec<Rule>> {
        let document = documents.read_json(&self.root().join("rules.json"))?;
        Ok(Rule::list_from_value(document.unwrap_or(Value::Null))?)
    }

    /// Whether the run creates its destination directory before dispatch.
    fn enters_destination(&self) -> bool {
        true
    }

    /// Builders for the metadata build pass.
    fn builders(&self) -> PotterResult<Vec<Box<dyn MetadataBuilder>>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Idle,
    ContextBuilt,
    Dispatching,
    Flushed,
    Done,
}

/// Inputs of one generator run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub project_root: PathBuf,
    pub destination_root: PathBuf,
    pub input: Value,
    pub commit_policy: CommitPolicy,
}

impl RunRequest {
    pub fn new(project_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            destination_root: destination_root.into(),
            input: Value::Object(Map::new()),
            commit_policy: CommitPolicy::default(),
        }
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    pub fn with_commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.commit_policy = policy;
        self
    }

    /// The `type` field of the input, if any.
    pub fn kind(&self) -> Option<&str> {
        self.input.get("type").and_then(Value::as_str)
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub generator: String,
    pub destination: PathBuf,
    pub entities: usize,
    pub rules: usize,
    pub workers: usize,
    pub dispatched: usize,
    pub files_committed: usize,
}

pub struct Generator {
    package: Arc<dyn GeneratorPackage>,
    services: Services,
    api_workers: Vec<Arc<dyn Worker>>,
    api_rules: Vec<Rule>,
    local_workers: Vec<Arc<dyn Worker>>,
    state: GeneratorState,
}

impl Generator {
    pub fn new(package: Arc<dyn GeneratorPackage>, services: Services) -> Self {
        Self {
            package,
            services,
            api_workers: Vec::new(),
            api_rules: Vec::new(),
            local_workers: Vec::new(),
            state: GeneratorState::Idle,
        }
    }

    /// Built-in workers and rules (the API level).
    pub fn with_api(mut self, workers: Vec<Arc<dyn Worker>>, rules: Vec<Rule>) -> Self {
        self.api_workers = workers;
        self.api_rules = rules;
        self
    }

    /// Project-local worker overrides, registered last.
    pub fn with_local_workers(mut self, workers: Vec<Arc<dyn Worker>>) -> Self {
        self.local_workers = workers;
        self
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn package(&self) -> &dyn GeneratorPackage {
        self.package.as_ref()
    }

    /// Build the context, dispatch the root port, flush.
    #[instrument(skip_all, fields(generator = %self.package.name()))]
    pub fn run(&mut self, request: RunRequest) -> PotterResult<RunReport> {
        if self.state != GeneratorState::Idle {
            return Err(ApplicationError::GeneratorAlreadyRan {
                name: self.package.name().to_string(),
            }
            .into());
        }

        let result = self.run_inner(&request);
        self.state = GeneratorState::Done;
        result
    }

    fn run_inner(&mut self, request: &RunRequest) -> PotterResult<RunReport> {
        let ctx = self.build_context(request)?;
        self.state = GeneratorState::ContextBuilt;

        self.state = GeneratorState::Dispatching;
        self.dispatch(&ctx)?;

        if ctx.params().commit_policy == CommitPolicy::EndOfRun {
            let written = self.services.filesystem.commit()?;
            ctx.record_commit(written);
        }
        self.state = GeneratorState::Flushed;

        let report = RunReport {
            run_id: ctx.run_id(),
            generator: self.package.name().to_string(),
            destination: ctx.params().destination_root.clone(),
            entities: ctx.entities().len(),
            rules: ctx.rule_count(),
            workers: ctx.workers().len(),
            dispatched: ctx.dispatched(),
            files_committed: ctx.committed(),
        };
        info!(
            run_id = %report.run_id,
            dispatched = report.dispatched,
            files = report.files_committed,
            "generation finished"
        );
        Ok(report)
    }

    /// Assemble the execution context for `request` from all three levels.
    pub fn build_context(&self, request: &RunRequest) -> PotterResult<ExecutionContext> {
        let documents = self.services.documents.as_ref();
        let package = self.package.as_ref();

        let params = RunParams::new(
            &request.project_root,
            package.root(),
            &request.destination_root,
        )
        .with_input(request.input.clone())
        .with_params(package.params(&request.input))
        .with_template_path(package.templates_dir())
        .with_commit_policy(request.commit_policy);

        let mut ctx = ExecutionContext::new(params, self.services.clone());

        if let Some(metadata) = self.load_metadata(request)? {
            ctx.add_metadata(metadata)?;
        }

        ctx.add_workers(self.api_workers.iter().cloned());
        ctx.add_workers(package.workers());
        ctx.add_workers(self.local_workers.iter().cloned());

        let api = ctx.add_rules(self.api_rules.iter().cloned(), Level::Api)?;
        let generator = ctx.add_rules(package.rules(documents)?, Level::Generator)?;
        let local_document = documents.read_json(&request.project_root.join("rules.json"))?;
        let local = ctx.add_rules(
            Rule::list_from_value(local_document.unwrap_or(Value::Null))?,
            Level::Local,
        )?;

        debug!(
            entities = ctx.entities().len(),
            workers = ?ctx.workers().names(),
            api,
            generator,
            local,
            "context built"
        );
        Ok(ctx)
    }

    fn load_metadata(&self, request: &RunRequest) -> PotterResult<Option<Value>> {
        let documents = self.services.documents.as_ref();

        if let Some(kind) = request.kind() {
            let built = crate::application::services::BuildService::metadata_path(
                &request.project_root,
                kind,
            )?;
            if let Some(metadata) = documents.read_json(&built)? {
                debug!(path = %built.display(), "using built metadata");
                return Ok(Some(metadata));
            }
        }
        documents.read_json(&request.project_root.join("metadata.json"))
    }

    fn dispatch(&self, ctx: &ExecutionContext) -> PotterResult<()> {
        if self.package.enters_destination() {
            self.services
                .filesystem
                .create_dir_all(&ctx.params().destination_root)?;
        }
        Port::invoke(ctx, ROOT_PORT, Selector::None)
    }
}
