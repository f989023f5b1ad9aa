//! The execution context: one shared aggregate per run.
//!
//! Assembled by the generator through `&mut self` methods, then handed to the
//! dispatch tree by shared reference. Nothing can add rules or workers once
//! dispatch has started because nothing holds a mutable borrow any more.

use crate::application::ports::{
    ArchiveExtractor, DocumentSource, Filesystem, Formatter, ProcessRunner, RepositoryCloner,
    TemplateRenderer,
};
use crate::application::ApplicationError;
use crate::application::registry::WorkerRegistry;
use crate::application::worker::Worker;
use crate::domain::{
    ContentModel, DomainError, DomainValidator, Entity, Level, Rule, RuleCascade, Selector,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Nesting bound for port dispatch. Deeper trees are reported as a cycle.
pub const MAX_DISPATCH_DEPTH: usize = 128;

/// When staged writes reach the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitPolicy {
    /// Each worker commits when its `run` finishes. A failure later in the
    /// tree leaves earlier output on disk.
    #[default]
    PerWorker,
    /// One commit after the root port returns; nothing is written on failure.
    EndOfRun,
}

impl fmt::Display for CommitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PerWorker => "per-worker",
            Self::EndOfRun => "end-of-run",
        })
    }
}

impl FromStr for CommitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-worker" => Ok(Self::PerWorker),
            "end-of-run" => Ok(Self::EndOfRun),
            other => Err(format!(
                "unknown commit policy '{other}' (expected per-worker or end-of-run)"
            )),
        }
    }
}

/// Run-scoped parameters.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Command-line input (`type`, `args`, ...).
    pub input: Value,
    /// Parameters contributed by the generator package.
    pub params: Value,
    pub project_root: PathBuf,
    pub generator_root: PathBuf,
    /// Generator templates directory.
    pub template_path: PathBuf,
    /// Project-local template overrides.
    pub local_template_path: PathBuf,
    /// Root every output path is resolved against.
    pub destination_root: PathBuf,
    pub commit_policy: CommitPolicy,
}

impl RunParams {
    pub fn new(
        project_root: impl Into<PathBuf>,
        generator_root: impl Into<PathBuf>,
        destination_root: impl Into<PathBuf>,
    ) -> Self {
        let project_root = project_root.into();
        let generator_root = generator_root.into();
        Self {
            input: Value::Object(Map::new()),
            params: Value::Object(Map::new()),
            template_path: generator_root.join("templates"),
            local_template_path: project_root.join("templates"),
            destination_root: destination_root.into(),
            project_root,
            generator_root,
            commit_policy: CommitPolicy::default(),
        }
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = path.into();
        self
    }

    pub fn with_commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.commit_policy = policy;
        self
    }
}

/// The adapters a run works through.
#[derive(Clone)]
pub struct Services {
    pub filesystem: Arc<dyn Filesystem>,
    pub renderer: Arc<dyn TemplateRenderer>,
    pub formatter: Arc<dyn Formatter>,
    pub process: Arc<dyn ProcessRunner>,
    pub archive: Arc<dyn ArchiveExtractor>,
    pub cloner: Arc<dyn RepositoryCloner>,
    pub documents: Arc<dyn DocumentSource>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct ExecutionContext {
    run_id: Uuid,
    metadata: Value,
    model: ContentModel,
    cascades: HashMap<String, RuleCascade>,
    workers: WorkerRegistry,
    params: RunParams,
    services: Services,
    dispatched: AtomicUsize,
    committed: AtomicUsize,
    /// `port for selector` frames currently on the dispatch stack.
    active: Mutex<Vec<String>>,
}

impl ExecutionContext {
    pub fn new(params: RunParams, services: Services) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            metadata: Value::Object(Map::new()),
            model: ContentModel::new(),
            cascades: HashMap::new(),
            workers: WorkerRegistry::new(),
            params,
            services,
            dispatched: AtomicUsize::new(0),
            committed: AtomicUsize::new(0),
            active: Mutex::new(Vec::new()),
        }
    }

    // ── Assembly ─────────────────────────────────────────────────────────────

    /// Keep the raw metadata document and parse its `entities`.
    pub fn add_metadata(&mut self, metadata: Value) -> Result<(), DomainError> {
        let model = ContentModel::from_metadata(&metadata)?;
        DomainValidator::validate_model(&model)?;
        self.metadata = metadata;
        self.add_entities(model.entities().iter().cloned())
    }

    pub fn add_entities(
        &mut self,
        entities: impl IntoIterator<Item = Entity>,
    ) -> Result<(), DomainError> {
        for entity in entities {
            self.model.push(entity)?;
        }
        Ok(())
    }

    /// Index `rules` at `level`, creating cascades for unseen ports.
    ///
    /// Returns the number of rules indexed.
    pub fn add_rules(
        &mut self,
        rules: impl IntoIterator<Item = Rule>,
        level: Level,
    ) -> Result<usize, DomainError> {
        let mut count = 0;
        for rule in rules {
            DomainValidator::validate_rule(&rule)?;
            self.cascades
                .entry(rule.port.clone())
                .or_default()
                .add(level, rule);
            count += 1;
        }
        Ok(count)
    }

    /// Register workers; later names replace earlier ones.
    pub fn add_workers(&mut self, workers: impl IntoIterator<Item = Arc<dyn Worker>>) {
        for worker in workers {
            self.workers.register(worker);
        }
    }

    // ── Lookup ───────────────────────────────────────────────────────────────

    /// The resolved rule for `port`, or `None` if the port has no rules or
    /// none match.
    pub fn rule(&self, port: &str, selector: &Selector<'_>) -> Option<&Rule> {
        self.cascades.get(port).and_then(|c| c.search(selector))
    }

    pub fn cascade(&self, port: &str) -> Option<&RuleCascade> {
        self.cascades.get(port)
    }

    /// Port names with at least one rule, sorted.
    pub fn ports(&self) -> Vec<&str> {
        let mut ports: Vec<&str> = self.cascades.keys().map(String::as_str).collect();
        ports.sort_unstable();
        ports
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn metadata(&self) -> &Value {
        &self.metadata
    }

    pub fn model(&self) -> &ContentModel {
        &self.model
    }

    pub fn entities(&self) -> &[Entity] {
        self.model.entities()
    }

    pub fn workers(&self) -> &WorkerRegistry {
        &self.workers
    }

    pub fn params(&self) -> &RunParams {
        &self.params
    }

    pub fn input(&self) -> &Value {
        &self.params.input
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn rule_count(&self) -> usize {
        self.cascades.values().map(RuleCascade::len).sum()
    }

    // ── Dispatch stack ───────────────────────────────────────────────────────

    /// Push `port` for `selector` onto the dispatch stack.
    ///
    /// Fails with [`ApplicationError::DispatchCycle`] if the same pair is
    /// already being dispatched, or if the stack is [`MAX_DISPATCH_DEPTH`]
    /// deep. The frame pops when the returned guard drops.
    pub(crate) fn enter_port(
        &self,
        port: &str,
        selector: &Selector<'_>,
    ) -> Result<ActivePort<'_>, ApplicationError> {
        let frame = format!("{port} for {selector}");
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);

        let repeat = active.iter().position(|f| *f == frame);
        if repeat.is_some() || active.len() >= MAX_DISPATCH_DEPTH {
            let mut path = active[repeat.unwrap_or(0)..].to_vec();
            path.push(frame);
            return Err(ApplicationError::DispatchCycle {
                port: port.to_string(),
                path,
            });
        }

        active.push(frame);
        Ok(ActivePort {
            active: &self.active,
        })
    }

    /// Ports on the dispatch stack, outermost first.
    pub fn dispatch_stack(&self) -> Vec<String> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ── Run statistics ───────────────────────────────────────────────────────

    pub(crate) fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self, files: usize) {
        self.committed.fetch_add(files, Ordering::Relaxed);
    }

    /// Ports dispatched so far (both paths).
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Files committed so far.
    pub fn committed(&self) -> usize {
        self.committed.load(Ordering::Relaxed)
    }
}

/// Pops its frame from the dispatch stack on drop, including on error paths.
#[derive(Debug)]
pub(crate) struct ActivePort<'a> {
    active: &'a Mutex<Vec<String>>,
}

impl Drop for ActivePort<'_> {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
    }
}
