//! Metadata build pass.
//!
//! Before generating, a project's descriptive files are folded into a single
//! `meta/<type>/metadata.json`. The pass starts from `project.json`, runs the
//! generator package's builders in ascending priority, and shallow-merges
//! each builder's object output over what came before.

use crate::application::ApplicationError;
use crate::application::ports::DocumentSource;
use crate::domain::RelativePath;
use crate::error::PotterResult;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// One step of the build pass.
pub trait MetadataBuilder: Send + Sync {
    fn name(&self) -> &str;

    /// Lower runs first.
    fn priority(&self) -> i32;

    /// Project-relative document this builder reads, if any.
    fn source(&self) -> Option<&Path>;

    /// Produce metadata from the source document (`Value::Null` when the
    /// builder has no source or the file is missing).
    fn build(&self, source: Value) -> PotterResult<Value>;
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output: PathBuf,
    pub builders_run: usize,
    pub keys: Vec<String>,
}

pub struct BuildService {
    documents: Arc<dyn DocumentSource>,
}

impl BuildService {
    pub fn new(documents: Arc<dyn DocumentSource>) -> Self {
        Self { documents }
    }

    /// Where the build pass writes metadata for `kind`.
    pub fn metadata_path(project_root: &Path, kind: &str) -> PotterResult<PathBuf> {
        let relative = RelativePath::new(Path::new("meta").join(kind).join("metadata.json"))?;
        Ok(relative.under(project_root))
    }

    #[instrument(skip_all, fields(kind = %kind, builders = builders.len()))]
    pub fn build(
        &self,
        project_root: &Path,
        kind: &str,
        mut builders: Vec<Box<dyn MetadataBuilder>>,
    ) -> PotterResult<BuildReport> {
        let output = Self::metadata_path(project_root, kind)?;

        let project_file = project_root.join("project.json");
        let mut merged = match self.documents.read_json(&project_file)? {
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(ApplicationError::InvalidDocument {
                    path: project_file,
                    reason: "expected a JSON object".into(),
                }
                .into());
            }
            None => Map::new(),
        };

        builders.sort_by_key(|b| b.priority());
        for builder in &builders {
            let source = match builder.source() {
                Some(rel) => {
                    let path = RelativePath::new(rel)?.under(project_root);
                    self.documents.read_json(&path)?.unwrap_or(Value::Null)
                }
                None => Value::Null,
            };

            match builder.build(source)? {
                Value::Object(part) => {
                    info!(builder = builder.name(), keys = part.len(), "[build] merged");
                    merged.extend(part);
                }
                Value::Null => {}
                other => warn!(
                    builder = builder.name(),
                    "builder returned {} instead of an object; ignored",
                    if other.is_array() { "an array" } else { "a scalar" }
                ),
            }
        }

        let keys = merged.keys().cloned().collect();
        self.documents.write_json(&output, &Value::Object(merged))?;
        info!(path = %output.display(), "[build] metadata written");

        Ok(BuildReport {
            output,
            builders_run: builders.len(),
            keys,
        })
    }
}
