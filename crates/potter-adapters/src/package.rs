//! On-disk generator packages.
//!
//! # Directory layout expected
//!
//! ```text
//! ~/.potter/
//! └── potter-express/
//!     ├── generator.toml     ← manifest (required)
//!     ├── rules.json         ← generator-level rules
//!     ├── templates/
//!     ├── files/             ← sources for CopyFileWorker / CopyPathWorker
//!     └── zip/               ← archives for UnzipperWorker
//! ```
//!
//! # `generator.toml` format
//!
//! ```toml
//! [generator]
//! name        = "express"          # the <type> passed to `potter generate`
//! description = "Express REST API" # optional
//!
//! # Optional: values exposed to workers as `params` and spread into
//! # template variables.
//! [params]
//! port = 3000
//!
//! # Optional: metadata builders for `potter build <type>`.
//! [[builders]]
//! file     = "models.json"   # project-relative source document
//! priority = 10              # lower runs first
//! key      = "entities"      # optional; without it the document is merged whole
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use potter_core::{
    application::{ApplicationError, GeneratorPackage, MetadataBuilder, Worker},
    error::PotterResult,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

pub const MANIFEST_FILE: &str = "generator.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `generator.toml` file.
#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorManifest {
    pub generator: GeneratorSection,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub builders: Vec<BuilderEntry>,
}

/// `[generator]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorSection {
    pub name: String,
    pub description: Option<String>,
}

/// One entry under `[[builders]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct BuilderEntry {
    pub file: PathBuf,
    #[serde(default)]
    pub priority: i32,
    pub key: Option<String>,
}

/// What `potter list` shows for an installed package.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub description: Option<String>,
    pub root: PathBuf,
}

// ── Package ───────────────────────────────────────────────────────────────────

/// A generator package loaded from a directory with a `generator.toml`.
pub struct DirectoryPackage {
    root: PathBuf,
    manifest: GeneratorManifest,
    workers: Vec<Arc<dyn Worker>>,
}

impl DirectoryPackage {
    /// Load the package rooted at `root`.
    ///
    /// # Errors
    ///
    /// [`ApplicationError::DiscoveryFailed`] when the manifest is missing,
    /// unreadable or malformed.
    #[instrument(fields(root = %root.as_ref().display()), skip_all)]
    pub fn load(root: impl AsRef<Path>) -> PotterResult<Self> {
        let root = root.as_ref();
        let manifest_path = root.join(MANIFEST_FILE);
        let failed = |reason: String| ApplicationError::DiscoveryFailed {
            path: manifest_path.clone(),
            reason,
        };

        let raw = fs::read_to_string(&manifest_path).map_err(|e| failed(e.to_string()))?;
        let manifest: GeneratorManifest =
            toml::from_str(&raw).map_err(|e| failed(e.to_string()))?;
        if manifest.generator.name.trim().is_empty() {
            return Err(failed("[generator] name must not be empty".into()).into());
        }
        if manifest.params.as_ref().is_some_and(|p| !p.is_object()) {
            return Err(failed("[params] must be a table".into()).into());
        }

        debug!(name = %manifest.generator.name, builders = manifest.builders.len(), "loaded package");
        Ok(Self {
            root: root.to_path_buf(),
            manifest,
            workers: Vec::new(),
        })
    }

    /// Register extra worker instances for this package.
    pub fn with_workers(mut self, workers: Vec<Arc<dyn Worker>>) -> Self {
        self.workers = workers;
        self
    }

    pub fn manifest(&self) -> &GeneratorManifest {
        &self.manifest
    }

    pub fn info(&self) -> PackageInfo {
        PackageInfo {
            name: self.manifest.generator.name.clone(),
            description: self.manifest.generator.description.clone(),
            root: self.root.clone(),
        }
    }
}

impl GeneratorPackage for DirectoryPackage {
    fn name(&self) -> &str {
        &self.manifest.generator.name
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn params(&self, _input: &Value) -> Value {
        self.manifest
            .params
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    fn workers(&self) -> Vec<Arc<dyn Worker>> {
        self.workers.clone()
    }

    fn builders(&self) -> PotterResult<Vec<Box<dyn MetadataBuilder>>> {
        Ok(self
            .manifest
            .builders
            .iter()
            .map(|entry| {
                Box::new(JsonFileBuilder::new(&entry.file, entry.priority, entry.key.clone()))
                    as Box<dyn MetadataBuilder>
            })
            .collect())
    }
}

// ── Builders ──────────────────────────────────────────────────────────────────

/// Contributes a project JSON document to the built metadata.
///
/// With a `key` the document lands under that key; without one it must be an
/// object and is merged as is.
#[derive(Debug, Clone)]
pub struct JsonFileBuilder {
    name: String,
    file: PathBuf,
    priority: i32,
    key: Option<String>,
}

impl JsonFileBuilder {
    pub fn new(file: impl Into<PathBuf>, priority: i32, key: Option<String>) -> Self {
        let file = file.into();
        Self {
            name: file.display().to_string(),
            file,
            priority,
            key,
        }
    }
}

impl MetadataBuilder for JsonFileBuilder {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn source(&self) -> Option<&Path> {
        Some(&self.file)
    }

    fn build(&self, source: Value) -> PotterResult<Value> {
        if source.is_null() {
            warn!(file = %self.file.display(), "builder source missing; skipped");
            return Ok(Value::Null);
        }
        Ok(match &self.key {
            Some(key) => {
                let mut map = Map::new();
                map.insert(key.clone(), source);
                Value::Object(map)
            }
            None => source,
        })
    }
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Every loadable package directly below `home`, sorted by name.
///
/// A missing `home` yields an empty list. Directories whose manifest fails
/// to load are skipped with a `WARN` log.
#[instrument(skip_all, fields(home = %home.display()))]
pub fn discover_packages(home: &Path) -> PotterResult<Vec<DirectoryPackage>> {
    if !home.exists() {
        debug!("generator home does not exist yet");
        return Ok(Vec::new());
    }

    let mut packages = Vec::new();
    for entry in WalkDir::new(home).min_depth(2).max_depth(2) {
        let entry = entry.map_err(|e| ApplicationError::DiscoveryFailed {
            path: e.path().unwrap_or(home).to_path_buf(),
            reason: e.to_string(),
        })?;
        if entry.file_name() != MANIFEST_FILE || !entry.file_type().is_file() {
            continue;
        }
        let Some(root) = entry.path().parent() else {
            continue;
        };

        match DirectoryPackage::load(root) {
            Ok(package) => packages.push(package),
            Err(e) => warn!(
                dir = %root.display(),
                error = %e,
                "skipping generator directory due to load error"
            ),
        }
    }

    packages.sort_by(|a, b| a.name().cmp(b.name()));
    debug!(count = packages.len(), "finished discovering generators");
    Ok(packages)
}

/// The package whose `[generator] name` or directory name is `name`.
pub fn find_package(home: &Path, name: &str) -> PotterResult<Option<DirectoryPackage>> {
    let direct = [format!("potter-{name}"), name.to_string()];
    Ok(discover_packages(home)?.into_iter().find(|p| {
        p.name() == name
            || p.root()
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|dir| direct.iter().any(|d| d == dir))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_package(home: &Path, dir: &str, manifest: &str) -> PathBuf {
        let root = home.join(dir);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join(MANIFEST_FILE), manifest).unwrap();
        root
    }

    #[test]
    fn loads_manifest_sections() {
        let home = TempDir::new().unwrap();
        let root = write_package(
            home.path(),
            "potter-express",
            r#"
                [generator]
                name = "express"
                description = "Express REST API"

                [params]
                port = 3000

                [[builders]]
                file = "models.json"
                priority = 10
                key = "entities"
            "#,
        );

        let package = DirectoryPackage::load(&root).unwrap();
        assert_eq!(package.name(), "express");
        assert_eq!(package.params(&json!({})), json!({ "port": 3000 }));
        assert_eq!(package.templates_dir(), root.join("templates"));

        let builders = package.builders().unwrap();
        assert_eq!(builders.len(), 1);
        assert_eq!(builders[0].priority(), 10);
        assert_eq!(builders[0].source(), Some(Path::new("models.json")));
    }

    #[test]
    fn missing_manifest_is_a_discovery_error() {
        let home = TempDir::new().unwrap();
        let err = DirectoryPackage::load(home.path()).err().unwrap();
        assert!(err.to_string().contains(MANIFEST_FILE));
    }

    #[test]
    fn params_must_be_a_table() {
        let home = TempDir::new().unwrap();
        let root = write_package(
            home.path(),
            "bad",
            "params = 3\n[generator]\nname = \"bad\"\n",
        );
        assert!(DirectoryPackage::load(&root).is_err());
    }

    #[test]
    fn discovery_skips_invalid_packages_and_sorts() {
        let home = TempDir::new().unwrap();
        write_package(home.path(), "b", "[generator]\nname = \"react\"\n");
        write_package(home.path(), "a", "[generator]\nname = \"express\"\n");
        write_package(home.path(), "broken", "[generator\n");
        fs::create_dir_all(home.path().join("not-a-package")).unwrap();

        let names: Vec<String> = discover_packages(home.path())
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["express", "react"]);
    }

    #[test]
    fn discovery_of_missing_home_is_empty() {
        let home = TempDir::new().unwrap();
        assert!(discover_packages(&home.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn find_package_matches_name_or_directory() {
        let home = TempDir::new().unwrap();
        write_package(home.path(), "potter-api", "[generator]\nname = \"rest\"\n");

        assert!(find_package(home.path(), "rest").unwrap().is_some());
        assert!(find_package(home.path(), "api").unwrap().is_some());
        assert!(find_package(home.path(), "web").unwrap().is_none());
    }

    #[test]
    fn json_builder_nests_under_key() {
        let keyed = JsonFileBuilder::new("models.json", 1, Some("entities".into()));
        assert_eq!(
            keyed.build(json!([{ "name": "User" }])).unwrap(),
            json!({ "entities": [{ "name": "User" }] })
        );

        let whole = JsonFileBuilder::new("extra.json", 2, None);
        assert_eq!(whole.build(json!({ "a": 1 })).unwrap(), json!({ "a": 1 }));
        assert_eq!(whole.build(Value::Null).unwrap(), Value::Null);
    }
}
