//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what workers and services need from external
//! systems. The `potter-adapters` crate provides implementations.

use crate::error::PotterResult;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Port for filesystem operations.
///
/// Writes are staged in memory and only reach the backing store on
/// [`commit`](Filesystem::commit). Reads see staged content first.
///
/// Implemented by:
/// - `potter_adapters::filesystem::LocalFilesystem` (production)
/// - `potter_adapters::filesystem::MemoryFilesystem` (testing)
pub trait Filesystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> PotterResult<String>;

    fn read_bytes(&self, path: &Path) -> PotterResult<Vec<u8>>;

    /// Stage `contents` for `path`, replacing anything staged before.
    fn write(&self, path: &Path, contents: &[u8]) -> PotterResult<()>;

    /// True if `path` is staged or exists in the backing store.
    fn exists(&self, path: &Path) -> bool;

    /// Every file below `dir`, recursively, sorted.
    fn list_files(&self, dir: &Path) -> PotterResult<Vec<PathBuf>>;

    /// Create a directory and its parents immediately (not staged).
    fn create_dir_all(&self, path: &Path) -> PotterResult<()>;

    /// Flush staged writes; returns how many files were written.
    fn commit(&self) -> PotterResult<usize>;

    /// Number of staged, uncommitted writes.
    fn pending(&self) -> usize;
}

/// Callback through which a template asks for another port's content.
///
/// `target` names what the child port is opened for: `item` (default),
/// `entity`, `property`, `none`, or the loops `entities` / `properties`.
pub trait PortHook {
    fn render_port(&self, port: &str, target: Option<&str>) -> PotterResult<String>;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `potter_adapters::renderer::SimpleRenderer` (`{{ path }}` substitution)
pub trait TemplateRenderer: Send + Sync {
    /// Expand `source` (identified as `name` for diagnostics) against `vars`.
    ///
    /// Rendering is pure: nested ports are requested through `hook`, which
    /// only ever takes the rendering path.
    fn render(
        &self,
        name: &str,
        source: &str,
        vars: &Value,
        hook: &dyn PortHook,
    ) -> PotterResult<String>;
}

/// Port for beautifying generated content, keyed by file extension.
///
/// Implemented by:
/// - `potter_adapters::formatter::ExtensionFormatter`
pub trait Formatter: Send + Sync {
    fn format(&self, path: &Path, content: String) -> PotterResult<String>;
}

/// Port for running external commands. Blocks until the process exits.
///
/// Implemented by:
/// - `potter_adapters::process::SystemProcessRunner`
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> PotterResult<()>;
}

/// Port for archive extraction. Writes directly, bypassing the staging area.
///
/// Implemented by:
/// - `potter_adapters::archive::ZipExtractor`
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive` into `destination`; returns the number of entries.
    fn extract(&self, archive: &Path, destination: &Path) -> PotterResult<usize>;
}

/// Port for cloning version-controlled repositories.
///
/// Implemented by:
/// - `potter_adapters::process::GitCloner`
pub trait RepositoryCloner: Send + Sync {
    /// Clone `url` inside `parent`; returns the checkout directory.
    fn clone_repo(&self, url: &str, parent: &Path) -> PotterResult<PathBuf>;
}

/// Port for JSON documents (metadata, rules, project descriptions).
///
/// Implemented by:
/// - `potter_adapters::documents::JsonDocumentSource`
pub trait DocumentSource: Send + Sync {
    /// `Ok(None)` when the document does not exist; an error when it exists
    /// but is not valid JSON.
    fn read_json(&self, path: &Path) -> PotterResult<Option<Value>>;

    /// Write `value` pretty-printed, creating parent directories.
    fn write_json(&self, path: &Path, value: &Value) -> PotterResult<()>;
}
