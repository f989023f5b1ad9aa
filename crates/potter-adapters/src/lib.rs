//! Infrastructure adapters for Potter.
//!
//! This crate implements the ports defined in `potter-core::application::ports`
//! and ships the built-in worker set. It contains all external dependencies
//! and I/O operations.

pub mod archive;
pub mod documents;
pub mod filesystem;
pub mod formatter;
pub mod installer;
pub mod package;
pub mod process;
pub mod renderer;
pub mod workers;

use std::sync::Arc;

use potter_core::application::Services;

// Re-export commonly used adapters
pub use archive::ZipExtractor;
pub use documents::JsonDocumentSource;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use formatter::ExtensionFormatter;
pub use installer::{InstallerPackage, InstallerWorker};
pub use package::{DirectoryPackage, JsonFileBuilder, PackageInfo, discover_packages, find_package};
pub use process::{GitCloner, SystemProcessRunner};
pub use renderer::SimpleRenderer;
pub use workers::builtin_workers;

/// The production adapter set: staged local disk, real processes.
pub fn local_services() -> Services {
    Services {
        filesystem: Arc::new(LocalFilesystem::new()),
        renderer: Arc::new(SimpleRenderer::new()),
        formatter: Arc::new(ExtensionFormatter::new()),
        process: Arc::new(SystemProcessRunner::new()),
        archive: Arc::new(ZipExtractor::new()),
        cloner: Arc::new(GitCloner::new()),
        documents: Arc::new(JsonDocumentSource::new()),
    }
}
