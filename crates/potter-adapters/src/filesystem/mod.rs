//! Filesystem adapters.
//!
//! Both adapters stage writes in memory until `commit`.

mod local;
mod memory;

pub use local::LocalFilesystem;
pub use memory::MemoryFilesystem;

use std::io;
use std::path::Path;

use potter_core::application::ApplicationError;
use potter_core::error::PotterError;

pub(crate) fn map_io_error(path: &Path, e: io::Error, operation: &str) -> PotterError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

pub(crate) fn lock_error<T>(_: T) -> PotterError {
    ApplicationError::StoreLockError.into()
}
