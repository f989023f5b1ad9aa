//! Local filesystem adapter using std::fs, with an in-memory write overlay.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use potter_core::{application::ports::Filesystem, error::PotterResult};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{lock_error, map_io_error};

/// Production filesystem implementation.
///
/// Reads go to disk unless the path is staged. Writes are held until
/// [`commit`](Filesystem::commit), which creates parent directories as needed.
#[derive(Debug, Default)]
pub struct LocalFilesystem {
    staged: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
}

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self::default()
    }

    fn staged(&self, path: &Path) -> PotterResult<Option<Vec<u8>>> {
        let staged = self.staged.read().map_err(lock_error)?;
        Ok(staged.get(path).cloned())
    }

    /// Read access for the infallible queries. A poisoned lock still holds a
    /// complete map (each write is a single insert), so it is read anyway.
    fn overlay(&self) -> RwLockReadGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        self.staged.read().unwrap_or_else(|poisoned| {
            warn!("staging overlay lock poisoned; reading it anyway");
            poisoned.into_inner()
        })
    }
}

impl Filesystem for LocalFilesystem {
    fn read_to_string(&self, path: &Path) -> PotterResult<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| {
            map_io_error(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
                "read file",
            )
        })
    }

    fn read_bytes(&self, path: &Path) -> PotterResult<Vec<u8>> {
        if let Some(bytes) = self.staged(path)? {
            return Ok(bytes);
        }
        fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> PotterResult<()> {
        let mut staged = self.staged.write().map_err(lock_error)?;
        debug!(path = %path.display(), bytes = contents.len(), "staged");
        staged.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.overlay().contains_key(path) || path.exists()
    }

    fn list_files(&self, dir: &Path) -> PotterResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                map_io_error(&path, e.into(), "walk directory")
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        let staged = self.staged.read().map_err(lock_error)?;
        files.extend(staged.keys().filter(|p| p.starts_with(dir)).cloned());
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn create_dir_all(&self, path: &Path) -> PotterResult<()> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn commit(&self) -> PotterResult<usize> {
        let pending = std::mem::take(&mut *self.staged.write().map_err(lock_error)?);
        let count = pending.len();

        for (path, contents) in pending {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| map_io_error(parent, e, "create directory"))?;
            }
            fs::write(&path, &contents).map_err(|e| map_io_error(&path, e, "write file"))?;
            info!(path = %path.display(), "wrote file");
        }
        Ok(count)
    }

    fn pending(&self) -> usize {
        self.overlay().len()
    }
}
