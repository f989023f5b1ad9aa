//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use potter_core::{
    application::{ApplicationError, ports::Filesystem},
    error::PotterResult,
};

use super::lock_error;

/// In-memory filesystem for testing.
///
/// Clones share the same storage, so a test can keep a handle while the
/// run owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    staged: BTreeMap<PathBuf, Vec<u8>>,
    directories: HashSet<PathBuf>,
    commits: usize,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a committed file (testing helper).
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.insert(path.into(), contents.as_ref().to_vec());
        }
        self
    }

    /// Committed content of a file (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner
            .files
            .get(path)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// Committed files, sorted.
    pub fn committed_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// How many times `commit` flushed at least one file.
    pub fn commit_count(&self) -> usize {
        self.inner.read().map(|inner| inner.commits).unwrap_or(0)
    }

    pub fn has_directory(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }
}

impl Filesystem for MemoryFilesystem {
    fn read_to_string(&self, path: &Path) -> PotterResult<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| {
            ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn read_bytes(&self, path: &Path) -> PotterResult<Vec<u8>> {
        let inner = self.inner.read().map_err(lock_error)?;
        inner
            .staged
            .get(path)
            .or_else(|| inner.files.get(path))
            .cloned()
            .ok_or_else(|| {
                ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "No such file".into(),
                }
                .into()
            })
    }

    fn write(&self, path: &Path, contents: &[u8]) -> PotterResult<()> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        inner.staged.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| {
                inner.staged.contains_key(path)
                    || inner.files.contains_key(path)
                    || inner.directories.contains(path)
            })
            .unwrap_or(false)
    }

    fn list_files(&self, dir: &Path) -> PotterResult<Vec<PathBuf>> {
        let inner = self.inner.read().map_err(lock_error)?;
        let mut files: Vec<PathBuf> = inner
            .files
            .keys()
            .chain(inner.staged.keys())
            .filter(|p| p.starts_with(dir))
            .cloned()
            .collect();
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn create_dir_all(&self, path: &Path) -> PotterResult<()> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }
        Ok(())
    }

    fn commit(&self) -> PotterResult<usize> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        let staged = std::mem::take(&mut inner.staged);
        let count = staged.len();

        for (path, contents) in staged {
            let mut current = PathBuf::new();
            if let Some(parent) = path.parent() {
                for component in parent.components() {
                    current.push(component);
                    inner.directories.insert(current.clone());
                }
            }
            inner.files.insert(path, contents);
        }
        if count > 0 {
            inner.commits += 1;
        }
        Ok(count)
    }

    fn pending(&self) -> usize {
        self.inner.read().map(|inner| inner.staged.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_content_shadows_committed_content() {
        let fs = MemoryFilesystem::new().with_file("/p/a.txt", "old");
        fs.write(Path::new("/p/a.txt"), b"new").unwrap();

        assert_eq!(fs.read_to_string(Path::new("/p/a.txt")).unwrap(), "new");
        assert_eq!(fs.read_file(Path::new("/p/a.txt")).as_deref(), Some("old"));

        fs.commit().unwrap();
        assert_eq!(fs.read_file(Path::new("/p/a.txt")).as_deref(), Some("new"));
    }

    #[test]
    fn commit_creates_parent_directories() {
        let fs = MemoryFilesystem::new();
        fs.write(Path::new("/out/src/models/user.js"), b"x").unwrap();
        assert_eq!(fs.commit().unwrap(), 1);

        assert!(fs.has_directory(Path::new("/out/src/models")));
        assert_eq!(fs.commit_count(), 1);
        assert_eq!(fs.commit().unwrap(), 0);
        assert_eq!(fs.commit_count(), 1);
    }

    #[test]
    fn clones_share_storage() {
        let fs = MemoryFilesystem::new();
        let handle = fs.clone();
        fs.write(Path::new("/a"), b"1").unwrap();
        fs.commit().unwrap();
        assert_eq!(handle.committed_files(), vec![PathBuf::from("/a")]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let fs = MemoryFilesystem::new();
        assert!(fs.read_bytes(Path::new("/nope")).is_err());
        assert!(!fs.exists(Path::new("/nope")));
    }
}
