//! Zip extraction adapter.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use potter_core::{
    application::{ApplicationError, ports::ArchiveExtractor},
    error::PotterResult,
};
use tracing::{debug, info, instrument, warn};

/// Extracts zip archives straight to disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ZipExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveExtractor for ZipExtractor {
    #[instrument(skip(self), fields(archive = %archive.display()))]
    fn extract(&self, archive: &Path, destination: &Path) -> PotterResult<usize> {
        let failed = |reason: String| ApplicationError::ArchiveFailed {
            archive: archive.to_path_buf(),
            reason,
        };

        let file = File::open(archive).map_err(|e| failed(e.to_string()))?;
        let mut zip = zip::ZipArchive::new(file).map_err(|e| failed(e.to_string()))?;
        fs::create_dir_all(destination).map_err(|e| failed(e.to_string()))?;

        let mut extracted = 0;
        for index in 0..zip.len() {
            let mut entry = zip.by_index(index).map_err(|e| failed(e.to_string()))?;
            let Some(relative) = entry.enclosed_name() else {
                warn!(entry = entry.name(), "skipping entry outside the destination");
                continue;
            };
            let target = destination.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target).map_err(|e| failed(e.to_string()))?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
            }
            let mut out = File::create(&target).map_err(|e| failed(e.to_string()))?;
            io::copy(&mut entry, &mut out).map_err(|e| failed(e.to_string()))?;
            debug!(path = %target.display(), "extracted");
            extracted += 1;
        }

        info!(
            destination = %destination.display(),
            files = extracted,
            "[unzip] extracted"
        );
        Ok(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn make_zip(path: &Path, files: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, body) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_nested_files() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("public.zip");
        make_zip(
            &archive,
            &[("index.html", "<html/>"), ("css/site.css", "body {}")],
        );

        let out = temp.path().join("dist/public");
        let count = ZipExtractor::new().extract(&archive, &out).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            fs::read_to_string(out.join("css/site.css")).unwrap(),
            "body {}"
        );
    }

    #[test]
    fn missing_archive_is_an_archive_error() {
        let temp = TempDir::new().unwrap();
        let err = ZipExtractor::new()
            .extract(&temp.path().join("missing.zip"), temp.path())
            .unwrap_err();
        assert!(err.to_string().contains("missing.zip"));
    }
}
