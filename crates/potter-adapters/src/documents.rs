//! JSON documents on disk: metadata, rules, project descriptions.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use potter_core::{
    application::{ApplicationError, ports::DocumentSource},
    error::PotterResult,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::filesystem::map_io_error;

/// Reads and writes JSON files directly (not staged).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentSource;

impl JsonDocumentSource {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentSource for JsonDocumentSource {
    fn read_json(&self, path: &Path) -> PotterResult<Option<Value>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "document missing; treated as empty");
                return Ok(None);
            }
            Err(e) => return Err(map_io_error(path, e, "read document")),
        };

        serde_json::from_str(&raw).map(Some).map_err(|e| {
            ApplicationError::InvalidDocument {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn write_json(&self, path: &Path, value: &Value) -> PotterResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| map_io_error(parent, e, "create directory"))?;
        }
        let mut body = serde_json::to_string_pretty(value).map_err(|e| {
            ApplicationError::InvalidDocument {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        body.push('\n');
        fs::write(path, body).map_err(|e| map_io_error(path, e, "write document"))?;
        info!(path = %path.display(), "wrote document");
        Ok(())
    }
}
