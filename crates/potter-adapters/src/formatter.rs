//! Content beautifier keyed by file extension.

use std::path::Path;

use potter_core::{application::ports::Formatter, error::PotterResult};
use tracing::warn;

/// Pretty-prints `.json` output; every other extension passes through.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionFormatter;

impl ExtensionFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for ExtensionFormatter {
    fn format(&self, path: &Path, content: String) -> PotterResult<String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => match serde_json::from_str::<serde_json::Value>(&content) {
                Ok(value) => Ok(serde_json::to_string_pretty(&value)
                    .map(|mut s| {
                        s.push('\n');
                        s
                    })
                    .unwrap_or(content)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "not valid JSON; left unformatted");
                    Ok(content)
                }
            },
            _ => Ok(content),
        }
    }
}
