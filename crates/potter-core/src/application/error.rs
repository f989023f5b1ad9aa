//! Application layer errors.
//!
//! These errors represent failures in orchestration and in the adapters
//! behind the driven ports, not in rule or model logic. Those are
//! `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while building a context or dispatching ports.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A resolved rule names a worker nobody registered.
    #[error("Unknown worker '{name}' for port '{port}'")]
    UnknownWorker { name: String, port: String },

    /// A document exists but could not be parsed.
    #[error("Invalid document {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    /// A template could not be found in the project or generator.
    #[error("Template not found: {name}")]
    TemplateNotFound { name: String, searched: Vec<PathBuf> },

    /// Template rendering failed.
    #[error("Template rendering failed: {reason}")]
    RenderingFailed { reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// An external command exited unsuccessfully or could not start.
    #[error("Command '{program}' failed: {reason}")]
    ProcessFailed { program: String, reason: String },

    /// Archive extraction failed.
    #[error("Could not extract {archive}: {reason}")]
    ArchiveFailed { archive: PathBuf, reason: String },

    /// Repository clone failed.
    #[error("Could not clone {url}: {reason}")]
    CloneFailed { url: String, reason: String },

    /// A generator package or worker source could not be read.
    #[error("Generator discovery failed at {path}: {reason}")]
    DiscoveryFailed { path: PathBuf, reason: String },

    /// Shared state lock poisoned.
    #[error("Staging area lock poisoned")]
    StoreLockError,

    /// A port was reached again while it was still being dispatched for the
    /// same selector, or dispatch nested past `MAX_DISPATCH_DEPTH`.
    #[error("Dispatch cycle at port '{port}': {}", .path.join(" -> "))]
    DispatchCycle { port: String, path: Vec<String> },

    /// A generator instance was run twice.
    #[error("Generator '{name}' has already run; create a new one per run")]
    GeneratorAlreadyRan { name: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownWorker { name, port } => vec![
                format!("Port '{}' resolved to worker '{}'", port, name),
                "Check the 'worker' field of the matching rule for typos".into(),
                "Custom workers must be registered by the generator package".into(),
            ],
            Self::InvalidDocument { path, .. } => vec![
                format!("Fix the JSON syntax in {}", path.display()),
                "Missing documents are allowed; malformed ones are not".into(),
            ],
            Self::TemplateNotFound { searched, .. } => {
                let mut hints: Vec<String> = searched
                    .iter()
                    .map(|p| format!("Looked in: {}", p.display()))
                    .collect();
                hints.push("Templates are resolved from ./templates first, then the generator".into());
                hints
            }
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::ProcessFailed { program, .. } => vec![
                format!("Make sure '{}' is installed and on your PATH", program),
            ],
            Self::CloneFailed { .. } => vec![
                "Check the repository URL and your network connection".into(),
                "The 'git' executable must be on your PATH".into(),
            ],
            Self::DiscoveryFailed { path, .. } => vec![
                format!("Check the generator package at {}", path.display()),
                "A package needs a readable generator.toml".into(),
                "Try: potter list to see installed generators".into(),
            ],
            Self::DispatchCycle { port, .. } => vec![
                format!("Port '{}' ends up dispatching itself", port),
                "Break the loop in the 'chain' lists of rules.json".into(),
                "Check {{> port}} includes in templates for ports that include each other".into(),
            ],
            Self::StoreLockError => vec!["Try again".into()],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownWorker { .. } | Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidDocument { .. } | Self::DispatchCycle { .. } => ErrorCategory::Validation,
            Self::DiscoveryFailed { .. } => ErrorCategory::Configuration,
            Self::RenderingFailed { .. }
            | Self::FilesystemError { .. }
            | Self::ProcessFailed { .. }
            | Self::ArchiveFailed { .. }
            | Self::CloneFailed { .. }
            | Self::StoreLockError
            | Self::GeneratorAlreadyRan { .. } => ErrorCategory::Internal,
        }
    }
}
