// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel through the dispatch tree by value)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Document Errors
    // ========================================================================
    #[error("Invalid metadata document: {0}")]
    InvalidMetadata(String),

    #[error("Duplicate entity '{name}' in metadata")]
    DuplicateEntity { name: String },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Rule for port '{port}' is missing required field '{field}'")]
    MissingRuleField { port: String, field: &'static str },

    // ========================================================================
    // Resolution Errors
    // ========================================================================
    #[error("No rule matches port '{port}' for selector {selector}")]
    NoMatchingRule { port: String, selector: String },

    #[error("Unresolved placeholder '${{{path}}}': {reason}")]
    UnresolvedPlaceholder { path: String, reason: String },

    #[error("Unterminated placeholder in '{text}'")]
    UnterminatedPlaceholder { text: String },

    // ========================================================================
    // Path Errors
    // ========================================================================
    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes the destination root: {path}")]
    PathEscapesRoot { path: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidMetadata(msg) => vec![
                "Check metadata.json against the entity/property layout".into(),
                format!("Details: {}", msg),
            ],
            Self::DuplicateEntity { name } => vec![
                format!("Entity '{}' is declared more than once", name),
                "Entity names must be unique within a metadata document".into(),
            ],
            Self::InvalidRule(_) | Self::MissingRuleField { .. } => vec![
                "Check rules.json in the project and the generator package".into(),
                "Every rule needs a 'port' and the payload its worker expects".into(),
            ],
            Self::NoMatchingRule { port, .. } => vec![
                format!("No rule is registered for port '{}'", port),
                "Add a rule for this port to your local rules.json".into(),
                "Or add a wildcard rule ('*') that covers the selector".into(),
            ],
            Self::UnresolvedPlaceholder { path, .. } => vec![
                format!("Placeholder '${{{}}}' could not be resolved", path),
                "Roots: item, entity, property, config, input, params, metadata".into(),
            ],
            Self::AbsolutePathNotAllowed { .. } | Self::PathEscapesRoot { .. } => vec![
                "Rule outputs must be relative to the destination directory".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidMetadata(_)
            | Self::DuplicateEntity { .. }
            | Self::InvalidRule(_)
            | Self::MissingRuleField { .. }
            | Self::UnterminatedPlaceholder { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathEscapesRoot { .. } => ErrorCategory::Validation,
            Self::NoMatchingRule { .. } | Self::UnresolvedPlaceholder { .. } => {
                ErrorCategory::NotFound
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
