//! Domain value objects: override levels and canonical worker names.
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Level ────────────────────────────────────────────────────────────────────

/// One of the three override tiers contributing rules and workers.
///
/// Ordered by increasing specificity: `Api < Generator < Local`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Built-in defaults shipped with the engine.
    Api,
    /// The active generator package.
    Generator,
    /// The invoking project.
    Local,
}

impl Level {
    /// Every level, in the order contexts are assembled.
    pub const ALL: [Level; 3] = [Level::Api, Level::Generator, Level::Local];

    /// Levels consulted by rule resolution, most specific first.
    ///
    /// `Api` is intentionally absent: API rules are indexed but never reached
    /// through the search path.
    pub const RESOLUTION_ORDER: [Level; 2] = [Level::Local, Level::Generator];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Generator => "generator",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "api" | "builtin" => Ok(Self::Api),
            "generator" | "gen" => Ok(Self::Generator),
            "local" | "project" => Ok(Self::Local),
            other => Err(DomainError::InvalidRule(format!("unknown level: {other}"))),
        }
    }
}

// ── Worker names ─────────────────────────────────────────────────────────────

/// Canonical registry keys of the built-in workers.
///
/// Rule documents refer to workers by these names, so they are part of the
/// external interface and must stay stable.
pub mod worker_names {
    pub const TEMPLATE_BASED: &str = "TemplateBasedWorker";
    pub const TEMPLATE_BATCH: &str = "TemplateBatchWorker";
    pub const TEMPLATE_PATH: &str = "TemplatePathWorker";
    pub const SIMPLE_TEXT: &str = "SimpleTextWorker";
    pub const COPY_FILE: &str = "CopyFileWorker";
    pub const COPY_PATH: &str = "CopyPathWorker";
    pub const PORT_CHAIN: &str = "PortChainWorker";
    pub const UNZIPPER: &str = "UnzipperWorker";
    pub const CMD: &str = "CmdWorker";
    pub const DEFAULT: &str = "DefaultWorker";
}

/// Name of the port every generator run starts from.
pub const ROOT_PORT: &str = "generator";
