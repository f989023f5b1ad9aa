//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `POTTER__*` environment variables (`POTTER__GENERATORS__HOME=/opt/potter`)
//! 3. `--config <FILE>` / `POTTER_CONFIG`
//! 4. `./potter.toml`
//! 5. The global config file ([`AppConfig::config_path`])
//! 6. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File};
use potter_core::application::CommitPolicy;
use serde::{Deserialize, Serialize};

/// Local configuration file name.
pub const LOCAL_CONFIG: &str = "potter.toml";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Installed generator packages.
    pub generators: GeneratorsConfig,
    /// Generation defaults.
    pub generation: GenerationConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorsConfig {
    /// Where `potter install` clones packages and `generate` looks them up.
    pub home: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Output root relative to the project; the type is appended.
    pub destination: PathBuf,
    pub commit: CommitPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generators: GeneratorsConfig {
                home: default_home(),
            },
            generation: GenerationConfig {
                destination: PathBuf::from("dist"),
                commit: CommitPolicy::PerWorker,
            },
            output: OutputConfig {
                no_color: false,
                format: "human".into(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from every source in priority order.
    ///
    /// The global and local files are optional; an explicit `config_file`
    /// must exist.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("failed to encode default configuration")?;

        let mut builder = Config::builder()
            .add_source(defaults)
            .add_source(File::from(Self::config_path()).required(false))
            .add_source(File::from(Path::new(LOCAL_CONFIG)).required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix("POTTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Path to the global configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `potter.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "potter", "potter")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
    }

    /// A single value by dotted key, for `potter config get`.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "generators.home" => Some(self.generators.home.display().to_string()),
            "generation.destination" => Some(self.generation.destination.display().to_string()),
            "generation.commit" => Some(self.generation.commit.to_string()),
            "output.no_color" => Some(self.output.no_color.to_string()),
            "output.format" => Some(self.output.format.clone()),
            _ => None,
        }
    }
}

/// `~/.potter`, or `.potter-generators` when no home directory is known.
fn default_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".potter"))
        .unwrap_or_else(|| PathBuf::from(".potter-generators"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_destination_is_dist() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.generation.destination, PathBuf::from("dist"));
        assert_eq!(cfg.generation.commit, CommitPolicy::PerWorker);
    }

    #[test]
    fn default_no_color_is_false() {
        assert!(!AppConfig::default().output.no_color);
    }

    #[test]
    fn get_known_and_unknown_keys() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.get("generation.commit").as_deref(), Some("per-worker"));
        assert_eq!(cfg.get("output.format").as_deref(), Some("human"));
        assert!(cfg.get("does.not.exist").is_none());
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("potter.toml");
        std::fs::write(
            &path,
            "[generation]\ndestination = \"out\"\ncommit = \"end-of-run\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.generation.destination, PathBuf::from("out"));
        assert_eq!(cfg.generation.commit, CommitPolicy::EndOfRun);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(AppConfig::load(Some(&temp.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
