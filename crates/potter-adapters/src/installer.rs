//! The built-in installer generator behind `potter install <url>`.
//!
//! It is an ordinary generator run: one embedded rule sends the root port to
//! [`InstallerWorker`], which clones the repository into the generators home.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use potter_core::{
    application::{ApplicationError, GeneratorPackage, Worker, WorkerCall, ports::DocumentSource},
    domain::{ROOT_PORT, Rule},
    error::PotterResult,
};
use serde_json::{Value, json};
use tracing::info;

pub const INSTALLER_WORKER: &str = "InstallerWorker";

/// Package for the installer run. Input: `{ "generator": { "url": … } }`.
#[derive(Debug, Clone)]
pub struct InstallerPackage {
    home: PathBuf,
}

impl InstallerPackage {
    /// `home` is where generator packages are installed.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Run input for installing `url`.
    pub fn input(url: &str) -> Value {
        json!({ "generator": { "url": url } })
    }
}

impl GeneratorPackage for InstallerPackage {
    fn name(&self) -> &str {
        "installer"
    }

    fn root(&self) -> &Path {
        &self.home
    }

    fn params(&self, input: &Value) -> Value {
        json!({
            "generator": { "url": input.pointer("/generator/url").cloned().unwrap_or(Value::Null) },
            "home": self.home.display().to_string(),
        })
    }

    fn workers(&self) -> Vec<Arc<dyn Worker>> {
        vec![Arc::new(InstallerWorker)]
    }

    fn rules(&self, _documents: &dyn DocumentSource) -> PotterResult<Vec<Rule>> {
        Ok(vec![Rule::new(ROOT_PORT).with_worker(INSTALLER_WORKER)])
    }

    /// Installing never creates an output directory.
    fn enters_destination(&self) -> bool {
        false
    }
}

/// Creates the generators home and clones `params.generator.url` into it.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallerWorker;

impl Worker for InstallerWorker {
    fn name(&self) -> &str {
        INSTALLER_WORKER
    }

    fn do_work(&self, call: &WorkerCall<'_>) -> PotterResult<()> {
        let params = &call.context().params().params;
        let url = params
            .pointer("/generator/url")
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApplicationError::CloneFailed {
                url: String::new(),
                reason: "no repository URL given".into(),
            })?;
        let home = params
            .get("home")
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .unwrap_or_else(|| call.context().params().generator_root.clone());

        let services = call.services();
        info!("[create] {}", home.display());
        services.filesystem.create_dir_all(&home)?;

        info!("[git] {url}");
        let checkout = services.cloner.clone_repo(url, &home)?;
        info!(path = %checkout.display(), "generator installed");
        Ok(())
    }
}
