//! `potter generate <type>`: run a generator package against the project.

use std::sync::Arc;

use potter_adapters::{builtin_workers, local_services};
use potter_core::prelude::*;
use serde_json::json;
use tracing::{info, instrument};

use crate::{
    cli::{CommitArg, GenerateArgs, OutputFormat},
    commands::{installed_package, project_root},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

impl From<CommitArg> for CommitPolicy {
    fn from(arg: CommitArg) -> Self {
        match arg {
            CommitArg::PerWorker => CommitPolicy::PerWorker,
            CommitArg::EndOfRun => CommitPolicy::EndOfRun,
        }
    }
}

#[instrument(skip_all, fields(kind = %args.kind))]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let root = project_root()?;
    let package = installed_package(&config.generators.home, &args.kind)?;

    let destination = root
        .join(args.destination.unwrap_or(config.generation.destination))
        .join(&args.kind);
    let policy = args
        .commit
        .map(CommitPolicy::from)
        .unwrap_or(config.generation.commit);

    info!("[generate] {}", args.kind);
    let request = RunRequest::new(&root, &destination)
        .with_input(json!({ "type": args.kind }))
        .with_commit_policy(policy);

    let report = Generator::new(Arc::new(package), local_services())
        .with_api(builtin_workers(), Vec::new())
        .run(request)?;

    if output.format() == OutputFormat::Json {
        output.json(&json!({
            "run_id": report.run_id.to_string(),
            "generator": report.generator,
            "destination": report.destination,
            "entities": report.entities,
            "rules": report.rules,
            "workers": report.workers,
            "dispatched": report.dispatched,
            "files": report.files_committed,
        }))?;
        return Ok(());
    }

    output.success(&format!(
        "Generated {} into {}",
        report.generator,
        report.destination.display()
    ))?;
    output.print(&format!(
        "  {} entities, {} ports dispatched, {} files written",
        report.entities, report.dispatched, report.files_committed
    ))?;
    Ok(())
}
