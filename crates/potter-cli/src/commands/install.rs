//! `potter install`: clone a generator package into the generators home.

use std::sync::Arc;

use potter_adapters::{InstallerPackage, builtin_workers, local_services};
use potter_core::prelude::*;
use tracing::instrument;

use crate::{cli::InstallArgs, config::AppConfig, error::CliResult, output::OutputManager};

#[instrument(skip_all, fields(url = %args.url))]
pub fn execute(args: InstallArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let home = config.generators.home;
    let package = Arc::new(InstallerPackage::new(&home));

    // The installer runs inside the home so that a project's rules.json in
    // the working directory cannot redirect it.
    let request = RunRequest::new(&home, &home).with_input(InstallerPackage::input(&args.url));

    let spinner = output.spinner(&format!("Cloning {}", args.url));
    let result = Generator::new(package, local_services())
        .with_api(builtin_workers(), Vec::new())
        .run(request);
    spinner.finish_and_clear();

    let report = result?;
    output.success(&format!(
        "Installed {} into {}",
        args.url,
        report.destination.display()
    ))?;
    output.print("List installed generators with: potter list")?;
    Ok(())
}
