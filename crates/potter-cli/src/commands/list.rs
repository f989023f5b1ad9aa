//! `potter list`: installed generator packages.

use potter_adapters::{PackageInfo, discover_packages};

use crate::{
    cli::{ListArgs, ListFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let home = &config.generators.home;
    let packages: Vec<PackageInfo> = discover_packages(home)?
        .iter()
        .map(|p| p.info())
        .collect();

    match args.format {
        ListFormat::Table => {
            if packages.is_empty() {
                output.info(&format!("No generators installed in {}", home.display()))?;
                return Ok(());
            }
            output.header("Installed Generators:")?;
            let width = packages.iter().map(|p| p.name.len()).max().unwrap_or(0);
            for package in &packages {
                output.print(&format!(
                    "  {:width$}  {}",
                    package.name,
                    package.description.as_deref().unwrap_or("-"),
                ))?;
            }
        }
        ListFormat::List => {
            for package in &packages {
                output.print(&package.name)?;
            }
        }
        ListFormat::Json => output.json(&packages)?,
    }

    Ok(())
}
