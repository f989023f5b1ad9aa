//! `potter`: rule-driven project generator.
//!
//! Startup: `.env`, argument parsing, logging, configuration, output, then
//! dispatch. Failures become a rendered [`CliError`] and an exit code:
//!
//! | Code | Meaning        |
//! |------|----------------|
//! |  0   | success        |
//! |  1   | internal       |
//! |  2   | user input     |
//! |  3   | not found      |
//! |  4   | configuration  |

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, instrument};

use crate::{
    cli::{Cli, Commands},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    // --help and --version also arrive as errors, with exit code 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(2));
        }
    };

    if let Err(e) = logging::init_logging(&cli.global) {
        eprintln!("potter: {e}");
        return ExitCode::from(1);
    }
    debug!(command = ?cli.command, "starting");

    let config = match AppConfig::load(cli.global.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            return report(CliError::ConfigError {
                message: format!("{e:#}"),
                source: None,
            }, cli.global.verbose > 0);
        }
    };

    let verbose = cli.global.verbose > 0;
    let output = OutputManager::new(&cli.global, &config);
    match run(cli.command, config, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(e, verbose),
    }
}

#[instrument(skip_all)]
fn run(command: Commands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match command {
        Commands::New(args) => commands::new::execute(args, output),
        Commands::Install(args) => commands::install::execute(args, config, output),
        Commands::Build(args) => commands::build::execute(args, config, output),
        Commands::Generate(args) => commands::generate::execute(args, config, output),
        Commands::List(args) => commands::list::execute(args, config, output),
        Commands::Init(args) => commands::init::execute(args, output),
        Commands::Completions(args) => commands::completions::execute(args),
        Commands::Config(cmd) => commands::config::execute(cmd, config, output),
    }
}

/// Log, print to stderr (coloured only on a terminal), map to an exit code.
fn report(err: CliError, verbose: bool) -> ExitCode {
    err.log();
    let rendered = if io::stderr().is_terminal() {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{rendered}");
    ExitCode::from(err.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn version_comes_from_the_package() {
        assert_eq!(Cli::command().get_version(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn every_command_is_reachable() {
        let names: Vec<_> = Cli::command()
            .get_subcommands()
            .map(|c| c.get_name().to_string())
            .collect();
        for expected in ["new", "install", "build", "generate", "list", "init", "completions", "config"] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }
}
