//! `potter config get|list|path`.

use crate::{
    cli::ConfigCommands,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(cmd: ConfigCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let text = match cmd {
        ConfigCommands::Get { key } => lookup(&config, &key)?,
        ConfigCommands::List => toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
            message: format!("could not encode configuration: {e}"),
            source: Some(Box::new(e)),
        })?,
        ConfigCommands::Path => AppConfig::config_path().display().to_string(),
    };
    output.print(text.trim_end())?;
    Ok(())
}

fn lookup(config: &AppConfig, key: &str) -> CliResult<String> {
    config.get(key).ok_or_else(|| CliError::ConfigError {
        message: format!("Unknown config key: '{key}'"),
        source: None,
    })
}
