//! Flags shared by every `potter` subcommand.

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum};

/// Flattened into [`super::Cli`]; every field is `global = true`.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Log more: `-v` shows writes and commands, `-vv` rule resolution,
    /// `-vvv` everything.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Plain output without ANSI colours (also set by `NO_COLOR`).
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Extra configuration file, layered over the global and local ones.
    #[arg(short, long, global = true, value_name = "FILE", env = "POTTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output style; `auto` picks `human` on a terminal and `plain` otherwise.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Auto,
    /// Coloured, with icons and spinners.
    Human,
    Plain,
    /// Machine-readable reports on stdout.
    Json,
}
