//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "potter",
    bin_name = "potter",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Rule-driven project generator",
    long_about = "Potter generates projects from a content model (metadata.json) \
                  and cascading rules supplied by installable generator packages.",
    after_help = "EXAMPLES:\n\
        \x20 potter install https://github.com/acme/potter-express.git\n\
        \x20 potter new shop && cd shop\n\
        \x20 potter build express\n\
        \x20 potter generate express",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new Potter project.
    #[command(
        visible_alias = "n",
        about = "Create a new Potter project",
        after_help = "EXAMPLES:\n\
            \x20 potter new shop\n\
            \x20 potter new ../projects/shop --force"
    )]
    New(NewArgs),

    /// Install a generator package from a git repository.
    #[command(
        visible_alias = "i",
        about = "Install a generator package",
        after_help = "EXAMPLES:\n\
            \x20 potter install https://github.com/acme/potter-express.git"
    )]
    Install(InstallArgs),

    /// Run the metadata build pass for a project type.
    #[command(
        visible_alias = "b",
        about = "Build meta/<type>/metadata.json",
        after_help = "EXAMPLES:\n\
            \x20 potter build express"
    )]
    Build(BuildArgs),

    /// Generate output for a project type.
    #[command(
        visible_alias = "g",
        about = "Generate a project",
        after_help = "EXAMPLES:\n\
            \x20 potter generate express\n\
            \x20 potter generate express --commit end-of-run\n\
            \x20 potter generate express --destination out"
    )]
    Generate(GenerateArgs),

    /// List installed generator packages.
    #[command(
        visible_alias = "ls",
        about = "List installed generators",
        after_help = "EXAMPLES:\n\
            \x20 potter list\n\
            \x20 potter list --format json"
    )]
    List(ListArgs),

    /// Initialise a Potter configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 potter init           # global config\n\
            \x20 potter init --local   # ./potter.toml"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 potter completions bash > ~/.local/share/bash-completion/completions/potter\n\
            \x20 potter completions zsh  > ~/.zfunc/_potter\n\
            \x20 potter completions fish > ~/.config/fish/completions/potter.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Potter configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 potter config get generators.home\n\
            \x20 potter config list\n\
            \x20 potter config path"
    )]
    Config(ConfigCommands),
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `potter new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Project name or path.  A plain name creates `./name`; a path like
    /// `../foo` places the project one level up.
    #[arg(value_name = "NAME", help = "Project name or path")]
    pub name: String,

    /// Reuse an existing directory.
    #[arg(long = "force", help = "Initialise inside an existing directory")]
    pub force: bool,
}

// ── install ───────────────────────────────────────────────────────────────────

/// Arguments for `potter install`.
#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Repository URL understood by `git clone`.
    #[arg(value_name = "URL")]
    pub url: String,
}

// ── build / generate ──────────────────────────────────────────────────────────

/// Arguments for `potter build`.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Generator / project type, e.g. `express`.
    #[arg(value_name = "TYPE")]
    pub kind: String,
}

/// Arguments for `potter generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Generator / project type, e.g. `express`.
    #[arg(value_name = "TYPE")]
    pub kind: String,

    /// Output root relative to the project (overrides `generation.destination`).
    #[arg(short = 'd', long = "destination", value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// When staged files are written.
    #[arg(long = "commit", value_enum, help = "Commit policy")]
    pub commit: Option<CommitArg>,
}

/// CLI spelling of the core commit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CommitArg {
    /// Each worker writes its files when it finishes.
    PerWorker,
    /// Files are written once, after the whole run succeeded.
    EndOfRun,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `potter list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `potter init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `potter.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `potter completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `potter config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `generation.destination`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the global configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
