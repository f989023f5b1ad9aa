//! Command handlers, one module per subcommand.

pub mod build;
pub mod completions;
pub mod config;
pub mod generate;
pub mod init;
pub mod install;
pub mod list;
pub mod new;

use std::path::{Path, PathBuf};

use potter_adapters::{DirectoryPackage, find_package};

use crate::error::{CliError, CliResult, IntoCli};

/// Marker file `potter new` leaves in a project root.
pub const PROJECT_MARKER: &str = ".potter";

/// The current directory, if it is a Potter project.
pub(crate) fn project_root() -> CliResult<PathBuf> {
    let cwd = std::env::current_dir().with_cli_context(|| "reading the current directory")?;
    if !cwd.join(PROJECT_MARKER).exists() {
        return Err(CliError::NotAPotterProject { path: cwd });
    }
    Ok(cwd)
}

/// An installed generator package by type name.
pub(crate) fn installed_package(home: &Path, kind: &str) -> CliResult<DirectoryPackage> {
    find_package(home, kind)?.ok_or_else(|| CliError::GeneratorNotFound {
        name: kind.to_string(),
        home: home.to_path_buf(),
    })
}
