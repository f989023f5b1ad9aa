//! `potter new`: create a project skeleton.
//!
//! ```text
//! <name>/
//!   .potter         marker checked by build / generate
//!   project.json    { name, created }
//!   rules.json      []  (local rule overrides)
//!   templates/      local template overrides
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::{debug, instrument};

use crate::{
    cli::NewArgs,
    commands::PROJECT_MARKER,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

#[instrument(skip_all, fields(name = %args.name))]
pub fn execute(args: NewArgs, output: OutputManager) -> CliResult<()> {
    let root = PathBuf::from(&args.name);
    let name = project_name(&root)?;

    if root.exists() && !args.force {
        return Err(CliError::ProjectExists { path: root });
    }

    create_skeleton(&root, &name)?;
    debug!(root = %root.display(), "project skeleton written");

    output.success(&format!("Created project '{name}' in {}", root.display()))?;
    output.print("")?;
    output.print("Next steps:")?;
    output.print(&format!("  cd {}", root.display()))?;
    output.print("  potter build <type>")?;
    output.print("  potter generate <type>")?;
    Ok(())
}

/// The last path component, validated as a project name.
fn project_name(root: &Path) -> CliResult<String> {
    let name = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let invalid = |reason: &str| CliError::InvalidProjectName {
        name: name.clone(),
        reason: reason.into(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.starts_with('.') || name.starts_with('-') {
        return Err(invalid("must start with a letter, digit or '_'"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(invalid(&format!("contains '{c}'")));
    }
    Ok(name)
}

fn create_skeleton(root: &Path, name: &str) -> CliResult<()> {
    let write = |file: &str, contents: String| {
        let path = root.join(file);
        fs::write(&path, contents).with_cli_context(|| format!("writing {}", path.display()))
    };

    fs::create_dir_all(root.join("templates"))
        .with_cli_context(|| format!("creating {}", root.display()))?;

    let project = json!({
        "name": name,
        "created": chrono::Utc::now().to_rfc3339(),
    });
    let pretty = serde_json::to_string_pretty(&project).map_err(|e| CliError::InvalidInput {
        message: "could not encode project.json".into(),
        source: Some(Box::new(e)),
    })?;

    write(PROJECT_MARKER, String::new())?;
    write("project.json", pretty + "\n")?;
    if !root.join("rules.json").exists() {
        write("rules.json", "[]\n".into())?;
    }
    Ok(())
}
