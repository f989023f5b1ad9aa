//! External process adapters: command runner and git cloner.
//!
//! Both block until the child exits. There is no timeout.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use potter_core::{
    application::{
        ApplicationError,
        ports::{ProcessRunner, RepositoryCloner},
    },
    error::PotterResult,
};
use tracing::{info, instrument};

/// Runs commands with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    #[instrument(skip(self), fields(cwd = %cwd.display()))]
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> PotterResult<()> {
        info!("[cmd] {} {}", program, args.join(" "));
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| ApplicationError::ProcessFailed {
                program: program.to_string(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ApplicationError::ProcessFailed {
                program: program.to_string(),
                reason: match status.code() {
                    Some(code) => format!("exited with status {code}"),
                    None => "terminated by signal".into(),
                },
            }
            .into())
        }
    }
}

/// Clones repositories with the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCloner {
    program: String,
}

impl GitCloner {
    pub fn new() -> Self {
        Self {
            program: "git".into(),
        }
    }

    /// Use a different git executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Checkout directory name for `url`: last path segment without `.git`.
    pub fn checkout_name(url: &str) -> Option<&str> {
        let name = url
            .trim_end_matches('/')
            .rsplit(['/', ':'])
            .next()?
            .trim_end_matches(".git");
        (!name.is_empty() && name != "." && name != "..").then_some(name)
    }
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryCloner for GitCloner {
    #[instrument(skip(self), fields(parent = %parent.display()))]
    fn clone_repo(&self, url: &str, parent: &Path) -> PotterResult<PathBuf> {
        let name = Self::checkout_name(url).ok_or_else(|| ApplicationError::CloneFailed {
            url: url.to_string(),
            reason: "cannot derive a directory name from the URL".into(),
        })?;
        let checkout = parent.join(name);

        let output = Command::new(&self.program)
            .arg("clone")
            .arg(url)
            .arg(&checkout)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ApplicationError::CloneFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ApplicationError::CloneFailed {
                url: url.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        info!(path = %checkout.display(), "[install] cloned");
        Ok(checkout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_name_strips_git_suffix() {
        assert_eq!(
            GitCloner::checkout_name("https://github.com/acme/potter-express.git"),
            Some("potter-express")
        );
        assert_eq!(
            GitCloner::checkout_name("git@github.com:acme/potter-react"),
            Some("potter-react")
        );
        assert_eq!(GitCloner::checkout_name("https://host/x/"), Some("x"));
        assert_eq!(GitCloner::checkout_name(".."), None);
    }

    #[test]
    fn missing_program_is_a_process_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = SystemProcessRunner::new()
            .run("potter-definitely-not-a-program", &[], temp.path())
            .unwrap_err();
        assert!(err.to_string().contains("potter-definitely-not-a-program"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = SystemProcessRunner::new()
            .run("sh", &["-c".into(), "exit 3".into()], temp.path())
            .unwrap_err();
        assert!(err.to_string().contains("status 3"));
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_the_given_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        SystemProcessRunner::new()
            .run("sh", &["-c".into(), "touch marker".into()], temp.path())
            .unwrap();
        assert!(temp.path().join("marker").exists());
    }
}
