//! Shared fixtures for binary-level tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// An isolated environment: fake home, config dir, generators home and a
/// working directory.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["home", "xdg", "generators", "work"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        Self { dir }
    }

    pub fn work(&self) -> PathBuf {
        self.dir.path().join("work")
    }

    pub fn generators(&self) -> PathBuf {
        self.dir.path().join("generators")
    }

    /// `potter` running in `cwd` with every config source pointed into the
    /// sandbox.
    pub fn potter_in(&self, cwd: &Path) -> Command {
        let mut cmd = Command::cargo_bin("potter").unwrap();
        cmd.current_dir(cwd)
            .env("HOME", self.dir.path().join("home"))
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg"))
            .env("POTTER__GENERATORS__HOME", self.generators())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("POTTER_CONFIG");
        cmd
    }

    pub fn potter(&self) -> Command {
        self.potter_in(&self.work())
    }

    /// Install the `express` fixture package directly into the generators
    /// home.
    pub fn install_express(&self) -> PathBuf {
        let root = self.generators().join("potter-express");
        write(
            &root.join("generator.toml"),
            r#"
[generator]
name = "express"
description = "Express API skeleton"

[params]
framework = "express"

[[builders]]
file = "model.json"
priority = 10
key = "entities"
"#,
        );
        write(
            &root.join("rules.json"),
            r#"[
  { "port": "generator", "chain": ["readme", "static", "manifest"] },
  { "port": "readme", "template": "README.md.tpl", "output": "README.md" },
  { "port": "entity-line", "text": "- ${entity.name}\n" },
  { "port": "static", "copy-path": { "path": "static", "output": "." } },
  { "port": "manifest", "template": "package.json.tpl", "output": "package.json" }
]"#,
        );
        write(
            &root.join("templates/README.md.tpl"),
            "# {{ metadata.name }}\n\nBuilt with {{ framework }}.\n\n{{> entity-line entities }}",
        );
        write(
            &root.join("templates/package.json.tpl"),
            r#"{"name":"{{ metadata.name }}","private":true}"#,
        );
        write(&root.join("files/static/.gitignore"), "node_modules\n");
        root
    }

    /// `potter new <name>` followed by a model document.
    pub fn new_project(&self, name: &str) -> PathBuf {
        self.potter().args(["new", name]).assert().success();
        let root = self.work().join(name);
        write(
            &root.join("model.json"),
            r#"[
  { "name": "User", "properties": [ { "name": "email", "type": "VARCHAR" } ] },
  { "name": "Order" }
]"#,
        );
        root
    }
}

pub fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}
