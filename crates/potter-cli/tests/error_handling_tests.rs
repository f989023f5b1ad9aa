//! Exit codes and diagnostics for failing commands.

mod common;

use common::{Sandbox, write};
use predicates::prelude::*;

#[test]
fn test_unknown_command_fails() {
    Sandbox::new()
        .potter()
        .arg("frobnicate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("frobnicate"));
}

#[test]
fn test_generate_outside_project() {
    Sandbox::new()
        .potter()
        .args(["generate", "express"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Not a Potter project"))
        .stderr(predicate::str::contains("potter new"));
}

#[test]
fn test_build_outside_project() {
    Sandbox::new()
        .potter()
        .args(["build", "express"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Not a Potter project"));
}

#[test]
fn test_unknown_generator() {
    let sandbox = Sandbox::new();
    let project = sandbox.new_project("shop");

    sandbox
        .potter_in(&project)
        .args(["generate", "react"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Generator 'react' is not installed"))
        .stderr(predicate::str::contains("potter install"));
}

#[test]
fn test_new_existing_directory() {
    let sandbox = Sandbox::new();
    std::fs::create_dir_all(sandbox.work().join("shop")).unwrap();

    sandbox
        .potter()
        .args(["new", "shop"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("--force"));

    sandbox.potter().args(["new", "shop", "--force"]).assert().success();
}

#[test]
fn test_new_invalid_name() {
    Sandbox::new()
        .potter()
        .args(["new", "bad name"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid project name"));
}

#[test]
fn test_missing_template_reports_name() {
    let sandbox = Sandbox::new();
    let package = sandbox.install_express();
    std::fs::remove_file(package.join("templates/package.json.tpl")).unwrap();
    let project = sandbox.new_project("shop");

    sandbox
        .potter_in(&project)
        .args(["generate", "express"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Template not found: package.json.tpl"));

    // Per-worker commits keep what earlier workers wrote.
    assert!(project.join("dist/express/README.md").is_file());
}

#[test]
fn test_malformed_local_rules() {
    let sandbox = Sandbox::new();
    sandbox.install_express();
    let project = sandbox.new_project("shop");
    write(&project.join("rules.json"), "[{ not json");

    sandbox
        .potter_in(&project)
        .args(["generate", "express"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rules.json"));
}

#[test]
fn test_unknown_config_key() {
    Sandbox::new()
        .potter()
        .args(["config", "get", "nope"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"));
}
