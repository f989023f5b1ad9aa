//! Integration tests for the `potter` binary.

mod common;

use std::fs;

use common::{Sandbox, write};
use predicates::prelude::*;

#[test]
fn test_help_flag() {
    Sandbox::new()
        .potter()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("install"));
}

#[test]
fn test_version_flag() {
    Sandbox::new()
        .potter()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_new_project_layout() {
    let sandbox = Sandbox::new();
    sandbox
        .potter()
        .args(["new", "shop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project 'shop'"));

    let root = sandbox.work().join("shop");
    assert!(root.join(".potter").is_file());
    assert!(root.join("templates").is_dir());
    assert_eq!(fs::read_to_string(root.join("rules.json")).unwrap(), "[]\n");

    let project: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("project.json")).unwrap()).unwrap();
    assert_eq!(project["name"], "shop");
}

#[test]
fn test_build_writes_metadata() {
    let sandbox = Sandbox::new();
    sandbox.install_express();
    let project = sandbox.new_project("shop");

    sandbox
        .potter_in(&project)
        .args(["build", "express"])
        .assert()
        .success();

    let meta: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(project.join("meta/express/metadata.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(meta["name"], "shop");
    assert_eq!(meta["entities"][0]["name"], "User");
}

#[test]
fn test_generate_full_project() {
    let sandbox = Sandbox::new();
    sandbox.install_express();
    let project = sandbox.new_project("shop");

    sandbox
        .potter_in(&project)
        .args(["build", "express"])
        .assert()
        .success();
    sandbox
        .potter_in(&project)
        .args(["generate", "express"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated express"));

    let out = project.join("dist/express");
    let readme = fs::read_to_string(out.join("README.md")).unwrap();
    assert!(readme.starts_with("# shop\n"));
    assert!(readme.contains("Built with express."));
    assert!(readme.contains("- User\n- Order\n"));

    assert_eq!(
        fs::read_to_string(out.join(".gitignore")).unwrap(),
        "node_modules\n"
    );

    let manifest = fs::read_to_string(out.join("package.json")).unwrap();
    assert!(manifest.contains("\n  \"name\": \"shop\""));
}

#[test]
fn test_generate_json_report_and_destination_flag() {
    let sandbox = Sandbox::new();
    sandbox.install_express();
    let project = sandbox.new_project("shop");

    let assert = sandbox
        .potter_in(&project)
        .args([
            "--output-format",
            "json",
            "generate",
            "express",
            "-d",
            "out",
            "--commit",
            "end-of-run",
        ])
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["generator"], "express");
    assert_eq!(report["files"], 3);
    assert!(project.join("out/express/README.md").is_file());
}

#[test]
fn test_local_rules_override_package() {
    let sandbox = Sandbox::new();
    sandbox.install_express();
    let project = sandbox.new_project("shop");
    write(
        &project.join("rules.json"),
        r#"[{ "port": "entity-line", "text": "* ${entity.lowerName}\n" }]"#,
    );

    sandbox
        .potter_in(&project)
        .args(["build", "express"])
        .assert()
        .success();
    sandbox
        .potter_in(&project)
        .args(["generate", "express"])
        .assert()
        .success();

    let readme = fs::read_to_string(project.join("dist/express/README.md")).unwrap();
    assert!(readme.contains("* user\n* order\n"));
}

#[test]
fn test_list_json() {
    let sandbox = Sandbox::new();
    sandbox.install_express();

    let assert = sandbox
        .potter()
        .args(["list", "--format", "json"])
        .assert()
        .success();

    let packages: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(packages[0]["name"], "express");
    assert_eq!(packages[0]["description"], "Express API skeleton");
}

#[test]
fn test_list_empty_home() {
    Sandbox::new()
        .potter()
        .args(["list", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_completions_bash() {
    Sandbox::new()
        .potter()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("potter"));
}

#[test]
fn test_config_get_default_destination() {
    Sandbox::new()
        .potter()
        .args(["config", "get", "generation.destination"])
        .assert()
        .success()
        .stdout(predicate::str::diff("dist\n"));
}

#[test]
fn test_config_env_override() {
    let sandbox = Sandbox::new();
    sandbox
        .potter()
        .env("POTTER__GENERATION__COMMIT", "end-of-run")
        .args(["config", "get", "generation.commit"])
        .assert()
        .success()
        .stdout(predicate::str::diff("end-of-run\n"));
}

#[test]
fn test_init_local_config() {
    let sandbox = Sandbox::new();
    sandbox
        .potter()
        .args(["init", "--local"])
        .assert()
        .success();

    let text = fs::read_to_string(sandbox.work().join("potter.toml")).unwrap();
    assert!(text.contains("[generation]"));
}
