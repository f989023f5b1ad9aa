//! End-to-end runs over real directories: a generator package on disk, a
//! project with metadata and local rules, and the built-in worker set.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use potter_adapters::{
    DirectoryPackage, ExtensionFormatter, InstallerPackage, JsonDocumentSource, LocalFilesystem,
    SimpleRenderer, ZipExtractor, builtin_workers,
};
use potter_core::application::ports::{ProcessRunner, RepositoryCloner};
use potter_core::application::BuildService;
use potter_core::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

// ── Test doubles ────────────────────────────────────────────────────────────

#[derive(Default, Clone)]
struct RecordingProcess {
    calls: Arc<Mutex<Vec<(String, Vec<String>, PathBuf)>>>,
    /// Whether `package.json` was on disk in `cwd` when each process started.
    saw_manifest: Arc<Mutex<Vec<bool>>>,
}

impl ProcessRunner for RecordingProcess {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> PotterResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec(), cwd.to_path_buf()));
        self.saw_manifest
            .lock()
            .unwrap()
            .push(cwd.join("package.json").exists());
        Ok(())
    }
}

#[derive(Default, Clone)]
struct RecordingCloner {
    calls: Arc<Mutex<Vec<(String, PathBuf)>>>,
}

impl RepositoryCloner for RecordingCloner {
    fn clone_repo(&self, url: &str, parent: &Path) -> PotterResult<PathBuf> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), parent.to_path_buf()));
        Ok(parent.join("checkout"))
    }
}

/// Invokes `model` once per entity.
struct EntitiesWorker;

impl Worker for EntitiesWorker {
    fn name(&self) -> &str {
        "EntitiesWorker"
    }

    fn do_work(&self, call: &WorkerCall<'_>) -> PotterResult<()> {
        call.invoke_loop("model", call.entities().iter().map(Selector::Entity))?;
        Ok(())
    }
}

// ── Fixture ─────────────────────────────────────────────────────────────────

struct Fixture {
    _temp: TempDir,
    package: PathBuf,
    project: PathBuf,
    process: RecordingProcess,
    cloner: RecordingCloner,
}

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn write_json(path: &Path, value: &Value) {
    write(path, &serde_json::to_string_pretty(value).unwrap());
}

fn write_zip(path: &Path, files: &[(&str, &str)]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
    for (name, body) in files {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let package = temp.path().join("home/potter-express");
    let project = temp.path().join("shop");

    write(
        &package.join("generator.toml"),
        r#"
            [generator]
            name = "express"

            [params]
            appName = "shop-api"

            [[builders]]
            file = "models.json"
            priority = 10
            key = "entities"
        "#,
    );
    write_json(
        &package.join("rules.json"),
        &json!([
            { "port": "generator", "chain": ["scaffold", "manifest", "models", "assets", "install"] },
            { "port": "scaffold", "copy-path": { "path": "static", "output": "." } },
            { "port": "manifest", "template": "package.json.tpl", "output": "package.json" },
            { "port": "models", "worker": "EntitiesWorker" },
            { "port": "model", "template": "model.js.tpl",
              "output": "src/models/${item.lowerName}.js" },
            { "port": "field", "text": "  ${property.name}: String,\n" },
            { "port": "field", "propertyType": "INTEGER", "text": "  ${property.name}: Number,\n" },
            { "port": "assets", "zip": { "file": "public.zip", "output": "public" } },
            { "port": "install", "worker": "CmdWorker",
              "cmd": { "program": "npm", "args": ["install", "--prefix", "${params.appName}"] } }
        ]),
    );
    write(
        &package.join("templates/package.json.tpl"),
        r#"{"name":"{{ appName }}","entities":{{ entities }}}"#,
    );
    write(
        &package.join("templates/model.js.tpl"),
        "class {{ entity.name }} {\n{{> field properties }}}\nmodule.exports = {{ entity.name }};\n",
    );
    write(&package.join("files/static/README.md"), "# generated\n");
    write(&package.join("files/static/config/app.env"), "PORT=3000\n");
    write_zip(&package.join("zip/public.zip"), &[("index.html", "<html/>")]);

    write(&project.join(".potter"), "");
    write_json(
        &project.join("metadata.json"),
        &json!({ "entities": [
            { "name": "User", "properties": [
                { "name": "email", "type": "VARCHAR" },
                { "name": "age", "type": "INTEGER" }
            ]},
            { "name": "OrderLine", "properties": [
                { "name": "quantity", "type": "INTEGER" }
            ]}
        ]}),
    );

    Fixture {
        _temp: temp,
        package,
        project,
        process: RecordingProcess::default(),
        cloner: RecordingCloner::default(),
    }
}

impl Fixture {
    fn services(&self) -> Services {
        Services {
            filesystem: Arc::new(LocalFilesystem::new()),
            renderer: Arc::new(SimpleRenderer::new()),
            formatter: Arc::new(ExtensionFormatter::new()),
            process: Arc::new(self.process.clone()),
            archive: Arc::new(ZipExtractor::new()),
            cloner: Arc::new(self.cloner.clone()),
            documents: Arc::new(JsonDocumentSource::new()),
        }
    }

    fn package(&self) -> Arc<dyn GeneratorPackage> {
        Arc::new(
            DirectoryPackage::load(&self.package)
                .unwrap()
                .with_workers(vec![Arc::new(EntitiesWorker)]),
        )
    }

    fn dest(&self) -> PathBuf {
        self.project.join("dist/express")
    }

    fn generate(&self) -> PotterResult<RunReport> {
        self.generate_with(CommitPolicy::PerWorker)
    }

    fn generate_with(&self, policy: CommitPolicy) -> PotterResult<RunReport> {
        Generator::new(self.package(), self.services())
            .with_api(builtin_workers(), Vec::new())
            .run(
                RunRequest::new(&self.project, self.dest())
                    .with_input(json!({ "type": "express" }))
                    .with_commit_policy(policy),
            )
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.dest().join(relative)).unwrap()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[test]
fn generates_a_project_from_an_on_disk_package() {
    let fx = fixture();
    let report = fx.generate().unwrap();

    assert_eq!(report.generator, "express");
    assert_eq!(report.entities, 2);

    assert_eq!(fx.read("README.md"), "# generated\n");
    assert_eq!(fx.read("config/app.env"), "PORT=3000\n");
    assert_eq!(
        fx.read("src/models/user.js"),
        "class User {\n  email: String,\n  age: Number,\n}\nmodule.exports = User;\n"
    );
    assert_eq!(
        fx.read("src/models/order-line.js"),
        "class OrderLine {\n  quantity: Number,\n}\nmodule.exports = OrderLine;\n"
    );
    assert_eq!(fx.read("public/index.html"), "<html/>");
}

#[test]
fn json_output_is_pretty_printed() {
    let fx = fixture();
    fx.generate().unwrap();

    let manifest = fx.read("package.json");
    assert!(manifest.contains("\n  \"name\": \"shop-api\""));
    assert!(manifest.ends_with("}\n"));
    let parsed: Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(parsed["entities"][1]["name"], "OrderLine");
}

#[test]
fn command_runs_in_destination_with_interpolated_args() {
    let fx = fixture();
    fx.generate().unwrap();

    let calls = fx.process.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (program, args, cwd) = &calls[0];
    assert_eq!(program, "npm");
    assert_eq!(args, &["install", "--prefix", "shop-api"]);
    assert_eq!(cwd, &fx.dest());
}

#[test]
fn command_sees_earlier_output_under_either_commit_policy() {
    for policy in [CommitPolicy::PerWorker, CommitPolicy::EndOfRun] {
        let fx = fixture();
        let report = fx.generate_with(policy).unwrap();

        assert_eq!(*fx.process.saw_manifest.lock().unwrap(), [true], "{policy}");
        assert_eq!(fx.read("src/models/user.js").lines().next(), Some("class User {"));
        assert!(report.files_committed >= 5, "{policy}: {}", report.files_committed);
    }
}

#[test]
fn end_of_run_still_commits_output_after_the_last_command() {
    let fx = fixture();
    let mut rules: Value =
        serde_json::from_str(&fs::read_to_string(fx.package.join("rules.json")).unwrap()).unwrap();
    rules[0]["chain"] = json!(["manifest", "install", "models"]);
    write_json(&fx.package.join("rules.json"), &rules);

    fx.generate_with(CommitPolicy::EndOfRun).unwrap();

    assert_eq!(*fx.process.saw_manifest.lock().unwrap(), [true]);
    assert!(fx.dest().join("src/models/order-line.js").exists());
}

#[test]
fn local_templates_and_rules_override_the_package() {
    let fx = fixture();
    write(
        &fx.project.join("templates/model.js.tpl"),
        "export class {{ entity.name }} {}\n",
    );
    write_json(
        &fx.project.join("rules.json"),
        &json!([
            { "port": "model", "entity": "OrderLine", "worker": "DefaultWorker" }
        ]),
    );

    fx.generate().unwrap();

    assert_eq!(fx.read("src/models/user.js"), "export class User {}\n");
    assert!(!fx.dest().join("src/models/order-line.js").exists());
}

#[test]
fn missing_template_aborts_the_run() {
    let fx = fixture();
    fs::remove_file(fx.package.join("templates/model.js.tpl")).unwrap();

    let err = fx.generate().unwrap_err();
    assert!(err.to_string().contains("model.js.tpl"));
    // Workers that ran before the failure already committed.
    assert!(fx.dest().join("README.md").exists());
    assert!(fx.process.calls.lock().unwrap().is_empty());
}

#[test]
fn output_escaping_the_destination_is_rejected() {
    let fx = fixture();
    write_json(
        &fx.project.join("rules.json"),
        &json!([{ "port": "manifest", "template": "package.json.tpl", "output": "../../evil.json" }]),
    );

    let err = fx.generate().unwrap_err();
    assert!(matches!(
        err,
        PotterError::Domain(potter_core::domain::DomainError::PathEscapesRoot { .. })
    ));
    assert!(!fx.project.join("evil.json").exists());
}

#[test]
fn build_pass_feeds_the_generator() {
    let fx = fixture();
    write_json(&fx.project.join("project.json"), &json!({ "name": "shop" }));
    write_json(
        &fx.project.join("models.json"),
        &json!([{ "name": "Invoice", "properties": [{ "name": "total", "type": "DECIMAL" }] }]),
    );

    let package = fx.package();
    let report = BuildService::new(Arc::new(JsonDocumentSource::new()))
        .build(&fx.project, "express", package.builders().unwrap())
        .unwrap();
    assert_eq!(report.output, fx.project.join("meta/express/metadata.json"));
    assert_eq!(report.keys, vec!["entities", "name"]);

    fx.generate().unwrap();
    assert_eq!(
        fx.read("src/models/invoice.js"),
        "class Invoice {\n  total: String,\n}\nmodule.exports = Invoice;\n"
    );
    assert!(!fx.dest().join("src/models/user.js").exists());
}

#[test]
fn installer_clones_into_the_generators_home() {
    let fx = fixture();
    let home = fx.project.join("generators");

    let report = Generator::new(Arc::new(InstallerPackage::new(&home)), fx.services())
        .with_api(builtin_workers(), Vec::new())
        .run(
            RunRequest::new(&home, &home)
                .with_input(InstallerPackage::input("https://example.com/potter-express.git")),
        )
        .unwrap();

    assert_eq!(report.generator, "installer");
    assert!(home.is_dir());
    assert_eq!(
        fx.cloner.calls.lock().unwrap().as_slice(),
        &[("https://example.com/potter-express.git".to_string(), home.clone())]
    );
}

#[test]
fn installer_without_url_fails() {
    let fx = fixture();
    let home = fx.project.join("generators");

    let result = Generator::new(Arc::new(InstallerPackage::new(&home)), fx.services())
        .with_api(builtin_workers(), Vec::new())
        .run(RunRequest::new(&home, &home).with_input(json!({})));

    assert!(result.is_err());
    assert!(fx.cloner.calls.lock().unwrap().is_empty());
}
