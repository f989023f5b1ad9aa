//! Built-in workers.
//!
//! | worker                | rule payload                   | effect                         |
//! |-----------------------|--------------------------------|--------------------------------|
//! | `TemplateBasedWorker` | `template`, `output`           | render one template to a file  |
//! | `TemplateBatchWorker` | `template-batch`               | several template/output pairs  |
//! | `TemplatePathWorker`  | `template-path: {path,output}` | render a template tree         |
//! | `SimpleTextWorker`    | `text`                         | render-only text               |
//! | `CopyFileWorker`      | `file`, `output`               | copy from `files/`             |
//! | `CopyPathWorker`      | `copy-path: {path,output}`     | copy a tree from `files/`      |
//! | `PortChainWorker`     | `chain`                        | invoke ports in order          |
//! | `UnzipperWorker`      | `zip: {file,output}`           | extract from `zip/`            |
//! | `CmdWorker`           | `cmd: {program,args}`          | run a command in the output    |
//! | `DefaultWorker`       |                                | nothing                        |

mod command;
mod copy;
mod default;
mod port_chain;
mod simple_text;
mod template;
mod unzipper;

pub use command::CmdWorker;
pub use copy::{CopyFileWorker, CopyPathWorker};
pub use default::DefaultWorker;
pub use port_chain::PortChainWorker;
pub use simple_text::SimpleTextWorker;
pub use template::{TemplateBasedWorker, TemplateBatchWorker, TemplatePathWorker};
pub use unzipper::UnzipperWorker;

use std::path::Path;
use std::sync::Arc;

use potter_core::{
    application::{Worker, WorkerCall},
    domain::RelativePath,
    error::PotterResult,
};
use tracing::info;

/// The API-level worker set, registered before any package or project
/// workers.
pub fn builtin_workers() -> Vec<Arc<dyn Worker>> {
    vec![
        Arc::new(TemplateBasedWorker),
        Arc::new(TemplateBatchWorker),
        Arc::new(TemplatePathWorker),
        Arc::new(SimpleTextWorker),
        Arc::new(CopyFileWorker),
        Arc::new(CopyPathWorker),
        Arc::new(PortChainWorker),
        Arc::new(UnzipperWorker),
        Arc::new(CmdWorker),
        Arc::new(DefaultWorker),
    ]
}

/// Stage a copy of `source` at `destination`.
fn copy_one(call: &WorkerCall<'_>, source: &Path, destination: &Path) -> PotterResult<()> {
    let fs = &call.services().filesystem;
    let bytes = fs.read_bytes(source)?;
    fs.write(destination, &bytes)?;
    info!("[copy] {}", destination.display());
    Ok(())
}

/// Every file below `dir` paired with its path relative to `dir`.
fn relative_files(call: &WorkerCall<'_>, dir: &Path) -> PotterResult<Vec<RelativePath>> {
    let files = call.services().filesystem.list_files(dir)?;
    let mut relative = Vec::with_capacity(files.len());
    for file in files {
        let rel = file.strip_prefix(dir).unwrap_or(&file);
        relative.push(RelativePath::new(rel)?);
    }
    Ok(relative)
}
