use potter_core::{
    application::{Worker, WorkerCall},
    domain::worker_names,
    error::PotterResult,
};

use super::{copy_one, relative_files};

/// Copies `<generator>/files/<file>` to `output`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyFileWorker;

impl Worker for CopyFileWorker {
    fn name(&self) -> &str {
        worker_names::COPY_FILE
    }

    fn do_work(&self, call: &WorkerCall<'_>) -> PotterResult<()> {
        let rule = call.rule();
        let file = call.require("file", rule.file.as_ref())?;
        let output = call.require("output", rule.output.as_ref())?;

        let source = call.generator_file("files", file)?;
        copy_one(call, &source, &call.output_path(output)?)
    }
}

/// Copies the tree `<generator>/files/<path>` below `output`, keeping each
/// file's path relative to `<path>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyPathWorker;

impl Worker for CopyPathWorker {
    fn name(&self) -> &str {
        worker_names::COPY_PATH
    }

    fn do_work(&self, call: &WorkerCall<'_>) -> PotterResult<()> {
        let mapping = call.require("copy-path", call.rule().copy_path.as_ref())?;
        let source_root = call.generator_file("files", &mapping.path)?;
        let output_root = call.output_path(&mapping.output)?;

        for relative in relative_files(call, &source_root)? {
            copy_one(
                call,
                &relative.under(&source_root),
                &relative.under(&output_root),
            )?;
        }
        Ok(())
    }
}
