use potter_core::{
    application::{Worker, WorkerCall},
    domain::worker_names,
    error::PotterResult,
};
use tracing::info;

/// Extracts `<generator>/zip/<zip.file>` into `zip.output`.
///
/// Extraction writes straight to disk; it is not staged. Staged output is
/// flushed first so files land in the order the rules produce them.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnzipperWorker;

impl Worker for UnzipperWorker {
    fn name(&self) -> &str {
        worker_names::UNZIPPER
    }

    fn do_work(&self, call: &WorkerCall<'_>) -> PotterResult<()> {
        let spec = call.require("zip", call.rule().zip.as_ref())?;
        let archive = call.generator_file("zip", &spec.file)?;
        let output = call.output_path(&spec.output)?;

        call.flush()?;
        info!("[unzip] {}", output.display());
        call.services().archive.extract(&archive, &output)?;
        Ok(())
    }
}
