use potter_core::{
    application::{Worker, WorkerCall},
    domain::worker_names,
    error::PotterResult,
};

/// Runs `cmd.program` with `cmd.args` in the destination root.
///
/// Staged output is flushed first, whatever the commit policy, so the
/// process sees every file generated before it. Never inferred: rules must
/// name `CmdWorker` explicitly. Blocks until the process exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmdWorker;

impl Worker for CmdWorker {
    fn name(&self) -> &str {
        worker_names::CMD
    }

    fn do_work(&self, call: &WorkerCall<'_>) -> PotterResult<()> {
        let cmd = call.require("cmd", call.rule().cmd.as_ref())?;
        let args = cmd
            .args
            .iter()
            .map(|arg| call.interpolate(arg))
            .collect::<PotterResult<Vec<_>>>()?;

        call.flush()?;
        call.services()
            .process
            .run(&cmd.program, &args, call.destination_root())
    }
}
