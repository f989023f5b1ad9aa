use potter_core::{
    application::{Worker, WorkerCall},
    domain::worker_names,
    error::PotterResult,
};
use tracing::debug;

/// Invokes each port of `chain` in order with the caller's selector.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortChainWorker;

impl PortChainWorker {
    fn each(call: &WorkerCall<'_>) -> PotterResult<String> {
        let chain = call.require("chain", call.rule().chain.as_ref())?;
        let mut out = String::new();
        for port in chain {
            debug!(from = call.port(), to = %port, "chain");
            out.push_str(&call.invoke(port, call.selector())?);
        }
        Ok(out)
    }
}

impl Worker for PortChainWorker {
    fn name(&self) -> &str {
        worker_names::PORT_CHAIN
    }

    fn do_work(&self, call: &WorkerCall<'_>) -> PotterResult<()> {
        Self::each(call).map(|_| ())
    }

    /// Concatenated output of the chained ports.
    fn render(&self, call: &WorkerCall<'_>) -> PotterResult<String> {
        Self::each(call)
    }
}
