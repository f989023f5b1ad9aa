use potter_core::{
    application::{Worker, WorkerCall},
    domain::worker_names,
    error::PotterResult,
};

/// Render-only: returns the rule's `text` with placeholders substituted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTextWorker;

impl Worker for SimpleTextWorker {
    fn name(&self) -> &str {
        worker_names::SIMPLE_TEXT
    }

    fn render(&self, call: &WorkerCall<'_>) -> PotterResult<String> {
        let text = call.require("text", call.rule().text.as_ref())?;
        call.interpolate(text)
    }
}
