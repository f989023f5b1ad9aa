use potter_core::{application::Worker, domain::worker_names};

/// Does nothing; the fallback when a rule carries no payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultWorker;

impl Worker for DefaultWorker {
    fn name(&self) -> &str {
        worker_names::DEFAULT
    }
}
