//! Potter Core - rule cascade resolution and port dispatch
//!
//! This crate provides the domain and application layers of the Potter
//! project generator, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            potter-cli (CLI)             │
//! │        new / build / generate           │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │      (Generator, BuildService)          │
//! │   ExecutionContext → Port → Worker      │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │ (Filesystem, TemplateRenderer, ...)     │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    potter-adapters (Infrastructure)     │
//! │  (LocalFilesystem, built-in workers)    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (Entity, Rule, Selector, RuleCascade)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use potter_core::prelude::*;
//! # fn demo(package: std::sync::Arc<dyn GeneratorPackage>, services: Services,
//! #         builtins: Vec<std::sync::Arc<dyn Worker>>) -> PotterResult<()> {
//! let request = RunRequest::new(".", "dist/api")
//!     .with_input(serde_json::json!({ "type": "api" }));
//!
//! let report = Generator::new(package, services)
//!     .with_api(builtins, Vec::new())
//!     .run(request)?;
//! println!("{} files written", report.files_committed);
//! # Ok(()) }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        CommitPolicy, DispatchMode, ExecutionContext, Generator, GeneratorPackage, Port,
        RunReport, RunRequest, Services, Worker, WorkerCall,
        ports::{DocumentSource, Filesystem, Formatter, PortHook, TemplateRenderer},
    };
    pub use crate::domain::{
        ContentModel, Entity, Level, Property, Rule, RuleCascade, Selector, worker_names,
    };
    pub use crate::error::{PotterError, PotterResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
