//! Application layer for Potter.
//!
//! This layer contains:
//! - **Dispatch**: ports, the worker contract, the worker registry
//! - **Context**: the per-run execution context and its parameters
//! - **Services**: generator orchestration and the metadata build pass
//! - **Ports**: traits for the filesystem, renderer and other externals
//! - **Errors**: application-specific error types
//!
//! Rule matching itself lives in `crate::domain`.

pub mod context;
pub mod error;
pub mod port;
pub mod ports;
pub mod registry;
pub mod services;
pub mod worker;

pub use context::{CommitPolicy, ExecutionContext, MAX_DISPATCH_DEPTH, RunParams, Services};
pub use port::{Port, PortKind, PortParams, ResolvedRule};
pub use registry::WorkerRegistry;
pub use worker::{DispatchMode, Worker, WorkerCall};

pub use services::{
    BuildReport, BuildService, Generator, GeneratorPackage, GeneratorState, MetadataBuilder,
    RunReport, RunRequest,
};

pub use ports::{
    ArchiveExtractor, DocumentSource, Filesystem, Formatter, PortHook, ProcessRunner,
    RepositoryCloner, TemplateRenderer,
};

pub use error::ApplicationError;
