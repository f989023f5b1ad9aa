//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `potter-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by workers and services, implemented by infrastructure
//!   - `Filesystem`: staged file writes, reads and listing
//!   - `TemplateRenderer`: template expansion
//!   - `Formatter`: output beautification by file extension
//!   - `ProcessRunner`, `ArchiveExtractor`, `RepositoryCloner`: blocking externals
//!   - `DocumentSource`: JSON documents (metadata, rules, project)
//!
//! - **Driving (Input) Ports**: `Generator` and `BuildService`, called by the CLI
//!
//! Not to be confused with generator *ports* (`crate::application::Port`),
//! the named extension points rules are registered for.

pub mod output;

pub use output::{
    ArchiveExtractor, DocumentSource, Filesystem, Formatter, PortHook, ProcessRunner,
    RepositoryCloner, TemplateRenderer,
};
