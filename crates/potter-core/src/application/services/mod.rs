//! Application services (driving ports).
//!
//! - `Generator`: assembles an execution context and runs the dispatch tree
//! - `BuildService`: folds project documents into per-type metadata

pub mod builder;
pub mod generator;

pub use builder::{BuildReport, BuildService, MetadataBuilder};
pub use generator::{
    Generator, GeneratorPackage, GeneratorState, RunReport, RunRequest,
};
