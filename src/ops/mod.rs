//! Operations that materialize bioassemblies from stored structures.
//!
//! This module groups the public entry points for assembly replication: the
//! count estimator, the staged assembly builder, and the replication engine
//! that drives them. Each submodule exposes a cohesive API and shares a
//! common error type so downstream consumers can compose workflows easily.

pub mod builder;
pub mod count;
pub mod error;
pub mod replicate;

pub use builder::AssemblyBuilder;

pub use count::{count_assembly, AssemblyCounts};

pub use replicate::{assembly_id, replicate_all, replicate_assembly};

pub use error::{Error, Result};
