//! # AssemblyForge
//!
//! **AssemblyForge** is a pure-Rust bioassembly materialization engine that takes a stored macromolecular structure (the asymmetric unit) together with its bioassembly transform catalogue and produces, for each bioassembly, a fresh self-consistent structure record. The crate favors deterministic two-pass rebuilds, strong typing, and clean error surfaces so derived records stay auditable from counting to finalization.
//!
//! ## Features
//!
//! - **Columnar structure model** – A [`StructureData`] record stores models, chains, groups, and atoms as parallel index-aligned arrays, with residue schemas deduplicated into a shared [`GroupTemplate`] catalogue.
//! - **Exact count estimation** – [`ops::count_assembly`] walks the record in emission order and returns the precise totals a derived assembly will carry, before a single record is written.
//! - **Strict staged building** – [`ops::AssemblyBuilder`] enforces the model → entity → chain → group → atom write protocol and re-checks every total at finalization.
//! - **Transform replication** – [`ops::replicate_assembly`] applies each bioassembly's chain-tagged 4×4 operations via `nalgebra`, replicating chains once per listing with coordinates transformed and all other metadata copied verbatim.
//! - **Optional parallelism** – With the `parallel` feature (default), [`ops::replicate_all`] materializes independent bioassemblies on the Rayon thread pool.

mod model;
mod utils;

pub mod ops;

pub use model::assembly::{BioAssembly, TransformOperation, MATRIX_LEN};
pub use model::entity::Entity;
pub use model::group::GroupTemplate;
pub use model::header::{CrystalInfo, HeaderInfo};
pub use model::structure::StructureData;
