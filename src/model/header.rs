//! Descriptive and crystallographic header metadata.
//!
//! These records are opaque to the replication engine: every derived assembly
//! receives a verbatim copy of the originals.

use serde::{Deserialize, Serialize};

/// Descriptive header of a structure record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub title: String,
    pub deposition_date: String,
    pub release_date: String,
    pub experimental_methods: Vec<String>,
    pub resolution: Option<f32>,
    pub r_free: Option<f32>,
    pub r_work: Option<f32>,
}

/// Crystallographic metadata of a structure record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrystalInfo {
    /// Unit cell as `[a, b, c, alpha, beta, gamma]`.
    pub unit_cell: Option<[f32; 6]>,
    /// Hermann-Mauguin space group symbol.
    pub space_group: String,
}
