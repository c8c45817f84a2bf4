//! Bioassembly specifications: named lists of chain-tagged 4×4 transforms.
//!
//! A bioassembly describes how to expand the asymmetric unit into a complete
//! quaternary structure. Each [`TransformOperation`] pairs one homogeneous
//! affine matrix with the model-local chain indices it replicates; each
//! listing of a chain, within one operation or across several, yields one
//! replicated copy.

use nalgebra::{Matrix4, RowVector4};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Matrices arrive as flattened row-major 4×4; anything else is malformed.
pub const MATRIX_LEN: usize = 16;

/// One symmetry operation of a bioassembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOperation {
    /// Model-local chain indices this operation applies to.
    pub chain_index_list: Vec<usize>,
    /// Flattened row-major 4×4 homogeneous affine matrix.
    pub matrix: Vec<f64>,
}

impl TransformOperation {
    pub fn new(chain_index_list: Vec<usize>, matrix: Vec<f64>) -> Self {
        Self {
            chain_index_list,
            matrix,
        }
    }

    /// Identity operation over the given chains.
    pub fn identity(chain_index_list: Vec<usize>) -> Self {
        Self::translation(chain_index_list, 0.0, 0.0, 0.0)
    }

    /// Pure translation over the given chains.
    ///
    /// Coordinates are applied as row vectors (`p' = p · M`), so the
    /// translation components live in the bottom row of the matrix.
    pub fn translation(chain_index_list: Vec<usize>, dx: f64, dy: f64, dz: f64) -> Self {
        let mut matrix = vec![
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        matrix[12] = dx;
        matrix[13] = dy;
        matrix[14] = dz;
        Self::new(chain_index_list, matrix)
    }

    pub fn applies_to(&self, chain_index: usize) -> bool {
        self.chain_index_list.contains(&chain_index)
    }

    /// Number of times the chain is listed; each listing yields one copy.
    pub fn multiplicity(&self, chain_index: usize) -> usize {
        self.chain_index_list
            .iter()
            .filter(|&&c| c == chain_index)
            .count()
    }

    pub fn chain_count(&self) -> usize {
        self.chain_index_list.len()
    }

    /// Reshapes the flattened matrix row-major into 4×4.
    ///
    /// Returns `None` when the stored list is not exactly 16 elements; callers
    /// treat that as a structural-integrity failure.
    pub fn to_matrix(&self) -> Option<Matrix4<f64>> {
        if self.matrix.len() != MATRIX_LEN {
            return None;
        }
        Some(Matrix4::from_row_slice(&self.matrix))
    }
}

impl fmt::Display for TransformOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransformOperation {{ chains: {:?}, matrix: {} elements }}",
            self.chain_index_list,
            self.matrix.len()
        )
    }
}

/// Applies a homogeneous transform to one coordinate.
///
/// The coordinate row vector `(x, y, z, 1)` is right-multiplied by the matrix
/// and the first three components of the product are returned. Arithmetic runs
/// in `f64`; the result is narrowed back to the structure's `f32` streams.
pub fn apply_to_point(matrix: &Matrix4<f64>, x: f32, y: f32, z: f32) -> (f32, f32, f32) {
    let p = RowVector4::new(f64::from(x), f64::from(y), f64::from(z), 1.0);
    let q = p * matrix;
    (q[0] as f32, q[1] as f32, q[2] as f32)
}

/// Named bioassembly: the declared-order list of transform operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BioAssembly {
    /// Assembly tag as stored in the source record (commonly `"1"`, `"2"`, ...).
    pub name: String,
    /// Transform operations in declared order.
    pub transform_list: Vec<TransformOperation>,
}

impl BioAssembly {
    pub fn new(name: &str, transform_list: Vec<TransformOperation>) -> Self {
        Self {
            name: name.to_string(),
            transform_list,
        }
    }

    pub fn transform_count(&self) -> usize {
        self.transform_list.len()
    }

    /// Output chains contributed per model: every listing of every operation
    /// yields one replicated chain.
    pub fn chains_per_model(&self) -> usize {
        self.transform_list.iter().map(|t| t.chain_count()).sum()
    }
}

impl fmt::Display for BioAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BioAssembly {{ name: \"{}\", transforms: {} }}",
            self.name,
            self.transform_count()
        )
    }
}
