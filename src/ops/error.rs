use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of assembly materialization.
///
/// Structural-integrity variants abort the single bioassembly being built and
/// carry its name; builder-protocol variants indicate a caller bug or a
/// divergence between the counting and emission passes. There is no transient
/// class: every failure is a deterministic function of the input.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "bioassembly '{assembly}': transform {transform} references chain index {chain_index}, \
         but model {model} has only {chain_count} chains"
    )]
    ChainIndexOutOfRange {
        assembly: String,
        transform: usize,
        chain_index: usize,
        model: usize,
        chain_count: usize,
    },

    #[error(
        "bioassembly '{assembly}': transform {transform} carries a {len}-element matrix, \
         expected 16 (flattened row-major 4x4)"
    )]
    MalformedMatrix {
        assembly: String,
        transform: usize,
        len: usize,
    },

    #[error("bioassembly '{assembly}': chain {chain_index} is not covered by any entity")]
    MissingEntity {
        assembly: String,
        chain_index: usize,
    },

    #[error("builder protocol violation: {call} called {detail}")]
    ProtocolViolation { call: &'static str, detail: String },

    #[error("builder received more {kind} records than the declared total of {declared}")]
    CountOverrun { kind: &'static str, declared: usize },

    #[error("finalize: emitted {kind} count {emitted} does not match declared {declared}")]
    CountMismatch {
        kind: &'static str,
        declared: usize,
        emitted: usize,
    },
}

impl Error {
    pub fn chain_index_out_of_range(
        assembly: impl Into<String>,
        transform: usize,
        chain_index: usize,
        model: usize,
        chain_count: usize,
    ) -> Self {
        Self::ChainIndexOutOfRange {
            assembly: assembly.into(),
            transform,
            chain_index,
            model,
            chain_count,
        }
    }

    pub fn malformed_matrix(assembly: impl Into<String>, transform: usize, len: usize) -> Self {
        Self::MalformedMatrix {
            assembly: assembly.into(),
            transform,
            len,
        }
    }

    pub fn missing_entity(assembly: impl Into<String>, chain_index: usize) -> Self {
        Self::MissingEntity {
            assembly: assembly.into(),
            chain_index,
        }
    }

    pub fn protocol(call: &'static str, detail: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            call,
            detail: detail.into(),
        }
    }

    pub fn overrun(kind: &'static str, declared: usize) -> Self {
        Self::CountOverrun { kind, declared }
    }

    pub fn mismatch(kind: &'static str, declared: usize, emitted: usize) -> Self {
        Self::CountMismatch {
            kind,
            declared,
            emitted,
        }
    }
}
