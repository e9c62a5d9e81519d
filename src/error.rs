//! Error types for state construction and phase-space evaluation.

use thiserror::Error;

use crate::quantum::StateKind;

/// Errors produced by quantum-state wrapping and Wigner evaluation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StateError {
    /// A raw buffer fits neither candidate shape for the requested dims.
    #[error(
        "invalid state data: {len} elements fit neither a state vector of shape {state_vector_shape:?} \
         nor a density matrix of shape {density_matrix_shape:?}"
    )]
    Shape {
        /// Number of elements in the raw buffer.
        len: usize,
        /// Candidate state-vector shape (`dims`).
        state_vector_shape: Vec<usize>,
        /// Candidate density-matrix shape (`dims ++ dims`).
        density_matrix_shape: Vec<usize>,
    },

    /// Conversion requested from a representation that cannot be converted.
    #[error("cannot convert to a density matrix: state is already a {0}")]
    InvalidConversion(StateKind),

    /// Input is neither a recognized state nor a rank-1/rank-2 array.
    #[error("unsupported state kind: {0}")]
    UnsupportedStateKind(String),

    /// Operation needs an attached representation.
    #[error("state has not been initialized with Hilbert space dimensions")]
    NotInitialized,

    /// `initialize` called on an already attached state.
    #[error("state is already initialized with dimensions {dims:?}")]
    AlreadyInitialized {
        /// Dimensions fixed by the earlier initialization.
        dims: Vec<usize>,
    },

    /// Dimensions empty, containing zero, or overflowing `usize`.
    #[error("invalid Hilbert space dimensions {0:?}")]
    InvalidDimensions(Vec<usize>),

    /// Attached storage has the wrong element count.
    #[error("storage holds {actual} elements but the representation needs {expected}")]
    StorageSize {
        /// Element count required by the representation.
        expected: usize,
        /// Element count of the offered buffer.
        actual: usize,
    },

    /// Byte range does not describe whole elements inside the owner.
    #[error("byte range {byte_offset}..+{byte_len} is not a valid element range of a {available}-byte buffer")]
    BufferRange {
        /// Requested byte offset.
        byte_offset: usize,
        /// Requested byte length.
        byte_len: usize,
        /// Size of the owning buffer in bytes.
        available: usize,
    },

    /// Density matrix is not Hermitian within tolerance.
    #[error("density matrix is not Hermitian: |rho[{row},{col}] - conj(rho[{col},{row}])| = {deviation:e}")]
    NonHermitian {
        /// Row of the worst offending element.
        row: usize,
        /// Column of the worst offending element.
        col: usize,
        /// Size of the violation.
        deviation: f64,
    },

    /// Subsystem index outside the tensor-product structure.
    #[error("subsystem {index} out of range for a system of {count} subsystems")]
    SubsystemOutOfRange {
        /// Offending subsystem index.
        index: usize,
        /// Number of subsystems.
        count: usize,
    },

    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for state and phase-space operations.
pub type StateResult<T> = Result<T, StateError>;
