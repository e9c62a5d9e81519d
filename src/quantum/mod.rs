// src/quantum/mod.rs
//! Quantum state representations
//!
//! This module wraps caller-owned amplitude buffers as state vectors or
//! density matrices without copying them.

pub mod buffer;
pub mod context;
pub mod state;
pub mod density_matrix;
pub mod quantum_state;
pub mod ops;

pub use buffer::{BufferView, KeepAlive};
pub use context::NumericContext;
pub use density_matrix::DensityMatrix;
pub use state::{BackingState, StateKind, StateVector};
pub use quantum_state::{QuantumState, Representation, SHAPE_TRIAL_ORDER};
pub use ops::{ket_to_dm, kron};

/// Re-export commonly used types and traits
pub mod prelude {
    pub use super::{BufferView, NumericContext, QuantumState, StateKind};
    pub use super::{BackingState, DensityMatrix, StateVector};
}
