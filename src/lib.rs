//! Quantum states over aliased buffers and phase-space quasiprobabilities
//!
//! This crate wraps numeric buffers owned by other subsystems as either state
//! vectors or density matrices without copying them, and evaluates the Wigner
//! quasiprobability distribution of such states over phase-space grids.

pub mod config;
pub mod error;
pub mod quantum;
pub mod phase_space;

pub use config::ContextConfig;
pub use error::{StateError, StateResult};

// Create a prelude module for convenient imports
pub mod prelude {
    pub use crate::quantum::prelude::*;
    pub use crate::phase_space::{coherent_density_matrix, coherent_state, wigner_function, PhaseSpaceGrid};
    pub use crate::{ContextConfig, StateError, StateResult};
}

// Version and crate information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
