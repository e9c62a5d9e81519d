//! Phase-space quasiprobability tools
//!
//! Coherent-state construction for truncated bosonic modes and Wigner
//! function evaluation over rectangular grids.

pub mod coherent;
pub mod grid;
pub mod wigner;

pub use coherent::{coherent_density_matrix, coherent_state};
pub use grid::{linspace, PhaseSpaceGrid};
pub use wigner::{wigner_function, wigner_function_in, WignerInput};
