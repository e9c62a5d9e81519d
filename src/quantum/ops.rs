// src/quantum/ops.rs
//! Small array operations shared by states and the phase-space evaluators

use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;

/// Density matrix of a pure state: ρ = |ψ⟩⟨ψ|
pub fn ket_to_dm(ket: ArrayView1<'_, Complex64>) -> Array2<Complex64> {
    let dim = ket.len();
    Array2::from_shape_fn((dim, dim), |(i, j)| ket[i] * ket[j].conj())
}

/// Tensor product |a⟩ ⊗ |b⟩ of two state vectors
pub fn kron(a: ArrayView1<'_, Complex64>, b: ArrayView1<'_, Complex64>) -> Array1<Complex64> {
    let b_dim = b.len();
    Array1::from_shape_fn(a.len() * b_dim, |idx| a[idx / b_dim] * b[idx % b_dim])
}
