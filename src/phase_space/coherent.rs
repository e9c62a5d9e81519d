//! Coherent states of a truncated bosonic mode

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::quantum::ops::ket_to_dm;

/// Fock-basis amplitudes of the coherent state |α⟩ truncated to `n` levels.
///
/// Amplitudes are `exp(-|α|²/2) α^k / sqrt(k!)`, built as a running product of
/// `α / sqrt(k)` so no factorial is ever formed. Truncation drops the tail,
/// so the norm never exceeds 1.
pub fn coherent_state(n: usize, alpha: impl Into<Complex64>) -> Array1<Complex64> {
    let alpha = alpha.into();
    if n == 0 {
        return Array1::zeros(0);
    }

    let mut terms: Array1<Complex64> = (0..n)
        .map(|k| {
            // sqrt(0) replaced by 1; term 0 is overwritten below
            let sqrt_k = if k == 0 { 1.0 } else { (k as f64).sqrt() };
            alpha / sqrt_k
        })
        .collect();
    terms[0] = Complex64::new((-alpha.norm_sqr() / 2.0).exp(), 0.0);

    let mut running = terms[0];
    for term in terms.iter_mut().skip(1) {
        running *= *term;
        *term = running;
    }

    terms
}

/// Density matrix |α⟩⟨α| of the truncated coherent state.
pub fn coherent_density_matrix(n: usize, alpha: impl Into<Complex64>) -> Array2<Complex64> {
    ket_to_dm(coherent_state(n, alpha).view())
}
