// demos/cavity_wigner.rs
//! Wigner function of a cavity mode coupled to a transmon
//!
//! Prepares the product state |0⟩ ⊗ |α⟩ of a transmon and a truncated cavity,
//! wraps its amplitudes without copying, traces out the transmon and samples
//! the cavity's Wigner function.

use std::sync::Arc;

use num_complex::Complex64;
use tracing_subscriber::EnvFilter;

use fockspace::phase_space::{coherent_state, PhaseSpaceGrid};
use fockspace::quantum::{kron, BufferView, QuantumState};
use fockspace::StateResult;

const CAVITY_LEVELS: usize = 20;

fn main() -> StateResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Cavity Wigner Function Example");
    println!("==============================\n");

    let transmon = ndarray::array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
    let cavity = coherent_state(CAVITY_LEVELS, 2.0);
    let amplitudes: Arc<Vec<Complex64>> = Arc::new(kron(transmon.view(), cavity.view()).to_vec());

    let mut psi0 = QuantumState::from_raw_buffer(BufferView::alias(amplitudes.clone()));
    psi0.initialize(&[2, CAVITY_LEVELS])?;
    println!("Initial state kind: {}", psi0.kind());

    let rho = psi0.to_density_matrix()?;
    let cavity_rho = rho
        .as_density_matrix()
        .expect("conversion yields a density matrix")
        .partial_trace(&[1])?;
    println!("Cavity trace: {:.8}", cavity_rho.trace());
    println!("Cavity purity: {:.8}\n", cavity_rho.purity());

    let cavity_state = QuantumState::from_backing(cavity_rho);
    let grid = PhaseSpaceGrid::symmetric(6.0, 100);
    let w = grid.wigner(&cavity_state)?;

    if let Some((x, y)) = grid.argmax(&w) {
        println!("Wigner peak at x = {:.3}, y = {:.3}", x, y);
    }
    println!("Integrated Wigner function: {:.6}\n", grid.integrate(&w));

    // Coarse density plot, one character per 5x5 block
    let shades = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
    let peak = w.iter().cloned().fold(f64::MIN, f64::max);
    for row in (0..w.nrows()).step_by(5).rev() {
        let line: String = (0..w.ncols())
            .step_by(5)
            .map(|col| {
                let level = (w[[row, col]].max(0.0) / peak * 9.0).round() as usize;
                shades[level.min(9)]
            })
            .collect();
        println!("{}", line);
    }

    Ok(())
}
