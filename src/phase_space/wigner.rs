//! Wigner quasiprobability distribution
//!
//! The Wigner function is evaluated in the Fock basis with a two-pass
//! recurrence over kernel functions `W[n]`, one per matrix element `|m⟩⟨n|`,
//! which avoids evaluating high-order Laguerre polynomials directly. Each
//! grid point runs the recurrence independently, so rows can be evaluated in
//! parallel without changing the accumulation order at any point.

use std::f64::consts::{PI, SQRT_2};
use std::sync::Arc;

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewD, ArrayViewMut1, Axis, CowArray, Ix1, Ix2};
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{StateError, StateResult};
use crate::phase_space::grid::PhaseSpaceGrid;
use crate::quantum::density_matrix::hermiticity_violation;
use crate::quantum::ops::ket_to_dm;
use crate::quantum::{NumericContext, QuantumState, Representation};

/// Anything the Wigner evaluator accepts as a state
#[derive(Debug, Clone)]
pub enum WignerInput<'a> {
    /// A wrapped state; raw buffers count as flat state vectors
    State(&'a QuantumState),
    /// A pure state, converted to |ψ⟩⟨ψ| first
    Vector(ArrayView1<'a, Complex64>),
    /// A square density matrix
    Matrix(ArrayView2<'a, Complex64>),
    /// An array of unknown rank; must be rank 1 or 2
    Dynamic(ArrayViewD<'a, Complex64>),
}

impl<'a> From<&'a QuantumState> for WignerInput<'a> {
    fn from(state: &'a QuantumState) -> Self {
        WignerInput::State(state)
    }
}

impl<'a> From<ArrayView1<'a, Complex64>> for WignerInput<'a> {
    fn from(view: ArrayView1<'a, Complex64>) -> Self {
        WignerInput::Vector(view)
    }
}

impl<'a> From<ArrayView2<'a, Complex64>> for WignerInput<'a> {
    fn from(view: ArrayView2<'a, Complex64>) -> Self {
        WignerInput::Matrix(view)
    }
}

impl<'a> From<ArrayViewD<'a, Complex64>> for WignerInput<'a> {
    fn from(view: ArrayViewD<'a, Complex64>) -> Self {
        WignerInput::Dynamic(view)
    }
}

impl<'a> WignerInput<'a> {
    /// Resolve to a square density matrix, borrowing when no conversion is needed.
    fn into_density_matrix(self) -> StateResult<CowArray<'a, Complex64, Ix2>> {
        let rho: CowArray<'a, Complex64, Ix2> = match self {
            WignerInput::State(state) => match state.representation() {
                Representation::Uninitialized(buffer) => ket_to_dm(buffer.vector_view()).into(),
                Representation::StateVector(sv) => ket_to_dm(sv.amplitudes()).into(),
                Representation::DensityMatrix(dm) => dm.matrix().into(),
            },
            WignerInput::Vector(ket) => ket_to_dm(ket).into(),
            WignerInput::Matrix(matrix) => matrix.into(),
            WignerInput::Dynamic(array) => match array.ndim() {
                1 => {
                    let ket = array
                        .into_dimensionality::<Ix1>()
                        .map_err(|e| StateError::UnsupportedStateKind(e.to_string()))?;
                    ket_to_dm(ket).into()
                }
                2 => array
                    .into_dimensionality::<Ix2>()
                    .map_err(|e| StateError::UnsupportedStateKind(e.to_string()))?
                    .into(),
                rank => {
                    return Err(StateError::UnsupportedStateKind(format!(
                        "array of rank {} is neither a state vector nor a density matrix",
                        rank
                    )))
                }
            },
        };

        let (rows, cols) = rho.dim();
        if rows != cols {
            return Err(StateError::UnsupportedStateKind(format!(
                "{}x{} matrix is not square",
                rows, cols
            )));
        }
        if rows == 0 {
            return Err(StateError::UnsupportedStateKind("empty state".to_string()));
        }

        Ok(rho)
    }
}

/// Wigner function of `state` on the grid spanned by `x` and `y`.
///
/// Wrapped states are evaluated with their own context; bare arrays with the
/// process-wide one. The result has shape `(len(y), len(x))`.
pub fn wigner_function<'a>(
    state: impl Into<WignerInput<'a>>,
    x: ArrayView1<'_, f64>,
    y: ArrayView1<'_, f64>,
) -> StateResult<Array2<f64>> {
    let input: WignerInput<'a> = state.into();
    let context = match &input {
        WignerInput::State(state) => state.context().clone(),
        _ => NumericContext::global(),
    };
    wigner_function_in(&context, input, x, y)
}

/// Wigner function of `state` using the tolerances and switches of `context`.
pub fn wigner_function_in<'a>(
    context: &Arc<NumericContext>,
    state: impl Into<WignerInput<'a>>,
    x: ArrayView1<'_, f64>,
    y: ArrayView1<'_, f64>,
) -> StateResult<Array2<f64>> {
    let input: WignerInput<'a> = state.into();
    let rho = input.into_density_matrix()?;
    let config = context.config();

    if config.validate_hermitian {
        if let Some((row, col, deviation)) = hermiticity_violation(&rho.view(), config.hermitian_tolerance) {
            return Err(StateError::NonHermitian { row, col, deviation });
        }
    }

    let trace: f64 = rho.diag().iter().map(|c| c.re).sum();
    if (trace - 1.0).abs() > config.tolerance {
        warn!(trace, "Wigner input is not trace-normalized");
    }

    let dim = rho.nrows();
    let (nx, ny) = (x.len(), y.len());
    debug!(dimension = dim, grid = ?(ny, nx), parallel = config.parallel, "evaluating Wigner function");

    let sqrt_n: Vec<f64> = (0..dim).map(|k| (k as f64).sqrt()).collect();
    let rho = rho.view();

    let eval_row = |row: usize, mut out: ArrayViewMut1<'_, f64>| {
        let mut kernels = vec![Complex64::new(0.0, 0.0); dim];
        for (col, value) in out.iter_mut().enumerate() {
            let a = Complex64::new(x[col], y[row]) * (0.5 * SQRT_2);
            *value = wigner_at(&rho, a, &sqrt_n, &mut kernels);
        }
    };

    let mut values = Array2::<f64>::zeros((ny, nx));
    if config.parallel {
        values
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, out)| eval_row(row, out));
    } else {
        values
            .axis_iter_mut(Axis(0))
            .enumerate()
            .for_each(|(row, out)| eval_row(row, out));
    }

    Ok(values)
}

/// Run the kernel recurrence at the phase-space point `a = (x + iy)/√2`.
///
/// `kernels` is scratch space of length `dim`; after the first pass
/// `kernels[n]` holds the kernel of `|0⟩⟨n|`, and the second pass walks the
/// remaining upper triangle row by row, overwriting in place.
fn wigner_at(
    rho: &ArrayView2<'_, Complex64>,
    a: Complex64,
    sqrt_n: &[f64],
    kernels: &mut [Complex64],
) -> f64 {
    let dim = kernels.len();
    let g2 = SQRT_2 * SQRT_2;

    kernels[0] = Complex64::new((-2.0 * a.norm_sqr()).exp() / PI, 0.0);
    let mut result = rho[[0, 0]].re * kernels[0].re;

    for n in 1..dim {
        kernels[n] = (2.0 * a * kernels[n - 1]) / sqrt_n[n];
        result += 2.0 * (rho[[0, n]] * kernels[n]).re;
    }

    for m in 1..dim {
        // Must be read before kernels[m] is overwritten
        let mut prev = kernels[m];
        kernels[m] = (2.0 * a.conj() * prev - sqrt_n[m] * kernels[m - 1]) / sqrt_n[m];
        result += (rho[[m, m]] * kernels[m]).re;

        for n in (m + 1)..dim {
            let next = (2.0 * a * kernels[n - 1] - sqrt_n[m] * prev) / sqrt_n[n];
            prev = kernels[n];
            kernels[n] = next;
            result += 2.0 * (rho[[m, n]] * kernels[n]).re;
        }
    }

    0.5 * result * g2
}

impl PhaseSpaceGrid {
    /// Wigner function of `state` sampled on this grid.
    pub fn wigner<'a>(&self, state: impl Into<WignerInput<'a>>) -> StateResult<Array2<f64>> {
        wigner_function(state, self.x.view(), self.y.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextConfig;
    use crate::phase_space::coherent::coherent_density_matrix;
    use ndarray::{array, Array1, ArrayD, IxDyn};

    /// Whole-grid transcription of the recurrence, one kernel array per Fock level.
    fn grid_recurrence(rho: &Array2<Complex64>, x: &Array1<f64>, y: &Array1<f64>) -> Array2<f64> {
        let g = SQRT_2;
        let dim = rho.nrows();
        let a = Array2::from_shape_fn((y.len(), x.len()), |(r, c)| {
            Complex64::new(x[c], y[r]) * (0.5 * g)
        });

        let mut w: Vec<Array2<Complex64>> = vec![Array2::zeros(a.dim()); dim];
        w[0] = a.mapv(|v| Complex64::new((-2.0 * v.norm_sqr()).exp() / PI, 0.0));
        let mut total = w[0].mapv(|k| rho[[0, 0]].re * k.re);

        for n in 1..dim {
            let sqrt_n = (n as f64).sqrt();
            w[n] = ndarray::Zip::from(&a).and(&w[n - 1]).map_collect(|&av, &k| (2.0 * av * k) / sqrt_n);
            total = total + w[n].mapv(|k| 2.0 * (rho[[0, n]] * k).re);
        }

        for m in 1..dim {
            let sqrt_m = (m as f64).sqrt();
            let mut prev = w[m].clone();
            w[m] = ndarray::Zip::from(&a)
                .and(&prev)
                .and(&w[m - 1])
                .map_collect(|&av, &p, &lower| (2.0 * av.conj() * p - sqrt_m * lower) / sqrt_m);
            total = total + w[m].mapv(|k| (rho[[m, m]] * k).re);

            for n in (m + 1)..dim {
                let sqrt_n = (n as f64).sqrt();
                let next = ndarray::Zip::from(&a)
                    .and(&w[n - 1])
                    .and(&prev)
                    .map_collect(|&av, &left, &p| (2.0 * av * left - sqrt_m * p) / sqrt_n);
                prev = std::mem::replace(&mut w[n], next);
                total = total + w[n].mapv(|k| 2.0 * (rho[[m, n]] * k).re);
            }
        }

        total.mapv(|r| 0.5 * r * (g * g))
    }

    #[test]
    fn matches_grid_recurrence_bit_for_bit() {
        let rho = coherent_density_matrix(10, Complex64::new(1.1, 0.4));
        let x = Array1::linspace(-4.0, 4.0, 41);
        let y = Array1::linspace(-3.0, 5.0, 41);

        let w = wigner_function(rho.view(), x.view(), y.view()).unwrap();
        let reference = grid_recurrence(&rho, &x, &y);

        let differing = w
            .iter()
            .zip(reference.iter())
            .filter(|(a, b)| a.to_bits() != b.to_bits())
            .count();
        assert_eq!(differing, 0, "{} of {} points differ", differing, w.len());
    }

    #[test]
    fn rounding_noise_passes_hermiticity_check() {
        let mut rho = coherent_density_matrix(6, 1.0);
        rho[[0, 1]] += Complex64::new(0.0, 5e-10);
        rho[[2, 4]] += Complex64::new(1e-9, -1e-9);
        let x = Array1::linspace(-2.0, 2.0, 5);

        let context = NumericContext::new(ContextConfig::default());
        assert!(wigner_function_in(&context, rho.view(), x.view(), x.view()).is_ok());

        rho[[3, 1]] += Complex64::new(0.05, 0.0);
        let err = wigner_function_in(&context, rho.view(), x.view(), x.view()).unwrap_err();
        assert!(matches!(err, StateError::NonHermitian { row: 3, col: 1, .. }));
    }

    #[test]
    fn hermitian_tolerance_scales_with_largest_element() {
        let mut rho = vacuum(2).mapv(|c| c * 1e6);
        rho[[0, 1]] = Complex64::new(0.0, 1e-3);
        let x = array![0.0];

        let context = NumericContext::new(ContextConfig::default());
        assert!(wigner_function_in(&context, rho.view(), x.view(), x.view()).is_ok());

        let strict = NumericContext::new(ContextConfig::default().with_hermitian_tolerance(1e-12));
        assert!(wigner_function_in(&strict, rho.view(), x.view(), x.view()).is_err());
    }

    fn vacuum(dim: usize) -> Array2<Complex64> {
        let mut rho = Array2::zeros((dim, dim));
        rho[[0, 0]] = Complex64::new(1.0, 0.0);
        rho
    }

    #[test]
    fn rank_three_is_unsupported() {
        let cube = ArrayD::<Complex64>::zeros(IxDyn(&[2, 2, 2]));
        let x = array![0.0];
        let err = wigner_function(cube.view(), x.view(), x.view()).unwrap_err();
        assert!(matches!(err, StateError::UnsupportedStateKind(_)));
    }

    #[test]
    fn non_square_is_unsupported() {
        let rect = Array2::<Complex64>::zeros((2, 3));
        let x = array![0.0];
        let err = wigner_function(rect.view(), x.view(), x.view()).unwrap_err();
        assert!(matches!(err, StateError::UnsupportedStateKind(_)));
    }

    #[test]
    fn output_shape_is_y_by_x() {
        let rho = vacuum(3);
        let x = Array1::linspace(-1.0, 1.0, 4);
        let y = Array1::linspace(-1.0, 1.0, 7);
        let w = wigner_function(rho.view(), x.view(), y.view()).unwrap();
        assert_eq!(w.dim(), (7, 4));
    }

    #[test]
    fn parallel_matches_sequential_exactly() {
        let mut rho = Array2::zeros((3, 3));
        rho[[0, 0]] = Complex64::new(0.5, 0.0);
        rho[[1, 1]] = Complex64::new(0.3, 0.0);
        rho[[2, 2]] = Complex64::new(0.2, 0.0);
        rho[[0, 2]] = Complex64::new(0.1, 0.05);
        rho[[2, 0]] = Complex64::new(0.1, -0.05);

        let x = Array1::linspace(-3.0, 3.0, 17);
        let seq = NumericContext::new(ContextConfig::default().with_parallel(false));
        let par = NumericContext::new(ContextConfig::default().with_parallel(true));

        let a = wigner_function_in(&seq, rho.view(), x.view(), x.view()).unwrap();
        let b = wigner_function_in(&par, rho.view(), x.view(), x.view()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn non_hermitian_rejected_unless_disabled() {
        let mut rho = vacuum(2);
        rho[[0, 1]] = Complex64::new(0.5, 0.0);
        let x = array![0.0, 1.0];

        let strict = NumericContext::new(ContextConfig::default());
        let err = wigner_function_in(&strict, rho.view(), x.view(), x.view()).unwrap_err();
        assert!(matches!(err, StateError::NonHermitian { row: 1, col: 0, .. }));

        let lax = NumericContext::new(ContextConfig::default().with_hermitian_validation(false));
        assert!(wigner_function_in(&lax, rho.view(), x.view(), x.view()).is_ok());
    }
}
