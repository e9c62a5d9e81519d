use std::fmt::{self, Display};
use std::sync::Arc;

use ndarray::ArrayView2;
use num_complex::Complex64;

use crate::error::{StateError, StateResult};
use crate::quantum::buffer::BufferView;
use crate::quantum::context::NumericContext;
use crate::quantum::ops::ket_to_dm;
use crate::quantum::state::{basis_label, hilbert_dimension, BackingState, StateKind, StateVector};

/// Represents a quantum state as a density matrix
#[derive(Clone, Debug)]
pub struct DensityMatrix {
    /// Local dimension of each subsystem
    dims: Vec<usize>,

    /// Row-major `M x M` elements with `M = ∏dims`
    storage: BufferView,

    context: Arc<NumericContext>,
}

impl DensityMatrix {
    /// Create a density matrix over `dims` backed by `storage`
    pub fn with_storage(
        context: &Arc<NumericContext>,
        dims: &[usize],
        storage: BufferView,
    ) -> StateResult<Self> {
        let expected = Self::storage_size(dims)?;

        if storage.len() != expected {
            return Err(StateError::StorageSize {
                expected,
                actual: storage.len(),
            });
        }

        Ok(DensityMatrix {
            dims: dims.to_vec(),
            storage,
            context: context.clone(),
        })
    }

    /// Number of elements a density matrix over `dims` occupies
    pub fn storage_size(dims: &[usize]) -> StateResult<usize> {
        let dim = hilbert_dimension(dims)?;
        dim.checked_mul(dim)
            .ok_or_else(|| StateError::InvalidDimensions(dims.to_vec()))
    }

    /// Create a density matrix from a state vector: ρ = |ψ⟩⟨ψ|
    ///
    /// The result owns freshly allocated storage.
    pub fn from_state_vector(state: &StateVector) -> StateResult<Self> {
        let matrix = ket_to_dm(state.amplitudes());
        Self::with_storage(
            state.context(),
            state.hilbert_space_dims(),
            BufferView::from_vec(matrix.into_raw_vec()),
        )
    }

    /// Replace the attached storage with another buffer of the same size
    pub fn attach_storage(&mut self, storage: BufferView) -> StateResult<()> {
        let expected = self.storage.len();
        if storage.len() != expected {
            return Err(StateError::StorageSize {
                expected,
                actual: storage.len(),
            });
        }

        self.storage = storage;
        Ok(())
    }

    /// Get a square view of the matrix
    pub fn matrix(&self) -> ArrayView2<'_, Complex64> {
        let dim = self.dimension();
        // Every constructor and attach_storage checks len == dim²
        ArrayView2::from_shape((dim, dim), self.storage.as_slice())
            .expect("storage size is validated on attach")
    }

    /// Calculate the trace of the density matrix
    pub fn trace(&self) -> f64 {
        self.matrix().diag().iter().map(|c| c.re).sum()
    }

    /// Calculate the purity Tr(ρ²)
    pub fn purity(&self) -> f64 {
        let m = self.matrix();
        let dim = self.dimension();
        let mut sum = Complex64::new(0.0, 0.0);
        for i in 0..dim {
            for j in 0..dim {
                sum += m[[i, j]] * m[[j, i]];
            }
        }
        sum.re
    }

    /// Worst Hermiticity violation above the context's Hermitian tolerance, if any
    pub fn hermiticity_violation(&self) -> Option<(usize, usize, f64)> {
        hermiticity_violation(&self.matrix(), self.context.config().hermitian_tolerance)
    }

    pub fn is_hermitian(&self) -> bool {
        self.hermiticity_violation().is_none()
    }

    /// Trace out every subsystem not listed in `keep`
    ///
    /// Kept subsystems retain their relative order. The result owns its storage.
    pub fn partial_trace(&self, keep: &[usize]) -> StateResult<Self> {
        let count = self.dims.len();
        for &index in keep {
            if index >= count {
                return Err(StateError::SubsystemOutOfRange { index, count });
            }
        }

        let mut kept: Vec<usize> = keep.to_vec();
        kept.sort_unstable();
        kept.dedup();
        if kept.is_empty() {
            return Err(StateError::InvalidDimensions(Vec::new()));
        }
        let traced: Vec<usize> = (0..count).filter(|i| !kept.contains(i)).collect();

        // Row-major strides of the full tensor-product index
        let mut strides = vec![1usize; count];
        for k in (0..count.saturating_sub(1)).rev() {
            strides[k] = strides[k + 1] * self.dims[k + 1];
        }

        let kept_offsets = subsystem_offsets(&kept, &self.dims, &strides);
        let traced_offsets = subsystem_offsets(&traced, &self.dims, &strides);
        let kept_dims: Vec<usize> = kept.iter().map(|&k| self.dims[k]).collect();

        let m = self.matrix();
        let reduced_dim = kept_offsets.len();
        let mut data = Vec::with_capacity(reduced_dim * reduced_dim);

        for &row in &kept_offsets {
            for &col in &kept_offsets {
                let sum: Complex64 = traced_offsets
                    .iter()
                    .map(|&t| m[[row + t, col + t]])
                    .sum();
                data.push(sum);
            }
        }

        Self::with_storage(&self.context, &kept_dims, BufferView::from_vec(data))
    }
}

/// Flat-index contribution of every basis state of the listed subsystems.
fn subsystem_offsets(subsystems: &[usize], dims: &[usize], strides: &[usize]) -> Vec<usize> {
    let mut offsets = vec![0usize];
    for &s in subsystems {
        offsets = offsets
            .iter()
            .flat_map(|&base| (0..dims[s]).map(move |digit| base + digit * strides[s]))
            .collect();
    }
    offsets
}

/// Find the largest `|ρ[i,j] - conj(ρ[j,i])|` exceeding `relative_tolerance * max|ρ|`.
pub fn hermiticity_violation(
    matrix: &ArrayView2<'_, Complex64>,
    relative_tolerance: f64,
) -> Option<(usize, usize, f64)> {
    let dim = matrix.nrows();
    let scale = matrix.iter().map(|c| c.norm()).fold(0.0, f64::max);
    let tolerance = relative_tolerance * scale;
    let mut worst: Option<(usize, usize, f64)> = None;

    for i in 0..dim {
        for j in 0..=i {
            let deviation = (matrix[[i, j]] - matrix[[j, i]].conj()).norm();
            if deviation > tolerance && worst.map_or(true, |(_, _, w)| deviation > w) {
                worst = Some((i, j, deviation));
            }
        }
    }

    worst
}

impl BackingState for DensityMatrix {
    fn kind(&self) -> StateKind {
        StateKind::DensityMatrix
    }

    fn hilbert_space_dims(&self) -> &[usize] {
        &self.dims
    }

    fn storage(&self) -> &BufferView {
        &self.storage
    }

    fn context(&self) -> &Arc<NumericContext> {
        &self.context
    }

    fn is_valid(&self) -> bool {
        let tolerance = self.context.tolerance();
        if (self.trace() - 1.0).abs() > tolerance {
            return false;
        }

        if !self.is_hermitian() {
            return false;
        }

        // Diagonal entries are populations
        self.matrix().diag().iter().all(|c| c.re >= -tolerance)
    }
}

impl Display for DensityMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "density matrix over dims {:?}:", self.dims)?;

        let threshold = 1e-10;
        let dim = self.dimension();
        let m = self.matrix();

        let purity = self.purity();
        writeln!(f, "Purity: {:.6} (pure: {})", purity, (purity - 1.0).abs() < 1e-10)?;

        if dim <= 16 {
            for i in 0..dim {
                for j in 0..dim {
                    let elem = m[[i, j]];
                    if elem.norm_sqr() > threshold {
                        writeln!(
                            f,
                            "  |{}⟩⟨{}|: {:.6}{:+.6}i",
                            basis_label(i, &self.dims),
                            basis_label(j, &self.dims),
                            elem.re,
                            elem.im
                        )?;
                    }
                }
            }
        } else {
            writeln!(f, "  (Matrix too large to display fully)")?;

            for i in 0..dim {
                let prob = m[[i, i]].re;
                if prob > threshold {
                    writeln!(f, "  |{}⟩: [{:.1}%]", basis_label(i, &self.dims), prob * 100.0)?;
                }
            }
        }

        Ok(())
    }
}
