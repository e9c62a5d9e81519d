// src/quantum/state.rs
//! State-vector backing representation
//!
//! This module defines the pure-state backing object and the trait shared by
//! every backing representation that a [`QuantumState`](super::QuantumState)
//! can attach.

use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use ndarray::ArrayView1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};
use crate::quantum::buffer::BufferView;
use crate::quantum::context::NumericContext;

/// Which representation a state currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKind {
    /// Raw buffer, no dimensions bound yet
    Uninitialized,
    /// Pure state, `∏dims` amplitudes
    StateVector,
    /// Mixed state, `(∏dims)²` elements
    DensityMatrix,
}

impl Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKind::Uninitialized => write!(f, "uninitialized buffer"),
            StateKind::StateVector => write!(f, "state vector"),
            StateKind::DensityMatrix => write!(f, "density matrix"),
        }
    }
}

/// Behaviour common to attached backing representations
pub trait BackingState: Clone + Debug {
    /// Which representation this is
    fn kind(&self) -> StateKind;

    /// Local dimension of each subsystem
    fn hilbert_space_dims(&self) -> &[usize];

    /// The aliased storage holding the elements
    fn storage(&self) -> &BufferView;

    /// Context this representation was created against
    fn context(&self) -> &Arc<NumericContext>;

    /// Check the physical constraints of the representation
    fn is_valid(&self) -> bool;

    /// Dimension of the full Hilbert space (∏dims)
    fn dimension(&self) -> usize {
        self.hilbert_space_dims().iter().product()
    }

    fn num_elements(&self) -> usize {
        self.storage().len()
    }

    /// Size of one element in bytes
    fn element_size(&self) -> usize {
        self.storage().element_size()
    }

    fn storage_ptr(&self) -> *const Complex64 {
        self.storage().as_ptr()
    }
}

/// Validate `dims` and return the Hilbert space dimension `∏dims`.
pub(crate) fn hilbert_dimension(dims: &[usize]) -> StateResult<usize> {
    if dims.is_empty() || dims.contains(&0) {
        return Err(StateError::InvalidDimensions(dims.to_vec()));
    }

    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| StateError::InvalidDimensions(dims.to_vec()))
}

/// Ket label of a flat basis index over a mixed-radix tensor product.
pub(crate) fn basis_label(mut index: usize, dims: &[usize]) -> String {
    let mut digits = vec![0; dims.len()];
    for (slot, &d) in digits.iter_mut().zip(dims).rev() {
        *slot = index % d;
        index /= d;
    }

    digits.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(",")
}

/// State vector representation of a quantum state
#[derive(Clone, Debug)]
pub struct StateVector {
    /// Local dimension of each subsystem
    dims: Vec<usize>,

    /// The amplitudes, aliased rather than owned
    storage: BufferView,

    context: Arc<NumericContext>,
}

impl StateVector {
    /// Create a state vector over `dims` backed by `storage`
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

        Ok(StateVector {
            dims: dims.to_vec(),
            storage,
            context: context.clone(),
        })
    }

    /// Number of elements a state vector over `dims` occupies
    pub fn storage_size(dims: &[usize]) -> StateResult<usize> {
        hilbert_dimension(dims)
    }

    /// Replace the attached storage with another buffer of the same size
    pub fn attach_storage(&mut self, storage: BufferView) -> StateResult<()> {
        let expected = self.dimension();
        if storage.len() != expected {
            return Err(StateError::StorageSize {
                expected,
                actual: storage.len(),
            });
        }

        self.storage = storage;
        Ok(())
    }

    /// Get a view of the amplitudes
    pub fn amplitudes(&self) -> ArrayView1<'_, Complex64> {
        self.storage.vector_view()
    }

    /// Squared norm ⟨ψ|ψ⟩
    pub fn norm_sqr(&self) -> f64 {
        self.storage.as_slice().iter().map(|amp| amp.norm_sqr()).sum()
    }

    /// Check normalization against the context tolerance
    pub fn is_normalized(&self) -> bool {
        (self.norm_sqr() - 1.0).abs() < self.context.tolerance()
    }
}

impl BackingState for StateVector {
    fn kind(&self) -> StateKind {
        StateKind::StateVector
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
        self.is_normalized()
    }
}

impl Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "state vector over dims {:?}:", self.dims)?;

        let threshold = 1e-10;
        let mut has_entries = false;

        for (i, amp) in self.storage.as_slice().iter().enumerate() {
            if amp.norm_sqr() > threshold {
                has_entries = true;
                writeln!(
                    f,
                    "  ({:.6}{:+.6}i) |{}⟩ [{:.1}%]",
                    amp.re,
                    amp.im,
                    basis_label(i, &self.dims),
                    amp.norm_sqr() * 100.0
                )?;
            }
        }

        if !has_entries {
            writeln!(f, "  (zero state)")?;
        }

        Ok(())
    }
}
