// src/quantum/quantum_state.rs
//! Dual-representation state wrapper
//!
//! A [`QuantumState`] either holds a raw buffer whose shape is not known yet,
//! or an attached [`StateVector`] / [`DensityMatrix`] aliasing that buffer.
//! Binding dimensions to a raw buffer is done once with
//! [`QuantumState::initialize`]; after that the dimensions are fixed.

use std::fmt::{self, Display};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{StateError, StateResult};
use crate::quantum::buffer::BufferView;
use crate::quantum::context::NumericContext;
use crate::quantum::density_matrix::DensityMatrix;
use crate::quantum::state::{hilbert_dimension, BackingState, StateKind, StateVector};

/// Order in which [`QuantumState::initialize`] tries to reinterpret a raw buffer.
///
/// The two candidate sizes only coincide when every dimension is 1; such a
/// buffer resolves to a density matrix.
pub const SHAPE_TRIAL_ORDER: [StateKind; 2] = [StateKind::DensityMatrix, StateKind::StateVector];

/// What a [`QuantumState`] currently holds
#[derive(Clone, Debug)]
pub enum Representation {
    /// Raw buffer awaiting dimensions
    Uninitialized(BufferView),
    /// Attached pure state
    StateVector(StateVector),
    /// Attached mixed state
    DensityMatrix(DensityMatrix),
}

impl Representation {
    pub fn kind(&self) -> StateKind {
        match self {
            Representation::Uninitialized(_) => StateKind::Uninitialized,
            Representation::StateVector(_) => StateKind::StateVector,
            Representation::DensityMatrix(_) => StateKind::DensityMatrix,
        }
    }

    /// Storage currently aliased by this representation
    pub fn buffer(&self) -> &BufferView {
        match self {
            Representation::Uninitialized(buffer) => buffer,
            Representation::StateVector(sv) => sv.storage(),
            Representation::DensityMatrix(dm) => dm.storage(),
        }
    }
}

impl From<StateVector> for Representation {
    fn from(state: StateVector) -> Self {
        Representation::StateVector(state)
    }
}

impl From<DensityMatrix> for Representation {
    fn from(state: DensityMatrix) -> Self {
        Representation::DensityMatrix(state)
    }
}

/// A quantum state backed by aliased storage, as a vector or a density matrix
#[derive(Clone, Debug)]
pub struct QuantumState {
    hilbert_space_dims: Option<Vec<usize>>,
    representation: Representation,
    context: Arc<NumericContext>,
}

impl QuantumState {
    /// Wrap an already attached representation; dimensions are read off it.
    pub fn from_backing(backing: impl Into<Representation>) -> Self {
        let representation = backing.into();
        let (hilbert_space_dims, context) = match &representation {
            Representation::Uninitialized(_) => (None, NumericContext::global()),
            Representation::StateVector(sv) => {
                (Some(sv.hilbert_space_dims().to_vec()), sv.context().clone())
            }
            Representation::DensityMatrix(dm) => {
                (Some(dm.hilbert_space_dims().to_vec()), dm.context().clone())
            }
        };

        QuantumState {
            hilbert_space_dims,
            representation,
            context,
        }
    }

    /// Wrap a raw buffer against the process-wide context.
    pub fn from_raw_buffer(buffer: impl Into<BufferView>) -> Self {
        Self::from_raw_buffer_in(&NumericContext::global(), buffer)
    }

    /// Wrap a raw buffer against an injected context.
    pub fn from_raw_buffer_in(context: &Arc<NumericContext>, buffer: impl Into<BufferView>) -> Self {
        QuantumState {
            hilbert_space_dims: None,
            representation: Representation::Uninitialized(buffer.into()),
            context: context.clone(),
        }
    }

    /// Bind `dims` to the raw buffer.
    ///
    /// Candidate shapes are tried in [`SHAPE_TRIAL_ORDER`]. On failure the
    /// state is left untouched.
    pub fn initialize(&mut self, dims: &[usize]) -> StateResult<()> {
        let buffer = match &self.representation {
            Representation::Uninitialized(buffer) => buffer.clone(),
            _ => {
                return Err(StateError::AlreadyInitialized {
                    dims: self.hilbert_space_dims.clone().unwrap_or_default(),
                })
            }
        };

        let representation = self.reinterpret(dims, buffer)?;
        debug!(
            ?dims,
            kind = %representation.kind(),
            context = self.context.id(),
            "initialized quantum state"
        );

        self.hilbert_space_dims = Some(dims.to_vec());
        self.representation = representation;
        Ok(())
    }

    fn reinterpret(&self, dims: &[usize], buffer: BufferView) -> StateResult<Representation> {
        hilbert_dimension(dims)?;
        let len = buffer.len();

        for kind in SHAPE_TRIAL_ORDER {
            let fits = match kind {
                StateKind::DensityMatrix => DensityMatrix::storage_size(dims).map_or(false, |n| n == len),
                StateKind::StateVector => StateVector::storage_size(dims).map_or(false, |n| n == len),
                StateKind::Uninitialized => false,
            };
            trace!(%kind, len, fits, "trying shape");

            if fits {
                return match kind {
                    StateKind::DensityMatrix => {
                        Ok(DensityMatrix::with_storage(&self.context, dims, buffer)?.into())
                    }
                    _ => Ok(StateVector::with_storage(&self.context, dims, buffer)?.into()),
                };
            }
        }

        let mut density_matrix_shape = dims.to_vec();
        density_matrix_shape.extend_from_slice(dims);
        Err(StateError::Shape {
            len,
            state_vector_shape: dims.to_vec(),
            density_matrix_shape,
        })
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(self.representation, Representation::Uninitialized(_))
    }

    pub fn is_density_matrix(&self) -> bool {
        matches!(self.representation, Representation::DensityMatrix(_))
    }

    pub fn kind(&self) -> StateKind {
        self.representation.kind()
    }

    pub fn hilbert_space_dims(&self) -> Option<&[usize]> {
        self.hilbert_space_dims.as_deref()
    }

    pub fn representation(&self) -> &Representation {
        &self.representation
    }

    pub fn context(&self) -> &Arc<NumericContext> {
        &self.context
    }

    pub fn as_state_vector(&self) -> Option<&StateVector> {
        match &self.representation {
            Representation::StateVector(sv) => Some(sv),
            _ => None,
        }
    }

    pub fn as_density_matrix(&self) -> Option<&DensityMatrix> {
        match &self.representation {
            Representation::DensityMatrix(dm) => Some(dm),
            _ => None,
        }
    }

    /// The buffer currently aliased, attached or not
    pub fn raw_buffer(&self) -> &BufferView {
        self.representation.buffer()
    }

    /// Build a new density-matrix state ρ = |ψ⟩⟨ψ| from this state vector.
    pub fn to_density_matrix(&self) -> StateResult<QuantumState> {
        match &self.representation {
            Representation::StateVector(sv) => {
                let dm = DensityMatrix::from_state_vector(sv)?;
                debug!(dims = ?dm.hilbert_space_dims(), "converted state vector to density matrix");
                Ok(QuantumState::from_backing(dm))
            }
            Representation::DensityMatrix(_) => Err(StateError::InvalidConversion(StateKind::DensityMatrix)),
            Representation::Uninitialized(_) => Err(StateError::NotInitialized),
        }
    }

    /// Render the aliased elements for display
    pub fn dump(&self) -> String {
        match &self.representation {
            Representation::Uninitialized(buffer) => format!("{}", buffer.vector_view()),
            Representation::StateVector(sv) => format!("{}", sv.amplitudes()),
            Representation::DensityMatrix(dm) => format!("{}", dm.matrix()),
        }
    }
}

impl From<StateVector> for QuantumState {
    fn from(state: StateVector) -> Self {
        QuantumState::from_backing(state)
    }
}

impl From<DensityMatrix> for QuantumState {
    fn from(state: DensityMatrix) -> Self {
        QuantumState::from_backing(state)
    }
}

impl Display for QuantumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}
