//! Non-owning views over caller-supplied amplitude storage
//!
//! A [`BufferView`] aliases memory owned elsewhere. The owner is held through
//! an `Arc` keep-alive handle, so cloning a view, reshaping it or attaching it
//! to a backing representation never copies the amplitudes.

use std::fmt::{self, Debug};
use std::mem;
use std::sync::Arc;

use ndarray::{ArrayView1, ArrayView2};
use num_complex::Complex64;

use crate::error::{StateError, StateResult};

/// Keep-alive handle for whatever object owns the aliased amplitudes.
pub type KeepAlive = Arc<dyn AsRef<[Complex64]> + Send + Sync>;

/// A window of complex amplitudes inside storage owned by someone else.
///
/// Elements are laid out row-major (C order) over whichever logical shape
/// the view is later interpreted with.
#[derive(Clone)]
pub struct BufferView {
    owner: KeepAlive,
    offset: usize,
    len: usize,
}

impl BufferView {
    /// Alias the whole of `owner`.
    pub fn alias(owner: KeepAlive) -> Self {
        let len = Self::owner_slice(&owner).len();
        BufferView { owner, offset: 0, len }
    }

    /// Alias `byte_len` bytes of `owner` starting at `byte_offset`.
    ///
    /// The range must lie inside the owner and cover whole elements.
    pub fn alias_bytes(owner: KeepAlive, byte_offset: usize, byte_len: usize) -> StateResult<Self> {
        let element_size = mem::size_of::<Complex64>();
        let available = Self::owner_slice(&owner).len() * element_size;

        let in_bounds = byte_offset
            .checked_add(byte_len)
            .map_or(false, |end| end <= available);
        if !in_bounds || byte_offset % element_size != 0 || byte_len % element_size != 0 {
            return Err(StateError::BufferRange { byte_offset, byte_len, available });
        }

        Ok(BufferView {
            owner,
            offset: byte_offset / element_size,
            len: byte_len / element_size,
        })
    }

    /// Take ownership of `data` and view all of it. The vector is moved, not copied.
    pub fn from_vec(data: Vec<Complex64>) -> Self {
        Self::alias(Arc::new(data))
    }

    fn owner_slice(owner: &KeepAlive) -> &[Complex64] {
        AsRef::<[Complex64]>::as_ref(&**owner)
    }

    /// The aliased amplitudes.
    pub fn as_slice(&self) -> &[Complex64] {
        &Self::owner_slice(&self.owner)[self.offset..self.offset + self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        mem::size_of::<Complex64>()
    }

    pub fn byte_len(&self) -> usize {
        self.len * self.element_size()
    }

    /// Raw pointer to the first aliased element.
    pub fn as_ptr(&self) -> *const Complex64 {
        self.as_slice().as_ptr()
    }

    /// True when both views keep the same owner alive.
    pub fn shares_storage_with(&self, other: &BufferView) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.owner) as *const u8,
            Arc::as_ptr(&other.owner) as *const u8,
        )
    }

    /// Copy the aliased amplitudes out.
    pub fn to_vec(&self) -> Vec<Complex64> {
        self.as_slice().to_vec()
    }

    /// Interpret the view as a flat vector.
    pub fn vector_view(&self) -> ArrayView1<'_, Complex64> {
        ArrayView1::from(self.as_slice())
    }

    /// Interpret the view as a square `dim x dim` matrix.
    pub fn matrix_view(&self, dim: usize) -> StateResult<ArrayView2<'_, Complex64>> {
        let expected = dim.checked_mul(dim).ok_or_else(|| StateError::InvalidDimensions(vec![dim]))?;
        ArrayView2::from_shape((dim, dim), self.as_slice()).map_err(|_| StateError::StorageSize {
            expected,
            actual: self.len,
        })
    }
}

impl Debug for BufferView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferView")
            .field("ptr", &self.as_ptr())
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

impl From<Vec<Complex64>> for BufferView {
    fn from(data: Vec<Complex64>) -> Self {
        BufferView::from_vec(data)
    }
}
