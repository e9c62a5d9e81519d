//! Rectangular phase-space sampling grids

use ndarray::{Array1, Array2};

/// `n` evenly spaced points from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    Array1::linspace(start, stop, n)
}

/// Sampling grid for a quasiprobability distribution.
///
/// Evaluated arrays are indexed `[y, x]`, i.e. shape `(len(y), len(x))`.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSpaceGrid {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
}

impl PhaseSpaceGrid {
    pub fn new(x: Array1<f64>, y: Array1<f64>) -> Self {
        PhaseSpaceGrid { x, y }
    }

    /// Square grid over `[-extent, extent]` with `n` points per axis.
    pub fn symmetric(extent: f64, n: usize) -> Self {
        let axis = linspace(-extent, extent, n);
        PhaseSpaceGrid { x: axis.clone(), y: axis }
    }

    /// Shape of arrays evaluated on this grid.
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }

    fn spacing(axis: &Array1<f64>) -> f64 {
        match axis.len() {
            0 | 1 => 0.0,
            n => (axis[n - 1] - axis[0]) / (n - 1) as f64,
        }
    }

    /// Area of one grid cell, assuming uniform spacing.
    pub fn cell_area(&self) -> f64 {
        Self::spacing(&self.x) * Self::spacing(&self.y)
    }

    /// Riemann sum of `values` times the cell area.
    pub fn integrate(&self, values: &Array2<f64>) -> f64 {
        values.sum() * self.cell_area()
    }

    /// Coordinates `(x, y)` of the largest value, or `None` for an empty array.
    pub fn argmax(&self, values: &Array2<f64>) -> Option<(f64, f64)> {
        values
            .indexed_iter()
            .filter(|(_, v)| !v.is_nan())
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|((row, col), _)| (self.x[col], self.y[row]))
    }
}
