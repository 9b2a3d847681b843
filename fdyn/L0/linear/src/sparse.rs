//! Sparse assembly of a factor graph into a stacked linear system.
//!
//! The elimination in this crate never forms the global matrix. The stacked
//! system is for inspection: checking residuals, counting non-zeros, exporting
//! to another solver.
//!
//! # Sparsity Pattern
//!
//! For a tree of N links the dynamics graph has O(N) factors and each factor
//! touches a bounded number of variables, so the Jacobian has O(N) non-zeros
//! in an O(N) × O(N) matrix.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::LinearError;
use crate::key::Key;
use crate::values::VectorValues;

/// Entries with magnitude at or below this are not stored.
const DROP_TOLERANCE: f64 = 1e-15;

/// Sparse Jacobian in CSR format for efficient row operations.
#[derive(Debug, Clone)]
pub struct SparseJacobian {
    matrix: CsrMatrix<f64>,
    num_rows: usize,
    num_cols: usize,
}

impl SparseJacobian {
    /// Build a sparse Jacobian from `(row, col, value)` triplets.
    ///
    /// Duplicate entries are summed.
    #[must_use]
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        triplets: &[(usize, usize, f64)],
    ) -> Self {
        let mut coo = CooMatrix::new(num_rows, num_cols);
        for &(row, col, val) in triplets {
            if val.abs() > DROP_TOLERANCE {
                coo.push(row, col, val);
            }
        }

        Self {
            matrix: CsrMatrix::from(&coo),
            num_rows,
            num_cols,
        }
    }

    /// Get the number of rows.
    #[must_use]
    pub const fn nrows(&self) -> usize {
        self.num_rows
    }

    /// Get the number of columns.
    #[must_use]
    pub const fn ncols(&self) -> usize {
        self.num_cols
    }

    /// Get the number of non-zero entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// Compute J * v.
    #[must_use]
    pub fn mul_vec(&self, v: &DVector<f64>) -> DVector<f64> {
        let mut result = DVector::zeros(self.num_rows);
        for (row_idx, row) in self.matrix.row_iter().enumerate() {
            result[row_idx] = row
                .col_indices()
                .iter()
                .zip(row.values())
                .map(|(&col, &val)| val * v[col])
                .sum();
        }
        result
    }

    /// Convert to a dense matrix.
    #[must_use]
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.num_rows, self.num_cols);
        for (row_idx, row) in self.matrix.row_iter().enumerate() {
            for (&col, &val) in row.col_indices().iter().zip(row.values()) {
                dense[(row_idx, col)] = val;
            }
        }
        dense
    }
}

/// Triplet accumulator for [`SparseJacobian`].
#[derive(Debug, Clone)]
pub struct JacobianBuilder {
    triplets: Vec<(usize, usize, f64)>,
    num_rows: usize,
    num_cols: usize,
}

impl JacobianBuilder {
    /// Create a builder for a `num_rows × num_cols` matrix.
    #[must_use]
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        // A dynamics factor row touches at most a few 6-wide blocks.
        Self {
            triplets: Vec::with_capacity(num_rows * 18),
            num_rows,
            num_cols,
        }
    }

    /// Add a single entry.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.num_rows);
        debug_assert!(col < self.num_cols);
        if value.abs() > DROP_TOLERANCE {
            self.triplets.push((row, col, value));
        }
    }

    /// Add a dense block with its top-left corner at `(row, col)`.
    pub fn add_block(&mut self, row: usize, col: usize, block: &DMatrix<f64>) {
        for j in 0..block.ncols() {
            for i in 0..block.nrows() {
                self.add(row + i, col + j, block[(i, j)]);
            }
        }
    }

    /// Build the sparse Jacobian.
    #[must_use]
    pub fn build(self) -> SparseJacobian {
        SparseJacobian::from_triplets(self.num_rows, self.num_cols, &self.triplets)
    }
}

/// A factor graph flattened into `A·x = b`.
#[derive(Debug, Clone)]
pub struct SparseSystem {
    jacobian: SparseJacobian,
    rhs: DVector<f64>,
    columns: Vec<(Key, usize, usize)>,
}

impl SparseSystem {
    pub(crate) fn new(
        jacobian: SparseJacobian,
        rhs: DVector<f64>,
        columns: Vec<(Key, usize, usize)>,
    ) -> Self {
        Self {
            jacobian,
            rhs,
            columns,
        }
    }

    /// The stacked Jacobian `A`.
    #[must_use]
    pub fn jacobian(&self) -> &SparseJacobian {
        &self.jacobian
    }

    /// The stacked right-hand side `b`.
    #[must_use]
    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    /// `(key, column offset, width)` for every variable, in column order.
    #[must_use]
    pub fn columns(&self) -> &[(Key, usize, usize)] {
        &self.columns
    }

    /// First column of `key`.
    #[must_use]
    pub fn column_offset(&self, key: Key) -> Option<usize> {
        self.columns
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|&(_, offset, _)| offset)
    }

    /// Stack `values` into a single vector in column order.
    ///
    /// # Errors
    ///
    /// Returns [`LinearError::MissingKey`] or [`LinearError::DimensionMismatch`]
    /// if `values` does not cover the system's variables.
    pub fn flatten(&self, values: &VectorValues) -> crate::Result<DVector<f64>> {
        let mut x = DVector::zeros(self.jacobian.ncols());
        for &(key, offset, dim) in &self.columns {
            let value = values.at(key)?;
            if value.len() != dim {
                return Err(LinearError::dimension_mismatch(
                    format!("value of {key}"),
                    dim,
                    value.len(),
                ));
            }
            x.rows_mut(offset, dim).copy_from(value);
        }
        Ok(x)
    }

    /// Residual `A·x − b`.
    #[must_use]
    pub fn residual(&self, x: &DVector<f64>) -> DVector<f64> {
        self.jacobian.mul_vec(x) - &self.rhs
    }
}
