//! Linear Jacobian factors.
//!
//! A [`JacobianFactor`] is a hard linear constraint `Σ_k J_k · x_k = b` over a
//! small set of variables. Every block has the same number of rows as `b`.

use nalgebra::{DMatrix, DVector};

use crate::error::LinearError;
use crate::key::Key;
use crate::values::VectorValues;

/// A linear constraint `Σ_k J_k · x_k = b`.
#[derive(Debug, Clone, PartialEq)]
pub struct JacobianFactor {
    label: String,
    keys: Vec<Key>,
    blocks: Vec<DMatrix<f64>>,
    rhs: DVector<f64>,
}

impl JacobianFactor {
    /// Create a factor from `(key, block)` terms and a right-hand side.
    ///
    /// Terms naming the same key are summed.
    ///
    /// # Errors
    ///
    /// Returns [`LinearError::DimensionMismatch`] if a block's row count differs
    /// from `rhs.len()` or two blocks for the same key have different widths.
    pub fn new(
        label: impl Into<String>,
        terms: Vec<(Key, DMatrix<f64>)>,
        rhs: DVector<f64>,
    ) -> crate::Result<Self> {
        let label = label.into();
        let rows = rhs.len();
        let mut keys: Vec<Key> = Vec::with_capacity(terms.len());
        let mut blocks: Vec<DMatrix<f64>> = Vec::with_capacity(terms.len());

        for (key, block) in terms {
            if block.nrows() != rows {
                return Err(LinearError::dimension_mismatch(
                    format!("rows of block {key} in factor '{label}'"),
                    rows,
                    block.nrows(),
                ));
            }
            if let Some(pos) = keys.iter().position(|&k| k == key) {
                if blocks[pos].ncols() != block.ncols() {
                    return Err(LinearError::dimension_mismatch(
                        format!("columns of block {key} in factor '{label}'"),
                        blocks[pos].ncols(),
                        block.ncols(),
                    ));
                }
                blocks[pos] += block;
            } else {
                keys.push(key);
                blocks.push(block);
            }
        }

        Ok(Self {
            label,
            keys,
            blocks,
            rhs,
        })
    }

    /// A constraint fixing `key` to `value` (identity block).
    #[must_use]
    pub fn prior(label: impl Into<String>, key: Key, value: DVector<f64>) -> Self {
        let n = value.len();
        Self {
            label: label.into(),
            keys: vec![key],
            blocks: vec![DMatrix::identity(n, n)],
            rhs: value,
        }
    }

    pub(crate) fn from_parts(
        label: String,
        keys: Vec<Key>,
        blocks: Vec<DMatrix<f64>>,
        rhs: DVector<f64>,
    ) -> Self {
        Self {
            label,
            keys,
            blocks,
            rhs,
        }
    }

    /// Human-readable label for diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Keys this factor touches, in term order.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Number of scalar equations.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rhs.len()
    }

    /// Right-hand side `b`.
    #[must_use]
    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    /// The block multiplying `key`, if the factor touches it.
    #[must_use]
    pub fn block(&self, key: Key) -> Option<&DMatrix<f64>> {
        self.keys
            .iter()
            .position(|&k| k == key)
            .map(|pos| &self.blocks[pos])
    }

    /// Iterate over `(key, block)` terms.
    pub fn terms(&self) -> impl Iterator<Item = (Key, &DMatrix<f64>)> {
        self.keys.iter().copied().zip(self.blocks.iter())
    }

    /// Whether the factor touches `key`.
    #[must_use]
    pub fn involves(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Residual `Σ_k J_k · x_k − b` at `values`.
    ///
    /// # Errors
    ///
    /// Returns [`LinearError::MissingKey`] if a touched key has no value, or
    /// [`LinearError::DimensionMismatch`] if a value has the wrong length.
    pub fn error(&self, values: &VectorValues) -> crate::Result<DVector<f64>> {
        let mut residual = -self.rhs.clone();
        for (key, block) in self.terms() {
            let x = values.at(key)?;
            if x.len() != block.ncols() {
                return Err(LinearError::dimension_mismatch(
                    format!("value of {key}"),
                    block.ncols(),
                    x.len(),
                ));
            }
            residual += block * x;
        }
        Ok(residual)
    }
}

impl std::fmt::Display for JacobianFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [", self.label)?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}")?;
        }
        write!(f, "] ({} rows)", self.rows())
    }
}
