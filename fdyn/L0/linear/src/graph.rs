//! Gaussian factor graphs.

use hashbrown::HashMap;
use nalgebra::DVector;
use tracing::debug;

use crate::eliminate::{BayesNet, eliminate_sequential};
use crate::error::LinearError;
use crate::factor::JacobianFactor;
use crate::key::Key;
use crate::ordering::Ordering;
use crate::sparse::{JacobianBuilder, SparseSystem};
use crate::values::VectorValues;

/// A collection of linear factors over vector-valued variables.
///
/// Variable widths are fixed by the first factor that mentions them; later
/// factors must agree.
#[derive(Debug, Clone, Default)]
pub struct GaussianFactorGraph {
    factors: Vec<JacobianFactor>,
    key_order: Vec<Key>,
    dims: HashMap<Key, usize>,
}

impl GaussianFactorGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with room for `capacity` factors.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            factors: Vec::with_capacity(capacity),
            key_order: Vec::with_capacity(capacity),
            dims: HashMap::with_capacity(capacity),
        }
    }

    /// Add a factor.
    ///
    /// # Errors
    ///
    /// Returns [`LinearError::DimensionMismatch`] if the factor uses a known
    /// key with a different width.
    pub fn add(&mut self, factor: JacobianFactor) -> crate::Result<()> {
        for (key, block) in factor.terms() {
            if let Some(&dim) = self.dims.get(&key) {
                if dim != block.ncols() {
                    return Err(LinearError::dimension_mismatch(
                        format!("width of {key} in factor '{}'", factor.label()),
                        dim,
                        block.ncols(),
                    ));
                }
            }
        }
        for (key, block) in factor.terms() {
            if !self.dims.contains_key(&key) {
                self.dims.insert(key, block.ncols());
                self.key_order.push(key);
            }
        }
        self.factors.push(factor);
        Ok(())
    }

    /// Number of factors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether the graph has no factors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// All factors, in insertion order.
    #[must_use]
    pub fn factors(&self) -> &[JacobianFactor] {
        &self.factors
    }

    /// Iterate over factors.
    pub fn iter(&self) -> impl Iterator<Item = &JacobianFactor> {
        self.factors.iter()
    }

    /// Variables in order of first appearance.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.key_order
    }

    /// Width of every variable.
    #[must_use]
    pub fn key_dims(&self) -> &HashMap<Key, usize> {
        &self.dims
    }

    /// Width of one variable.
    #[must_use]
    pub fn dim(&self, key: Key) -> Option<usize> {
        self.dims.get(&key).copied()
    }

    /// Total number of scalar equations.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.factors.iter().map(JacobianFactor::rows).sum()
    }

    /// Total number of scalar unknowns.
    #[must_use]
    pub fn total_dim(&self) -> usize {
        self.dims.values().sum()
    }

    /// Assemble the stacked system `A·x = b` with columns laid out in
    /// `ordering`.
    ///
    /// # Errors
    ///
    /// Returns [`LinearError::InvalidOrdering`] if `ordering` does not name
    /// every variable exactly once.
    pub fn sparse_jacobian(&self, ordering: &Ordering) -> crate::Result<SparseSystem> {
        ordering.positions(self)?;

        let mut columns = Vec::with_capacity(ordering.len());
        let mut offsets = HashMap::with_capacity(ordering.len());
        let mut offset = 0;
        for key in ordering.iter() {
            let dim = self.dims.get(&key).copied().unwrap_or(0);
            columns.push((key, offset, dim));
            offsets.insert(key, offset);
            offset += dim;
        }

        let rows = self.total_rows();
        let mut builder = JacobianBuilder::new(rows, offset);
        let mut rhs = DVector::zeros(rows);
        let mut row = 0;
        for factor in &self.factors {
            for (key, block) in factor.terms() {
                let col = offsets.get(&key).copied().unwrap_or(0);
                builder.add_block(row, col, block);
            }
            rhs.rows_mut(row, factor.rows()).copy_from(factor.rhs());
            row += factor.rows();
        }

        Ok(SparseSystem::new(builder.build(), rhs, columns))
    }

    /// Stacked residual of every factor at `values`, in factor order.
    ///
    /// # Errors
    ///
    /// Returns [`LinearError::MissingKey`] if a variable has no value.
    pub fn residual(&self, values: &VectorValues) -> crate::Result<DVector<f64>> {
        let mut residual = DVector::zeros(self.total_rows());
        let mut row = 0;
        for factor in &self.factors {
            let error = factor.error(values)?;
            residual.rows_mut(row, factor.rows()).copy_from(&error);
            row += factor.rows();
        }
        Ok(residual)
    }

    /// Eliminate every variable in `ordering`, producing a Bayes net.
    ///
    /// `rank_tolerance` is relative to the largest entry of each gathered
    /// block (or 1, whichever is larger).
    ///
    /// # Errors
    ///
    /// - [`LinearError::InvalidOrdering`] if the ordering does not match the graph
    /// - [`LinearError::StructuralSingularity`] if a variable is undetermined
    /// - [`LinearError::Inconsistent`] if leftover constraints are violated
    pub fn eliminate(&self, ordering: &Ordering, rank_tolerance: f64) -> crate::Result<BayesNet> {
        debug!(
            factors = self.factors.len(),
            variables = self.key_order.len(),
            rows = self.total_rows(),
            dim = self.total_dim(),
            "eliminating factor graph"
        );
        eliminate_sequential(self, ordering, rank_tolerance)
    }

    /// Eliminate and back-substitute.
    ///
    /// # Errors
    ///
    /// See [`GaussianFactorGraph::eliminate`].
    pub fn optimize(&self, ordering: &Ordering, rank_tolerance: f64) -> crate::Result<VectorValues> {
        self.eliminate(ordering, rank_tolerance)?.optimize()
    }
}
