//! Sequential variable elimination and back-substitution.
//!
//! Eliminating a variable `x` gathers every factor that touches it, stacks
//! them into `[J_x | J_sep | b]`, and reduces the stack with a Householder QR.
//! The first `dim(x)` rows of `R` form a conditional `R·x + Σ S·sep = d`; the
//! remaining rows form a new factor on the separator, which goes back into the
//! pool. Back-substitution then visits the conditionals in reverse.

use hashbrown::HashMap;
use nalgebra::{DMatrix, DVector};
use tracing::{trace, warn};

use crate::error::LinearError;
use crate::factor::JacobianFactor;
use crate::graph::GaussianFactorGraph;
use crate::key::Key;
use crate::ordering::Ordering;
use crate::values::VectorValues;

/// A solved-for variable in terms of later-eliminated ones:
/// `R·x + Σ_i S_i·parent_i = d`, with `R` upper triangular.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianConditional {
    frontal: Key,
    r: DMatrix<f64>,
    parents: Vec<Key>,
    s: Vec<DMatrix<f64>>,
    d: DVector<f64>,
}

impl GaussianConditional {
    /// The variable this conditional determines.
    #[must_use]
    pub fn frontal(&self) -> Key {
        self.frontal
    }

    /// The upper-triangular block on the frontal variable.
    #[must_use]
    pub fn r(&self) -> &DMatrix<f64> {
        &self.r
    }

    /// Variables the frontal variable depends on.
    #[must_use]
    pub fn parents(&self) -> &[Key] {
        &self.parents
    }

    /// Block multiplying `parent`, if it is one.
    #[must_use]
    pub fn s(&self, parent: Key) -> Option<&DMatrix<f64>> {
        self.parents
            .iter()
            .position(|&k| k == parent)
            .map(|i| &self.s[i])
    }

    /// Right-hand side.
    #[must_use]
    pub fn d(&self) -> &DVector<f64> {
        &self.d
    }

    /// Solve for the frontal variable given values of all parents.
    ///
    /// # Errors
    ///
    /// Returns [`LinearError::MissingKey`] if a parent has no value, or
    /// [`LinearError::StructuralSingularity`] if `R` cannot be inverted.
    pub fn solve(&self, parents: &VectorValues) -> crate::Result<DVector<f64>> {
        let mut rhs = self.d.clone();
        for (parent, s) in self.parents.iter().zip(&self.s) {
            rhs -= s * parents.at(*parent)?;
        }
        self.r
            .solve_upper_triangular(&rhs)
            .ok_or(LinearError::StructuralSingularity { key: self.frontal })
    }
}

/// The conditionals produced by eliminating a graph, in elimination order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BayesNet {
    conditionals: Vec<GaussianConditional>,
}

impl BayesNet {
    /// Number of conditionals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditionals.len()
    }

    /// Whether the net is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditionals.is_empty()
    }

    /// Conditionals in elimination order.
    #[must_use]
    pub fn conditionals(&self) -> &[GaussianConditional] {
        &self.conditionals
    }

    /// The conditional on `key`.
    #[must_use]
    pub fn conditional(&self, key: Key) -> Option<&GaussianConditional> {
        self.conditionals.iter().find(|c| c.frontal == key)
    }

    /// Largest separator (number of parents) over all conditionals.
    ///
    /// Stays bounded under a good ordering; grows with problem size under a
    /// poor one.
    #[must_use]
    pub fn max_parents(&self) -> usize {
        self.conditionals
            .iter()
            .map(|c| c.parents.len())
            .max()
            .unwrap_or(0)
    }

    /// Back-substitute in reverse elimination order.
    ///
    /// # Errors
    ///
    /// See [`GaussianConditional::solve`].
    pub fn optimize(&self) -> crate::Result<VectorValues> {
        let mut values = VectorValues::new();
        for conditional in self.conditionals.iter().rev() {
            let x = conditional.solve(&values)?;
            values.insert(conditional.frontal, x);
        }
        Ok(values)
    }
}

pub(crate) fn eliminate_sequential(
    graph: &GaussianFactorGraph,
    ordering: &Ordering,
    rank_tolerance: f64,
) -> crate::Result<BayesNet> {
    let positions = ordering.positions(graph)?;

    let mut pool: Vec<Option<JacobianFactor>> = Vec::with_capacity(2 * graph.len());
    let mut touching: HashMap<Key, Vec<usize>> = HashMap::with_capacity(ordering.len());
    for factor in graph.iter() {
        if factor.keys().is_empty() {
            check_leftover(factor.rhs().norm(), factor.rhs().amax().max(1.0), rank_tolerance)?;
            continue;
        }
        let slot = pool.len();
        for &key in factor.keys() {
            touching.entry(key).or_default().push(slot);
        }
        pool.push(Some(factor.clone()));
    }

    let mut conditionals = Vec::with_capacity(ordering.len());
    for key in ordering.iter() {
        let gathered: Vec<JacobianFactor> = touching
            .remove(&key)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|slot| pool[slot].take())
            .collect();
        let dim = graph.dim(key).unwrap_or(0);

        let (conditional, remainder) =
            eliminate_one(key, dim, &gathered, &positions, rank_tolerance)?;
        conditionals.push(conditional);

        if let Some(remainder) = remainder {
            let slot = pool.len();
            for &sep in remainder.keys() {
                touching.entry(sep).or_default().push(slot);
            }
            pool.push(Some(remainder));
        }
    }

    Ok(BayesNet { conditionals })
}

fn check_leftover(residual: f64, scale: f64, rank_tolerance: f64) -> crate::Result<()> {
    if residual > rank_tolerance * scale {
        warn!(residual, "leftover constraints are not satisfiable");
        return Err(LinearError::Inconsistent { residual });
    }
    Ok(())
}

fn eliminate_one(
    key: Key,
    dim: usize,
    gathered: &[JacobianFactor],
    positions: &HashMap<Key, usize>,
    rank_tolerance: f64,
) -> crate::Result<(GaussianConditional, Option<JacobianFactor>)> {
    // Separator in elimination order, with widths.
    let mut separator: Vec<(Key, usize)> = Vec::new();
    for factor in gathered {
        for (k, block) in factor.terms() {
            if k != key && !separator.iter().any(|(s, _)| *s == k) {
                separator.push((k, block.ncols()));
            }
        }
    }
    separator.sort_by_key(|(k, _)| positions.get(k).copied().unwrap_or(usize::MAX));

    let mut col_offsets: HashMap<Key, usize> = HashMap::with_capacity(separator.len() + 1);
    col_offsets.insert(key, 0);
    let mut cols = dim;
    for &(k, width) in &separator {
        col_offsets.insert(k, cols);
        cols += width;
    }
    let rhs_col = cols;
    let rows: usize = gathered.iter().map(JacobianFactor::rows).sum();

    trace!(
        key = %key,
        factors = gathered.len(),
        rows,
        separator = separator.len(),
        "eliminating variable"
    );

    if rows < dim {
        warn!(key = %key, rows, dim, "too few constraints to determine variable");
        return Err(LinearError::StructuralSingularity { key });
    }

    let mut stacked = DMatrix::zeros(rows, cols + 1);
    let mut row = 0;
    for factor in gathered {
        let n = factor.rows();
        for (k, block) in factor.terms() {
            let col = col_offsets.get(&k).copied().unwrap_or(0);
            stacked
                .view_mut((row, col), (n, block.ncols()))
                .copy_from(block);
        }
        stacked.view_mut((row, rhs_col), (n, 1)).copy_from(factor.rhs());
        row += n;
    }

    // Pivots are judged against the coefficients alone; the right-hand side
    // only scales the leftover-consistency check.
    let pivot_scale = stacked.columns(0, cols).amax().max(1.0);
    let scale = stacked.amax().max(1.0);
    let r = stacked.qr().r();

    for i in 0..dim {
        if r[(i, i)].abs() <= rank_tolerance * pivot_scale {
            warn!(key = %key, pivot = r[(i, i)], "rank-deficient block during elimination");
            return Err(LinearError::StructuralSingularity { key });
        }
    }

    let conditional = GaussianConditional {
        frontal: key,
        r: r.view((0, 0), (dim, dim)).into_owned(),
        parents: separator.iter().map(|(k, _)| *k).collect(),
        s: separator
            .iter()
            .map(|(k, width)| {
                let col = col_offsets.get(k).copied().unwrap_or(0);
                r.view((0, col), (dim, *width)).into_owned()
            })
            .collect(),
        d: r.view((0, rhs_col), (dim, 1)).column(0).into_owned(),
    };

    let remaining = r.nrows() - dim;
    if remaining == 0 {
        return Ok((conditional, None));
    }

    let rhs = r.view((dim, rhs_col), (remaining, 1)).column(0).into_owned();
    if separator.is_empty() {
        check_leftover(rhs.norm(), scale, rank_tolerance)?;
        return Ok((conditional, None));
    }

    let blocks = separator
        .iter()
        .map(|(k, width)| {
            let col = col_offsets.get(k).copied().unwrap_or(0);
            r.view((dim, col), (remaining, *width)).into_owned()
        })
        .collect();
    let remainder = JacobianFactor::from_parts(
        format!("eliminated {key}"),
        separator.iter().map(|(k, _)| *k).collect(),
        blocks,
        rhs,
    );

    Ok((conditional, Some(remainder)))
}
