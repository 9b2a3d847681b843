//! Error types for linear factor graphs.

use thiserror::Error;

use crate::key::Key;

/// Errors raised while assembling or solving a linear factor graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinearError {
    /// The gathered constraints do not determine a variable uniquely.
    #[error("structural singularity while eliminating {key}")]
    StructuralSingularity {
        /// The variable whose block was rank deficient.
        key: Key,
    },

    /// Constraints left over after elimination are not satisfied.
    #[error("inconsistent system: leftover residual {residual:.3e}")]
    Inconsistent {
        /// Norm of the unsatisfiable right-hand side.
        residual: f64,
    },

    /// The ordering does not match the graph's variables.
    #[error("invalid ordering: {reason}")]
    InvalidOrdering {
        /// Description of the mismatch.
        reason: String,
    },

    /// Block or vector sizes disagree.
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being sized.
        what: String,
        /// Expected size.
        expected: usize,
        /// Supplied size.
        actual: usize,
    },

    /// A value was requested for a variable that has none.
    #[error("missing value for {key}")]
    MissingKey {
        /// The requested key.
        key: Key,
    },
}

impl LinearError {
    /// Create a dimension mismatch error.
    #[must_use]
    pub fn dimension_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// Create an invalid ordering error.
    #[must_use]
    pub fn invalid_ordering(reason: impl Into<String>) -> Self {
        Self::InvalidOrdering {
            reason: reason.into(),
        }
    }

    /// The key this error refers to, if any.
    #[must_use]
    pub fn key(&self) -> Option<Key> {
        match self {
            Self::StructuralSingularity { key } | Self::MissingKey { key } => Some(*key),
            _ => None,
        }
    }
}
