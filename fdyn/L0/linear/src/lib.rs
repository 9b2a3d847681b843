//! Linear factor graphs solved by sequential elimination.
//!
//! A [`GaussianFactorGraph`] holds hard linear constraints ([`JacobianFactor`])
//! over vector-valued variables identified by [`Key`]s. Solving takes an
//! [`Ordering`]:
//!
//! 1. **Eliminate** each variable in turn with a dense Householder QR of the
//!    factors that touch it, producing a [`GaussianConditional`] and a new
//!    factor on the variable's separator.
//! 2. **Back-substitute** the resulting [`BayesNet`] in reverse order into a
//!    [`VectorValues`] map.
//!
//! The cost is governed by the separators the ordering produces. For a tree
//! structured problem eliminated leaves-first every separator is bounded and
//! the whole solve is linear in the number of variables.
//!
//! # Example
//!
//! ```
//! use fdyn_linear::{GaussianFactorGraph, JacobianFactor, Key, Ordering};
//! use nalgebra::{DMatrix, DVector};
//!
//! let x = Key::new('x', 0);
//! let y = Key::new('x', 1);
//!
//! let mut graph = GaussianFactorGraph::new();
//! graph.add(JacobianFactor::prior("x", x, DVector::from_element(1, 2.0)))?;
//! graph.add(JacobianFactor::new(
//!     "y - x",
//!     vec![(y, DMatrix::from_element(1, 1, 1.0)), (x, DMatrix::from_element(1, 1, -1.0))],
//!     DVector::from_element(1, 1.0),
//! )?)?;
//!
//! let values = graph.optimize(&Ordering::natural(&graph), 1e-9)?;
//! assert!((values.at(y)?[0] - 3.0).abs() < 1e-12);
//! # Ok::<(), fdyn_linear::LinearError>(())
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::many_single_char_names, // R, S, d follow the usual notation
    clippy::similar_names,
)]

mod eliminate;
mod error;
mod factor;
mod graph;
mod key;
mod ordering;
mod sparse;
mod values;

pub use eliminate::{BayesNet, GaussianConditional};
pub use error::LinearError;
pub use factor::JacobianFactor;
pub use graph::GaussianFactorGraph;
pub use key::{Key, Symbol};
pub use ordering::Ordering;
pub use sparse::{JacobianBuilder, SparseJacobian, SparseSystem};
pub use values::VectorValues;

/// Result type for linear factor graph operations.
pub type Result<T> = std::result::Result<T, LinearError>;
