//! Integration tests for the fdyn crates.
//!
//! These tests drive the public API end to end:
//! - Canonical fixtures with closed-form answers
//! - Structural singularities and the error taxonomy
//! - Agreement between elimination orderings
//! - Cross-validation against recursive Newton-Euler on random trees

pub mod errors;
pub mod fixture;
pub mod kinematics;
pub mod orderings;
pub mod singularity;
