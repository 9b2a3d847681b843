//! Forward dynamics of articulated rigid-body trees as a factor graph.
//!
//! Instead of running a hand-ordered recursive algorithm, this crate writes the
//! Newton-Euler equations of every link as linear constraints over per-query
//! unknowns and lets [`fdyn_linear`] solve them jointly by sequential
//! elimination:
//!
//! ```text
//!   RobotDescription ──► Robot (validated tree, COM frames, screw axes)
//!                          │
//!   ForwardDynamicsQuery ──┤  kinematics: pTc(q), wTcom, link twists
//!                          ▼
//!                  GaussianFactorGraph   A_i  F_j  a_j  W_leaf
//!                          │  ordering (tip-to-root by default)
//!                          ▼
//!                  BayesNet ──► VectorValues ──► ForwardDynamicsSolution
//! ```
//!
//! # Layer 0
//!
//! Headless and synchronous. A [`Robot`] is immutable after construction and
//! can be shared by reference across threads; every query allocates its own
//! graph and values.
//!
//! # Quick Start
//!
//! ```
//! use fdyn_core::{ForwardDynamicsQuery, Robot, forward_dynamics};
//! use fdyn_types::DynamicsConfig;
//! use nalgebra::DVector;
//!
//! let robot = Robot::serial_chain(3, 1.0, 1.0)?;
//! let query = ForwardDynamicsQuery::at_rest(&robot);
//! let solution = forward_dynamics(&robot, &query, &DynamicsConfig::earth())?;
//! assert_eq!(solution.joint_accelerations().len(), 3);
//! # Ok::<(), fdyn_types::DynamicsError>(())
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::many_single_char_names,    // Math notation (q, m, g, v)
    clippy::similar_names,             // w_t_l / w_t_com, c_t_p / k_t_c
    clippy::doc_markdown,              // Not all technical terms need backticks
)]

// Screw algebra on twists and wrenches
pub mod spatial;

// Validated link/joint tree
pub mod robot;

// Poses and twists at a configuration
pub mod kinematics;

// Variable keys and factor construction
pub mod factors;
pub mod keys;

// Elimination, ordering, and results
pub mod forward;
pub mod ordering;
pub mod solution;

// Recursive Newton-Euler reference
pub mod recursive;

pub use factors::{DynamicsGraph, ForwardDynamicsQuery, build_dynamics_graph};
pub use forward::{ForwardDynamics, forward_dynamics, map_linear_error};
pub use keys::{describe_key, joint_accel_key, tip_wrench_key, twist_accel_key, wrench_key};
pub use kinematics::{LinkPoses, forward_kinematics, link_twists, relative_transforms};
pub use ordering::elimination_ordering;
pub use recursive::{forward_dynamics_reference, inverse_dynamics, joint_space_mass_matrix};
pub use robot::{Joint, Link, Robot, RobotBuilder};
pub use solution::ForwardDynamicsSolution;
pub use spatial::{
    SpatialVector, ad, adjoint_map, exp_twist, generalized_mass_matrix, skew,
    spatial_cross_force, spatial_cross_motion, transform_twist, transform_wrench, unit_twist,
};

pub use fdyn_types::{DynamicsConfig, DynamicsError, Gravity, OrderingStrategy, Result};
