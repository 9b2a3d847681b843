//! Core data types for factor-graph rigid-body dynamics.
//!
//! This crate provides the vocabulary shared by the dynamics crates:
//!
//! - [`Pose`] and [`MassProperties`] - static link geometry and inertia
//! - [`JointType`], [`JointEffort`], [`JointLimits`] - joint kinds and force models
//! - [`RobotDescription`] - a plain-data robot, as a file reader would produce it
//! - [`DynamicsConfig`] - gravity, elimination ordering, rank tolerance
//! - [`DynamicsError`] - the error taxonomy for construction and queries
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They carry no kinematics and no solver. Joint
//! positions, velocities and accelerations never live on these types; they are
//! per-query vectors owned by the caller.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate: it depends only on `nalgebra`, `thiserror`, and
//! (optionally) `serde`.
//!
//! # Spatial Conventions
//!
//! - Twists are `[ω, v]` (angular first), wrenches are `[moment, force]`.
//! - `aTb` denotes the pose of frame `b` expressed in frame `a`.
//! - Right-handed frames throughout.
//!
//! # Example
//!
//! ```
//! use fdyn_types::{JointDescription, LinkDescription, MassProperties, Pose, RobotDescription};
//! use nalgebra::{Point3, Vector3};
//!
//! let desc = RobotDescription::new()
//!     .link(LinkDescription::new("base", MassProperties::massless(), Pose::identity()))
//!     .link(LinkDescription::new(
//!         "arm",
//!         MassProperties::point_mass(1.0),
//!         Pose::from_position(Point3::new(1.0, 0.0, 0.0)),
//!     ))
//!     .joint(JointDescription::revolute(
//!         "shoulder",
//!         "base",
//!         "arm",
//!         Vector3::z(),
//!         Point3::new(-1.0, 0.0, 0.0),
//!     ));
//!
//! assert_eq!(desc.joints[0].axis, [0.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Allow certain clippy lints that are overly pedantic for type definitions
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
    clippy::many_single_char_names,    // Math notation (m, i, w, v)
)]

mod body;
mod config;
mod description;
mod error;
mod joint;

pub use body::{INVARIANT_TOLERANCE, LinkId, MassProperties, Pose};
pub use config::{DEFAULT_RANK_TOLERANCE, DynamicsConfig, Gravity, OrderingStrategy};
pub use description::{JointDescription, LinkDescription, RobotDescription};
pub use error::DynamicsError;
pub use joint::{JointEffort, JointId, JointLimits, JointType};

/// Result type for dynamics operations.
pub type Result<T> = std::result::Result<T, DynamicsError>;
