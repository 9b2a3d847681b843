//! Joint types for articulated trees.
//!
//! A joint connects a parent link to a child link and allows motion along a
//! single screw axis (or none, for fixed joints). Joint state is never stored
//! here; positions, velocities and accelerations live in per-query vectors.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dense index of a joint inside a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointId(pub usize);

impl JointId {
    /// Wrap a dense joint index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position in `Robot::joints()`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for JointId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for JointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Joint({})", self.0)
    }
}

/// Kinematic type of a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointType {
    /// Rotation about a screw axis with unit angular part.
    Revolute,
    /// Translation along a screw axis with zero angular and unit linear part.
    Prismatic,
    /// Rigid attachment, no relative motion.
    Fixed,
}

impl JointType {
    /// Entries this joint contributes to `q`.
    #[must_use]
    pub const fn dof(self) -> usize {
        match self {
            Self::Fixed => 0,
            Self::Revolute | Self::Prismatic => 1,
        }
    }

    /// Check if the joint allows any relative motion.
    #[must_use]
    pub const fn is_movable(self) -> bool {
        !matches!(self, Self::Fixed)
    }
}

impl std::fmt::Display for JointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Revolute => write!(f, "revolute"),
            Self::Prismatic => write!(f, "prismatic"),
            Self::Fixed => write!(f, "fixed"),
        }
    }
}

/// How the generalized force on a joint is determined.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointEffort {
    /// The applied torque (or force) is taken from the query.
    #[default]
    Actuated,
    /// Passive joint: the transmitted generalized force is zero.
    Unactuated,
    /// Torsional spring: the applied torque is augmented by
    /// `-stiffness * (q - rest_position)`.
    Impedance {
        /// Spring stiffness (N·m/rad or N/m). Must be non-negative.
        stiffness: f64,
        /// Position at which the spring exerts no torque.
        rest_position: f64,
    },
}

impl JointEffort {
    /// Generalized force on the joint given the applied value and position.
    #[must_use]
    pub fn resolve(&self, applied: f64, position: f64) -> f64 {
        match *self {
            Self::Actuated => applied,
            Self::Unactuated => 0.0,
            Self::Impedance {
                stiffness,
                rest_position,
            } => applied - stiffness * (position - rest_position),
        }
    }

    /// Check the effort parameters for validity.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match *self {
            Self::Actuated | Self::Unactuated => true,
            Self::Impedance {
                stiffness,
                rest_position,
            } => stiffness.is_finite() && stiffness >= 0.0 && rest_position.is_finite(),
        }
    }
}

/// Travel range and effort bound of a joint.
///
/// Carried as data; the dynamics solve does not enforce them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointLimits {
    /// Lower travel bound (rad or m).
    pub lower: f64,
    /// Upper travel bound (rad or m).
    pub upper: f64,
    /// Largest torque or force magnitude the actuator can apply.
    pub max_effort: f64,
}

impl Default for JointLimits {
    fn default() -> Self {
        Self::range(f64::NEG_INFINITY, f64::INFINITY)
    }
}

impl JointLimits {
    /// Travel range with an unbounded actuator.
    #[must_use]
    pub const fn range(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            max_effort: f64::INFINITY,
        }
    }

    /// Cap the actuator effort.
    #[must_use]
    pub const fn with_max_effort(mut self, max_effort: f64) -> Self {
        self.max_effort = max_effort;
        self
    }

    /// Bounds must be ordered and the effort cap non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lower <= self.upper && self.max_effort >= 0.0
    }
}
