//! Error types for dynamics model construction and queries.

use thiserror::Error;

/// Errors that can occur while building a robot or running a dynamics query.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DynamicsError {
    /// Malformed topology or inconsistent description at build time.
    #[error("robot construction failed: {reason}")]
    Construction {
        /// Description of what is wrong.
        reason: String,
    },

    /// Invalid mass or inertia on a link.
    #[error("invalid mass properties on link '{link}': {reason}")]
    InvalidMassProperties {
        /// Name of the offending link.
        link: String,
        /// Description of what is wrong.
        reason: String,
    },

    /// A pose that is not a finite rigid transform.
    #[error("invalid pose for {what}: {reason}")]
    InvalidPose {
        /// Which pose (e.g. "link 'base' wTl").
        what: String,
        /// Description of what is wrong.
        reason: String,
    },

    /// A screw axis that violates the invariant of its joint type.
    #[error("invalid screw axis on joint '{joint}': {reason}")]
    InvalidScrewAxis {
        /// Name of the offending joint.
        joint: String,
        /// Description of what is wrong.
        reason: String,
    },

    /// Query input length disagrees with the robot.
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which input (e.g. "joint positions").
        what: String,
        /// Expected length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// The assembled linear system has no unique solution.
    #[error("structurally singular system at {variable} ({context})")]
    StructuralSingularity {
        /// The variable whose elimination failed.
        variable: String,
        /// The link or joint the variable belongs to.
        context: String,
    },

    /// Constraints contradict each other.
    #[error("inconsistent constraints: {reason}")]
    InconsistentSystem {
        /// Description of the inconsistency.
        reason: String,
    },

    /// A variable was requested that the solved system never contained.
    #[error("unknown variable: {key}")]
    UnknownKey {
        /// The requested key.
        key: String,
    },

    /// Query input that is well-sized but meaningless for this robot.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Description of the problem.
        reason: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },
}

impl DynamicsError {
    /// Create a construction error.
    #[must_use]
    pub fn construction(reason: impl Into<String>) -> Self {
        Self::Construction {
            reason: reason.into(),
        }
    }

    /// Create an invalid mass properties error.
    #[must_use]
    pub fn invalid_mass(link: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMassProperties {
            link: link.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error.
    #[must_use]
    pub fn dimension_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this error was raised while constructing a robot.
    #[must_use]
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::Construction { .. }
                | Self::InvalidMassProperties { .. }
                | Self::InvalidPose { .. }
                | Self::InvalidScrewAxis { .. }
        )
    }

    /// Check if this is a structural singularity.
    #[must_use]
    pub fn is_singular(&self) -> bool {
        matches!(self, Self::StructuralSingularity { .. })
    }

    /// Check if this is a dimension mismatch.
    #[must_use]
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}
