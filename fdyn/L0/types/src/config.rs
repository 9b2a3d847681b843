//! Configuration for forward-dynamics queries.
//!
//! This module provides the settings that control a solve: the gravity field,
//! the elimination ordering strategy, and the rank tolerance used to detect
//! structurally singular systems.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Uniform gravity field, expressed in the world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gravity {
    /// Acceleration due to gravity (m/s²).
    pub acceleration: Vector3<f64>,
}

impl Default for Gravity {
    fn default() -> Self {
        Self::zero()
    }
}

impl Gravity {
    /// Standard Earth gravity (9.81 m/s² in -Z direction).
    #[must_use]
    pub fn earth() -> Self {
        Self {
            acceleration: Vector3::new(0.0, 0.0, -9.81),
        }
    }

    /// Zero gravity.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            acceleration: Vector3::zeros(),
        }
    }

    /// Custom gravity vector.
    #[must_use]
    pub fn custom(acceleration: Vector3<f64>) -> Self {
        Self { acceleration }
    }

    /// Check whether the field vanishes.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.acceleration.iter().all(|&x| x == 0.0)
    }

    /// Gravitational force on a mass, in the world frame.
    #[must_use]
    pub fn force_on(&self, mass: f64) -> Vector3<f64> {
        self.acceleration * mass
    }
}

/// Order in which the solver eliminates unknowns.
///
/// Every strategy produces the same solution for a well-posed tree; they differ
/// in fill-in and therefore cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderingStrategy {
    /// Leaves first: each link's tip wrench, twist acceleration, joint wrench
    /// and joint acceleration, walking toward the root. Linear in link count.
    #[default]
    TipToRoot,
    /// Twist and joint accelerations root-to-tip, then wrenches tip-to-root.
    ///
    /// This is the textbook order (accelerations outward, forces inward). It
    /// is kept for comparison with the default and solves the same system.
    RootToTip,
    /// The order in which unknowns first appear in the factor graph.
    Natural,
}

impl std::fmt::Display for OrderingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TipToRoot => write!(f, "tip-to-root"),
            Self::RootToTip => write!(f, "root-to-tip"),
            Self::Natural => write!(f, "natural"),
        }
    }
}

/// Default relative tolerance for rank decisions during elimination.
pub const DEFAULT_RANK_TOLERANCE: f64 = 1e-9;

/// Settings for a forward-dynamics solve.
///
/// # Example
///
/// ```
/// use fdyn_types::{DynamicsConfig, OrderingStrategy};
///
/// let config = DynamicsConfig::earth().ordering(OrderingStrategy::Natural);
/// assert!(config.validate().is_ok());
/// assert!(!config.gravity.is_zero());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DynamicsConfig {
    /// Gravity field applied to every link's center of mass.
    pub gravity: Gravity,
    /// Elimination ordering strategy.
    pub ordering: OrderingStrategy,
    /// Pivot threshold, relative to the largest coefficient being eliminated,
    /// below which a variable is considered undetermined.
    pub rank_tolerance: f64,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            gravity: Gravity::zero(),
            ordering: OrderingStrategy::default(),
            rank_tolerance: DEFAULT_RANK_TOLERANCE,
        }
    }
}

impl DynamicsConfig {
    /// Configuration with standard Earth gravity.
    #[must_use]
    pub fn earth() -> Self {
        Self {
            gravity: Gravity::earth(),
            ..Default::default()
        }
    }

    /// Configuration without gravity.
    #[must_use]
    pub fn zero_gravity() -> Self {
        Self::default()
    }

    /// Set the gravity.
    #[must_use]
    pub fn gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the elimination ordering strategy.
    #[must_use]
    pub fn ordering(mut self, ordering: OrderingStrategy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Set the rank tolerance.
    #[must_use]
    pub fn rank_tolerance(mut self, tolerance: f64) -> Self {
        self.rank_tolerance = tolerance;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.gravity.acceleration.iter().all(|x| x.is_finite()) {
            return Err(crate::DynamicsError::invalid_config(
                "gravity must be finite",
            ));
        }

        if !self.rank_tolerance.is_finite() || self.rank_tolerance <= 0.0 {
            return Err(crate::DynamicsError::invalid_config(format!(
                "rank tolerance must be positive and finite, got {}",
                self.rank_tolerance
            )));
        }

        Ok(())
    }
}
