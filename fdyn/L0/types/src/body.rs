//! Rigid link types: identifiers, poses, and mass properties.
//!
//! A link's static description is its mass properties plus two poses: the
//! link frame in the world at rest (`wTl`) and the center-of-mass frame in the
//! link frame (`lTcom`).

use nalgebra::{Isometry3, Matrix3, Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance used when checking symmetry and rigidity invariants.
pub const INVARIANT_TOLERANCE: f64 = 1e-9;

/// Dense index of a link inside a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkId(pub usize);

impl LinkId {
    /// Wrap a dense link index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position in `Robot::links()`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for LinkId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Link({})", self.0)
    }
}

/// Position and orientation of a frame.
///
/// # Example
///
/// ```
/// use fdyn_types::Pose;
/// use nalgebra::Point3;
///
/// // A link frame two meters out along x.
/// let w_t_l = Pose::from_position(Point3::new(2.0, 0.0, 0.0));
/// let com = w_t_l.to_isometry() * Point3::new(0.5, 0.0, 0.0);
/// assert_eq!(com, Point3::new(2.5, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Position of the frame origin.
    pub position: Point3<f64>,
    /// Orientation as a unit quaternion.
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Frame coincident with its parent.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Pure translation.
    #[must_use]
    pub fn from_position(position: Point3<f64>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Translation followed by rotation.
    #[must_use]
    pub const fn from_position_rotation(
        position: Point3<f64>,
        rotation: UnitQuaternion<f64>,
    ) -> Self {
        Self { position, rotation }
    }

    /// The pose as a rigid transform, the form kinematics works in.
    #[must_use]
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(self.position.coords.into(), self.rotation)
    }

    /// Pose of the parent frame expressed in this frame.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let r_inv = self.rotation.inverse();
        Self::from_position_rotation(Point3::from(-(r_inv * self.position.coords)), r_inv)
    }

    /// False if any coordinate is `NaN` or infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position
            .coords
            .iter()
            .chain(self.rotation.coords.iter())
            .all(|c| c.is_finite())
    }

    /// Check that the pose is a finite rigid transform (unit quaternion).
    #[must_use]
    pub fn is_rigid(&self) -> bool {
        self.is_finite() && (self.rotation.coords.norm() - 1.0).abs() < INVARIANT_TOLERANCE
    }

}

/// Mass and rotational inertia of a link.
///
/// The inertia tensor is taken about the center of mass, with axes aligned to
/// the link frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MassProperties {
    /// Total mass in kg.
    pub mass: f64,
    /// Inertia tensor about the center of mass (kg·m²).
    pub inertia: Matrix3<f64>,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self::massless()
    }
}

impl MassProperties {
    /// Mass with a full inertia tensor about the COM.
    #[must_use]
    pub const fn new(mass: f64, inertia: Matrix3<f64>) -> Self {
        Self { mass, inertia }
    }

    /// Mass properties of a massless frame (e.g. a fixed base or tool frame).
    #[must_use]
    pub fn massless() -> Self {
        Self {
            mass: 0.0,
            inertia: Matrix3::zeros(),
        }
    }

    /// Mass with principal moments along the link axes.
    #[must_use]
    pub fn from_diagonal(mass: f64, moments: Vector3<f64>) -> Self {
        Self {
            mass,
            inertia: Matrix3::from_diagonal(&moments),
        }
    }

    /// All mass concentrated at the COM.
    #[must_use]
    pub fn point_mass(mass: f64) -> Self {
        Self {
            mass,
            inertia: Matrix3::zeros(),
        }
    }

    /// Solid ball of radius `radius`, `2/5 m r²` about every axis.
    #[must_use]
    pub fn sphere(mass: f64, radius: f64) -> Self {
        Self::from_diagonal(mass, Vector3::repeat(2.0 * mass * radius * radius / 5.0))
    }

    /// Create mass properties for a slender rod of length `length` along X.
    ///
    /// - Ixx = 0
    /// - Iyy = Izz = (1/12) * m * L²
    #[must_use]
    pub fn rod_x(mass: f64, length: f64) -> Self {
        let i = mass * length * length / 12.0;
        Self::from_diagonal(mass, Vector3::new(0.0, i, i))
    }

    /// Solid cuboid with the given half extents along the link axes.
    #[must_use]
    pub fn box_shape(mass: f64, half_extents: Vector3<f64>) -> Self {
        let sq = half_extents.component_mul(&half_extents);
        let moments = Vector3::new(sq.y + sq.z, sq.x + sq.z, sq.x + sq.y) * (mass / 3.0);
        Self::from_diagonal(mass, moments)
    }

    /// Check whether the link carries no mass and no inertia.
    #[must_use]
    pub fn is_massless(&self) -> bool {
        self.mass == 0.0 && self.inertia.iter().all(|&x| x == 0.0)
    }

    /// Validate that the mass properties are physically valid.
    ///
    /// `link` names the owning link in the returned error.
    pub fn validate(&self, link: &str) -> crate::Result<()> {
        if !self.mass.is_finite() {
            return Err(crate::DynamicsError::invalid_mass(link, "mass must be finite"));
        }

        if self.mass < 0.0 {
            return Err(crate::DynamicsError::invalid_mass(
                link,
                "mass cannot be negative",
            ));
        }

        if !self.inertia.iter().all(|x| x.is_finite()) {
            return Err(crate::DynamicsError::invalid_mass(
                link,
                "inertia must be finite",
            ));
        }

        let scale = self.inertia.abs().max().max(1.0);
        if (self.inertia - self.inertia.transpose()).abs().max() > INVARIANT_TOLERANCE * scale {
            return Err(crate::DynamicsError::invalid_mass(
                link,
                "inertia tensor must be symmetric",
            ));
        }

        let eigenvalues = self.inertia.symmetric_eigenvalues();
        if eigenvalues.iter().any(|&e| e < -1e-10 * scale) {
            return Err(crate::DynamicsError::invalid_mass(
                link,
                "inertia tensor must be positive semi-definite",
            ));
        }

        Ok(())
    }
}
