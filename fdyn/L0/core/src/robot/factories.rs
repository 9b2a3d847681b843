//! Factory methods for common robots.
//!
//! These constructors produce ready-made [`Robot`] instances for canonical
//! test systems. Used by inline tests, benches, and `fdyn-conformance-tests`.

use nalgebra::{Matrix3, Point3, Vector3};

use fdyn_types::{
    DynamicsError, JointDescription, LinkDescription, MassProperties, Pose, Result,
    RobotDescription,
};

use super::Robot;

impl Robot {
    /// Single revolute joint behind a fixed mount.
    ///
    /// - `link0` at the origin (root, massless)
    /// - `link1` at `(1, 0, 0)`, massless, welded to `link0` by `joint0`
    /// - `link2` at `(2, 0, 0)`, mass 1, inertia `diag(0, 1/6, 1/6)`,
    ///   driven by revolute `joint1` about z through `(-1, 0, 0)` in its own frame
    ///
    /// The moving link's COM sits one meter from the joint axis, so its
    /// rotational inertia about the axis is `1/6 + 1`.
    ///
    /// # Errors
    ///
    /// Never fails; the signature matches the other constructors.
    pub fn simple_r() -> Result<Self> {
        Self::simple_r_with_mass(1.0)
    }

    /// [`Robot::simple_r`] with a different mass on the moving link.
    ///
    /// A mass of zero gives a structurally singular robot (the joint has
    /// nothing to accelerate).
    ///
    /// # Errors
    ///
    /// Returns a construction error for a negative or non-finite mass.
    pub fn simple_r_with_mass(mass: f64) -> Result<Self> {
        let inertia = if mass == 0.0 {
            Matrix3::zeros()
        } else {
            Matrix3::from_diagonal(&Vector3::new(0.0, 1.0 / 6.0, 1.0 / 6.0))
        };
        let description = RobotDescription::new()
            .link(LinkDescription::new(
                "link0",
                MassProperties::massless(),
                Pose::identity(),
            ))
            .link(LinkDescription::new(
                "link1",
                MassProperties::massless(),
                Pose::from_position(Point3::new(1.0, 0.0, 0.0)),
            ))
            .link(LinkDescription::new(
                "link2",
                MassProperties::new(mass, inertia),
                Pose::from_position(Point3::new(2.0, 0.0, 0.0)),
            ))
            .joint(JointDescription::fixed("joint0", "link0", "link1"))
            .joint(JointDescription::revolute(
                "joint1",
                "link1",
                "link2",
                Vector3::z(),
                Point3::new(-1.0, 0.0, 0.0),
            ));
        Self::from_description(&description)
    }

    /// Planar serial chain of `n` uniform rods hinged about z.
    ///
    /// The massless `base` sits at the origin. Link `link_i` (1-based) has its
    /// frame at its proximal end `((i - 1)·L, 0, 0)`, its COM half a length
    /// along +x, and is driven by `joint_i` about z through its frame origin.
    /// At `q = 0` the chain lies straight along +x.
    ///
    /// # Errors
    ///
    /// Returns a construction error if `n` is 0 or the length or mass is
    /// invalid.
    pub fn serial_chain(n: usize, link_length: f64, link_mass: f64) -> Result<Self> {
        if n == 0 {
            return Err(DynamicsError::construction(
                "serial chain requires at least one link",
            ));
        }
        if !link_length.is_finite() || link_length <= 0.0 {
            return Err(DynamicsError::construction(format!(
                "serial chain link length must be positive, got {link_length}"
            )));
        }

        #[allow(clippy::cast_precision_loss)]
        let offset = |i: usize| (i as f64 - 1.0) * link_length;

        let mut description = RobotDescription::new().link(LinkDescription::new(
            "base",
            MassProperties::massless(),
            Pose::identity(),
        ));
        for i in 1..=n {
            let parent = if i == 1 {
                "base".to_string()
            } else {
                format!("link_{}", i - 1)
            };
            description = description
                .link(
                    LinkDescription::new(
                        format!("link_{i}"),
                        MassProperties::rod_x(link_mass, link_length),
                        Pose::from_position(Point3::new(offset(i), 0.0, 0.0)),
                    )
                    .with_com(Pose::from_position(Point3::new(
                        0.5 * link_length,
                        0.0,
                        0.0,
                    ))),
                )
                .joint(JointDescription::revolute(
                    format!("joint_{i}"),
                    parent,
                    format!("link_{i}"),
                    Vector3::z(),
                    Point3::origin(),
                ));
        }
        Self::from_description(&description)
    }

    /// Point-mass pendulum hinged about y at the origin.
    ///
    /// The bob hangs at `(0, 0, -length)` at `q = 0`. Under gravity along -z
    /// the exact dynamics are `q̈ = -(g / length)·sin(q)`.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the length is not positive or the
    /// mass is invalid.
    pub fn point_pendulum(length: f64, mass: f64) -> Result<Self> {
        if !length.is_finite() || length <= 0.0 {
            return Err(DynamicsError::construction(format!(
                "pendulum length must be positive, got {length}"
            )));
        }
        let description = RobotDescription::new()
            .link(LinkDescription::new(
                "pivot",
                MassProperties::massless(),
                Pose::identity(),
            ))
            .link(LinkDescription::new(
                "bob",
                MassProperties::point_mass(mass),
                Pose::from_position(Point3::new(0.0, 0.0, -length)),
            ))
            .joint(JointDescription::revolute(
                "hinge",
                "pivot",
                "bob",
                Vector3::y(),
                Point3::new(0.0, 0.0, length),
            ));
        Self::from_description(&description)
    }
}
