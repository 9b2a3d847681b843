//! Plain-data robot descriptions.
//!
//! A [`RobotDescription`] is what a file reader (URDF, SDF, a hand-written
//! table) produces. It names links and joints by string and carries no derived
//! quantities; validation happens when the description is turned into a robot.

use nalgebra::{Matrix3, Point3, Vector3, Vector6};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::body::{MassProperties, Pose};
use crate::joint::{JointEffort, JointLimits, JointType};

/// Static description of one link.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkDescription {
    /// Unique link name.
    pub name: String,
    /// Link mass in kg.
    pub mass: f64,
    /// Inertia about the center of mass, in link-frame axes (row-major).
    pub inertia: [[f64; 3]; 3],
    /// Link frame in the world at the rest configuration (`wTl`).
    pub pose: Pose,
    /// Center-of-mass frame in the link frame (`lTcom`).
    pub com: Pose,
}

impl LinkDescription {
    /// Describe a link with its COM at the link frame origin.
    #[must_use]
    pub fn new(name: impl Into<String>, mass: MassProperties, pose: Pose) -> Self {
        let m = mass.inertia;
        Self {
            name: name.into(),
            mass: mass.mass,
            inertia: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
            pose,
            com: Pose::identity(),
        }
    }

    /// Set the center-of-mass frame relative to the link frame.
    #[must_use]
    pub fn with_com(mut self, com: Pose) -> Self {
        self.com = com;
        self
    }

    /// Mass properties as a typed value.
    #[must_use]
    pub fn mass_properties(&self) -> MassProperties {
        let i = &self.inertia;
        MassProperties::new(
            self.mass,
            Matrix3::new(
                i[0][0], i[0][1], i[0][2], i[1][0], i[1][1], i[1][2], i[2][0], i[2][1], i[2][2],
            ),
        )
    }
}

/// Static description of one joint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointDescription {
    /// Unique joint name.
    pub name: String,
    /// Kinematic type.
    pub joint_type: JointType,
    /// How the joint's generalized force is determined.
    pub effort: JointEffort,
    /// Name of the parent link.
    pub parent: String,
    /// Name of the child link.
    pub child: String,
    /// Screw axis `[ω, v]` in the child link frame. Zero for fixed joints.
    pub axis: [f64; 6],
    /// Optional limits, carried as data.
    pub limits: Option<JointLimits>,
}

impl JointDescription {
    /// Describe an actuated joint with an explicit screw axis.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        joint_type: JointType,
        parent: impl Into<String>,
        child: impl Into<String>,
        axis: Vector6<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            joint_type,
            effort: JointEffort::Actuated,
            parent: parent.into(),
            child: child.into(),
            axis: [axis[0], axis[1], axis[2], axis[3], axis[4], axis[5]],
            limits: None,
        }
    }

    /// Revolute joint about `direction` through `point`, both in the child
    /// link frame. The screw axis is `[ω, p × ω]` with `ω` normalized.
    #[must_use]
    pub fn revolute(
        name: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
        direction: Vector3<f64>,
        point: Point3<f64>,
    ) -> Self {
        let w = direction.normalize();
        let v = point.coords.cross(&w);
        Self::new(
            name,
            JointType::Revolute,
            parent,
            child,
            Vector6::new(w.x, w.y, w.z, v.x, v.y, v.z),
        )
    }

    /// Prismatic joint sliding along `direction` (child link frame).
    #[must_use]
    pub fn prismatic(
        name: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
        direction: Vector3<f64>,
    ) -> Self {
        let v = direction.normalize();
        Self::new(
            name,
            JointType::Prismatic,
            parent,
            child,
            Vector6::new(0.0, 0.0, 0.0, v.x, v.y, v.z),
        )
    }

    /// Rigid attachment.
    #[must_use]
    pub fn fixed(
        name: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self::new(name, JointType::Fixed, parent, child, Vector6::zeros())
    }

    /// Set the effort model.
    #[must_use]
    pub fn with_effort(mut self, effort: JointEffort) -> Self {
        self.effort = effort;
        self
    }

    /// Attach position/effort limits.
    #[must_use]
    pub fn with_limits(mut self, limits: JointLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Screw axis as a typed vector.
    #[must_use]
    pub fn axis_vector(&self) -> Vector6<f64> {
        Vector6::from_column_slice(&self.axis)
    }
}

/// Links and joints of a robot, by name.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RobotDescription {
    /// Link descriptions in declaration order.
    pub links: Vec<LinkDescription>,
    /// Joint descriptions in declaration order, which is also the order of
    /// every per-joint query and result vector.
    pub joints: Vec<JointDescription>,
}

impl RobotDescription {
    /// Create an empty description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a link.
    #[must_use]
    pub fn link(mut self, link: LinkDescription) -> Self {
        self.links.push(link);
        self
    }

    /// Append a joint.
    #[must_use]
    pub fn joint(mut self, joint: JointDescription) -> Self {
        self.joints.push(joint);
        self
    }
}
