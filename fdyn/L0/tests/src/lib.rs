//! Shared robots for the conformance tests.
//!
//! [`LinkSpec`] describes one non-root link of an arbitrary tree in plain
//! numbers, so property tests can generate trees without touching the
//! description types directly.

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]

use nalgebra::{Point3, UnitQuaternion, Vector3};

use fdyn_core::Robot;
use fdyn_types::{
    JointDescription, JointEffort, JointType, LinkDescription, MassProperties, Pose, Result,
    RobotDescription,
};

/// One non-root link and the joint that attaches it.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSpec {
    /// Index of the parent among the links built so far (0 is the root).
    pub parent: usize,
    /// Link frame origin relative to the parent's link frame origin, in the world.
    pub offset: [f64; 3],
    /// Link frame orientation as roll, pitch, yaw.
    pub euler: [f64; 3],
    /// COM position in the link frame.
    pub com: [f64; 3],
    /// Link mass.
    pub mass: f64,
    /// Half extents of the box whose inertia the link carries.
    pub half_extents: [f64; 3],
    /// Joint direction in the link frame.
    pub axis: [f64; 3],
    /// Kind of the attaching joint.
    pub joint_type: JointType,
    /// Effort model of the attaching joint.
    pub effort: JointEffort,
}

impl LinkSpec {
    /// A unit box one meter along +x from its parent, on a revolute z joint.
    #[must_use]
    pub fn revolute(parent: usize) -> Self {
        Self {
            parent,
            offset: [1.0, 0.0, 0.0],
            euler: [0.0; 3],
            com: [0.5, 0.0, 0.0],
            mass: 1.0,
            half_extents: [0.5, 0.05, 0.05],
            axis: [0.0, 0.0, 1.0],
            joint_type: JointType::Revolute,
            effort: JointEffort::Actuated,
        }
    }

    fn axis(&self) -> Vector3<f64> {
        let axis = Vector3::from(self.axis);
        if axis.norm() < 1e-3 {
            Vector3::z()
        } else {
            axis
        }
    }
}

fn link_name(i: usize) -> String {
    if i == 0 {
        "root".to_string()
    } else {
        format!("link{i}")
    }
}

/// Build a tree from a massless root at the origin and `links` in order.
///
/// Parent indices are clamped to the links built so far, so any list of
/// specs gives a valid tree.
///
/// # Errors
///
/// Returns a construction error for invalid masses or inertias.
pub fn tree(links: &[LinkSpec]) -> Result<Robot> {
    let mut positions = vec![Point3::origin()];
    let mut description = RobotDescription::new().link(LinkDescription::new(
        link_name(0),
        MassProperties::massless(),
        Pose::identity(),
    ));

    for (i, spec) in links.iter().enumerate() {
        let index = i + 1;
        let parent = spec.parent.min(i);
        let position = positions[parent] + Vector3::from(spec.offset);
        positions.push(position);

        let rotation = UnitQuaternion::from_euler_angles(spec.euler[0], spec.euler[1], spec.euler[2]);
        let link = LinkDescription::new(
            link_name(index),
            MassProperties::box_shape(spec.mass, Vector3::from(spec.half_extents)),
            Pose::from_position_rotation(position, rotation),
        )
        .with_com(Pose::from_position(Point3::from(spec.com)));

        let name = format!("joint{index}");
        let joint = match spec.joint_type {
            JointType::Revolute => JointDescription::revolute(
                name,
                link_name(parent),
                link_name(index),
                spec.axis(),
                Point3::origin(),
            ),
            JointType::Prismatic => {
                JointDescription::prismatic(name, link_name(parent), link_name(index), spec.axis())
            }
            JointType::Fixed => JointDescription::fixed(name, link_name(parent), link_name(index)),
        }
        .with_effort(spec.effort);

        description = description.link(link).joint(joint);
    }

    Robot::from_description(&description)
}

/// A tree with two branches of two links each off a common trunk link.
///
/// # Errors
///
/// Never fails for the built-in parameters.
pub fn forked_tree() -> Result<Robot> {
    let mut specs = vec![LinkSpec::revolute(0)];
    let mut left = LinkSpec::revolute(1);
    left.offset = [0.5, 0.8, 0.0];
    left.axis = [1.0, 0.0, 0.0];
    let mut right = LinkSpec::revolute(1);
    right.offset = [0.5, -0.8, 0.3];
    right.joint_type = JointType::Prismatic;
    right.axis = [0.0, 1.0, 1.0];
    specs.extend([left, right, LinkSpec::revolute(2), LinkSpec::revolute(3)]);
    tree(&specs)
}

/// [`forked_tree`] with two of its joints welded: one mid-branch, one at a
/// leaf. Query vectors still carry an entry for each weld.
///
/// # Errors
///
/// Never fails for the built-in parameters.
pub fn forked_tree_with_welds() -> Result<Robot> {
    let mut specs = vec![LinkSpec::revolute(0)];
    let mut left = LinkSpec::revolute(1);
    left.offset = [0.5, 0.8, 0.0];
    left.joint_type = JointType::Fixed;
    let mut right = LinkSpec::revolute(1);
    right.offset = [0.5, -0.8, 0.3];
    right.axis = [1.0, 0.0, 0.0];
    let mut cap = LinkSpec::revolute(3);
    cap.joint_type = JointType::Fixed;
    specs.extend([left, right, LinkSpec::revolute(2), cap]);
    tree(&specs)
}
