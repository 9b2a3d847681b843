//! Kinematic propagation: relative transforms, link poses, link twists.
//!
//! All quantities here are known inputs to the dynamics solve, computed
//! directly from the joint state. Frames are the links' center-of-mass frames.

use nalgebra::{DVector, Isometry3};

use fdyn_types::{DynamicsError, LinkId, Result};

use crate::robot::Robot;
use crate::spatial::{SpatialVector, adjoint_map};

/// World poses of every link at a configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPoses {
    link: Vec<Isometry3<f64>>,
    com: Vec<Isometry3<f64>>,
}

impl LinkPoses {
    /// Link frame in the world (`wTl`).
    #[must_use]
    pub fn link_pose(&self, id: LinkId) -> Option<&Isometry3<f64>> {
        self.link.get(id.index())
    }

    /// COM frame in the world (`wTcom`).
    #[must_use]
    pub fn com_pose(&self, id: LinkId) -> Option<&Isometry3<f64>> {
        self.com.get(id.index())
    }

    /// All link frames, indexed by link.
    #[must_use]
    pub fn link_poses(&self) -> &[Isometry3<f64>] {
        &self.link
    }

    /// All COM frames, indexed by link.
    #[must_use]
    pub fn com_poses(&self) -> &[Isometry3<f64>] {
        &self.com
    }
}

pub(crate) fn check_len(what: &str, expected: usize, v: &DVector<f64>) -> Result<()> {
    if v.len() != expected {
        return Err(DynamicsError::dimension_mismatch(what, expected, v.len()));
    }
    Ok(())
}

/// Child-COM-in-parent-COM transform of every joint at `q`, indexed by joint:
/// `pTc(q) = pMc · exp(A·q)`.
///
/// `q` holds one entry per joint, in joint order; entries of fixed joints
/// are ignored.
///
/// # Errors
///
/// Returns [`DynamicsError::DimensionMismatch`] if `q.len() != robot.num_joints()`.
pub fn relative_transforms(robot: &Robot, q: &DVector<f64>) -> Result<Vec<Isometry3<f64>>> {
    check_len("joint positions", robot.num_joints(), q)?;
    Ok(robot
        .joints()
        .iter()
        .zip(q.iter())
        .map(|(joint, &position)| {
            joint.relative_transform(if joint.dof() == 0 { 0.0 } else { position })
        })
        .collect())
}

/// World poses of every link and COM frame at `q`.
///
/// The root stays at its rest pose.
///
/// # Errors
///
/// Returns [`DynamicsError::DimensionMismatch`] if `q.len() != robot.num_joints()`.
pub fn forward_kinematics(robot: &Robot, q: &DVector<f64>) -> Result<LinkPoses> {
    let transforms = relative_transforms(robot, q)?;
    Ok(poses_from_transforms(robot, &transforms))
}

pub(crate) fn poses_from_transforms(robot: &Robot, transforms: &[Isometry3<f64>]) -> LinkPoses {
    let n = robot.num_links();
    let mut com = vec![Isometry3::identity(); n];
    let root = robot.root();
    com[root.index()] = *robot.links()[root.index()].w_t_com();

    for &j in robot.topological_joints() {
        let joint = &robot.joints()[j.index()];
        com[joint.child().index()] = com[joint.parent().index()] * transforms[j.index()];
    }

    let link = robot
        .links()
        .iter()
        .zip(&com)
        .map(|(l, w_t_com)| w_t_com * l.l_t_com().inverse())
        .collect();

    LinkPoses { link, com }
}

/// Twist of every link in its own COM frame, indexed by link:
/// `V_c = Ad(cTp)·V_p + A·q̇`.
///
/// `base_twist` is the root's twist in its COM frame (zero for a fixed base).
///
/// # Errors
///
/// Returns [`DynamicsError::DimensionMismatch`] if `qd.len() != robot.num_joints()` or
/// `transforms` does not have one entry per joint.
pub fn link_twists(
    robot: &Robot,
    transforms: &[Isometry3<f64>],
    qd: &DVector<f64>,
    base_twist: &SpatialVector,
) -> Result<Vec<SpatialVector>> {
    check_len("joint velocities", robot.num_joints(), qd)?;
    if transforms.len() != robot.num_joints() {
        return Err(DynamicsError::dimension_mismatch(
            "relative transforms",
            robot.num_joints(),
            transforms.len(),
        ));
    }

    let mut twists = vec![SpatialVector::zeros(); robot.num_links()];
    twists[robot.root().index()] = *base_twist;

    for &j in robot.topological_joints() {
        let joint = &robot.joints()[j.index()];
        let c_t_p = transforms[j.index()].inverse();
        let mut twist = adjoint_map(&c_t_p) * twists[joint.parent().index()];
        if joint.dof() > 0 {
            twist += joint.screw_axis_com() * qd[j.index()];
        }
        twists[joint.child().index()] = twist;
    }

    Ok(twists)
}
