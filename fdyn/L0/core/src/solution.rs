//! Solved forward-dynamics quantities.

use nalgebra::DVector;

use fdyn_linear::{Key, VectorValues};
use fdyn_types::{DynamicsError, JointId, LinkId, Result};

use crate::keys::{joint_accel_key, tip_wrench_key, twist_accel_key, wrench_key};
use crate::robot::Robot;
use crate::spatial::SpatialVector;

fn unknown(key: impl ToString) -> DynamicsError {
    DynamicsError::UnknownKey {
        key: key.to_string(),
    }
}

/// Result of one forward-dynamics query.
///
/// Owns the full assignment of every variable in the solved graph, plus the
/// link twists the graph was built from.
#[derive(Debug, Clone)]
pub struct ForwardDynamicsSolution {
    values: VectorValues,
    joint_accelerations: DVector<f64>,
    joint_torques: Vec<Option<f64>>,
    twists: Vec<SpatialVector>,
}

impl ForwardDynamicsSolution {
    pub(crate) fn new(
        robot: &Robot,
        values: VectorValues,
        twists: Vec<SpatialVector>,
    ) -> Result<Self> {
        let mut joint_accelerations = DVector::zeros(robot.num_joints());
        let mut joint_torques = vec![None; robot.num_joints()];

        for joint in robot.joints().iter().filter(|j| j.dof() > 0) {
            let key = joint_accel_key(joint.id());
            let qdd = values.get(key).ok_or_else(|| unknown(key))?;
            joint_accelerations[joint.id().index()] = qdd[0];

            let wrench = spatial(&values, wrench_key(joint.id()))?;
            joint_torques[joint.id().index()] = Some(joint.screw_axis_com().dot(&wrench));
        }

        Ok(Self {
            values,
            joint_accelerations,
            joint_torques,
            twists,
        })
    }

    /// Joint accelerations `q̈`, one entry per joint in joint order. Fixed
    /// joints read exactly zero.
    #[must_use]
    pub fn joint_accelerations(&self) -> &DVector<f64> {
        &self.joint_accelerations
    }

    /// Acceleration of a single joint, zero for a fixed one.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicsError::UnknownKey`] for unknown joints.
    pub fn joint_acceleration(&self, joint: JointId) -> Result<f64> {
        self.joint_accelerations
            .get(joint.index())
            .copied()
            .ok_or_else(|| unknown(joint))
    }

    /// Twist acceleration of a link in its COM frame.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicsError::UnknownKey`] for unknown links.
    pub fn twist_acceleration(&self, link: LinkId) -> Result<SpatialVector> {
        spatial(&self.values, twist_accel_key(link))
    }

    /// Wrench transmitted through a joint onto its child, in the child COM
    /// frame.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicsError::UnknownKey`] for unknown joints.
    pub fn wrench(&self, joint: JointId) -> Result<SpatialVector> {
        spatial(&self.values, wrench_key(joint))
    }

    /// Wrench a leaf exerts on its environment, in its COM frame.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicsError::UnknownKey`] if `link` is not a leaf.
    pub fn tip_wrench(&self, link: LinkId) -> Result<SpatialVector> {
        spatial(&self.values, tip_wrench_key(link))
    }

    /// Generalized force along a joint axis, `Aᵀ·F`.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicsError::UnknownKey`] for fixed or unknown joints.
    pub fn joint_torque(&self, joint: JointId) -> Result<f64> {
        self.joint_torques
            .get(joint.index())
            .copied()
            .flatten()
            .ok_or_else(|| unknown(joint))
    }

    /// Twist of a link in its COM frame, as used to build the graph.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicsError::UnknownKey`] for unknown links.
    pub fn link_twist(&self, link: LinkId) -> Result<SpatialVector> {
        self.twists.get(link.index()).copied().ok_or_else(|| unknown(link))
    }

    /// Every solved variable.
    #[must_use]
    pub fn values(&self) -> &VectorValues {
        &self.values
    }
}

fn spatial(values: &VectorValues, key: Key) -> Result<SpatialVector> {
    let v = values.get(key).ok_or_else(|| unknown(key))?;
    if v.len() != 6 {
        return Err(DynamicsError::dimension_mismatch(key.to_string(), 6, v.len()));
    }
    Ok(SpatialVector::from_column_slice(v.as_slice()))
}
