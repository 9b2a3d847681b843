//! Joints between links.

use nalgebra::Isometry3;

use fdyn_types::{JointEffort, JointId, JointLimits, JointType, LinkId};

use crate::spatial::{SpatialVector, adjoint_map, exp_twist};

/// A joint connecting a parent link to a child link.
///
/// Joint position, velocity and acceleration are not stored here.
#[derive(Debug, Clone)]
pub struct Joint {
    pub(crate) id: JointId,
    pub(crate) name: String,
    pub(crate) joint_type: JointType,
    pub(crate) effort: JointEffort,
    pub(crate) parent: LinkId,
    pub(crate) child: LinkId,
    pub(crate) screw_axis: SpatialVector,
    pub(crate) screw_axis_com: SpatialVector,
    pub(crate) rest_transform: Isometry3<f64>,
    pub(crate) limits: Option<JointLimits>,
    pub(crate) dof_offset: usize,
}

impl Joint {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: JointId,
        name: String,
        joint_type: JointType,
        effort: JointEffort,
        parent: LinkId,
        child: LinkId,
        screw_axis: SpatialVector,
        limits: Option<JointLimits>,
    ) -> Self {
        Self {
            id,
            name,
            joint_type,
            effort,
            parent,
            child,
            screw_axis,
            screw_axis_com: screw_axis,
            rest_transform: Isometry3::identity(),
            limits,
            dof_offset: 0,
        }
    }

    /// Fill in the quantities that depend on the attached links' rest poses.
    pub(crate) fn attach(
        &mut self,
        parent_w_t_com: &Isometry3<f64>,
        child_w_t_com: &Isometry3<f64>,
        child_l_t_com: &Isometry3<f64>,
    ) {
        self.rest_transform = parent_w_t_com.inverse() * child_w_t_com;
        self.screw_axis_com = adjoint_map(&child_l_t_com.inverse()) * self.screw_axis;
    }

    /// Joint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dense index of this joint.
    #[must_use]
    pub fn id(&self) -> JointId {
        self.id
    }

    /// Kinematic type.
    #[must_use]
    pub fn joint_type(&self) -> JointType {
        self.joint_type
    }

    /// Effort model.
    #[must_use]
    pub fn effort(&self) -> JointEffort {
        self.effort
    }

    /// Parent link.
    #[must_use]
    pub fn parent(&self) -> LinkId {
        self.parent
    }

    /// Child link.
    #[must_use]
    pub fn child(&self) -> LinkId {
        self.child
    }

    /// Screw axis in the child link frame.
    #[must_use]
    pub fn screw_axis(&self) -> &SpatialVector {
        &self.screw_axis
    }

    /// Screw axis in the child COM frame: `Ad(comTl) · S`.
    #[must_use]
    pub fn screw_axis_com(&self) -> &SpatialVector {
        &self.screw_axis_com
    }

    /// Child COM frame in the parent COM frame at `q = 0` (`pMc`).
    #[must_use]
    pub fn rest_transform(&self) -> &Isometry3<f64> {
        &self.rest_transform
    }

    /// Degrees of freedom (1 or 0).
    #[must_use]
    pub fn dof(&self) -> usize {
        self.joint_type.dof()
    }

    /// Row of this joint in the joint-space mass matrix. Meaningless for
    /// fixed joints, which have no row.
    #[must_use]
    pub fn dof_offset(&self) -> usize {
        self.dof_offset
    }

    /// Optional limits.
    #[must_use]
    pub fn limits(&self) -> Option<&JointLimits> {
        self.limits.as_ref()
    }

    /// Child COM frame in the parent COM frame at position `q`:
    /// `pTc(q) = pMc · exp(A·q)`.
    #[must_use]
    pub fn relative_transform(&self, q: f64) -> Isometry3<f64> {
        if self.joint_type.is_movable() {
            self.rest_transform * exp_twist(&(self.screw_axis_com * q))
        } else {
            self.rest_transform
        }
    }
}
