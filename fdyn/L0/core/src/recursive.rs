//! Classical recursive Newton-Euler dynamics.
//!
//! A direct two-pass implementation over the same frames and conventions as
//! the factor graph: twist accelerations outward from the root, wrenches
//! inward from the leaves. Joint vectors are laid out one entry per joint,
//! like [`ForwardDynamicsQuery`]. Forward dynamics here assembles the
//! joint-space mass matrix column by column and solves `M·q̈ = τ − c`, which scales
//! cubically but shares no code path with elimination. Use it to cross-check
//! [`forward_dynamics`](crate::forward_dynamics).

use nalgebra::{DMatrix, DVector, Isometry3};
use tracing::trace;

use fdyn_types::{DynamicsError, Gravity, LinkId, Result};

use crate::factors::{ForwardDynamicsQuery, gravity_wrench};
use crate::kinematics::{check_len, link_twists, poses_from_transforms, relative_transforms};
use crate::robot::{Joint, Robot};
use crate::spatial::{SpatialVector, ad, adjoint_map};

struct Pass<'a> {
    transforms: &'a [Isometry3<f64>],
    twists: &'a [SpatialVector],
    com_poses: &'a [Isometry3<f64>],
    gravity: &'a Gravity,
}

impl Pass<'_> {
    /// Generalized forces `Aᵀ·F_j` that produce `qdd`, zero on fixed joints.
    fn run(
        &self,
        robot: &Robot,
        qd: &DVector<f64>,
        qdd: &DVector<f64>,
        base_accel: &SpatialVector,
        tip: impl Fn(LinkId) -> SpatialVector,
    ) -> DVector<f64> {
        let mut accels = vec![SpatialVector::zeros(); robot.num_links()];
        accels[robot.root().index()] = *base_accel;

        for &j in robot.topological_joints() {
            let joint = &robot.joints()[j.index()];
            let c = joint.child().index();
            let c_t_p = self.transforms[j.index()].inverse();
            let mut accel = adjoint_map(&c_t_p) * accels[joint.parent().index()];
            if joint.dof() > 0 {
                let axis = joint.screw_axis_com();
                accel += axis * qdd[j.index()] + ad(&self.twists[c]) * axis * qd[j.index()];
            }
            accels[c] = accel;
        }

        let mut wrenches = vec![SpatialVector::zeros(); robot.num_joints()];
        let mut tau = DVector::zeros(robot.num_joints());

        for &j in robot.topological_joints().iter().rev() {
            let joint = &robot.joints()[j.index()];
            let c = joint.child();
            let link = &robot.links()[c.index()];
            let g = link.spatial_inertia();
            let v = &self.twists[c.index()];

            let mut wrench = g * accels[c.index()] - ad(v).transpose() * g * v
                - gravity_wrench(link.mass(), &self.com_poses[c.index()], self.gravity);
            for &k in robot.children(c) {
                let k_t_c = self.transforms[k.index()].inverse();
                wrench += adjoint_map(&k_t_c).transpose() * wrenches[k.index()];
            }
            if robot.is_leaf(c) {
                wrench += tip(c);
            }
            wrenches[j.index()] = wrench;

            if joint.dof() > 0 {
                tau[j.index()] = joint.screw_axis_com().dot(&wrench);
            }
        }

        tau
    }
}

/// Generalized forces along each joint axis that produce `qdd` at the state
/// of `query`, one entry per joint with zero on fixed joints.
///
/// The result is the force after each joint's effort model, comparable with
/// [`ForwardDynamicsQuery::effective_torque`]. The query's own torques are
/// ignored.
///
/// # Errors
///
/// Returns the errors of [`ForwardDynamicsQuery::validate`], or
/// [`DynamicsError::DimensionMismatch`] if `qdd.len() != robot.num_joints()`.
pub fn inverse_dynamics(
    robot: &Robot,
    query: &ForwardDynamicsQuery,
    qdd: &DVector<f64>,
    gravity: &Gravity,
) -> Result<DVector<f64>> {
    query.validate(robot)?;
    check_len("joint accelerations", robot.num_joints(), qdd)?;

    let transforms = relative_transforms(robot, &query.q)?;
    let poses = poses_from_transforms(robot, &transforms);
    let base_twist = query.base_twist.unwrap_or_else(SpatialVector::zeros);
    let twists = link_twists(robot, &transforms, &query.qd, &base_twist)?;

    let pass = Pass {
        transforms: &transforms,
        twists: &twists,
        com_poses: poses.com_poses(),
        gravity,
    };
    Ok(pass.run(
        robot,
        &query.qd,
        qdd,
        &query.base_accel.unwrap_or_else(SpatialVector::zeros),
        |link| query.tip_wrench_for(link),
    ))
}

/// Joint-space mass matrix `M(q)`, one column per unit joint acceleration.
///
/// `M` is `nq × nq`: fixed joints have no row, movable joints sit at their
/// [`dof_offset`](crate::Joint::dof_offset).
///
/// # Errors
///
/// Returns [`DynamicsError::DimensionMismatch`] if `q.len() != robot.num_joints()`.
pub fn joint_space_mass_matrix(robot: &Robot, q: &DVector<f64>) -> Result<DMatrix<f64>> {
    let nq = robot.nq();
    let n = robot.num_joints();
    let transforms = relative_transforms(robot, q)?;
    let poses = poses_from_transforms(robot, &transforms);
    let twists = vec![SpatialVector::zeros(); robot.num_links()];
    let zero_gravity = Gravity::zero();
    let pass = Pass {
        transforms: &transforms,
        twists: &twists,
        com_poses: poses.com_poses(),
        gravity: &zero_gravity,
    };

    let qd = DVector::zeros(n);
    let mut mass = DMatrix::zeros(nq, nq);
    for driven in movable(robot) {
        let mut unit = DVector::zeros(n);
        unit[driven.id().index()] = 1.0;
        let tau = pass.run(robot, &qd, &unit, &SpatialVector::zeros(), |_| {
            SpatialVector::zeros()
        });
        for joint in movable(robot) {
            mass[(joint.dof_offset(), driven.dof_offset())] = tau[joint.id().index()];
        }
    }
    Ok(mass)
}

/// Forward dynamics by solving `M(q)·q̈ = τ − c(q, q̇)`.
///
/// `c` collects velocity, gravity, base-acceleration and tip-wrench terms;
/// `τ` is each joint's effective torque.
///
/// # Errors
///
/// - the errors of [`ForwardDynamicsQuery::validate`]
/// - [`DynamicsError::StructuralSingularity`] if `M` is singular
pub fn forward_dynamics_reference(
    robot: &Robot,
    query: &ForwardDynamicsQuery,
    gravity: &Gravity,
) -> Result<DVector<f64>> {
    let n = robot.num_joints();
    let bias = inverse_dynamics(robot, query, &DVector::zeros(n), gravity)?;
    let mut qdd = DVector::zeros(n);
    if robot.nq() == 0 {
        return Ok(qdd);
    }

    let mass = joint_space_mass_matrix(robot, &query.q)?;
    let mut rhs = DVector::zeros(robot.nq());
    for joint in movable(robot) {
        let j = joint.id();
        rhs[joint.dof_offset()] = query.effective_torque(robot, j) - bias[j.index()];
    }

    let scale = mass.diagonal().amax().max(1.0);
    for joint in movable(robot) {
        let i = joint.dof_offset();
        if mass[(i, i)] <= f64::EPSILON * scale {
            return Err(DynamicsError::StructuralSingularity {
                variable: "M".to_string(),
                context: robot.joint_label(joint.id()),
            });
        }
    }

    let solved = match mass.clone().cholesky() {
        Some(cholesky) => cholesky.solve(&rhs),
        None => {
            trace!("mass matrix not positive definite, falling back to LU");
            mass.lu()
                .solve(&rhs)
                .ok_or_else(|| DynamicsError::StructuralSingularity {
                    variable: "M".to_string(),
                    context: "joint-space mass matrix".to_string(),
                })?
        }
    };
    for joint in movable(robot) {
        qdd[joint.id().index()] = solved[joint.dof_offset()];
    }
    Ok(qdd)
}

fn movable(robot: &Robot) -> impl Iterator<Item = &Joint> {
    robot.joints().iter().filter(|j| j.dof() > 0)
}
