//! Dynamics factor builder.
//!
//! Turns a robot and a joint state into a [`GaussianFactorGraph`] whose unique
//! solution is the forward dynamics. For every joint `j` with parent link `p`
//! and child link `c` (all quantities in COM frames, `A` the screw axis of `j`
//! in the child COM frame, `G` the spatial inertia):
//!
//! ```text
//! acceleration    A_c − Ad(cTp)·A_p − A·a_j            = ad(V_c)·A·q̇_j
//! wrench balance  F_j − Σ_k Ad(kTc)ᵀ·F_k − W_c − G_c·A_c = −ad(V_c)ᵀ·G_c·V_c − F_grav,c
//! torque          Aᵀ·F_j                               = τ_j
//! ```
//!
//! where `k` ranges over the child joints of `c` and `W_c` appears only when
//! `c` is a leaf. Fixed joints have no `a_j` term and no torque factor. The
//! root's twist acceleration and every leaf's tip wrench are pinned by priors.

use nalgebra::{DMatrix, DVector, Isometry3, Matrix6, Vector3};
use tracing::debug;

use fdyn_linear::{GaussianFactorGraph, JacobianFactor, Key, LinearError};
use fdyn_types::{DynamicsError, Gravity, JointId, LinkId, Result};

use crate::keys::{joint_accel_key, tip_wrench_key, twist_accel_key, wrench_key};
use crate::kinematics::{LinkPoses, check_len, link_twists, poses_from_transforms, relative_transforms};
use crate::robot::Robot;
use crate::spatial::{SpatialVector, ad, adjoint_map};

/// Inputs of one forward-dynamics query.
///
/// Everything except `q` and `qd` is optional and defaults to zero.
///
/// # Example
///
/// ```
/// use fdyn_core::{ForwardDynamicsQuery, Robot};
/// use nalgebra::DVector;
///
/// let robot = Robot::serial_chain(2, 1.0, 1.0)?;
/// let query = ForwardDynamicsQuery::at_rest(&robot).torques(DVector::from_vec(vec![1.0, 0.0]));
/// assert!(query.validate(&robot).is_ok());
/// # Ok::<(), fdyn_types::DynamicsError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardDynamicsQuery {
    /// Joint positions, one per joint in joint order. Fixed joints' entries
    /// are ignored.
    pub q: DVector<f64>,
    /// Joint velocities, laid out like `q`.
    pub qd: DVector<f64>,
    /// Applied joint torques (forces for prismatic joints), laid out like `q`.
    pub torques: Option<DVector<f64>>,
    /// Twist acceleration of the root, in its COM frame.
    pub base_accel: Option<SpatialVector>,
    /// Twist of the root, in its COM frame.
    pub base_twist: Option<SpatialVector>,
    /// Wrenches leaves exert on their environment, in the leaf COM frame.
    pub tip_wrenches: Vec<(LinkId, SpatialVector)>,
}

impl ForwardDynamicsQuery {
    /// Query at the given positions and velocities, everything else zero.
    #[must_use]
    pub fn new(q: DVector<f64>, qd: DVector<f64>) -> Self {
        Self {
            q,
            qd,
            torques: None,
            base_accel: None,
            base_twist: None,
            tip_wrenches: Vec::new(),
        }
    }

    /// Query with every joint at zero position and velocity.
    #[must_use]
    pub fn at_rest(robot: &Robot) -> Self {
        let n = robot.num_joints();
        Self::new(DVector::zeros(n), DVector::zeros(n))
    }

    /// Set the applied torques.
    #[must_use]
    pub fn torques(mut self, torques: DVector<f64>) -> Self {
        self.torques = Some(torques);
        self
    }

    /// Set the root's twist acceleration.
    #[must_use]
    pub fn base_accel(mut self, accel: SpatialVector) -> Self {
        self.base_accel = Some(accel);
        self
    }

    /// Set the root's twist.
    #[must_use]
    pub fn base_twist(mut self, twist: SpatialVector) -> Self {
        self.base_twist = Some(twist);
        self
    }

    /// Set the tip wrench of a leaf, replacing any earlier value.
    #[must_use]
    pub fn tip_wrench(mut self, link: LinkId, wrench: SpatialVector) -> Self {
        self.tip_wrenches.retain(|(l, _)| *l != link);
        self.tip_wrenches.push((link, wrench));
        self
    }

    /// Check the query against a robot.
    ///
    /// # Errors
    ///
    /// - [`DynamicsError::DimensionMismatch`] if a vector length differs from
    ///   the joint count
    /// - [`DynamicsError::InvalidInput`] for non-finite values or a tip wrench on
    ///   a link that is not a leaf
    pub fn validate(&self, robot: &Robot) -> Result<()> {
        let n = robot.num_joints();
        check_len("joint positions", n, &self.q)?;
        check_len("joint velocities", n, &self.qd)?;
        if let Some(torques) = &self.torques {
            check_len("joint torques", n, torques)?;
        }

        let finite = |what: &str, values: &[f64]| {
            if values.iter().all(|x| x.is_finite()) {
                Ok(())
            } else {
                Err(DynamicsError::invalid_input(format!(
                    "{what} contain non-finite values"
                )))
            }
        };
        finite("joint positions", self.q.as_slice())?;
        finite("joint velocities", self.qd.as_slice())?;
        if let Some(torques) = &self.torques {
            finite("joint torques", torques.as_slice())?;
        }
        if let Some(accel) = &self.base_accel {
            finite("base acceleration", accel.as_slice())?;
        }
        if let Some(twist) = &self.base_twist {
            finite("base twist", twist.as_slice())?;
        }

        for (i, (link, wrench)) in self.tip_wrenches.iter().enumerate() {
            if robot.link(*link).is_none() {
                return Err(DynamicsError::invalid_input(format!(
                    "tip wrench on unknown {link}"
                )));
            }
            if !robot.is_leaf(*link) {
                return Err(DynamicsError::invalid_input(format!(
                    "tip wrench on {}, which is not a leaf",
                    robot.link_label(*link)
                )));
            }
            if self.tip_wrenches[..i].iter().any(|(l, _)| l == link) {
                return Err(DynamicsError::invalid_input(format!(
                    "two tip wrenches on {}",
                    robot.link_label(*link)
                )));
            }
            finite("tip wrenches", wrench.as_slice())?;
        }

        Ok(())
    }

    /// Applied value for `joint` before its effort model is applied.
    #[must_use]
    pub fn applied_torque(&self, robot: &Robot, joint: JointId) -> f64 {
        match (&self.torques, robot.joint(joint)) {
            (Some(torques), Some(j)) if j.dof() > 0 => torques[joint.index()],
            _ => 0.0,
        }
    }

    /// Generalized force on `joint` after its effort model: the right-hand
    /// side of the torque factor.
    #[must_use]
    pub fn effective_torque(&self, robot: &Robot, joint: JointId) -> f64 {
        robot.joint(joint).map_or(0.0, |j| {
            if j.dof() == 0 {
                0.0
            } else {
                j.effort()
                    .resolve(self.applied_torque(robot, joint), self.q[joint.index()])
            }
        })
    }

    /// Tip wrench for `link`, zero if none was given.
    #[must_use]
    pub fn tip_wrench_for(&self, link: LinkId) -> SpatialVector {
        self.tip_wrenches
            .iter()
            .find(|(l, _)| *l == link)
            .map_or_else(SpatialVector::zeros, |(_, w)| *w)
    }
}

/// The factor graph of one query together with the kinematic quantities it
/// was built from.
#[derive(Debug, Clone)]
pub struct DynamicsGraph {
    graph: GaussianFactorGraph,
    transforms: Vec<Isometry3<f64>>,
    twists: Vec<SpatialVector>,
    poses: LinkPoses,
}

impl DynamicsGraph {
    /// The linear factor graph.
    #[must_use]
    pub fn graph(&self) -> &GaussianFactorGraph {
        &self.graph
    }

    /// Child-in-parent COM transforms, indexed by joint.
    #[must_use]
    pub fn transforms(&self) -> &[Isometry3<f64>] {
        &self.transforms
    }

    /// Link twists in their COM frames, indexed by link.
    #[must_use]
    pub fn twists(&self) -> &[SpatialVector] {
        &self.twists
    }

    /// World poses of every link.
    #[must_use]
    pub fn poses(&self) -> &LinkPoses {
        &self.poses
    }

    pub(crate) fn into_parts(self) -> (GaussianFactorGraph, Vec<SpatialVector>) {
        (self.graph, self.twists)
    }
}

fn dense6(m: &Matrix6<f64>) -> DMatrix<f64> {
    DMatrix::from_column_slice(6, 6, m.as_slice())
}

fn column(v: &SpatialVector) -> DMatrix<f64> {
    DMatrix::from_column_slice(6, 1, v.as_slice())
}

fn rhs(v: &SpatialVector) -> DVector<f64> {
    DVector::from_column_slice(v.as_slice())
}

/// Gravity wrench on a link's COM, in its COM frame: `[0; m·R_wcomᵀ·g]`.
pub(crate) fn gravity_wrench(mass: f64, w_t_com: &Isometry3<f64>, gravity: &Gravity) -> SpatialVector {
    if mass == 0.0 || gravity.is_zero() {
        return SpatialVector::zeros();
    }
    let f: Vector3<f64> = w_t_com.rotation.inverse() * gravity.force_on(mass);
    SpatialVector::new(0.0, 0.0, 0.0, f.x, f.y, f.z)
}

fn add(graph: &mut GaussianFactorGraph, factor: std::result::Result<JacobianFactor, LinearError>) -> Result<()> {
    factor
        .and_then(|f| graph.add(f))
        .map_err(|e| DynamicsError::construction(format!("malformed dynamics factor: {e}")))
}

/// Build the forward-dynamics factor graph for `query`.
///
/// # Errors
///
/// Returns the errors of [`ForwardDynamicsQuery::validate`]; fails before any
/// factor is built.
pub fn build_dynamics_graph(
    robot: &Robot,
    query: &ForwardDynamicsQuery,
    gravity: &Gravity,
) -> Result<DynamicsGraph> {
    query.validate(robot)?;

    let transforms = relative_transforms(robot, &query.q)?;
    let poses = poses_from_transforms(robot, &transforms);
    let base_twist = query.base_twist.unwrap_or_else(SpatialVector::zeros);
    let twists = link_twists(robot, &transforms, &query.qd, &base_twist)?;

    let identity = DMatrix::<f64>::identity(6, 6);
    let mut graph = GaussianFactorGraph::with_capacity(3 * robot.num_joints() + 2);

    let root = robot.root();
    let root_name = robot.links()[root.index()].name();
    add(
        &mut graph,
        Ok(JacobianFactor::prior(
            format!("base acceleration of '{root_name}'"),
            twist_accel_key(root),
            rhs(&query.base_accel.unwrap_or_else(SpatialVector::zeros)),
        )),
    )?;

    for &j in robot.topological_joints() {
        let joint = &robot.joints()[j.index()];
        let (p, c) = (joint.parent(), joint.child());
        let link = &robot.links()[c.index()];
        let axis = joint.screw_axis_com();
        let twist = &twists[c.index()];
        let c_t_p = transforms[j.index()].inverse();
        let movable = joint.dof() > 0;

        // Twist acceleration propagation.
        let mut terms = vec![
            (twist_accel_key(c), identity.clone()),
            (twist_accel_key(p), -dense6(&adjoint_map(&c_t_p))),
        ];
        let mut bias = SpatialVector::zeros();
        if movable {
            terms.push((joint_accel_key(j), -column(axis)));
            bias = ad(twist) * axis * query.qd[j.index()];
        }
        add(
            &mut graph,
            JacobianFactor::new(format!("acceleration of '{}'", joint.name()), terms, rhs(&bias)),
        )?;

        // Newton-Euler balance on the child link.
        let g = link.spatial_inertia();
        let mut terms: Vec<(Key, DMatrix<f64>)> = vec![
            (wrench_key(j), identity.clone()),
            (twist_accel_key(c), -dense6(g)),
        ];
        for &k in robot.children(c) {
            let k_t_c = transforms[k.index()].inverse();
            terms.push((wrench_key(k), -dense6(&adjoint_map(&k_t_c).transpose())));
        }
        if robot.is_leaf(c) {
            terms.push((tip_wrench_key(c), -identity.clone()));
        }
        let coriolis = -(ad(twist).transpose() * g * twist);
        let weight = gravity_wrench(link.mass(), &poses.com_poses()[c.index()], gravity);
        add(
            &mut graph,
            JacobianFactor::new(
                format!("wrench balance of '{}'", link.name()),
                terms,
                rhs(&(coriolis - weight)),
            ),
        )?;

        // Projection onto the joint axis.
        if movable {
            add(
                &mut graph,
                JacobianFactor::new(
                    format!("torque of '{}'", joint.name()),
                    vec![(
                        wrench_key(j),
                        DMatrix::from_row_slice(1, 6, axis.as_slice()),
                    )],
                    DVector::from_element(1, query.effective_torque(robot, j)),
                ),
            )?;
        }
    }

    for leaf in robot.leaves() {
        add(
            &mut graph,
            Ok(JacobianFactor::prior(
                format!("tip wrench of '{}'", robot.links()[leaf.index()].name()),
                tip_wrench_key(leaf),
                rhs(&query.tip_wrench_for(leaf)),
            )),
        )?;
    }

    debug!(
        factors = graph.len(),
        variables = graph.keys().len(),
        rows = graph.total_rows(),
        dim = graph.total_dim(),
        "built dynamics graph"
    );

    Ok(DynamicsGraph {
        graph,
        transforms,
        twists,
        poses,
    })
}
