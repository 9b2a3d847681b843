//! Single revolute joint on a fixed base.
//!
//! Links at (0,0,0), (1,0,0), (2,0,0); the last one (mass 1, inertia
//! diag(0, 1/6, 1/6)) spins about z through (1,0,0). Its inertia about the
//! axis is 1/6 + 1.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use approx::assert_relative_eq;
use nalgebra::DVector;

use fdyn_core::{
    DynamicsConfig, DynamicsError, ForwardDynamics, ForwardDynamicsQuery,
    ForwardDynamicsSolution, OrderingStrategy, Robot, SpatialVector, forward_dynamics,
};
use fdyn_conformance_tests::{forked_tree, forked_tree_with_welds};
use fdyn_types::{Gravity, JointId};

const AXIS_INERTIA: f64 = 1.0 / 6.0 + 1.0;

fn spinning() -> ForwardDynamicsQuery {
    ForwardDynamicsQuery::new(DVector::zeros(2), DVector::from_vec(vec![0.0, 1.0]))
}

#[test]
fn spinning_link_does_not_accelerate() {
    let robot = Robot::simple_r().unwrap();
    let solution = forward_dynamics(&robot, &spinning(), &DynamicsConfig::default()).unwrap();

    assert_eq!(solution.joint_accelerations().len(), robot.num_joints());
    assert_relative_eq!(solution.joint_accelerations()[1], 0.0, epsilon = 1e-12);
    assert_relative_eq!(
        solution.joint_acceleration(JointId::new(1)).unwrap(),
        0.0,
        epsilon = 1e-12
    );
}

#[test]
fn spinning_link_torque_residual_is_zero() {
    let robot = Robot::simple_r().unwrap();
    let engine = ForwardDynamics::new(&robot, DynamicsConfig::default()).unwrap();
    let query = spinning();
    let built = engine.build_graph(&query).unwrap();
    let solution = engine.solve(&query).unwrap();

    let torque = built
        .graph()
        .iter()
        .find(|f| f.label() == "torque of 'joint1'")
        .unwrap();
    let error = torque.error(solution.values()).unwrap();
    assert_eq!(error.len(), 1);
    assert_relative_eq!(error[0], 0.0, epsilon = 1e-12);
    assert_relative_eq!(solution.joint_torque(JointId::new(1)).unwrap(), 0.0, epsilon = 1e-12);
}

#[test]
fn spinning_link_centripetal_wrench() {
    // Pure rotation at unit rate one meter from the axis: the joint pulls the
    // COM inward (-x) with unit force.
    let robot = Robot::simple_r().unwrap();
    let solution = forward_dynamics(&robot, &spinning(), &DynamicsConfig::default()).unwrap();
    let wrench = solution.wrench(JointId::new(1)).unwrap();
    assert_relative_eq!(
        wrench,
        SpatialVector::new(0.0, 0.0, 0.0, -1.0, 0.0, 0.0),
        epsilon = 1e-12
    );
    assert_relative_eq!(
        solution.link_twist(fdyn_types::LinkId::new(2)).unwrap(),
        SpatialVector::new(0.0, 0.0, 1.0, 0.0, 1.0, 0.0),
        epsilon = 1e-12
    );
}

#[test]
fn applied_torque_accelerates_link() {
    let robot = Robot::simple_r().unwrap();
    for tau in [-3.0, 0.5, 2.0, 7.0 / 6.0] {
        let query = spinning().torques(DVector::from_vec(vec![0.0, tau]));
        let solution = forward_dynamics(&robot, &query, &DynamicsConfig::default()).unwrap();
        assert_eq!(solution.joint_accelerations()[0], 0.0);
        assert_relative_eq!(
            solution.joint_accelerations()[1],
            tau / AXIS_INERTIA,
            epsilon = 1e-10
        );
        assert_relative_eq!(solution.joint_torque(JointId::new(1)).unwrap(), tau, epsilon = 1e-10);
    }
}

#[test]
fn identical_queries_give_identical_results() {
    let robot = forked_tree().unwrap();
    let query = ForwardDynamicsQuery::new(
        DVector::from_fn(robot.num_joints(), |i, _| 0.3 * i as f64 - 0.4),
        DVector::from_fn(robot.num_joints(), |i, _| 0.2 - 0.1 * i as f64),
    )
    .torques(DVector::from_element(robot.num_joints(), 0.7));
    let config = DynamicsConfig::earth();

    let first = forward_dynamics(&robot, &query, &config).unwrap();
    let second = forward_dynamics(&robot, &query, &config).unwrap();
    assert_eq!(first.joint_accelerations(), second.joint_accelerations());
    for joint in robot.joints() {
        assert_eq!(first.wrench(joint.id()).unwrap(), second.wrench(joint.id()).unwrap());
    }
}

#[test]
fn heavier_link_accelerates_less() {
    let query = ForwardDynamicsQuery::at_rest(&Robot::simple_r().unwrap())
        .torques(DVector::from_vec(vec![0.0, 1.5]));
    let mut previous = f64::INFINITY;
    for mass in [0.25, 0.5, 1.0, 2.0, 8.0] {
        let robot = Robot::simple_r_with_mass(mass).unwrap();
        let qdd = forward_dynamics(&robot, &query, &DynamicsConfig::default())
            .unwrap()
            .joint_accelerations()[1]
            .abs();
        assert!(qdd < previous, "mass {mass}: |q̈| = {qdd} not below {previous}");
        previous = qdd;
    }
}

#[test]
fn torque_residuals_vanish_on_a_tree() {
    let robot = forked_tree().unwrap();
    let n = robot.num_joints();
    let query = ForwardDynamicsQuery::new(
        DVector::from_fn(n, |i, _| 0.1 * i as f64),
        DVector::from_fn(n, |i, _| 0.5 - 0.2 * i as f64),
    )
    .torques(DVector::from_fn(n, |i, _| 1.0 - 0.3 * i as f64));
    let engine = ForwardDynamics::new(&robot, DynamicsConfig::earth()).unwrap();
    let built = engine.build_graph(&query).unwrap();
    let solution = engine.solve(&query).unwrap();

    let torques: Vec<_> = built
        .graph()
        .iter()
        .filter(|f| f.label().starts_with("torque"))
        .collect();
    assert_eq!(torques.len(), n);
    for factor in torques {
        let error = factor.error(solution.values()).unwrap();
        assert!(error.norm() < 1e-9, "{}: {error}", factor.label());
    }
}

#[test]
fn solution_satisfies_every_factor() {
    let robot = forked_tree().unwrap();
    let query = ForwardDynamicsQuery::at_rest(&robot).torques(DVector::from_element(robot.num_joints(), 1.0));
    let engine = ForwardDynamics::new(
        &robot,
        DynamicsConfig::default().gravity(Gravity::custom(nalgebra::Vector3::new(0.0, -9.81, 0.0))),
    )
    .unwrap();
    let built = engine.build_graph(&query).unwrap();
    let solution = engine.solve(&query).unwrap();

    let graph = built.graph();
    assert!(graph.residual(solution.values()).unwrap().norm() < 1e-9);

    let ordering = engine.ordering(&built);
    let system = graph.sparse_jacobian(&ordering).unwrap();
    assert_eq!(system.jacobian().nrows(), graph.total_rows());
    let x = system.flatten(solution.values()).unwrap();
    assert!(system.residual(&x).norm() < 1e-9);
}

#[test]
fn one_entry_per_joint_including_the_weld() {
    // joint0 is the fixed mount; its entries are accepted and ignored.
    let robot = Robot::simple_r().unwrap();
    assert_eq!(robot.num_joints(), 2);
    let query = ForwardDynamicsQuery::new(
        DVector::from_vec(vec![0.7, 0.0]),
        DVector::from_vec(vec![-3.0, 1.0]),
    )
    .torques(DVector::from_vec(vec![40.0, 7.0 / 6.0]));
    let solution = forward_dynamics(&robot, &query, &DynamicsConfig::default()).unwrap();

    let qdd = solution.joint_accelerations();
    assert_eq!(qdd.len(), 2);
    assert_eq!(qdd[0], 0.0);
    assert_relative_eq!(qdd[1], 1.0, epsilon = 1e-10);
    assert_eq!(solution.joint_acceleration(JointId::new(0)).unwrap(), 0.0);

    let per_dof = ForwardDynamicsQuery::new(DVector::zeros(1), DVector::from_element(1, 1.0));
    let err = forward_dynamics(&robot, &per_dof, &DynamicsConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        DynamicsError::DimensionMismatch {
            expected: 2,
            actual: 1,
            ..
        }
    ));
}

#[test]
fn fixed_joints_never_accelerate() {
    let robot = forked_tree_with_welds().unwrap();
    let n = robot.num_joints();
    let query = ForwardDynamicsQuery::new(
        DVector::from_fn(n, |i, _| 0.4 - 0.15 * i as f64),
        DVector::from_fn(n, |i, _| 0.2 * i as f64 - 0.3),
    )
    .torques(DVector::from_element(n, 2.0));
    let solution = forward_dynamics(&robot, &query, &DynamicsConfig::earth()).unwrap();
    for joint in robot.joints().iter().filter(|j| j.dof() == 0) {
        assert_eq!(solution.joint_accelerations()[joint.id().index()], 0.0);
    }
}

#[test]
fn large_torques_still_solve() {
    let robot = Robot::simple_r().unwrap();
    for strategy in [
        OrderingStrategy::TipToRoot,
        OrderingStrategy::RootToTip,
        OrderingStrategy::Natural,
    ] {
        let config = DynamicsConfig::default().ordering(strategy);
        for tau in [1e9, 1e10, 1e12] {
            let query = ForwardDynamicsQuery::at_rest(&robot).torques(DVector::from_vec(vec![0.0, tau]));
            let solution = forward_dynamics(&robot, &query, &config).unwrap();
            assert_relative_eq!(
                solution.joint_accelerations()[1],
                tau / AXIS_INERTIA,
                max_relative = 1e-9
            );
        }
    }
}

#[test]
fn robot_and_solution_cross_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Robot>();
    assert_send_sync::<ForwardDynamicsSolution>();
    assert_send_sync::<ForwardDynamicsQuery>();
}

#[test]
fn shared_robot_gives_identical_results_on_every_thread() {
    let robot = forked_tree().unwrap();
    let n = robot.num_joints();
    let query = ForwardDynamicsQuery::new(
        DVector::from_fn(n, |i, _| 0.25 * i as f64 - 0.5),
        DVector::from_fn(n, |i, _| 0.3 - 0.1 * i as f64),
    )
    .torques(DVector::from_fn(n, |i, _| 1.0 + 0.5 * i as f64));
    let config = DynamicsConfig::earth();
    let expected = forward_dynamics(&robot, &query, &config).unwrap();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| forward_dynamics(&robot, &query, &config)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
    });

    for solution in results {
        let bits = |v: &DVector<f64>| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(
            bits(solution.joint_accelerations()),
            bits(expected.joint_accelerations())
        );
    }
}
