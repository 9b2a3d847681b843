//! Every elimination ordering solves the same system.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use approx::assert_relative_eq;
use nalgebra::DVector;

use fdyn_conformance_tests::forked_tree;
use fdyn_core::{
    DynamicsConfig, ForwardDynamics, ForwardDynamicsQuery, OrderingStrategy, Robot, SpatialVector,
    forward_dynamics,
};
use fdyn_linear::Ordering;

const STRATEGIES: [OrderingStrategy; 3] = [
    OrderingStrategy::TipToRoot,
    OrderingStrategy::RootToTip,
    OrderingStrategy::Natural,
];

fn busy_query(robot: &Robot) -> ForwardDynamicsQuery {
    let n = robot.num_joints();
    let mut query = ForwardDynamicsQuery::new(
        DVector::from_fn(n, |i, _| 0.7 - 0.25 * i as f64),
        DVector::from_fn(n, |i, _| 0.3 * i as f64 - 0.5),
    )
    .torques(DVector::from_fn(n, |i, _| 0.4 + 0.1 * i as f64))
    .base_accel(SpatialVector::new(0.1, -0.2, 0.05, 0.3, 0.0, -0.4))
    .base_twist(SpatialVector::new(0.0, 0.0, 0.2, 0.1, 0.0, 0.0));
    for (i, leaf) in robot.leaves().into_iter().enumerate() {
        let s = 1.0 + i as f64;
        query = query.tip_wrench(leaf, SpatialVector::new(0.1 * s, 0.0, -0.2, 0.5, -s, 0.3));
    }
    query
}

#[test]
fn strategies_agree_on_a_forked_tree() {
    let robot = forked_tree().unwrap();
    let query = busy_query(&robot);

    let solutions: Vec<_> = STRATEGIES
        .iter()
        .map(|&s| forward_dynamics(&robot, &query, &DynamicsConfig::earth().ordering(s)).unwrap())
        .collect();

    for other in &solutions[1..] {
        assert_relative_eq!(
            solutions[0].joint_accelerations(),
            other.joint_accelerations(),
            epsilon = 1e-8
        );
        for joint in robot.joints() {
            assert_relative_eq!(
                solutions[0].wrench(joint.id()).unwrap(),
                other.wrench(joint.id()).unwrap(),
                epsilon = 1e-8
            );
        }
        for link in robot.links() {
            assert_relative_eq!(
                solutions[0].twist_acceleration(link.id()).unwrap(),
                other.twist_acceleration(link.id()).unwrap(),
                epsilon = 1e-8
            );
        }
    }
}

#[test]
fn strategies_agree_on_a_long_chain() {
    let robot = Robot::serial_chain(12, 0.4, 0.8).unwrap();
    let query = busy_query(&robot);
    let reference = forward_dynamics(&robot, &query, &DynamicsConfig::earth()).unwrap();
    for strategy in STRATEGIES {
        let solution =
            forward_dynamics(&robot, &query, &DynamicsConfig::earth().ordering(strategy)).unwrap();
        assert_relative_eq!(
            reference.joint_accelerations(),
            solution.joint_accelerations(),
            epsilon = 1e-7
        );
    }
}

#[test]
fn reversed_natural_ordering_also_works() {
    let robot = forked_tree().unwrap();
    let query = busy_query(&robot);
    let engine = ForwardDynamics::new(&robot, DynamicsConfig::earth()).unwrap();
    let built = engine.build_graph(&query).unwrap();
    let natural = Ordering::natural(built.graph());
    let reversed: Ordering = natural.as_slice().iter().rev().copied().collect();

    let expected = engine.solve(&query).unwrap();
    let solution = engine.solve_with_ordering(&query, &reversed).unwrap();
    assert_relative_eq!(
        expected.joint_accelerations(),
        solution.joint_accelerations(),
        epsilon = 1e-8
    );
}

#[test]
fn tip_to_root_keeps_separators_small() {
    let robot = Robot::serial_chain(24, 0.5, 1.0).unwrap();
    let engine = ForwardDynamics::new(&robot, DynamicsConfig::default()).unwrap();
    let built = engine.build_graph(&ForwardDynamicsQuery::at_rest(&robot)).unwrap();
    let bayes_net = built
        .graph()
        .eliminate(&engine.ordering(&built), DynamicsConfig::default().rank_tolerance)
        .unwrap();
    assert!(bayes_net.max_parents() <= 3, "{}", bayes_net.max_parents());
}
