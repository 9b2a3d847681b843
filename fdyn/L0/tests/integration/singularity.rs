//! Accelerations that the constraints leave undetermined.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use nalgebra::DVector;

use fdyn_conformance_tests::{LinkSpec, tree};
use fdyn_core::{
    DynamicsConfig, DynamicsError, ForwardDynamicsQuery, Gravity, OrderingStrategy, Robot,
    forward_dynamics, forward_dynamics_reference,
};

const STRATEGIES: [OrderingStrategy; 3] = [
    OrderingStrategy::TipToRoot,
    OrderingStrategy::RootToTip,
    OrderingStrategy::Natural,
];

fn singular_at(err: DynamicsError) -> (String, String) {
    match err {
        DynamicsError::StructuralSingularity { variable, context } => (variable, context),
        other => panic!("expected a structural singularity, got {other}"),
    }
}

#[test]
fn massless_leaf_names_its_joint() {
    let robot = Robot::simple_r_with_mass(0.0).unwrap();
    let query = ForwardDynamicsQuery::new(DVector::zeros(2), DVector::from_vec(vec![0.0, 1.0]))
        .torques(DVector::from_vec(vec![0.0, 1.0]));
    for strategy in STRATEGIES {
        let err = forward_dynamics(&robot, &query, &DynamicsConfig::default().ordering(strategy))
            .unwrap_err();
        assert!(err.is_singular());
        assert!(err.to_string().contains("joint 'joint1'"), "{strategy}: {err}");
        assert_eq!(singular_at(err), ("a1".to_string(), "joint 'joint1'".to_string()));
    }
}

#[test]
fn massless_leaf_deep_in_a_chain() {
    let mut tip = LinkSpec::revolute(2);
    tip.mass = 0.0;
    let robot = tree(&[LinkSpec::revolute(0), LinkSpec::revolute(1), tip]).unwrap();
    let query = ForwardDynamicsQuery::at_rest(&robot);
    for strategy in STRATEGIES {
        let config = DynamicsConfig::earth().ordering(strategy);
        let (variable, context) = singular_at(forward_dynamics(&robot, &query, &config).unwrap_err());
        assert_eq!(variable, "a2", "{strategy}");
        assert_eq!(context, "joint 'joint3'", "{strategy}");
    }
}

#[test]
fn massless_intermediate_link_is_fine() {
    // The middle link carries nothing, but the tip gives every joint inertia.
    let mut middle = LinkSpec::revolute(1);
    middle.mass = 0.0;
    let robot = tree(&[LinkSpec::revolute(0), middle, LinkSpec::revolute(2)]).unwrap();
    let query = ForwardDynamicsQuery::at_rest(&robot).torques(DVector::from_element(3, 0.5));
    let solution = forward_dynamics(&robot, &query, &DynamicsConfig::default()).unwrap();
    let reference = forward_dynamics_reference(&robot, &query, &Gravity::zero()).unwrap();
    approx::assert_relative_eq!(solution.joint_accelerations(), &reference, epsilon = 1e-8);
}

#[test]
fn reference_agrees_on_singularity() {
    let robot = Robot::simple_r_with_mass(0.0).unwrap();
    let err = forward_dynamics_reference(&robot, &ForwardDynamicsQuery::at_rest(&robot), &Gravity::zero())
        .unwrap_err();
    assert_eq!(singular_at(err).1, "joint 'joint1'");
}
