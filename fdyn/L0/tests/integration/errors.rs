//! Error taxonomy at the public API.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use nalgebra::{DVector, Point3, Vector3, Vector6};

use fdyn_core::{
    DynamicsConfig, DynamicsError, ForwardDynamics, ForwardDynamicsQuery, Robot, RobotBuilder,
    SpatialVector, forward_dynamics,
};
use fdyn_linear::{Key, Ordering};
use fdyn_types::{
    JointDescription, JointId, JointType, LinkDescription, LinkId, MassProperties, Pose,
};

fn block(name: &str, x: f64) -> LinkDescription {
    LinkDescription::new(
        name,
        MassProperties::sphere(1.0, 0.1),
        Pose::from_position(Point3::new(x, 0.0, 0.0)),
    )
}

fn hinge(name: &str, parent: &str, child: &str) -> JointDescription {
    JointDescription::revolute(name, parent, child, Vector3::z(), Point3::new(-1.0, 0.0, 0.0))
}

#[test]
fn construction_failures() {
    let cases: Vec<(RobotBuilder, &str)> = vec![
        (
            RobotBuilder::new().link(block("a", 0.0)).link(block("a", 1.0)),
            "duplicate link name",
        ),
        (
            RobotBuilder::new()
                .link(block("a", 0.0))
                .joint(hinge("j", "a", "ghost")),
            "unknown link 'ghost'",
        ),
        (
            RobotBuilder::new()
                .link(block("a", 0.0))
                .link(block("b", 1.0))
                .link(block("c", 2.0)),
            "multiple root links",
        ),
        (
            RobotBuilder::new()
                .link(block("a", 0.0))
                .link(block("b", 1.0))
                .joint(hinge("ab", "a", "b"))
                .joint(hinge("ba", "b", "a")),
            "no root link",
        ),
        (
            RobotBuilder::new()
                .link(block("root", 0.0))
                .link(block("b", 1.0))
                .link(block("c", 2.0))
                .joint(hinge("bc", "b", "c"))
                .joint(hinge("cb", "c", "b")),
            "not connected to root 'root'",
        ),
    ];

    for (builder, needle) in cases {
        let err = builder.build().unwrap_err();
        assert!(err.is_construction_error(), "{err}");
        assert!(err.to_string().contains(needle), "'{err}' lacks '{needle}'");
    }
}

#[test]
fn invalid_link_and_joint_data() {
    let err = RobotBuilder::new()
        .link(LinkDescription::new(
            "heavy",
            MassProperties::point_mass(-1.0),
            Pose::identity(),
        ))
        .build()
        .unwrap_err();
    assert!(matches!(err, DynamicsError::InvalidMassProperties { ref link, .. } if link == "heavy"));

    let err = RobotBuilder::new()
        .link(LinkDescription::new(
            "lost",
            MassProperties::massless(),
            Pose::from_position(Point3::new(f64::NAN, 0.0, 0.0)),
        ))
        .build()
        .unwrap_err();
    assert!(matches!(err, DynamicsError::InvalidPose { .. }));

    let err = RobotBuilder::new()
        .link(block("a", 0.0))
        .link(block("b", 1.0))
        .joint(JointDescription::new(
            "stretched",
            JointType::Revolute,
            "a",
            "b",
            Vector6::new(0.0, 0.0, 2.0, 0.0, 0.0, 0.0),
        ))
        .build()
        .unwrap_err();
    assert!(matches!(err, DynamicsError::InvalidScrewAxis { ref joint, .. } if joint == "stretched"));
}

#[test]
fn query_errors_come_before_solving() {
    let robot = Robot::serial_chain(3, 1.0, 1.0).unwrap();
    let config = DynamicsConfig::default();

    let err = forward_dynamics(
        &robot,
        &ForwardDynamicsQuery::new(DVector::zeros(2), DVector::zeros(3)),
        &config,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DynamicsError::DimensionMismatch {
            expected: 3,
            actual: 2,
            ..
        }
    ));

    let engine = ForwardDynamics::new(&robot, config).unwrap();
    let err = engine
        .build_graph(&ForwardDynamicsQuery::at_rest(&robot).torques(DVector::zeros(4)))
        .unwrap_err();
    assert!(err.is_dimension_mismatch());

    let trunk = robot.link_by_name("link_1").unwrap().id();
    let err = engine
        .solve(&ForwardDynamicsQuery::at_rest(&robot).tip_wrench(trunk, SpatialVector::zeros()))
        .unwrap_err();
    assert!(matches!(err, DynamicsError::InvalidInput { .. }));
}

#[test]
fn invalid_ordering() {
    let robot = Robot::simple_r().unwrap();
    let engine = ForwardDynamics::new(&robot, DynamicsConfig::default()).unwrap();
    let query = ForwardDynamicsQuery::at_rest(&robot);

    let mut keys: Vec<Key> = engine
        .ordering(&engine.build_graph(&query).unwrap())
        .as_slice()
        .to_vec();
    keys.push(Key::new('A', 0));
    let err = engine
        .solve_with_ordering(&query, &Ordering::from(keys))
        .unwrap_err();
    assert!(err.to_string().contains("invalid elimination ordering"), "{err}");
}

#[test]
fn unknown_keys_in_the_solution() {
    let robot = Robot::simple_r().unwrap();
    let solution =
        forward_dynamics(&robot, &ForwardDynamicsQuery::at_rest(&robot), &DynamicsConfig::default())
            .unwrap();

    assert_eq!(solution.joint_acceleration(JointId::new(0)).unwrap(), 0.0);
    for err in [
        solution.joint_acceleration(JointId::new(5)).unwrap_err(),
        solution.tip_wrench(LinkId::new(0)).map(|_| ()).unwrap_err(),
        solution.joint_torque(JointId::new(0)).unwrap_err(),
    ] {
        assert!(matches!(err, DynamicsError::UnknownKey { .. }), "{err}");
    }
}

#[test]
fn invalid_config() {
    let robot = Robot::simple_r().unwrap();
    let config = DynamicsConfig::default().gravity(fdyn_types::Gravity::custom(Vector3::new(
        0.0,
        f64::INFINITY,
        0.0,
    )));
    let err = forward_dynamics(&robot, &ForwardDynamicsQuery::at_rest(&robot), &config).unwrap_err();
    assert!(matches!(err, DynamicsError::InvalidConfig { .. }));
}
