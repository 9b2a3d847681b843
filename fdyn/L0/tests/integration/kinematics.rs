//! Frame and inertia invariants of constructed robots.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use approx::assert_relative_eq;
use nalgebra::{DVector, Matrix3};
use proptest::prelude::*;

use fdyn_conformance_tests::{LinkSpec, forked_tree, tree};
use fdyn_core::{Robot, forward_kinematics};
use fdyn_types::{DynamicsError, JointType, LinkDescription, MassProperties, Pose, RobotDescription};

fn assert_com_consistent(robot: &Robot, q: &DVector<f64>) {
    let poses = forward_kinematics(robot, q).unwrap();
    for link in robot.links() {
        let w_t_l = poses.link_pose(link.id()).unwrap();
        let w_t_com = poses.com_pose(link.id()).unwrap();
        assert_relative_eq!(
            (w_t_l * link.l_t_com()).to_homogeneous(),
            w_t_com.to_homogeneous(),
            epsilon = 1e-9
        );
    }
}

#[test]
fn model_frames_compose() {
    for robot in [
        Robot::simple_r().unwrap(),
        Robot::serial_chain(4, 0.3, 2.0).unwrap(),
        forked_tree().unwrap(),
    ] {
        for link in robot.links() {
            assert_relative_eq!(
                (link.w_t_l() * link.l_t_com()).to_homogeneous(),
                link.w_t_com().to_homogeneous(),
                epsilon = 1e-12
            );
            assert_relative_eq!(*link.inertia(), link.inertia().transpose(), epsilon = 1e-12);
            assert_relative_eq!(
                *link.spatial_inertia(),
                link.spatial_inertia().transpose(),
                epsilon = 1e-12
            );
        }
        assert_com_consistent(&robot, &DVector::from_element(robot.num_joints(), 0.4));
    }
}

#[test]
fn asymmetric_inertia_is_rejected() {
    let mut inertia = Matrix3::identity();
    inertia[(0, 1)] = 0.2;
    let description = RobotDescription::new().link(LinkDescription::new(
        "skewed",
        MassProperties::new(1.0, inertia),
        Pose::identity(),
    ));
    let err = Robot::from_description(&description).unwrap_err();
    assert!(matches!(err, DynamicsError::InvalidMassProperties { .. }));
    assert!(err.is_construction_error());
}

fn arb_link(max_parent: usize) -> impl Strategy<Value = LinkSpec> {
    (
        0..=max_parent,
        prop::array::uniform3(-1.0..1.0f64),
        prop::array::uniform3(-3.0..3.0f64),
        prop::array::uniform3(-0.5..0.5f64),
        prop::array::uniform3(-1.0..1.0f64),
        prop::bool::ANY,
    )
        .prop_map(|(parent, offset, euler, com, axis, prismatic)| LinkSpec {
            parent,
            offset,
            euler,
            com,
            axis,
            joint_type: if prismatic {
                JointType::Prismatic
            } else {
                JointType::Revolute
            },
            ..LinkSpec::revolute(parent)
        })
}

proptest! {
    #[test]
    fn com_pose_is_link_pose_times_com_offset(
        links in prop::collection::vec(arb_link(6), 1..7),
        angles in prop::collection::vec(-3.0..3.0f64, 7),
    ) {
        let robot = tree(&links).unwrap();
        let q = DVector::from_fn(robot.num_joints(), |i, _| angles[i]);
        assert_com_consistent(&robot, &q);
    }
}
