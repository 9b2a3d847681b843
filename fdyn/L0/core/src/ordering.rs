//! Elimination orderings for the dynamics graph.

use fdyn_linear::{GaussianFactorGraph, Ordering};
use fdyn_types::OrderingStrategy;

use crate::keys::{joint_accel_key, tip_wrench_key, twist_accel_key, wrench_key};
use crate::robot::Robot;

/// Elimination order for `graph` under `strategy`.
///
/// Every strategy names each variable of a graph built by
/// [`build_dynamics_graph`](crate::build_dynamics_graph) exactly once.
///
/// - [`OrderingStrategy::TipToRoot`] eliminates each link's tip wrench,
///   twist acceleration, joint wrench and joint acceleration from the leaves
///   inward, and the root's acceleration last. Separators stay bounded, so
///   elimination is linear in the number of links.
/// - [`OrderingStrategy::RootToTip`] eliminates all accelerations outward,
///   then all wrenches inward.
/// - [`OrderingStrategy::Natural`] follows first appearance in the graph.
#[must_use]
pub fn elimination_ordering(
    robot: &Robot,
    graph: &GaussianFactorGraph,
    strategy: OrderingStrategy,
) -> Ordering {
    match strategy {
        OrderingStrategy::Natural => Ordering::natural(graph),
        OrderingStrategy::TipToRoot => tip_to_root(robot),
        OrderingStrategy::RootToTip => root_to_tip(robot),
    }
}

fn tip_to_root(robot: &Robot) -> Ordering {
    let mut ordering = Ordering::default();
    for &link in robot.topological_links().iter().rev() {
        let Some(j) = robot.parent_joint(link) else {
            continue;
        };
        if robot.is_leaf(link) {
            ordering.push(tip_wrench_key(link));
        }
        ordering.push(twist_accel_key(link));
        ordering.push(wrench_key(j));
        if robot.joints()[j.index()].dof() > 0 {
            ordering.push(joint_accel_key(j));
        }
    }
    ordering.push(twist_accel_key(robot.root()));
    ordering
}

fn root_to_tip(robot: &Robot) -> Ordering {
    let mut ordering = Ordering::default();
    ordering.push(twist_accel_key(robot.root()));
    for &link in robot.topological_links() {
        let Some(j) = robot.parent_joint(link) else {
            continue;
        };
        ordering.push(twist_accel_key(link));
        if robot.joints()[j.index()].dof() > 0 {
            ordering.push(joint_accel_key(j));
        }
    }
    for &link in robot.topological_links().iter().rev() {
        let Some(j) = robot.parent_joint(link) else {
            continue;
        };
        if robot.is_leaf(link) {
            ordering.push(tip_wrench_key(link));
        }
        ordering.push(wrench_key(j));
    }
    ordering
}
