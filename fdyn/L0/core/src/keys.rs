//! Variable keys of the dynamics graph.
//!
//! | Family | Variable | Frame |
//! |---|---|---|
//! | `A<link>` | twist acceleration of a link | link COM |
//! | `F<joint>` | wrench the joint transmits onto its child | child COM |
//! | `a<joint>` | joint acceleration | scalar |
//! | `W<link>` | tip wrench a leaf exerts on its environment | leaf COM |

use fdyn_linear::Key;
use fdyn_types::{JointId, LinkId};

use crate::robot::Robot;

/// Family character of twist-acceleration keys.
pub const TWIST_ACCEL: char = 'A';
/// Family character of joint-wrench keys.
pub const WRENCH: char = 'F';
/// Family character of joint-acceleration keys.
pub const JOINT_ACCEL: char = 'a';
/// Family character of tip-wrench keys.
pub const TIP_WRENCH: char = 'W';

/// Twist acceleration of `link`.
#[must_use]
pub fn twist_accel_key(link: LinkId) -> Key {
    Key::new(TWIST_ACCEL, link.index() as u64)
}

/// Wrench transmitted through `joint`.
#[must_use]
pub fn wrench_key(joint: JointId) -> Key {
    Key::new(WRENCH, joint.index() as u64)
}

/// Acceleration of `joint`.
#[must_use]
pub fn joint_accel_key(joint: JointId) -> Key {
    Key::new(JOINT_ACCEL, joint.index() as u64)
}

/// Tip wrench of leaf `link`.
#[must_use]
pub fn tip_wrench_key(link: LinkId) -> Key {
    Key::new(TIP_WRENCH, link.index() as u64)
}

/// The link or joint a key belongs to, by name.
#[must_use]
pub fn describe_key(robot: &Robot, key: Key) -> String {
    let Ok(index) = usize::try_from(key.index()) else {
        return key.to_string();
    };
    match key.chr() {
        TWIST_ACCEL | TIP_WRENCH => robot.link_label(LinkId::new(index)),
        WRENCH | JOINT_ACCEL => robot.joint_label(JointId::new(index)),
        _ => key.to_string(),
    }
}
