//! Validated robot model: links, joints, and the tree that connects them.
//!
//! A [`Robot`] is built once from a [`RobotDescription`] (directly or through
//! [`RobotBuilder`]) and is immutable afterwards. Construction either succeeds
//! with a fully validated rooted tree or fails with a construction error; there
//! is no partially built robot.

mod builder;
mod factories;
mod joint;
mod link;

pub use builder::RobotBuilder;
pub use joint::Joint;
pub use link::Link;

use hashbrown::HashMap;
use tracing::debug;

use fdyn_types::{
    DynamicsError, JointDescription, JointId, JointType, LinkId, Pose, Result, RobotDescription,
};

use crate::spatial::SpatialVector;

/// Tolerance on the unit-norm conditions of screw axes.
const AXIS_TOLERANCE: f64 = 1e-6;

/// An articulated rigid-body tree.
#[derive(Debug, Clone)]
pub struct Robot {
    links: Vec<Link>,
    joints: Vec<Joint>,
    link_names: HashMap<String, LinkId>,
    joint_names: HashMap<String, JointId>,
    root: LinkId,
    parent_joint: Vec<Option<JointId>>,
    children: Vec<Vec<JointId>>,
    topological_links: Vec<LinkId>,
    topological_joints: Vec<JointId>,
    nq: usize,
}

impl Robot {
    /// Build a robot from a plain-data description.
    ///
    /// Joint declaration order defines the layout of every joint vector and of
    /// the joint-space mass matrix.
    ///
    /// # Errors
    ///
    /// Returns a construction-class [`DynamicsError`] for duplicate names,
    /// unknown or self-referencing links, anything other than a single rooted
    /// connected tree, invalid mass properties, non-rigid poses, screw axes that
    /// do not match their joint type, or invalid effort parameters.
    pub fn from_description(description: &RobotDescription) -> Result<Self> {
        let mut link_names = HashMap::with_capacity(description.links.len());
        let mut links = Vec::with_capacity(description.links.len());
        for (index, desc) in description.links.iter().enumerate() {
            let id = LinkId::new(index);
            if link_names.insert(desc.name.clone(), id).is_some() {
                return Err(DynamicsError::construction(format!(
                    "duplicate link name '{}'",
                    desc.name
                )));
            }
            let mass_properties = desc.mass_properties();
            mass_properties.validate(&desc.name)?;
            check_pose(&desc.pose, || format!("link '{}' pose", desc.name))?;
            check_pose(&desc.com, || format!("link '{}' center of mass", desc.name))?;
            links.push(Link::new(
                id,
                desc.name.clone(),
                mass_properties,
                desc.pose.to_isometry(),
                desc.com.to_isometry(),
            ));
        }

        if links.is_empty() {
            return Err(DynamicsError::construction("robot has no links"));
        }

        let mut joint_names = HashMap::with_capacity(description.joints.len());
        let mut joints = Vec::with_capacity(description.joints.len());
        let mut parent_joint: Vec<Option<JointId>> = vec![None; links.len()];
        let mut children: Vec<Vec<JointId>> = vec![Vec::new(); links.len()];
        let mut nq = 0;

        for (index, desc) in description.joints.iter().enumerate() {
            let id = JointId::new(index);
            if joint_names.insert(desc.name.clone(), id).is_some() {
                return Err(DynamicsError::construction(format!(
                    "duplicate joint name '{}'",
                    desc.name
                )));
            }

            let lookup = |name: &str| {
                link_names.get(name).copied().ok_or_else(|| {
                    DynamicsError::construction(format!(
                        "joint '{}' references unknown link '{name}'",
                        desc.name
                    ))
                })
            };
            let parent = lookup(&desc.parent)?;
            let child = lookup(&desc.child)?;
            if parent == child {
                return Err(DynamicsError::construction(format!(
                    "joint '{}' connects link '{}' to itself",
                    desc.name, desc.parent
                )));
            }
            if let Some(existing) = parent_joint[child.index()] {
                return Err(DynamicsError::construction(format!(
                    "link '{}' has two parent joints ('{}' and '{}')",
                    desc.child, description.joints[existing.index()].name, desc.name
                )));
            }

            let axis = check_screw_axis(desc)?;
            if !desc.effort.is_valid() {
                return Err(DynamicsError::construction(format!(
                    "joint '{}' has invalid effort parameters: {:?}",
                    desc.name, desc.effort
                )));
            }
            if let Some(limits) = &desc.limits {
                if !limits.is_valid() {
                    return Err(DynamicsError::construction(format!(
                        "joint '{}' has invalid limits",
                        desc.name
                    )));
                }
            }

            let mut joint = Joint::new(
                id,
                desc.name.clone(),
                desc.joint_type,
                desc.effort,
                parent,
                child,
                axis,
                desc.limits,
            );
            joint.dof_offset = nq;
            nq += joint.dof();
            joint.attach(
                links[parent.index()].w_t_com(),
                links[child.index()].w_t_com(),
                links[child.index()].l_t_com(),
            );

            parent_joint[child.index()] = Some(id);
            children[parent.index()].push(id);
            links[parent.index()].joints.push(id);
            links[child.index()].joints.push(id);
            joints.push(joint);
        }

        let roots: Vec<LinkId> = (0..links.len())
            .filter(|&i| parent_joint[i].is_none())
            .map(LinkId::new)
            .collect();
        let root = match roots.as_slice() {
            [root] => *root,
            [] => {
                return Err(DynamicsError::construction(
                    "no root link: every link has a parent joint, so the joints form a cycle",
                ));
            }
            many => {
                let names: Vec<&str> = many.iter().map(|id| links[id.index()].name()).collect();
                return Err(DynamicsError::construction(format!(
                    "multiple root links: {}",
                    names.join(", ")
                )));
            }
        };

        // Depth-first preorder from the root, children in declaration order.
        let mut topological_links = Vec::with_capacity(links.len());
        let mut topological_joints = Vec::with_capacity(joints.len());
        let mut stack = vec![root];
        while let Some(link) = stack.pop() {
            topological_links.push(link);
            if let Some(joint) = parent_joint[link.index()] {
                topological_joints.push(joint);
            }
            for &joint in children[link.index()].iter().rev() {
                stack.push(joints[joint.index()].child);
            }
        }

        if topological_links.len() != links.len() {
            let mut reached = vec![false; links.len()];
            for id in &topological_links {
                reached[id.index()] = true;
            }
            let names: Vec<&str> = links
                .iter()
                .filter(|l| !reached[l.id.index()])
                .map(Link::name)
                .collect();
            return Err(DynamicsError::construction(format!(
                "links not connected to root '{}' (disconnected or cyclic): {}",
                links[root.index()].name(),
                names.join(", ")
            )));
        }

        debug!(
            links = links.len(),
            joints = joints.len(),
            nq,
            root = links[root.index()].name(),
            "built robot"
        );

        Ok(Self {
            links,
            joints,
            link_names,
            joint_names,
            root,
            parent_joint,
            children,
            topological_links,
            topological_joints,
            nq,
        })
    }

    /// All links, indexed by [`LinkId`].
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// All joints, indexed by [`JointId`].
    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Link by id.
    #[must_use]
    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.index())
    }

    /// Joint by id.
    #[must_use]
    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.index())
    }

    /// Link by name.
    #[must_use]
    pub fn link_by_name(&self, name: &str) -> Option<&Link> {
        self.link_names.get(name).and_then(|&id| self.link(id))
    }

    /// Joint by name.
    #[must_use]
    pub fn joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.joint_names.get(name).and_then(|&id| self.joint(id))
    }

    /// The root link (the only link without a parent joint).
    #[must_use]
    pub fn root(&self) -> LinkId {
        self.root
    }

    /// Joints whose parent is `link`, in declaration order.
    #[must_use]
    pub fn children(&self, link: LinkId) -> &[JointId] {
        self.children
            .get(link.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The joint whose child is `link`; `None` for the root.
    #[must_use]
    pub fn parent_joint(&self, link: LinkId) -> Option<JointId> {
        self.parent_joint.get(link.index()).copied().flatten()
    }

    /// Whether `link` is a non-root link without child joints.
    #[must_use]
    pub fn is_leaf(&self, link: LinkId) -> bool {
        link != self.root && link.index() < self.links.len() && self.children(link).is_empty()
    }

    /// Non-root links without child joints, in topological order.
    #[must_use]
    pub fn leaves(&self) -> Vec<LinkId> {
        self.topological_links
            .iter()
            .copied()
            .filter(|&l| self.is_leaf(l))
            .collect()
    }

    /// Links in root-to-leaf order (depth-first preorder).
    #[must_use]
    pub fn topological_links(&self) -> &[LinkId] {
        &self.topological_links
    }

    /// Joints in root-to-leaf order.
    #[must_use]
    pub fn topological_joints(&self) -> &[JointId] {
        &self.topological_joints
    }

    /// Number of links.
    #[must_use]
    pub fn num_links(&self) -> usize {
        self.links.len()
    }

    /// Number of joints.
    #[must_use]
    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    /// Number of movable joints, the dimension of the joint-space mass matrix.
    ///
    /// Query and result vectors have [`Robot::num_joints`] entries instead.
    #[must_use]
    pub fn nq(&self) -> usize {
        self.nq
    }

    /// Row of `joint` in the joint-space mass matrix.
    #[must_use]
    pub fn dof_offset(&self, joint: JointId) -> Option<usize> {
        self.joint(joint).map(Joint::dof_offset)
    }

    /// Human-readable name of a link, falling back to its id.
    pub(crate) fn link_label(&self, id: LinkId) -> String {
        self.link(id)
            .map_or_else(|| id.to_string(), |l| format!("link '{}'", l.name()))
    }

    /// Human-readable name of a joint, falling back to its id.
    pub(crate) fn joint_label(&self, id: JointId) -> String {
        self.joint(id)
            .map_or_else(|| id.to_string(), |j| format!("joint '{}'", j.name()))
    }
}

fn check_pose(pose: &Pose, what: impl Fn() -> String) -> Result<()> {
    if !pose.is_finite() {
        return Err(DynamicsError::InvalidPose {
            what: what(),
            reason: "contains non-finite values".to_string(),
        });
    }
    if !pose.is_rigid() {
        return Err(DynamicsError::InvalidPose {
            what: what(),
            reason: "rotation is not a unit quaternion".to_string(),
        });
    }
    Ok(())
}

fn check_screw_axis(desc: &JointDescription) -> Result<SpatialVector> {
    let axis = desc.axis_vector();
    let fail = |reason: &str| DynamicsError::InvalidScrewAxis {
        joint: desc.name.clone(),
        reason: reason.to_string(),
    };

    if !axis.iter().all(|x| x.is_finite()) {
        return Err(fail("contains non-finite values"));
    }

    let w = axis.fixed_rows::<3>(0).norm();
    let v = axis.fixed_rows::<3>(3).norm();
    match desc.joint_type {
        JointType::Revolute if (w - 1.0).abs() > AXIS_TOLERANCE => {
            Err(fail("revolute axis must have a unit rotational part"))
        }
        JointType::Prismatic if w > AXIS_TOLERANCE || (v - 1.0).abs() > AXIS_TOLERANCE => Err(
            fail("prismatic axis must have zero rotational and unit translational part"),
        ),
        JointType::Fixed if w > AXIS_TOLERANCE || v > AXIS_TOLERANCE => {
            Err(fail("fixed joint must have a zero screw axis"))
        }
        _ => Ok(axis),
    }
}
