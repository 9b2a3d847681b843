//! Fluent construction of robots.

use fdyn_types::{JointDescription, LinkDescription, Result, RobotDescription};

use super::Robot;

/// Incremental builder for a [`Robot`].
///
/// Collects link and joint descriptions and validates them all at once in
/// [`RobotBuilder::build`].
///
/// # Example
///
/// ```
/// use fdyn_core::RobotBuilder;
/// use fdyn_types::{JointDescription, LinkDescription, MassProperties, Pose};
/// use nalgebra::{Point3, Vector3};
///
/// let robot = RobotBuilder::new()
///     .link(LinkDescription::new("base", MassProperties::massless(), Pose::identity()))
///     .link(LinkDescription::new(
///         "arm",
///         MassProperties::rod_x(1.0, 1.0),
///         Pose::from_position(Point3::new(0.5, 0.0, 0.0)),
///     ))
///     .joint(JointDescription::revolute(
///         "shoulder",
///         "base",
///         "arm",
///         Vector3::z(),
///         Point3::new(-0.5, 0.0, 0.0),
///     ))
///     .build()?;
///
/// assert_eq!(robot.nq(), 1);
/// # Ok::<(), fdyn_types::DynamicsError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RobotBuilder {
    description: RobotDescription,
}

impl RobotBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a link.
    #[must_use]
    pub fn link(mut self, link: LinkDescription) -> Self {
        self.description.links.push(link);
        self
    }

    /// Add a joint. Joint order defines the layout of every joint vector.
    #[must_use]
    pub fn joint(mut self, joint: JointDescription) -> Self {
        self.description.joints.push(joint);
        self
    }

    /// The description accumulated so far.
    #[must_use]
    pub fn description(&self) -> &RobotDescription {
        &self.description
    }

    /// Validate and build the robot.
    ///
    /// # Errors
    ///
    /// See [`Robot::from_description`].
    pub fn build(self) -> Result<Robot> {
        Robot::from_description(&self.description)
    }
}
