//! Forward dynamics by factor-graph elimination.

use tracing::{debug, warn};

use fdyn_linear::{LinearError, Ordering};
use fdyn_types::{DynamicsConfig, DynamicsError, Result};

use crate::factors::{DynamicsGraph, ForwardDynamicsQuery, build_dynamics_graph};
use crate::keys::describe_key;
use crate::ordering::elimination_ordering;
use crate::robot::Robot;
use crate::solution::ForwardDynamicsSolution;

/// Translate a linear-solver error into a dynamics error naming the link or
/// joint involved.
#[must_use]
pub fn map_linear_error(robot: &Robot, error: LinearError) -> DynamicsError {
    match error {
        LinearError::StructuralSingularity { key } => DynamicsError::StructuralSingularity {
            variable: key.to_string(),
            context: describe_key(robot, key),
        },
        LinearError::Inconsistent { residual } => DynamicsError::InconsistentSystem {
            reason: format!("leftover residual {residual:.3e}"),
        },
        LinearError::InvalidOrdering { reason } => {
            DynamicsError::invalid_input(format!("invalid elimination ordering: {reason}"))
        }
        LinearError::DimensionMismatch {
            what,
            expected,
            actual,
        } => DynamicsError::dimension_mismatch(what, expected, actual),
        LinearError::MissingKey { key } => DynamicsError::UnknownKey {
            key: format!("{key} ({})", describe_key(robot, key)),
        },
    }
}

/// Forward-dynamics engine for one robot.
///
/// Holds the robot by reference; every [`solve`](Self::solve) builds its own
/// graph, so an engine can be shared freely between queries.
///
/// # Example
///
/// ```
/// use fdyn_core::{ForwardDynamics, ForwardDynamicsQuery, Robot};
/// use fdyn_types::DynamicsConfig;
/// use nalgebra::DVector;
///
/// let robot = Robot::simple_r()?;
/// let engine = ForwardDynamics::new(&robot, DynamicsConfig::default())?;
/// // One entry per joint: the weld `joint0`, then the hinge `joint1`.
/// let query = ForwardDynamicsQuery::at_rest(&robot).torques(DVector::from_vec(vec![0.0, 7.0 / 6.0]));
/// let solution = engine.solve(&query)?;
/// assert_eq!(solution.joint_accelerations()[0], 0.0);
/// assert!((solution.joint_accelerations()[1] - 1.0).abs() < 1e-9);
/// # Ok::<(), fdyn_types::DynamicsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ForwardDynamics<'a> {
    robot: &'a Robot,
    config: DynamicsConfig,
}

impl<'a> ForwardDynamics<'a> {
    /// Create an engine.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicsError::InvalidConfig`] if the configuration is invalid.
    pub fn new(robot: &'a Robot, config: DynamicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { robot, config })
    }

    /// The robot.
    #[must_use]
    pub fn robot(&self) -> &'a Robot {
        self.robot
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &DynamicsConfig {
        &self.config
    }

    /// Build the factor graph of `query` without solving it.
    ///
    /// # Errors
    ///
    /// See [`build_dynamics_graph`].
    pub fn build_graph(&self, query: &ForwardDynamicsQuery) -> Result<DynamicsGraph> {
        build_dynamics_graph(self.robot, query, &self.config.gravity)
    }

    /// The elimination order the configured strategy picks for `graph`.
    #[must_use]
    pub fn ordering(&self, graph: &DynamicsGraph) -> Ordering {
        elimination_ordering(self.robot, graph.graph(), self.config.ordering)
    }

    /// Solve for the joint accelerations of `query`.
    ///
    /// # Errors
    ///
    /// - [`DynamicsError::DimensionMismatch`] or [`DynamicsError::InvalidInput`]
    ///   for a malformed query
    /// - [`DynamicsError::StructuralSingularity`] if the accelerations are not
    ///   uniquely determined (for example a joint driving only massless links)
    /// - [`DynamicsError::InconsistentSystem`] if the constraints contradict
    pub fn solve(&self, query: &ForwardDynamicsQuery) -> Result<ForwardDynamicsSolution> {
        let built = self.build_graph(query)?;
        let ordering = self.ordering(&built);
        self.solve_graph(built, &ordering)
    }

    /// Solve with a caller-supplied elimination order.
    ///
    /// # Errors
    ///
    /// As [`solve`](Self::solve), plus [`DynamicsError::InvalidInput`] if the
    /// ordering does not name every variable exactly once.
    pub fn solve_with_ordering(
        &self,
        query: &ForwardDynamicsQuery,
        ordering: &Ordering,
    ) -> Result<ForwardDynamicsSolution> {
        let built = self.build_graph(query)?;
        self.solve_graph(built, ordering)
    }

    fn solve_graph(&self, built: DynamicsGraph, ordering: &Ordering) -> Result<ForwardDynamicsSolution> {
        let (graph, twists) = built.into_parts();
        let values = graph
            .optimize(ordering, self.config.rank_tolerance)
            .map_err(|e| {
                let error = map_linear_error(self.robot, e);
                warn!(%error, "forward dynamics failed");
                error
            })?;
        debug!(
            strategy = %self.config.ordering,
            variables = values.len(),
            "forward dynamics solved"
        );
        ForwardDynamicsSolution::new(self.robot, values, twists)
    }
}

/// Solve one forward-dynamics query.
///
/// Shorthand for [`ForwardDynamics::new`] followed by
/// [`ForwardDynamics::solve`].
///
/// # Errors
///
/// See [`ForwardDynamics::new`] and [`ForwardDynamics::solve`].
pub fn forward_dynamics(
    robot: &Robot,
    query: &ForwardDynamicsQuery,
    config: &DynamicsConfig,
) -> Result<ForwardDynamicsSolution> {
    ForwardDynamics::new(robot, config.clone())?.solve(query)
}
