//! Cartesian trajectory execution through a motion backend
pub mod sim;

use log::{debug, info, warn};

use crate::common::types::{Point, Pose};
use crate::error::{BackendError, ExecutionError};

/// Plan returned by the backend together with the share of the path it covers
#[derive(Debug, Clone)]
pub struct CartesianPlan<P> {
    pub plan: P,
    /// Achieved fraction of the requested waypoints, in `[0.0, 1.0]`
    pub fraction: f64,
}

/// Motion planning and execution collaborator
pub trait MotionBackend {
    /// Backend specific plan representation
    type Plan;

    /// Current end-effector pose
    fn current_pose(&mut self) -> Result<Pose, BackendError>;

    /// Plan a Cartesian path through `waypoints`
    fn plan_cartesian_path(
        &mut self,
        waypoints: &[Pose],
        max_step: f64,
        jump_threshold: f64,
    ) -> Result<CartesianPlan<Self::Plan>, BackendError>;

    /// Execute a plan, blocking until the motion is over.
    /// Returns `false` when the backend reports the motion failed.
    fn execute(&mut self, plan: &Self::Plan) -> Result<bool, BackendError>;
}

/// Result of running one trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExecutionOutcome {
    /// Full path planned and executed
    Completed,
    /// Only part of the path could be planned; nothing was executed
    Partial { fraction: f64 },
    /// Full path planned but the backend reported a failed execution
    Aborted,
}

/// Turns waypoint sequences into executed Cartesian motions
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryExecutor {
    /// Maximum translation between interpolated poses, meters
    max_step: f64,
    /// Joint-space jump limit, 0.0 disables the check
    jump_threshold: f64,
}

impl TrajectoryExecutor {
    /// Create a new executor
    pub fn new(max_step: f64, jump_threshold: f64) -> Self {
        TrajectoryExecutor {
            max_step,
            jump_threshold,
        }
    }

    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    pub fn jump_threshold(&self) -> f64 {
        self.jump_threshold
    }

    /// Plan a path through `waypoints` and execute it only if the whole
    /// path could be planned.
    ///
    /// Each waypoint takes its orientation from the current end-effector
    /// pose; only the position comes from the point.
    pub fn run<B: MotionBackend + ?Sized>(
        &self,
        backend: &mut B,
        waypoints: &[Point],
    ) -> Result<ExecutionOutcome, ExecutionError> {
        if waypoints.is_empty() {
            return Err(ExecutionError::EmptyTrajectory);
        }

        let template = backend.current_pose()?;
        let poses: Vec<Pose> = waypoints
            .iter()
            .map(|p| template.with_position(*p))
            .collect();

        let CartesianPlan { plan, fraction } =
            backend.plan_cartesian_path(&poses, self.max_step, self.jump_threshold)?;
        debug!(
            "Planned {} waypoints, achieved fraction {}",
            poses.len(),
            fraction
        );

        if fraction == 1.0 {
            info!("Full trajectory computed!");
            if backend.execute(&plan)? {
                Ok(ExecutionOutcome::Completed)
            } else {
                warn!("Backend reported a failed execution");
                Ok(ExecutionOutcome::Aborted)
            }
        } else {
            warn!(
                "Could not compute full trajectory. Only {:.1}% achieved.",
                fraction * 100.0
            );
            Ok(ExecutionOutcome::Partial { fraction })
        }
    }
}

impl Default for TrajectoryExecutor {
    fn default() -> Self {
        TrajectoryExecutor::new(0.01, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::UnitQuaternion;

    /// Backend stub answering every plan request with a fixed fraction
    struct StubBackend {
        fraction: f64,
        execute_ok: bool,
        orientation: UnitQuaternion<f64>,
        planned: Vec<Vec<Pose>>,
        executed: Vec<usize>,
    }

    impl StubBackend {
        fn new(fraction: f64) -> Self {
            StubBackend {
                fraction,
                execute_ok: true,
                orientation: UnitQuaternion::from_euler_angles(std::f64::consts::PI, 0.0, 0.0),
                planned: Vec::new(),
                executed: Vec::new(),
            }
        }
    }

    impl MotionBackend for StubBackend {
        type Plan = usize;

        fn current_pose(&mut self) -> Result<Pose, BackendError> {
            Ok(Pose::new(Point::new(9.0, 9.0, 9.0), self.orientation))
        }

        fn plan_cartesian_path(
            &mut self,
            waypoints: &[Pose],
            _max_step: f64,
            _jump_threshold: f64,
        ) -> Result<CartesianPlan<usize>, BackendError> {
            self.planned.push(waypoints.to_vec());
            Ok(CartesianPlan {
                plan: self.planned.len(),
                fraction: self.fraction,
            })
        }

        fn execute(&mut self, plan: &usize) -> Result<bool, BackendError> {
            self.executed.push(*plan);
            Ok(self.execute_ok)
        }
    }

    fn square_path() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(0.1, 0.0, 0.0),
            Point::new(0.1, 0.1, 0.0),
        ]
    }

    #[test]
    fn test_full_plan_is_executed_once() {
        let mut backend = StubBackend::new(1.0);
        let outcome = TrajectoryExecutor::default()
            .run(&mut backend, &square_path())
            .unwrap();

        assert_eq!(outcome, ExecutionOutcome::Completed);
        assert_eq!(backend.executed, vec![1]);
    }

    #[test]
    fn test_partial_plan_is_not_executed() {
        let mut backend = StubBackend::new(0.5);
        let outcome = TrajectoryExecutor::default()
            .run(&mut backend, &square_path())
            .unwrap();

        assert_eq!(outcome, ExecutionOutcome::Partial { fraction: 0.5 });
        assert!(backend.executed.is_empty());
    }

    #[test]
    fn test_nearly_full_plan_is_still_partial() {
        let mut backend = StubBackend::new(0.999_999);
        let outcome = TrajectoryExecutor::default()
            .run(&mut backend, &square_path())
            .unwrap();

        assert!(matches!(outcome, ExecutionOutcome::Partial { .. }));
        assert!(backend.executed.is_empty());
    }

    #[test]
    fn test_failed_execution_is_reported() {
        let mut backend = StubBackend::new(1.0);
        backend.execute_ok = false;

        let outcome = TrajectoryExecutor::default()
            .run(&mut backend, &square_path())
            .unwrap();

        assert_eq!(outcome, ExecutionOutcome::Aborted);
    }

    #[test]
    fn test_waypoints_take_current_orientation() {
        let mut backend = StubBackend::new(1.0);
        let path = square_path();
        TrajectoryExecutor::default().run(&mut backend, &path).unwrap();

        let poses = &backend.planned[0];
        assert_eq!(poses.len(), path.len());
        for (pose, point) in poses.iter().zip(&path) {
            assert_eq!(pose.position, *point);
            assert_eq!(pose.orientation, backend.orientation);
        }
    }

    #[test]
    fn test_empty_trajectory_rejected() {
        let mut backend = StubBackend::new(1.0);
        let result = TrajectoryExecutor::default().run(&mut backend, &[]);

        assert!(matches!(result, Err(ExecutionError::EmptyTrajectory)));
        assert!(backend.planned.is_empty());
    }
}
