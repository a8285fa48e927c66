//! In-process motion backend for dry runs

use log::debug;
use nalgebra::UnitQuaternion;

use super::{CartesianPlan, MotionBackend};
use crate::common::types::{Point, Pose};
use crate::error::BackendError;

/// Reach of a UR5 measured from the base, meters
pub const UR5_REACH: f64 = 0.85;

/// Kinematics-free arm that can reach any point within `reach` of the base.
///
/// Planning stops at the first waypoint outside the reach and reports the
/// covered share of the path, the way a real planner stops at the first
/// unreachable pose.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    pose: Pose,
    reach: f64,
    plans: usize,
    executions: usize,
}

impl SimulatedBackend {
    /// Create a new simulated arm with its tool pointing down
    pub fn new(reach: f64) -> Self {
        SimulatedBackend {
            pose: Pose::new(
                Point::new(0.0, 0.0, 0.3),
                UnitQuaternion::from_euler_angles(std::f64::consts::PI, 0.0, 0.0),
            ),
            reach,
            plans: 0,
            executions: 0,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Number of plan requests served
    pub fn plans(&self) -> usize {
        self.plans
    }

    /// Number of plans executed
    pub fn executions(&self) -> usize {
        self.executions
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        SimulatedBackend::new(UR5_REACH)
    }
}

impl MotionBackend for SimulatedBackend {
    type Plan = Vec<Pose>;

    fn current_pose(&mut self) -> Result<Pose, BackendError> {
        Ok(self.pose)
    }

    fn plan_cartesian_path(
        &mut self,
        waypoints: &[Pose],
        _max_step: f64,
        _jump_threshold: f64,
    ) -> Result<CartesianPlan<Vec<Pose>>, BackendError> {
        self.plans += 1;
        if waypoints.is_empty() {
            return Ok(CartesianPlan {
                plan: Vec::new(),
                fraction: 0.0,
            });
        }

        let plan: Vec<Pose> = waypoints
            .iter()
            .take_while(|pose| pose.position.coords.norm() <= self.reach)
            .copied()
            .collect();
        let fraction = plan.len() as f64 / waypoints.len() as f64;

        Ok(CartesianPlan { plan, fraction })
    }

    fn execute(&mut self, plan: &Vec<Pose>) -> Result<bool, BackendError> {
        match plan.last() {
            Some(last) => {
                debug!("Simulated arm moved through {} poses", plan.len());
                self.pose = *last;
                self.executions += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poses(points: &[(f64, f64)]) -> Vec<Pose> {
        points
            .iter()
            .map(|&(x, y)| Pose::default().with_position(Point::new(x, y, 0.0)))
            .collect()
    }

    #[test]
    fn test_reachable_path_plans_fully() {
        let mut backend = SimulatedBackend::new(1.0);
        let plan = backend
            .plan_cartesian_path(&poses(&[(0.1, 0.0), (0.5, 0.5)]), 0.01, 0.0)
            .unwrap();

        assert_eq!(plan.fraction, 1.0);
        assert!(backend.execute(&plan.plan).unwrap());
        assert_eq!(backend.pose().position, Point::new(0.5, 0.5, 0.0));
        assert_eq!(backend.executions(), 1);
    }

    #[test]
    fn test_planning_stops_at_first_unreachable_pose() {
        let mut backend = SimulatedBackend::new(1.0);
        let plan = backend
            .plan_cartesian_path(
                &poses(&[(0.1, 0.0), (2.0, 0.0), (0.2, 0.0), (0.3, 0.0)]),
                0.01,
                0.0,
            )
            .unwrap();

        assert_eq!(plan.fraction, 0.25);
        assert_eq!(plan.plan.len(), 1);
        assert_eq!(backend.plans(), 1);
    }

    #[test]
    fn test_empty_plan_does_not_move() {
        let mut backend = SimulatedBackend::default();
        let before = backend.pose();

        assert!(!backend.execute(&Vec::new()).unwrap());
        assert_eq!(backend.pose(), before);
    }
}
