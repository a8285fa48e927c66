pub mod common;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logo;
#[cfg(feature = "ros")]
pub mod ros;
pub mod trajectory;
pub mod visualization;

use crate::common::types::{Point, Waypoints};
use crate::config::DrawLogoConfig;
use crate::error::{ExecutionError, GeometryError};
use crate::geometry::Shape;
use crate::trajectory::{ExecutionOutcome, MotionBackend, TrajectoryExecutor};
use crate::visualization::{DisplayChannel, MarkerPublisher};

/// Everything a drawing needs: the arm, the marker display and the
/// trajectory settings. Passed explicitly to every drawing call.
pub struct DrawingSession<B, D> {
    backend: B,
    markers: MarkerPublisher<D>,
    executor: TrajectoryExecutor,
    samples: usize,
}

impl<B: MotionBackend, D: DisplayChannel> DrawingSession<B, D> {
    /// Create a new drawing session
    pub fn new(
        backend: B,
        markers: MarkerPublisher<D>,
        executor: TrajectoryExecutor,
        samples: usize,
    ) -> Self {
        DrawingSession {
            backend,
            markers,
            executor,
            samples,
        }
    }

    /// Create a session with the trajectory and marker settings of `config`
    pub fn from_config(backend: B, display: D, config: &DrawLogoConfig) -> Self {
        DrawingSession::new(
            backend,
            MarkerPublisher::new(display, config.marker.clone()),
            TrajectoryExecutor::new(config.trajectory.max_step, config.trajectory.jump_threshold),
            config.trajectory.samples,
        )
    }

    /// Waypoints tracing `shape` at this session's sample count
    pub fn waypoints(&self, shape: &Shape) -> Result<Waypoints, GeometryError> {
        shape.waypoints(self.samples)
    }

    /// Publish a marker per waypoint, then plan and execute the path
    pub fn trace(&mut self, waypoints: &[Point]) -> Result<ExecutionOutcome, ExecutionError> {
        self.markers.publish_path(waypoints);
        self.executor.run(&mut self.backend, waypoints)
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn markers(&self) -> &MarkerPublisher<D> {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut MarkerPublisher<D> {
        &mut self.markers
    }
}
