//! Logo composition: catalog shapes in, executed trajectories out
pub mod catalog;

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use self::catalog::{LogoCatalog, ShapeGroup};
use crate::error::DrawError;
use crate::trajectory::{ExecutionOutcome, MotionBackend};
use crate::visualization::DisplayChannel;
use crate::DrawingSession;

/// Longest uninterrupted sleep while waiting between redraws
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// What happened to one shape
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeReport {
    pub group: String,
    pub index: usize,
    pub kind: &'static str,
    pub waypoints: usize,
    pub outcome: ExecutionOutcome,
}

/// Outcomes of one drawing pass, in drawing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawReport {
    pub shapes: Vec<ShapeReport>,
}

impl DrawReport {
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::Completed))
    }

    pub fn partial(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::Partial { .. }))
    }

    pub fn aborted(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::Aborted))
    }

    fn count(&self, pred: impl Fn(&ExecutionOutcome) -> bool) -> usize {
        self.shapes.iter().filter(|s| pred(&s.outcome)).count()
    }
}

/// Draws the groups of a catalog, shape by shape, in catalog order
#[derive(Debug, Clone)]
pub struct LogoComposer {
    catalog: LogoCatalog,
}

impl LogoComposer {
    /// Create a new composer
    pub fn new(catalog: LogoCatalog) -> Self {
        LogoComposer { catalog }
    }

    pub fn catalog(&self) -> &LogoCatalog {
        &self.catalog
    }

    /// Draw every group once
    pub fn draw_logo<B, D>(
        &self,
        session: &mut DrawingSession<B, D>,
    ) -> Result<DrawReport, DrawError>
    where
        B: MotionBackend,
        D: DisplayChannel,
    {
        session.markers_mut().reset_ids();

        let mut report = DrawReport::default();
        for group in &self.catalog.groups {
            self.draw_shapes(group, session, &mut report)?;
        }

        info!(
            "Logo drawn: {} completed, {} partial, {} aborted",
            report.completed(),
            report.partial(),
            report.aborted()
        );
        Ok(report)
    }

    /// Draw a single group by name
    pub fn draw_group<B, D>(
        &self,
        session: &mut DrawingSession<B, D>,
        name: &str,
    ) -> Result<DrawReport, DrawError>
    where
        B: MotionBackend,
        D: DisplayChannel,
    {
        let group = self
            .catalog
            .group(name)
            .ok_or_else(|| DrawError::UnknownGroup(name.to_string()))?;

        let mut report = DrawReport::default();
        self.draw_shapes(group, session, &mut report)?;
        Ok(report)
    }

    /// Redraw the logo until `running` turns false.
    ///
    /// The flag is read before each redraw only; a redraw that has started
    /// always finishes. Returns the number of completed redraws.
    pub fn run<B, D>(
        &self,
        session: &mut DrawingSession<B, D>,
        interval: Duration,
        running: &AtomicBool,
    ) -> Result<usize, DrawError>
    where
        B: MotionBackend,
        D: DisplayChannel,
    {
        let mut redraws = 0;
        while running.load(Ordering::SeqCst) {
            self.draw_logo(session)?;
            redraws += 1;
            wait_interval(interval, running);
        }
        info!("Stopped after {} redraws", redraws);
        Ok(redraws)
    }

    fn draw_shapes<B, D>(
        &self,
        group: &ShapeGroup,
        session: &mut DrawingSession<B, D>,
        report: &mut DrawReport,
    ) -> Result<(), DrawError>
    where
        B: MotionBackend,
        D: DisplayChannel,
    {
        let placement = group.placement(self.catalog.units_per_meter);

        for (index, shape) in group.shapes.iter().enumerate() {
            let placed = shape.placed(&placement);
            let waypoints = session
                .waypoints(&placed)
                .map_err(|source| DrawError::Geometry {
                    group: group.name.clone(),
                    index,
                    source,
                })?;
            debug!(
                "{}[{}]: {} with {} waypoints",
                group.name,
                index,
                placed.kind(),
                waypoints.len()
            );

            let outcome = session.trace(&waypoints)?;
            if let ExecutionOutcome::Partial { fraction } = outcome {
                warn!(
                    "Skipped {}[{}] ({}), only {:.1}% planned",
                    group.name,
                    index,
                    placed.kind(),
                    fraction * 100.0
                );
            }

            report.shapes.push(ShapeReport {
                group: group.name.clone(),
                index,
                kind: placed.kind(),
                waypoints: waypoints.len(),
                outcome,
            });
        }
        Ok(())
    }
}

/// Sleep for `interval` or until `running` turns false, whichever is first.
/// An interval too large for `Instant` only ends on shutdown.
fn wait_interval(interval: Duration, running: &AtomicBool) {
    let deadline = Instant::now().checked_add(interval);
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        let pause = match deadline {
            Some(deadline) if now >= deadline => break,
            Some(deadline) => (deadline - now).min(SHUTDOWN_POLL),
            None => SHUTDOWN_POLL,
        };
        thread::sleep(pause);
    }
}
