//! Per-waypoint visualization markers

use log::{debug, warn};
use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

use crate::common::types::Point;
use crate::error::DisplayError;

/// Marker color, components in `[0.0, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

/// How markers are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    LineStrip,
}

/// What the display channel should do with a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerAction {
    Add,
}

/// Style shared by every marker of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Frame the marker points are expressed in
    pub frame_id: String,
    pub color: Rgba,
    /// Line width, meters
    pub line_width: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        MarkerStyle {
            frame_id: "base_link".to_string(),
            color: Rgba {
                r: 0.635,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
            line_width: 0.025,
        }
    }
}

/// A single-point marker
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: i32,
    pub frame_id: String,
    pub kind: MarkerKind,
    pub action: MarkerAction,
    pub color: Rgba,
    pub line_width: f64,
    pub orientation: UnitQuaternion<f64>,
    pub points: Vec<Point>,
}

/// Where markers are rendered
pub trait DisplayChannel {
    /// Hand a marker over; no acknowledgement beyond the transport result
    fn publish(&mut self, marker: &Marker) -> Result<(), DisplayError>;
}

impl<T: DisplayChannel + ?Sized> DisplayChannel for &mut T {
    fn publish(&mut self, marker: &Marker) -> Result<(), DisplayError> {
        (**self).publish(marker)
    }
}

/// Builds one marker per point and assigns identifiers.
///
/// Identifiers count up from 0 and restart on [`MarkerPublisher::reset_ids`],
/// so a redraw replaces the markers of the previous one.
pub struct MarkerPublisher<D> {
    channel: D,
    style: MarkerStyle,
    next_id: i32,
    failures: usize,
}

impl<D: DisplayChannel> MarkerPublisher<D> {
    /// Create a new marker publisher
    pub fn new(channel: D, style: MarkerStyle) -> Self {
        MarkerPublisher {
            channel,
            style,
            next_id: 0,
            failures: 0,
        }
    }

    /// Start a new identifier range
    pub fn reset_ids(&mut self) {
        self.next_id = 0;
    }

    /// Identifier the next marker will get
    pub fn next_id(&self) -> i32 {
        self.next_id
    }

    /// Markers the channel refused so far
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn channel(&self) -> &D {
        &self.channel
    }

    /// Build the marker for `point` with identifier `id`
    pub fn marker(&self, id: i32, point: Point) -> Marker {
        Marker {
            id,
            frame_id: self.style.frame_id.clone(),
            kind: MarkerKind::LineStrip,
            action: MarkerAction::Add,
            color: self.style.color,
            line_width: self.style.line_width,
            orientation: UnitQuaternion::identity(),
            points: vec![point],
        }
    }

    /// Publish a marker for one point and return its identifier
    pub fn publish_point(&mut self, point: Point) -> i32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let marker = self.marker(id, point);
        if let Err(e) = self.channel.publish(&marker) {
            self.failures += 1;
            warn!("{}", e);
        }
        id
    }

    /// Publish one marker per point, in order
    pub fn publish_path(&mut self, points: &[Point]) {
        for point in points {
            self.publish_point(*point);
        }
        debug!("Published {} markers, next id {}", points.len(), self.next_id);
    }
}

/// Display channel that only logs what it is given
#[derive(Debug, Default)]
pub struct LogDisplay {
    published: usize,
}

impl LogDisplay {
    pub fn new() -> Self {
        LogDisplay::default()
    }

    pub fn published(&self) -> usize {
        self.published
    }
}

impl DisplayChannel for LogDisplay {
    fn publish(&mut self, marker: &Marker) -> Result<(), DisplayError> {
        self.published += 1;
        log::trace!(
            "marker {} in {} at {:?}",
            marker.id,
            marker.frame_id,
            marker.points
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingDisplay {
        markers: Vec<Marker>,
        refuse: bool,
    }

    impl DisplayChannel for RecordingDisplay {
        fn publish(&mut self, marker: &Marker) -> Result<(), DisplayError> {
            if self.refuse {
                return Err(DisplayError {
                    id: marker.id,
                    reason: "channel closed".to_string(),
                });
            }
            self.markers.push(marker.clone());
            Ok(())
        }
    }

    #[test]
    fn test_marker_carries_fixed_style() {
        let publisher = MarkerPublisher::new(RecordingDisplay::default(), MarkerStyle::default());
        let marker = publisher.marker(7, Point::new(0.1, 0.2, 0.0));

        assert_eq!(marker.id, 7);
        assert_eq!(marker.frame_id, "base_link");
        assert_eq!(marker.kind, MarkerKind::LineStrip);
        assert_eq!(marker.action, MarkerAction::Add);
        assert_eq!(marker.color.r, 0.635);
        assert_eq!(marker.color.a, 1.0);
        assert_eq!(marker.line_width, 0.025);
        assert_eq!(marker.orientation, UnitQuaternion::identity());
        assert_eq!(marker.points, vec![Point::new(0.1, 0.2, 0.0)]);
    }

    #[test]
    fn test_ids_count_up_and_restart() {
        let mut publisher =
            MarkerPublisher::new(RecordingDisplay::default(), MarkerStyle::default());
        let points = vec![Point::origin(); 3];

        publisher.publish_path(&points);
        publisher.publish_path(&points[..1]);
        publisher.reset_ids();
        publisher.publish_point(Point::origin());

        let ids: Vec<i32> = publisher.channel().markers.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_refused_markers_are_counted_not_fatal() {
        let display = RecordingDisplay {
            refuse: true,
            ..Default::default()
        };
        let mut publisher = MarkerPublisher::new(display, MarkerStyle::default());

        publisher.publish_path(&[Point::origin(), Point::origin()]);

        assert_eq!(publisher.failures(), 2);
        assert_eq!(publisher.next_id(), 2);
    }

    #[test]
    fn test_style_alpha_defaults_to_opaque() {
        let style: MarkerStyle =
            serde_yaml::from_str("color: { r: 0.0, g: 0.5, b: 1.0 }").unwrap();

        assert_eq!(style.color.a, 1.0);
        assert_eq!(style.frame_id, "base_link");
    }
}
