//! Shape parameters and the curve generators that trace them
pub mod curves;

use serde::{Deserialize, Serialize};

use crate::common::types::{Point, Waypoints};
use crate::error::GeometryError;

/// Side of the chord a semicircle bulges into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum ArcDirection {
    /// Angles grow from 0 to π
    CounterClockwise,
    /// Angles shrink from 0 to -π
    Clockwise,
}

impl ArcDirection {
    /// Sign applied to the sweep angle
    pub fn sign(self) -> f64 {
        match self {
            ArcDirection::CounterClockwise => 1.0,
            ArcDirection::Clockwise => -1.0,
        }
    }
}

impl TryFrom<i8> for ArcDirection {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ArcDirection::CounterClockwise),
            -1 => Ok(ArcDirection::Clockwise),
            other => Err(format!("arc direction must be 1 or -1, got {}", other)),
        }
    }
}

impl From<ArcDirection> for i8 {
    fn from(direction: ArcDirection) -> Self {
        direction.sign() as i8
    }
}

/// A drawable outline and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Circle {
        center: Point,
        radius: f64,
    },
    Square {
        center: Point,
        side: f64,
    },
    Rectangle {
        center: Point,
        width: f64,
        height: f64,
    },
    RotatedRectangle {
        center: Point,
        width: f64,
        height: f64,
        angle_degrees: f64,
    },
    Line {
        from: Point,
        to: Point,
    },
    Semicircle {
        from: Point,
        to: Point,
        direction: ArcDirection,
    },
}

/// Uniform scale followed by a planar shift
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Placement {
    pub fn identity() -> Self {
        Placement {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    fn point(&self, p: &Point) -> Point {
        Point::new(
            p.x * self.scale + self.offset_x,
            p.y * self.scale + self.offset_y,
            p.z * self.scale,
        )
    }

    fn length(&self, value: f64) -> f64 {
        value * self.scale
    }
}

impl Shape {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Circle { .. } => "circle",
            Shape::Square { .. } => "square",
            Shape::Rectangle { .. } => "rectangle",
            Shape::RotatedRectangle { .. } => "rotated_rectangle",
            Shape::Line { .. } => "line",
            Shape::Semicircle { .. } => "semicircle",
        }
    }

    /// The same shape with every coordinate and length mapped through `placement`.
    /// Angles and arc directions are unchanged.
    pub fn placed(&self, placement: &Placement) -> Shape {
        match self {
            Shape::Circle { center, radius } => Shape::Circle {
                center: placement.point(center),
                radius: placement.length(*radius),
            },
            Shape::Square { center, side } => Shape::Square {
                center: placement.point(center),
                side: placement.length(*side),
            },
            Shape::Rectangle {
                center,
                width,
                height,
            } => Shape::Rectangle {
                center: placement.point(center),
                width: placement.length(*width),
                height: placement.length(*height),
            },
            Shape::RotatedRectangle {
                center,
                width,
                height,
                angle_degrees,
            } => Shape::RotatedRectangle {
                center: placement.point(center),
                width: placement.length(*width),
                height: placement.length(*height),
                angle_degrees: *angle_degrees,
            },
            Shape::Line { from, to } => Shape::Line {
                from: placement.point(from),
                to: placement.point(to),
            },
            Shape::Semicircle {
                from,
                to,
                direction,
            } => Shape::Semicircle {
                from: placement.point(from),
                to: placement.point(to),
                direction: *direction,
            },
        }
    }

    /// Generate the waypoints tracing this shape
    pub fn waypoints(&self, samples: usize) -> Result<Waypoints, GeometryError> {
        match self {
            Shape::Circle { center, radius } => curves::circle(center, *radius, samples),
            Shape::Square { center, side } => curves::square(center, *side, samples),
            Shape::Rectangle {
                center,
                width,
                height,
            } => curves::rectangle(center, *width, *height, samples),
            Shape::RotatedRectangle {
                center,
                width,
                height,
                angle_degrees,
            } => curves::rotated_rectangle(center, *width, *height, *angle_degrees, samples),
            Shape::Line { from, to } => curves::line(from, to, samples),
            Shape::Semicircle {
                from,
                to,
                direction,
            } => curves::semicircle(from, to, direction.sign(), samples),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_placement_scales_then_shifts() {
        let placement = Placement {
            scale: 0.75 / 1000.0,
            offset_x: 0.4,
            offset_y: 0.0,
        };
        let shape = Shape::Line {
            from: Point::new(-330.0, 190.0, 0.0),
            to: Point::new(-150.0, 190.0, 0.0),
        };

        match shape.placed(&placement) {
            Shape::Line { from, to } => {
                assert_relative_eq!(from.x, -330.0 / 1000.0 * 0.75 + 0.4, epsilon = 1e-12);
                assert_relative_eq!(from.y, 190.0 / 1000.0 * 0.75, epsilon = 1e-12);
                assert_relative_eq!(to.x, -150.0 / 1000.0 * 0.75 + 0.4, epsilon = 1e-12);
            }
            other => panic!("placement changed the shape kind: {:?}", other),
        }
    }

    #[test]
    fn test_placement_keeps_angle_and_direction() {
        let placement = Placement {
            scale: 2.0,
            offset_x: 1.0,
            offset_y: 1.0,
        };
        let rotated = Shape::RotatedRectangle {
            center: Point::origin(),
            width: 1.0,
            height: 1.0,
            angle_degrees: 30.0,
        };
        let arc = Shape::Semicircle {
            from: Point::origin(),
            to: Point::new(1.0, 0.0, 0.0),
            direction: ArcDirection::Clockwise,
        };

        assert!(matches!(
            rotated.placed(&placement),
            Shape::RotatedRectangle { angle_degrees, width, .. } if angle_degrees == 30.0 && width == 2.0
        ));
        assert!(matches!(
            arc.placed(&placement),
            Shape::Semicircle { direction: ArcDirection::Clockwise, .. }
        ));
    }

    #[test]
    fn test_shape_dispatches_to_generator() {
        let shape = Shape::Circle {
            center: Point::origin(),
            radius: 0.4,
        };
        assert_eq!(shape.waypoints(100).unwrap().len(), 101);
        assert_eq!(shape.kind(), "circle");
    }

    #[test]
    fn test_shape_from_yaml() {
        let yaml = r#"
- kind: rectangle
  center: [200, 275, 0]
  width: 220
  height: 50
- kind: semicircle
  from: [205, -130, 0]
  to: [350, -130, 0]
  direction: -1
"#;
        let shapes: Vec<Shape> = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            shapes[0],
            Shape::Rectangle {
                center: Point::new(200.0, 275.0, 0.0),
                width: 220.0,
                height: 50.0,
            }
        );
        assert!(matches!(
            shapes[1],
            Shape::Semicircle { direction: ArcDirection::Clockwise, .. }
        ));
    }

    #[test]
    fn test_arc_direction_rejects_other_values() {
        assert!(ArcDirection::try_from(0).is_err());
        assert!(serde_yaml::from_str::<ArcDirection>("2").is_err());
        assert_eq!(i8::from(ArcDirection::CounterClockwise), 1);
    }
}
