//! Shape catalog describing the logo
//!
//! Shapes are stored in design units (millimetres by default). Each group
//! scales its shapes and shifts them by an offset in meters, which is how the
//! emblem and the lettering end up side by side.

use serde::{Deserialize, Serialize};

use crate::common::types::Point;
use crate::geometry::{ArcDirection, Placement, Shape};

/// Named, ordered set of shapes sharing one placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeGroup {
    pub name: String,
    #[serde(default = "unit_scale")]
    pub scale: f64,
    /// Planar shift applied after scaling, meters
    #[serde(default)]
    pub offset: [f64; 2],
    pub shapes: Vec<Shape>,
}

impl ShapeGroup {
    /// Maps design units of this group to meters in the robot frame
    pub fn placement(&self, units_per_meter: f64) -> Placement {
        Placement {
            scale: self.scale / units_per_meter,
            offset_x: self.offset[0],
            offset_y: self.offset[1],
        }
    }
}

/// Ordered shape groups making up a drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoCatalog {
    #[serde(default = "millimetres")]
    pub units_per_meter: f64,
    pub groups: Vec<ShapeGroup>,
}

fn unit_scale() -> f64 {
    1.0
}

fn millimetres() -> f64 {
    1000.0
}

/// Scale of the logo emblem and lettering
pub const LOGO_SCALE: f64 = 0.75;
/// Horizontal distance of each half of the logo from the base, meters
pub const LOGO_HALF_OFFSET: f64 = 0.4;

impl LogoCatalog {
    /// Ring and emblem on the left, the letters F, Z and U on the right
    pub fn logo() -> Self {
        let left = [-LOGO_HALF_OFFSET, 0.0];
        let right = [LOGO_HALF_OFFSET, 0.0];

        LogoCatalog {
            units_per_meter: millimetres(),
            groups: vec![
                group("ring", 1.0, left, vec![circle((0.0, 0.0), 400.0)]),
                group("emblem", LOGO_SCALE, left, emblem()),
                group("letter_f", LOGO_SCALE, right, letter_f()),
                group("letter_z", LOGO_SCALE, right, letter_z()),
                group("letter_u", LOGO_SCALE, right, letter_u()),
            ],
        }
    }

    /// The emblem at full size inside a 1.2 m ring, centered on the base
    pub fn full_size_emblem() -> Self {
        LogoCatalog {
            units_per_meter: millimetres(),
            groups: vec![
                group("ring", 1.0, [0.0, 0.0], vec![circle((0.0, 0.0), 1200.0)]),
                group("emblem", 1.0, [0.0, 0.0], emblem()),
            ],
        }
    }

    /// The letters at full size, centered on the base
    pub fn full_size_letters() -> Self {
        LogoCatalog {
            units_per_meter: millimetres(),
            groups: vec![
                group("letter_f", 1.0, [0.0, 0.0], letter_f()),
                group("letter_z", 1.0, [0.0, 0.0], letter_z()),
                group("letter_u", 1.0, [0.0, 0.0], letter_u()),
            ],
        }
    }

    pub fn group(&self, name: &str) -> Option<&ShapeGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Total number of shapes across all groups
    pub fn shape_count(&self) -> usize {
        self.groups.iter().map(|g| g.shapes.len()).sum()
    }
}

impl Default for LogoCatalog {
    fn default() -> Self {
        LogoCatalog::logo()
    }
}

fn group(name: &str, scale: f64, offset: [f64; 2], shapes: Vec<Shape>) -> ShapeGroup {
    ShapeGroup {
        name: name.to_string(),
        scale,
        offset,
        shapes,
    }
}

fn point((x, y): (f64, f64)) -> Point {
    Point::new(x, y, 0.0)
}

fn circle(center: (f64, f64), radius: f64) -> Shape {
    Shape::Circle {
        center: point(center),
        radius,
    }
}

fn rectangle(center: (f64, f64), width: f64, height: f64) -> Shape {
    Shape::Rectangle {
        center: point(center),
        width,
        height,
    }
}

fn line(from: (f64, f64), to: (f64, f64)) -> Shape {
    Shape::Line {
        from: point(from),
        to: point(to),
    }
}

fn emblem() -> Vec<Shape> {
    vec![
        // right glyph
        rectangle((200.0, 275.0), 220.0, 50.0),
        rectangle((200.0, 100.0), 220.0, 220.0),
        rectangle((200.0, -200.0), 280.0, 280.0),
        rectangle((130.0, -130.0), 140.0, 140.0),
        rectangle((270.0, -270.0), 140.0, 140.0),
        // left glyph
        rectangle((-200.0, 270.0), 100.0, 70.0),
        rectangle((-200.0, 160.0), 300.0, 50.0),
        rectangle((-200.0, -105.0), 100.0, 480.0),
        rectangle((-320.0, -30.0), 50.0, 200.0),
        rectangle((-80.0, -30.0), 50.0, 200.0),
    ]
}

fn letter_f() -> Vec<Shape> {
    vec![
        line((-330.0, 190.0), (-150.0, 190.0)),
        line((-330.0, 70.0), (-150.0, 70.0)),
        line((-330.0, 190.0), (-330.0, -220.0)),
    ]
}

fn letter_z() -> Vec<Shape> {
    vec![
        line((-70.0, 190.0), (130.0, 190.0)),
        line((-70.0, -220.0), (130.0, -220.0)),
        line((-70.0, -220.0), (130.0, 190.0)),
    ]
}

fn letter_u() -> Vec<Shape> {
    vec![
        line((205.0, 200.0), (205.0, -130.0)),
        line((350.0, 200.0), (350.0, -130.0)),
        Shape::Semicircle {
            from: point((205.0, -130.0)),
            to: point((350.0, -130.0)),
            direction: ArcDirection::Clockwise,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_logo_layout() {
        let catalog = LogoCatalog::logo();
        let names: Vec<&str> = catalog.groups.iter().map(|g| g.name.as_str()).collect();

        assert_eq!(
            names,
            vec!["ring", "emblem", "letter_f", "letter_z", "letter_u"]
        );
        assert_eq!(catalog.shape_count(), 20);
    }

    #[test]
    fn test_ring_is_unscaled_on_left_half() {
        let catalog = LogoCatalog::logo();
        let ring = catalog.group("ring").unwrap();
        match ring.shapes[0].placed(&ring.placement(catalog.units_per_meter)) {
            Shape::Circle { center, radius } => {
                assert_relative_eq!(center.x, -0.4, epsilon = 1e-12);
                assert_relative_eq!(center.y, 0.0, epsilon = 1e-12);
                assert_relative_eq!(radius, 0.4, epsilon = 1e-12);
            }
            other => panic!("expected the ring, got {:?}", other),
        }
    }

    #[test]
    fn test_letters_are_scaled_on_right_half() {
        let catalog = LogoCatalog::logo();
        let u = catalog.group("letter_u").unwrap();

        match u.shapes[2].placed(&u.placement(catalog.units_per_meter)) {
            Shape::Semicircle { from, to, .. } => {
                assert_relative_eq!(from.x, 205.0 / 1000.0 * 0.75 + 0.4, epsilon = 1e-12);
                assert_relative_eq!(to.x, 350.0 / 1000.0 * 0.75 + 0.4, epsilon = 1e-12);
                assert_relative_eq!(to.y, -130.0 / 1000.0 * 0.75, epsilon = 1e-12);
            }
            other => panic!("expected the U bowl, got {:?}", other),
        }
    }

    #[test]
    fn test_full_size_emblem_has_large_ring() {
        let catalog = LogoCatalog::full_size_emblem();

        assert_eq!(catalog.shape_count(), 11);
        assert!(matches!(
            catalog.groups[0].shapes[0],
            Shape::Circle { radius, .. } if radius == 1200.0
        ));
        assert_eq!(LogoCatalog::full_size_letters().shape_count(), 9);
    }

    #[test]
    fn test_group_defaults_from_yaml() {
        let yaml = r#"
groups:
  - name: dot
    shapes:
      - kind: circle
        center: [0, 0, 0]
        radius: 10
"#;
        let catalog: LogoCatalog = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(catalog.units_per_meter, 1000.0);
        assert_eq!(catalog.groups[0].scale, 1.0);
        assert_eq!(catalog.groups[0].offset, [0.0, 0.0]);
    }
}
