//! Closed-form curve generators
//!
//! Every generator is pure: it validates its parameters, then returns the
//! waypoints in traversal order. Nothing is published or executed here.

use std::f64::consts::PI;

use nalgebra::{Point2, Rotation2};

use crate::common::types::{Point, Waypoints};
use crate::error::GeometryError;

/// Circle of `radius` around `center`, sampled at `2π·i/samples` for
/// `i` in `0..=samples`. The last point repeats the first.
pub fn circle(center: &Point, radius: f64, samples: usize) -> Result<Waypoints, GeometryError> {
    require_samples("circle", samples, 1)?;
    require_point("circle", "center", center)?;
    require_length("circle", "radius", radius)?;

    Ok((0..=samples)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / samples as f64;
            Point::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
                center.z,
            )
        })
        .collect())
}

/// Axis-aligned rectangle boundary, clockwise from the top-left corner.
///
/// Each side contributes `samples` points starting at its first corner, so
/// the result holds `4 * samples` points and does not repeat the start.
pub fn rectangle(
    center: &Point,
    width: f64,
    height: f64,
    samples: usize,
) -> Result<Waypoints, GeometryError> {
    require_samples("rectangle", samples, 1)?;
    require_point("rectangle", "center", center)?;
    require_length("rectangle", "width", width)?;
    require_length("rectangle", "height", height)?;

    Ok(outline(center, width, height, samples)
        .map(|p| Point::new(p.x, p.y, center.z))
        .collect())
}

/// Square boundary, traversed like [`rectangle`]
pub fn square(center: &Point, side: f64, samples: usize) -> Result<Waypoints, GeometryError> {
    require_length("square", "side", side)?;
    rectangle(center, side, side, samples)
}

/// Rectangle boundary rotated by `angle_degrees` about the origin.
///
/// The rotation pivots on (0, 0), not on `center`: a rectangle away from the
/// origin swings around it as the angle grows.
pub fn rotated_rectangle(
    center: &Point,
    width: f64,
    height: f64,
    angle_degrees: f64,
    samples: usize,
) -> Result<Waypoints, GeometryError> {
    require_samples("rotated rectangle", samples, 1)?;
    require_point("rotated rectangle", "center", center)?;
    require_length("rotated rectangle", "width", width)?;
    require_length("rotated rectangle", "height", height)?;
    require_finite("rotated rectangle", "angle", angle_degrees)?;

    let rotation = Rotation2::new(angle_degrees.to_radians());

    Ok(outline(center, width, height, samples)
        .map(|p| {
            let rotated = rotation * p;
            Point::new(rotated.x, rotated.y, center.z)
        })
        .collect())
}

/// Straight segment from `from` to `to`, both ends included.
///
/// The endpoints' z is ignored; every point lies on z = 0.
pub fn line(from: &Point, to: &Point, samples: usize) -> Result<Waypoints, GeometryError> {
    require_samples("line", samples, 1)?;
    require_point("line", "start", from)?;
    require_point("line", "end", to)?;

    let x_step = (to.x - from.x) / samples as f64;
    let y_step = (to.y - from.y) / samples as f64;

    Ok((0..=samples)
        .map(|i| {
            let i = i as f64;
            Point::new(from.x + i * x_step, from.y + i * y_step, 0.0)
        })
        .collect())
}

/// Half circle whose diameter is the chord `from`-`to`.
///
/// Angles run from 0 to `π·direction`, measured from the +x axis around the
/// chord midpoint, so the arc starts on the +x side of the midpoint whatever
/// the order of the endpoints. A positive direction sweeps counter-clockwise.
/// Points lie on z = 0.
pub fn semicircle(
    from: &Point,
    to: &Point,
    direction: f64,
    samples: usize,
) -> Result<Waypoints, GeometryError> {
    require_samples("semicircle", samples, 2)?;
    require_point("semicircle", "start", from)?;
    require_point("semicircle", "end", to)?;
    require_finite("semicircle", "direction", direction)?;

    let center = Point2::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
    let radius = nalgebra::distance(&Point2::new(from.x, from.y), &center);
    let last = (samples - 1) as f64;

    Ok((0..samples)
        .map(|i| {
            let theta = PI * i as f64 / last * direction;
            Point::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
                0.0,
            )
        })
        .collect())
}

/// Unrotated rectangle corners walked side by side in the xy plane
fn outline(
    center: &Point,
    width: f64,
    height: f64,
    samples: usize,
) -> impl Iterator<Item = Point2<f64>> {
    let (left, right) = (center.x - width / 2.0, center.x + width / 2.0);
    let (bottom, top) = (center.y - height / 2.0, center.y + height / 2.0);
    let step_width = width / samples as f64;
    let step_height = height / samples as f64;

    let top_edge = (0..samples).map(move |i| Point2::new(left + i as f64 * step_width, top));
    let right_edge = (0..samples).map(move |i| Point2::new(right, top - i as f64 * step_height));
    let bottom_edge =
        (0..samples).map(move |i| Point2::new(right - i as f64 * step_width, bottom));
    let left_edge = (0..samples).map(move |i| Point2::new(left, bottom + i as f64 * step_height));

    top_edge.chain(right_edge).chain(bottom_edge).chain(left_edge)
}

fn require_samples(shape: &'static str, got: usize, min: usize) -> Result<(), GeometryError> {
    if got < min {
        return Err(GeometryError::TooFewSamples { shape, min, got });
    }
    Ok(())
}

fn require_finite(shape: &'static str, name: &'static str, value: f64) -> Result<(), GeometryError> {
    if !value.is_finite() {
        return Err(GeometryError::InvalidParameter { shape, name, value });
    }
    Ok(())
}

fn require_length(shape: &'static str, name: &'static str, value: f64) -> Result<(), GeometryError> {
    require_finite(shape, name, value)?;
    if value < 0.0 {
        return Err(GeometryError::InvalidParameter { shape, name, value });
    }
    Ok(())
}

fn require_point(shape: &'static str, name: &'static str, point: &Point) -> Result<(), GeometryError> {
    match point.coords.iter().find(|c| !c.is_finite()) {
        Some(&value) => Err(GeometryError::InvalidParameter { shape, name, value }),
        None => Ok(()),
    }
}
