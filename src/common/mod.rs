//! Common types shared by the generators, the executor and the adapters

/// Common types used across the codebase
pub mod types {
    use nalgebra::{Point3, UnitQuaternion};

    /// A Cartesian point in meters
    pub type Point = Point3<f64>;

    /// Ordered waypoints, first to last in traversal order
    pub type Waypoints = Vec<Point>;

    /// An end-effector pose
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Pose {
        pub position: Point,
        pub orientation: UnitQuaternion<f64>,
    }

    impl Pose {
        /// Create a pose
        pub fn new(position: Point, orientation: UnitQuaternion<f64>) -> Self {
            Pose {
                position,
                orientation,
            }
        }

        /// Same orientation, new position
        pub fn with_position(&self, position: Point) -> Self {
            Pose {
                position,
                orientation: self.orientation,
            }
        }
    }

    impl Default for Pose {
        fn default() -> Self {
            Pose::new(Point::origin(), UnitQuaternion::identity())
        }
    }

}
