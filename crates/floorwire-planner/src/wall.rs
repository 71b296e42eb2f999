//! Walls derived from the room polygon.

use serde::{Deserialize, Serialize};

use crate::geometry;
use crate::types::Point;

/// One edge of the room polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wall {
    /// First vertex.
    pub start: Point,
    /// Second vertex.
    pub end: Point,
}

impl Wall {
    /// Create a wall between two vertices.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Length in inches.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Angle to the +x axis in degrees, in `[0, 360)`.
    #[must_use]
    pub fn angle_degrees(&self) -> f64 {
        let dx = f64::from(self.end.x - self.start.x);
        let dy = f64::from(self.end.y - self.start.y);
        let deg = dy.atan2(dx).to_degrees();
        if deg < 0.0 { deg + 360.0 } else { deg }
    }

    /// Closest point on the wall to `p`, rounded to whole inches.
    #[must_use]
    pub fn project(&self, p: Point) -> Point {
        geometry::project_onto_segment(p, self.start, self.end)
    }

    /// Distance from `p` to the wall.
    #[must_use]
    pub fn distance_to(&self, p: Point) -> f64 {
        geometry::dist_point_segment(p, self.start, self.end)
    }

    /// Returns `true` if the segment `a`-`b` runs parallel to this wall
    /// within a loose angular tolerance (about 5 degrees for short sides).
    #[must_use]
    pub fn is_parallel_to(&self, a: Point, b: Point) -> bool {
        let (dx1, dy1) = (i64::from(b.x - a.x), i64::from(b.y - a.y));
        let (dx2, dy2) = (
            i64::from(self.end.x - self.start.x),
            i64::from(self.end.y - self.start.y),
        );
        (dx1 * dy2 - dy1 * dx2).abs() < 50
    }

    /// Smallest distance between the wall and segment `a`-`b`, measured
    /// from each endpoint to the other segment.
    #[must_use]
    pub fn distance_to_segment(&self, a: Point, b: Point) -> f64 {
        [
            self.distance_to(a),
            self.distance_to(b),
            geometry::dist_point_segment(self.start, a, b),
            geometry::dist_point_segment(self.end, a, b),
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min)
    }
}

/// Walls of a closed polygon, one per edge, closing back to the first
/// vertex.
#[must_use]
pub fn walls_of(polygon: &[Point]) -> Vec<Wall> {
    if polygon.len() < 2 {
        return Vec::new();
    }
    polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(a, b)| Wall::new(*a, *b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_close_the_polygon() {
        let square = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        let walls = walls_of(&square);
        assert_eq!(walls.len(), 4);
        assert_eq!(walls[3], Wall::new(Point::new(0, 10), Point::new(0, 0)));
    }

    #[test]
    fn angles() {
        let east = Wall::new(Point::new(0, 0), Point::new(10, 0));
        let south = Wall::new(Point::new(0, 10), Point::new(0, 0));
        assert!(east.angle_degrees().abs() < 1e-9);
        assert!((south.angle_degrees() - 270.0).abs() < 1e-9);
    }

    #[test]
    fn parallel_and_distance() {
        let wall = Wall::new(Point::new(0, 0), Point::new(100, 0));
        assert!(wall.is_parallel_to(Point::new(40, 1), Point::new(48, 1)));
        assert!(!wall.is_parallel_to(Point::new(40, 1), Point::new(40, 9)));
        assert!((wall.distance_to_segment(Point::new(40, 1), Point::new(48, 1)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn projection() {
        let wall = Wall::new(Point::new(0, 0), Point::new(0, 50));
        assert_eq!(wall.project(Point::new(7, 20)), Point::new(0, 20));
        assert!((wall.distance_to(Point::new(7, 20)) - 7.0).abs() < 1e-9);
    }
}
