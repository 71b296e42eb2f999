//! Shared types for the floorwire planning engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;

/// Largest accepted extent of a room or element along one axis, in inches.
pub const MAX_DIMENSION: i32 = 10_000;

/// A 2D point in room coordinates (inches).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: i32,
    /// Vertical position.
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Translate by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned rectangle anchored at its minimum corner.
///
/// Containment is inclusive on every side: a point on the border is
/// inside. Overlap between two rectangles is strict, so rectangles that
/// only share an edge do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum x.
    pub x: i32,
    /// Minimum y.
    pub y: i32,
    /// Extent along x.
    pub width: i32,
    /// Extent along y.
    pub length: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, length: i32) -> Self {
        Self {
            x,
            y,
            width,
            length,
        }
    }

    /// Minimum corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Maximum x.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Maximum y.
    #[must_use]
    pub const fn top(&self) -> i32 {
        self.y + self.length
    }

    /// Returns `true` if `p` lies inside or on the border.
    #[must_use]
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.top()
    }

    /// Returns `true` if the interiors of the two rectangles intersect.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.top()
            && self.top() > other.y
    }

    /// The four corners, counter-clockwise from the origin.
    #[must_use]
    pub const fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.top()),
            Point::new(self.x, self.top()),
        ]
    }

    /// Copy of `self` moved so its origin is `origin`.
    #[must_use]
    pub const fn moved_to(self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.width, self.length)
    }

    /// Copy of `self` with a new size and the same origin.
    #[must_use]
    pub const fn resized(self, width: i32, length: i32) -> Self {
        Self::new(self.x, self.y, width, length)
    }
}

/// Axis-aligned bounding box of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Point,
    /// Extent along x.
    pub width: i32,
    /// Extent along y.
    pub length: i32,
}

impl Bounds {
    /// Bounds anchored at the origin.
    #[must_use]
    pub const fn sized(width: i32, length: i32) -> Self {
        Self {
            min: Point::new(0, 0),
            width,
            length,
        }
    }

    /// Bounding box of a set of points, or `None` for an empty slice.
    #[must_use]
    pub fn of_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            min: Point::new(min_x, min_y),
            width: max_x - min_x,
            length: max_y - min_y,
        })
    }

    /// Maximum x.
    #[must_use]
    pub const fn max_x(&self) -> i32 {
        self.min.x + self.width
    }

    /// Maximum y.
    #[must_use]
    pub const fn max_y(&self) -> i32 {
        self.min.y + self.length
    }

    /// Integer centre (halves truncate toward the minimum corner).
    #[must_use]
    pub const fn centre(&self) -> Point {
        Point::new(self.min.x + self.width / 2, self.min.y + self.length / 2)
    }

    /// The bounding box as a [`Rect`].
    #[must_use]
    pub const fn as_rect(&self) -> Rect {
        Rect::new(self.min.x, self.min.y, self.width, self.length)
    }
}

/// A planned heating-wire route.
///
/// Consecutive points form the wire's segments. The route also records
/// the parameters it was planned with and the room bounds at the time,
/// which are refreshed whenever the room is resized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WireRoute {
    points: Vec<Point>,
    /// Requested total length in inches.
    pub target_length: u32,
    /// Requested spacing between adjacent runs in inches.
    pub spacing: u32,
    /// Room bounds the route was recorded against.
    pub bounds: Bounds,
}

impl WireRoute {
    /// Create a route from its points and planning parameters.
    #[must_use]
    pub const fn new(points: Vec<Point>, target_length: u32, spacing: u32, bounds: Bounds) -> Self {
        Self {
            points,
            target_length,
            spacing,
            bounds,
        }
    }

    /// Same parameters, different points.
    #[must_use]
    pub fn with_points(&self, points: Vec<Point>) -> Self {
        Self {
            points,
            ..self.clone()
        }
    }

    /// Returns `true` if the route has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    /// Consumes the route and returns its points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Iterator over consecutive point pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// Total Euclidean length in inches.
    #[must_use]
    pub fn length(&self) -> f64 {
        path_length(&self.points)
    }

    /// Returns `true` if every segment is horizontal or vertical.
    #[must_use]
    pub fn is_axis_aligned(&self) -> bool {
        self.segments().all(|(a, b)| a.x == b.x || a.y == b.y)
    }
}

/// Total Euclidean length of a polyline.
#[must_use]
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Errors raised by room editing operations.
///
/// Every failing operation leaves the room unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum RoomError {
    /// A width or length is non-positive or exceeds [`MAX_DIMENSION`].
    #[error("invalid dimensions {width}x{length} (each must be in 1..={MAX_DIMENSION})")]
    InvalidDimensions {
        /// Requested width.
        width: i32,
        /// Requested length.
        length: i32,
    },

    /// The element would not lie entirely inside the room polygon.
    #[error("element is not entirely inside the room")]
    OutOfBounds,

    /// The furniture rectangle would overlap another furniture item.
    #[error("position is occupied by furniture {0}")]
    Overlap(ElementId),

    /// A heating element or thermostat does not touch a wall.
    #[error("heating elements and thermostats must touch a wall")]
    NotAgainstWall,

    /// The room already has a thermostat.
    #[error("the room already has a thermostat")]
    DuplicateThermostat,

    /// The operation needs a room but none has been created.
    #[error("no room has been created")]
    NoRoom,

    /// No element with this id is registered.
    #[error("no element with id {0}")]
    UnknownElement(ElementId),

    /// The furniture kind has no drain.
    #[error("furniture {0} has no drain")]
    NoDrain(ElementId),

    /// A polygon needs at least three vertices.
    #[error("a room polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// A vertex index is out of range.
    #[error("vertex index {index} out of range for {len} vertices")]
    VertexIndex {
        /// Requested index.
        index: usize,
        /// Number of vertices.
        len: usize,
    },

    /// The grid rejected the request.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Errors raised by grid configuration and the legacy assemble operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum GridError {
    /// Grid spacing must be at least one inch (32/32).
    #[error("grid spacing {0}/32\" is below the 1\" minimum")]
    InvalidSpacing(u32),

    /// Assembling a room needs at least three intersections.
    #[error("assembling a room needs at least 3 intersections, got {0}")]
    TooFewIntersections(usize),

    /// An intersection id does not exist in the generated grid.
    #[error("intersection {0} does not exist")]
    UnknownIntersection(String),

    /// Every chosen intersection neighbours every other one.
    #[error("intersections must not all be neighbours of each other")]
    AllNeighbours,
}

/// Errors raised by the planner and the extender.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum PlanError {
    /// The grid is not generated or not confirmed.
    #[error("the grid must be generated and confirmed before planning")]
    GridNotReady,

    /// The extension anchor is not a point of the given path.
    #[error("anchor {0} is not on the path")]
    AnchorNotInPath(Point),

    /// The extension anchor is not a grid intersection.
    #[error("anchor {0} is not a grid intersection")]
    AnchorNotOnGrid(Point),

    /// The operation needs a room but none has been created.
    #[error("no room has been created")]
    NoRoom,
}

/// Validate a width/length pair against the accepted range.
///
/// # Errors
///
/// Returns [`RoomError::InvalidDimensions`] when either value is
/// non-positive or exceeds [`MAX_DIMENSION`].
pub const fn check_dimensions(width: i32, length: i32) -> Result<(), RoomError> {
    if width <= 0 || length <= 0 || width > MAX_DIMENSION || length > MAX_DIMENSION {
        return Err(RoomError::InvalidDimensions { width, length });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        assert!((Point::new(0, 0).distance(Point::new(3, 4)) - 5.0).abs() < 1e-12);
        assert!((Point::new(-2, 1).distance_squared(Point::new(1, 5)) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn defaults_sit_at_the_origin() {
        assert_eq!(Point::default(), Point::new(0, 0));
        assert_eq!(Bounds::default(), Bounds::sized(0, 0));
        assert_eq!(WireRoute::default().bounds.min, Point::new(0, 0));
    }

    #[test]
    fn point_display() {
        assert_eq!(Point::new(3, -4).to_string(), "(3, -4)");
    }

    #[test]
    fn rect_containment_is_inclusive() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(Point::new(10, 10)));
        assert!(r.contains(Point::new(15, 15)));
        assert!(!r.contains(Point::new(16, 12)));
    }

    #[test]
    fn rect_sharing_an_edge_does_not_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Rect::new(9, 9, 4, 4)));
    }

    #[test]
    fn bounds_of_points() {
        let b = Bounds::of_points(&[Point::new(5, 2), Point::new(-1, 8), Point::new(3, 3)]).unwrap();
        assert_eq!(b.min, Point::new(-1, 2));
        assert_eq!((b.width, b.length), (6, 6));
        assert_eq!(b.centre(), Point::new(2, 5));
        assert!(Bounds::of_points(&[]).is_none());
    }

    #[test]
    fn wire_route_length_and_alignment() {
        let route = WireRoute::new(
            vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 6)],
            100,
            6,
            Bounds::sized(20, 20),
        );
        assert!((route.length() - 16.0).abs() < 1e-12);
        assert!(route.is_axis_aligned());
        assert_eq!(route.segments().count(), 2);

        let diagonal = route.with_points(vec![Point::new(0, 0), Point::new(3, 4)]);
        assert!(!diagonal.is_axis_aligned());
        assert_eq!(diagonal.target_length, 100);
    }

    #[test]
    fn dimension_limits() {
        assert!(check_dimensions(1, MAX_DIMENSION).is_ok());
        assert_eq!(
            check_dimensions(0, 10),
            Err(RoomError::InvalidDimensions {
                width: 0,
                length: 10
            })
        );
        assert!(check_dimensions(10, MAX_DIMENSION + 1).is_err());
    }

    #[test]
    fn errors_serialize() {
        let err = RoomError::Grid(GridError::InvalidSpacing(16));
        let json = serde_json::to_string(&err).unwrap();
        let back: RoomError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
        assert!(err.to_string().contains("16/32"));
    }
}
