//! Integer geometry kernel.
//!
//! Coordinates are whole inches stored as `i32`. Orientation tests widen
//! to `i64` so products of coordinates up to `±10⁵` cannot overflow.
//! Distances are `f64` and callers compare them against thresholds with
//! strict less-than.

use crate::types::{Point, Rect};

/// Turn direction of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The three points lie on one line.
    Collinear,
    /// `p -> q -> r` turns clockwise (y up).
    Clockwise,
    /// `p -> q -> r` turns counter-clockwise (y up).
    CounterClockwise,
}

/// Orientation of the triple `(p, q, r)`.
///
/// Sign of `(q.y − p.y)(r.x − q.x) − (q.x − p.x)(r.y − q.y)`.
#[must_use]
pub fn orientation(p: Point, q: Point, r: Point) -> Orientation {
    let val = (i64::from(q.y) - i64::from(p.y)) * (i64::from(r.x) - i64::from(q.x))
        - (i64::from(q.x) - i64::from(p.x)) * (i64::from(r.y) - i64::from(q.y));
    match val.cmp(&0) {
        std::cmp::Ordering::Equal => Orientation::Collinear,
        std::cmp::Ordering::Greater => Orientation::Clockwise,
        std::cmp::Ordering::Less => Orientation::CounterClockwise,
    }
}

/// Returns `true` if `p`, known to be collinear with `a`-`b`, lies on the
/// segment but is neither of its endpoints.
fn strictly_inside(p: Point, a: Point, b: Point) -> bool {
    p != a
        && p != b
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

/// Returns `true` if segment `a`-`b` intersects segment `c`-`d`.
///
/// Counts proper crossings and collinear touches where an endpoint of one
/// segment lies strictly inside the other. Segments that only share an
/// endpoint do not intersect, so consecutive wire segments meeting at a
/// turn are never reported.
///
/// ```
/// use floorwire_planner::geometry::segments_intersect;
/// use floorwire_planner::Point;
///
/// let p = Point::new;
/// assert!(segments_intersect(p(0, 0), p(10, 10), p(0, 10), p(10, 0)));
/// assert!(!segments_intersect(p(0, 0), p(10, 0), p(10, 0), p(10, 10)));
/// ```
#[must_use]
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);

    let all_turn = [o1, o2, o3, o4]
        .iter()
        .all(|o| *o != Orientation::Collinear);
    if all_turn {
        return o1 != o2 && o3 != o4;
    }

    (o1 == Orientation::Collinear && strictly_inside(c, a, b))
        || (o2 == Orientation::Collinear && strictly_inside(d, a, b))
        || (o3 == Orientation::Collinear && strictly_inside(a, c, d))
        || (o4 == Orientation::Collinear && strictly_inside(b, c, d))
}

/// Even-odd point-in-polygon test.
///
/// Casts a ray along +x. Each edge counts when the half-open rule
/// `y1 ≤ y < y2` (in either edge direction) holds, so a ray passing
/// through a vertex is counted once.
#[must_use]
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let px = f64::from(p.x);
    let py = f64::from(p.y);
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = (f64::from(polygon[i].x), f64::from(polygon[i].y));
        let (xj, yj) = (f64::from(polygon[j].x), f64::from(polygon[j].y));
        let spans = (yj <= py && yi > py) || (yj > py && yi <= py);
        if spans {
            let x_cross = (xi - xj).mul_add((py - yj) / (yi - yj), xj);
            if px < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance from `p` to segment `a`-`b`.
///
/// The projection parameter is clamped to `[0, 1]`; a degenerate segment
/// measures the distance to its single point.
#[must_use]
pub fn dist_point_segment(p: Point, a: Point, b: Point) -> f64 {
    let (px, py) = (f64::from(p.x), f64::from(p.y));
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let dx = f64::from(b.x) - ax;
    let dy = f64::from(b.y) - ay;
    if a == b {
        return p.distance(a);
    }
    let len_sq = dx.mul_add(dx, dy * dy);
    let t = ((px - ax).mul_add(dx, (py - ay) * dy) / len_sq).clamp(0.0, 1.0);
    let cx = t.mul_add(dx, ax);
    let cy = t.mul_add(dy, ay);
    (px - cx).hypot(py - cy)
}

/// Distance between segments `a`-`b` and `c`-`d`, zero when they touch.
///
/// Disjoint segments are closest at an endpoint of one of them.
#[must_use]
pub fn dist_segment_segment(a: Point, b: Point, c: Point, d: Point) -> f64 {
    if segments_intersect(a, b, c, d) {
        return 0.0;
    }
    dist_point_segment(a, c, d)
        .min(dist_point_segment(b, c, d))
        .min(dist_point_segment(c, a, b))
        .min(dist_point_segment(d, a, b))
}

/// Returns `true` if `c` continues the segment `a`-`b` straight on, in
/// the same direction.
#[must_use]
pub fn continues_straight(a: Point, b: Point, c: Point) -> bool {
    let dot = (i64::from(b.x) - i64::from(a.x)) * (i64::from(c.x) - i64::from(b.x))
        + (i64::from(b.y) - i64::from(a.y)) * (i64::from(c.y) - i64::from(b.y));
    orientation(a, b, c) == Orientation::Collinear && dot > 0
}

/// Closest point on segment `a`-`b` to `p`, rounded to whole inches.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn project_onto_segment(p: Point, a: Point, b: Point) -> Point {
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let dx = f64::from(b.x) - ax;
    let dy = f64::from(b.y) - ay;
    if a == b {
        return a;
    }
    let len_sq = dx.mul_add(dx, dy * dy);
    let t = ((f64::from(p.x) - ax).mul_add(dx, (f64::from(p.y) - ay) * dy) / len_sq)
        .clamp(0.0, 1.0);
    Point::new(
        t.mul_add(dx, ax).round() as i32,
        t.mul_add(dy, ay).round() as i32,
    )
}

/// Distance from `p` to the closed rectangle; zero iff `p` is inside or
/// on the border.
#[must_use]
pub fn dist_point_rect(p: Point, rect: &Rect) -> f64 {
    let cx = p.x.clamp(rect.x, rect.right());
    let cy = p.y.clamp(rect.y, rect.top());
    p.distance(Point::new(cx, cy))
}

/// Returns `true` if segment `a`-`b` touches the closed rectangle.
///
/// Liang-Barsky clip of the parametric segment against the four slabs.
/// Grazing a border or corner counts as touching.
#[must_use]
pub fn segment_touches_rect(a: Point, b: Point, rect: &Rect) -> bool {
    let (x0, y0) = (f64::from(a.x), f64::from(a.y));
    let dx = f64::from(b.x) - x0;
    let dy = f64::from(b.y) - y0;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    // (direction is zero, p, q) per slab.
    let slabs = [
        (a.x == b.x, -dx, x0 - f64::from(rect.x)),
        (a.x == b.x, dx, f64::from(rect.right()) - x0),
        (a.y == b.y, -dy, y0 - f64::from(rect.y)),
        (a.y == b.y, dy, f64::from(rect.top()) - y0),
    ];
    for (parallel, p, q) in slabs {
        if parallel {
            if q < 0.0 {
                return false;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return false;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return false;
            }
            t1 = t1.min(r);
        }
    }
    t0 <= t1
}

/// Stable client-facing id of the grid intersection at `p`.
///
/// ```
/// use floorwire_planner::geometry::snap_id;
/// use floorwire_planner::Point;
///
/// assert_eq!(snap_id(Point::new(12, -3)), "I_12_-3");
/// ```
#[must_use]
pub fn snap_id(p: Point) -> String {
    format!("I_{}_{}", p.x, p.y)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn orientation_signs() {
        assert_eq!(orientation(p(0, 0), p(1, 0), p(2, 0)), Orientation::Collinear);
        assert_eq!(
            orientation(p(0, 0), p(1, 0), p(1, 1)),
            Orientation::CounterClockwise
        );
        assert_eq!(orientation(p(0, 0), p(1, 0), p(1, -1)), Orientation::Clockwise);
    }

    #[test]
    fn orientation_does_not_overflow_at_extremes() {
        let big = 100_000;
        assert_eq!(
            orientation(p(-big, -big), p(big, big), p(-big, big)),
            Orientation::CounterClockwise
        );
        assert_eq!(
            orientation(p(-big, -big), p(0, 0), p(big, big)),
            Orientation::Collinear
        );
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(p(0, 5), p(10, 5), p(5, 0), p(5, 10)));
    }

    #[test]
    fn shared_endpoint_is_not_an_intersection() {
        assert!(!segments_intersect(p(0, 0), p(6, 0), p(6, 0), p(6, 6)));
        assert!(!segments_intersect(p(0, 0), p(6, 0), p(6, 0), p(12, 0)));
    }

    #[test]
    fn t_junction_intersects() {
        assert!(segments_intersect(p(0, 0), p(12, 0), p(6, 0), p(6, 6)));
        assert!(segments_intersect(p(6, 0), p(6, 6), p(0, 0), p(12, 0)));
    }

    #[test]
    fn collinear_overlap_intersects() {
        assert!(segments_intersect(p(0, 0), p(12, 0), p(6, 0), p(18, 0)));
        // Folding back over the previous segment.
        assert!(segments_intersect(p(0, 0), p(12, 0), p(12, 0), p(6, 0)));
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        assert!(!segments_intersect(p(0, 0), p(5, 0), p(7, 0), p(12, 0)));
        assert!(!segments_intersect(p(0, 0), p(10, 0), p(0, 3), p(10, 3)));
    }

    #[test]
    fn segment_distances() {
        // Collinear runs 2" apart.
        assert!((dist_segment_segment(p(6, 6), p(8, 6), p(10, 6), p(12, 6)) - 2.0).abs() < 1e-9);
        // Parallel lanes.
        assert!((dist_segment_segment(p(0, 0), p(10, 0), p(0, 3), p(10, 3)) - 3.0).abs() < 1e-9);
        assert!(dist_segment_segment(p(0, 0), p(12, 0), p(6, -6), p(6, 6)).abs() < 1e-9);
    }

    #[test]
    fn straight_continuation() {
        assert!(continues_straight(p(0, 0), p(3, 0), p(4, 0)));
        assert!(!continues_straight(p(0, 0), p(3, 0), p(1, 0)));
        assert!(!continues_straight(p(0, 0), p(3, 0), p(3, 3)));
    }

    #[test]
    fn point_in_square() {
        let square = [p(0, 0), p(10, 0), p(10, 10), p(0, 10)];
        assert!(point_in_polygon(p(5, 5), &square));
        assert!(!point_in_polygon(p(15, 5), &square));
        assert!(!point_in_polygon(p(5, -1), &square));
    }

    #[test]
    fn point_in_l_shape() {
        let l = [p(0, 0), p(60, 0), p(60, 40), p(40, 40), p(40, 60), p(0, 60)];
        assert!(point_in_polygon(p(10, 50), &l));
        assert!(point_in_polygon(p(50, 10), &l));
        assert!(!point_in_polygon(p(50, 50), &l));
        // Ray through the reflex vertex row.
        assert!(point_in_polygon(p(10, 40), &l));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        assert!(!point_in_polygon(p(0, 0), &[p(0, 0), p(1, 1)]));
    }

    #[test]
    fn point_segment_distance() {
        assert!((dist_point_segment(p(5, 3), p(0, 0), p(10, 0)) - 3.0).abs() < 1e-12);
        assert!((dist_point_segment(p(13, 4), p(0, 0), p(10, 0)) - 5.0).abs() < 1e-12);
        assert!((dist_point_segment(p(3, 4), p(0, 0), p(0, 0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn projection_is_clamped_and_rounded() {
        assert_eq!(project_onto_segment(p(5, 7), p(0, 0), p(10, 0)), p(5, 0));
        assert_eq!(project_onto_segment(p(-4, 2), p(0, 0), p(10, 0)), p(0, 0));
        assert_eq!(project_onto_segment(p(3, 0), p(0, 0), p(4, 4)), p(2, 2));
    }

    #[test]
    fn point_rect_distance() {
        let r = Rect::new(10, 10, 10, 10);
        assert!(dist_point_rect(p(15, 15), &r).abs() < 1e-12);
        assert!(dist_point_rect(p(10, 20), &r).abs() < 1e-12);
        assert!((dist_point_rect(p(5, 15), &r) - 5.0).abs() < 1e-12);
        assert!((dist_point_rect(p(23, 24), &r) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn segment_rect_touch() {
        let r = Rect::new(30, 30, 20, 20);
        // Straight through.
        assert!(segment_touches_rect(p(0, 40), p(100, 40), &r));
        // Along the border.
        assert!(segment_touches_rect(p(0, 30), p(100, 30), &r));
        // Passing just outside.
        assert!(!segment_touches_rect(p(0, 29), p(100, 29), &r));
        // Stops short.
        assert!(!segment_touches_rect(p(0, 40), p(29, 40), &r));
        // Endpoint inside.
        assert!(segment_touches_rect(p(35, 35), p(35, 0), &r));
        // Degenerate segment.
        assert!(segment_touches_rect(p(40, 40), p(40, 40), &r));
        assert!(!segment_touches_rect(p(0, 0), p(0, 0), &r));
    }

    #[test]
    fn snap_ids() {
        assert_eq!(snap_id(p(3, 6)), "I_3_6");
    }
}
