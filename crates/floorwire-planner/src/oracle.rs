//! Clearance rules for wire vertices and segments.
//!
//! A point is legal when it keeps its distance from the walls, from
//! every furniture rectangle and drain, and lies outside every forbidden
//! zone. A segment is legal when both endpoints are legal and it does
//! not touch a forbidden zone. Furniture collisions between endpoints
//! are not tested separately: on a lattice whose pitch is smaller than
//! twice the furniture clearance, an axis-aligned edge between two clear
//! endpoints cannot reach a rectangle.
//!
//! The per-rule helpers are public so the validator can report which
//! rule a point breaks and by how much.

use crate::furniture::Furniture;
use crate::geometry;
use crate::room::Room;
use crate::types::{Point, Rect};
use crate::zone::ForbiddenZone;

/// Minimum wire distance from any wall, in inches.
pub const MIN_WALL: i32 = 3;
/// Minimum wire distance from any furniture rectangle, in inches.
pub const MIN_FURNITURE: i32 = 3;
/// Minimum wire distance from a drain, in inches.
pub const MIN_DRAIN: i32 = 6;
/// Minimum wire distance from a toilet drain, in inches.
pub const MIN_DRAIN_TOILET: i32 = 10;
/// Minimum distance between two non-adjacent wire segments, in inches.
pub const MIN_WIRE_SEPARATION: i32 = 3;
/// Longest admissible wire segment, in inches.
pub const MAX_SEGMENT: i32 = 120;

/// Wall clearance used when planning with `spacing` between runs.
#[must_use]
pub fn planning_wall_clearance(spacing: u32) -> i32 {
    i32::try_from(spacing).map_or(i32::MAX, |s| s.max(MIN_WALL))
}

/// Distance from `p` to the nearest wall, or `None` when `p` is outside
/// the room (for rectangular rooms, outside the clearance box is
/// reported through a negative distance).
///
/// Rectangular rooms measure against the bounding box only; irregular
/// rooms measure against every polygon edge.
#[must_use]
pub fn wall_distance(p: Point, room: &Room) -> Option<f64> {
    if room.is_rectangular() {
        let b = room.bounds();
        let d = (p.x - b.min.x)
            .min(b.max_x() - p.x)
            .min(p.y - b.min.y)
            .min(b.max_y() - p.y);
        return Some(f64::from(d));
    }
    if !room.contains_point(p) {
        return None;
    }
    Some(
        room.walls()
            .iter()
            .map(|w| w.distance_to(p))
            .fold(f64::INFINITY, f64::min),
    )
}

/// Returns `true` if `p` keeps `min_wall` from every wall.
#[must_use]
pub fn clears_walls(p: Point, room: &Room, min_wall: i32) -> bool {
    wall_distance(p, room).is_some_and(|d| d >= f64::from(min_wall))
}

/// First furniture item closer to `p` than [`MIN_FURNITURE`], with the
/// measured distance.
#[must_use]
pub fn furniture_violation(p: Point, room: &Room) -> Option<(&Furniture, f64)> {
    room.furniture().find_map(|f| {
        let d = geometry::dist_point_rect(p, &f.rect);
        (d < f64::from(MIN_FURNITURE)).then_some((f, d))
    })
}

/// First drain closer to `p` than its kind's clearance, with the
/// measured distance and the required clearance.
#[must_use]
pub fn drain_violation(p: Point, room: &Room) -> Option<(&Furniture, f64, i32)> {
    room.furniture().find_map(|f| {
        let drain = f.drain_position()?;
        let min = f.drain_clearance()?;
        let d = p.distance(drain);
        (d < f64::from(min)).then_some((f, d, min))
    })
}

/// First forbidden zone containing `p`.
#[must_use]
pub fn forbidden_zone_at(p: Point, room: &Room) -> Option<&ForbiddenZone> {
    room.forbidden_zones().find(|z| z.rect.contains(p))
}

/// First forbidden zone touched by segment `a`-`b`.
#[must_use]
pub fn forbidden_zone_crossed(a: Point, b: Point, room: &Room) -> Option<&ForbiddenZone> {
    room.forbidden_zones()
        .find(|z| geometry::segment_touches_rect(a, b, &z.rect))
}

/// Returns `true` if `p` satisfies every clearance rule.
#[must_use]
pub fn is_legal_point(p: Point, room: &Room, min_wall: i32) -> bool {
    clears_walls(p, room, min_wall)
        && furniture_violation(p, room).is_none()
        && drain_violation(p, room).is_none()
        && forbidden_zone_at(p, room).is_none()
}

/// Returns `true` if both endpoints are legal and the segment stays out
/// of every forbidden zone.
#[must_use]
pub fn is_legal_segment(a: Point, b: Point, room: &Room, min_wall: i32) -> bool {
    is_legal_point(a, room, min_wall)
        && is_legal_point(b, room, min_wall)
        && forbidden_zone_crossed(a, b, room).is_none()
}

/// Returns `true` if `rect` lies entirely inside the room polygon.
#[must_use]
pub fn rect_inside_room(rect: &Rect, room: &Room) -> bool {
    if room.is_rectangular() {
        let b = room.bounds();
        return rect.x >= b.min.x
            && rect.y >= b.min.y
            && rect.right() <= b.max_x()
            && rect.top() <= b.max_y();
    }
    rect.corners().iter().all(|c| room.contains_point(*c))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::furniture::FurnitureKind;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn rectangular_wall_margin() {
        let room = Room::rectangle(60, 40).unwrap();
        assert!(is_legal_point(p(3, 3), &room, MIN_WALL));
        assert!(is_legal_point(p(57, 37), &room, MIN_WALL));
        assert!(!is_legal_point(p(2, 10), &room, MIN_WALL));
        assert!(!is_legal_point(p(10, 38), &room, MIN_WALL));
        assert!(!is_legal_point(p(5, 10), &room, 6));
    }

    #[test]
    fn irregular_wall_margin() {
        let room = Room::from_polygon(vec![
            p(0, 0),
            p(60, 0),
            p(60, 40),
            p(40, 40),
            p(40, 60),
            p(0, 60),
        ])
        .unwrap();
        assert!(is_legal_point(p(10, 50), &room, MIN_WALL));
        // Outside the L.
        assert!(!is_legal_point(p(50, 50), &room, MIN_WALL));
        // Inside but hugging the reflex corner.
        assert!(!is_legal_point(p(41, 41), &room, MIN_WALL));
        assert!(!is_legal_point(p(38, 42), &room, MIN_WALL));
        assert!(is_legal_point(p(37, 43), &room, MIN_WALL));
    }

    #[test]
    fn furniture_clearance() {
        let mut room = Room::rectangle(100, 100).unwrap();
        room.add_furniture(crate::furniture::Furniture::new(
            FurnitureKind::Cabinet,
            Rect::new(40, 40, 20, 20),
        ))
        .unwrap();
        assert!(!is_legal_point(p(50, 50), &room, MIN_WALL));
        assert!(!is_legal_point(p(38, 50), &room, MIN_WALL));
        assert!(is_legal_point(p(37, 50), &room, MIN_WALL));
        let (_, d) = furniture_violation(p(38, 50), &room).unwrap();
        assert!((d - 2.0).abs() < 1e-9);
    }

    #[test]
    fn toilet_drain_clearance() {
        let mut room = Room::rectangle(60, 60).unwrap();
        room.add_furniture(crate::furniture::Furniture::new(
            FurnitureKind::Toilet,
            Rect::new(20, 20, 20, 20),
        ))
        .unwrap();
        // Outside the rectangle but within 10" of the drain at (30, 30).
        let drain_only = p(30, 16);
        assert!(furniture_violation(drain_only, &room).is_none());
        let (_, d, min) = drain_violation(p(30, 21), &room).unwrap();
        assert_eq!(min, MIN_DRAIN_TOILET);
        assert!((d - 9.0).abs() < 1e-9);
        assert!(drain_violation(drain_only, &room).is_none());
    }

    #[test]
    fn forbidden_zone_rules() {
        let mut room = Room::rectangle(100, 100).unwrap();
        room.add_forbidden_zone(Rect::new(30, 30, 20, 20)).unwrap();
        assert!(!is_legal_point(p(30, 40), &room, MIN_WALL));
        assert!(is_legal_point(p(20, 40), &room, MIN_WALL));
        assert!(!is_legal_segment(p(20, 40), p(60, 40), &room, MIN_WALL));
        assert!(is_legal_segment(p(20, 20), p(60, 20), &room, MIN_WALL));
    }

    #[test]
    fn planning_clearance_never_below_minimum() {
        assert_eq!(planning_wall_clearance(1), MIN_WALL);
        assert_eq!(planning_wall_clearance(6), 6);
    }
}
