//! Greedy path extension from an anchor point.
//!
//! Used when a route is edited mid-way: everything after the anchor is
//! dropped and the route regrows from the anchor over grid edges only,
//! scoring each open neighbour for coverage until the extra length is
//! spent.

use petgraph::graph::NodeIndex;

use crate::oracle;
use crate::planner::{FIT_RATIO, MAX_ITERATIONS, STOP_RATIO, admit, coverage_score, legal_nodes};
use crate::room::Room;
use crate::types::{PlanError, Point, WireRoute};

/// Extend `route` from `anchor`, consuming at most about `remaining`
/// inches.
///
/// Points after the anchor are discarded. Points before it count as
/// visited. A `remaining` of zero returns the route unchanged.
///
/// # Errors
///
/// - [`PlanError::GridNotReady`] if the room's grid is not generated
///   and confirmed.
/// - [`PlanError::AnchorNotInPath`] if `anchor` is not a point of the
///   route.
/// - [`PlanError::AnchorNotOnGrid`] if `anchor` is not a grid node.
pub fn extend_from(
    room: &Room,
    route: &WireRoute,
    anchor: Point,
    remaining: u32,
) -> Result<WireRoute, PlanError> {
    if remaining == 0 {
        return Ok(route.clone());
    }
    let grid = room.grid();
    if !grid.is_ready() {
        return Err(PlanError::GridNotReady);
    }
    let cut = route
        .points()
        .iter()
        .position(|&p| p == anchor)
        .ok_or(PlanError::AnchorNotInPath(anchor))?;
    let mut current = grid
        .node_at(anchor)
        .ok_or(PlanError::AnchorNotOnGrid(anchor))?;

    let legal = legal_nodes(room, grid, oracle::planning_wall_clearance(route.spacing));
    let mut visited = vec![false; grid.node_count()];
    let mut points = route.points()[..=cut].to_vec();
    for idx in points.iter().filter_map(|&p| grid.node_at(p)) {
        visited[idx.index()] = true;
    }

    let budget = f64::from(remaining);
    let mut added = 0.0;
    let mut iterations = 0;
    while added < budget * STOP_RATIO && iterations < MAX_ITERATIONS {
        iterations += 1;
        let here = grid.position(current);
        let left = budget - added;

        let mut best: Option<(NodeIndex, f64)> = None;
        for n in grid.neighbours(current) {
            if visited[n.index()] || !legal[n.index()] {
                continue;
            }
            let there = grid.position(n);
            let edge = here.distance(there);
            if edge > left * FIT_RATIO {
                continue;
            }
            let score = coverage_score(room, there, edge, left);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((n, score));
            }
        }
        let Some((candidate, _)) = best else {
            break;
        };

        visited[candidate.index()] = true;
        let next = grid.position(candidate);
        match admit(room, &points, cut + 1, added, budget, next) {
            Ok(admission) => {
                admission.apply(&mut points, next);
                added += admission.edge;
                current = candidate;
            }
            Err(reason) => {
                tracing::debug!(?reason, at = %next, "extension candidate rejected");
            }
        }
    }

    if iterations >= MAX_ITERATIONS {
        tracing::warn!(iterations, "extender hit the iteration limit");
    }
    tracing::info!(from = %anchor, added, remaining, "route extended");
    Ok(route.with_points(points))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::segments_intersect;
    use crate::grid::GridSettings;

    fn room() -> Room {
        let mut room = Room::rectangle(60, 60).unwrap();
        room.configure_grid(GridSettings {
            confirmed: true,
            ..GridSettings::default()
        })
        .unwrap();
        room.generate_grid();
        room
    }

    fn wall_route(room: &Room) -> WireRoute {
        let points = vec![Point::new(6, 30), Point::new(6, 18), Point::new(6, 6)];
        WireRoute::new(points, 200, 6, room.bounds())
    }

    #[test]
    fn zero_remaining_is_identity() {
        let room = room();
        let route = wall_route(&room);
        let out = extend_from(&room, &route, Point::new(6, 6), 0).unwrap();
        assert_eq!(out, route);
    }

    #[test]
    fn extension_grows_route() {
        let room = room();
        let route = wall_route(&room);
        let out = extend_from(&room, &route, Point::new(6, 6), 60).unwrap();

        assert!(out.length() > route.length());
        assert!(out.length() <= route.length() + 60.0 * 1.05);
        assert!(out.is_axis_aligned());
        assert_eq!(&out.points()[..3], route.points());

        let segments: Vec<_> = out.segments().collect();
        for i in 0..segments.len() {
            for j in i + 1..segments.len() {
                let (a, b) = segments[i];
                let (c, d) = segments[j];
                assert!(!segments_intersect(a, b, c, d), "{i} crosses {j}");
            }
        }
    }

    #[test]
    fn truncates_after_anchor() {
        let room = room();
        let route = wall_route(&room);
        let out = extend_from(&room, &route, Point::new(6, 18), 30).unwrap();
        assert_eq!(&out.points()[..2], &route.points()[..2]);
        assert!(out.len() > 2);
        assert!(out.length() - 12.0 <= 30.0 * 1.05);
    }

    #[test]
    fn anchor_errors() {
        let room = room();
        let route = wall_route(&room);
        assert_eq!(
            extend_from(&room, &route, Point::new(9, 9), 10).unwrap_err(),
            PlanError::AnchorNotInPath(Point::new(9, 9))
        );

        let off_grid = WireRoute::new(vec![Point::new(7, 7)], 100, 6, room.bounds());
        assert_eq!(
            extend_from(&room, &off_grid, Point::new(7, 7), 10).unwrap_err(),
            PlanError::AnchorNotOnGrid(Point::new(7, 7))
        );
    }

    #[test]
    fn grid_must_be_ready() {
        let room = Room::rectangle(60, 60).unwrap();
        let route = WireRoute::new(vec![Point::new(6, 6)], 100, 6, room.bounds());
        assert_eq!(
            extend_from(&room, &route, Point::new(6, 6), 10).unwrap_err(),
            PlanError::GridNotReady
        );
    }
}
