//! Property tests for the geometry kernel, the grid and the planner.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;

use floorwire_planner::geometry::{Orientation, orientation, segments_intersect};
use floorwire_planner::{
    Furniture, FurnitureKind, GridSettings, LaneAxis, PlanConfig, Point, Rect, Room, planner,
    validate,
};
use proptest::prelude::*;

const LIMIT: i32 = 100_000;

fn point() -> impl Strategy<Value = Point> {
    (-LIMIT..=LIMIT, -LIMIT..=LIMIT).prop_map(|(x, y)| Point::new(x, y))
}

/// A w x l rectangle, or an L with its top-right corner cut away at
/// `(cx, cy)`.
fn outline(w: i32, l: i32, notch: Option<(i32, i32)>) -> Vec<Point> {
    let p = Point::new;
    match notch {
        None => vec![p(0, 0), p(w, 0), p(w, l), p(0, l)],
        Some((cx, cy)) => vec![p(0, 0), p(w, 0), p(w, cy), p(cx, cy), p(cx, l), p(0, l)],
    }
}

fn confirmed_room(
    polygon: Vec<Point>,
    obstacle: Option<(i32, i32)>,
    settings: GridSettings,
) -> Room {
    let mut room = Room::from_polygon(polygon).unwrap();
    if let Some((x, y)) = obstacle {
        room.add_furniture(Furniture::new(FurnitureKind::Cabinet, Rect::new(x, y, 12, 12)))
            .unwrap();
    }
    room.configure_grid(GridSettings {
        confirmed: true,
        ..settings
    })
    .unwrap();
    room.generate_grid();
    room
}

/// Rectangles and L-shapes, optionally furnished, on grids from 1" to
/// 4" pitch with arbitrary translation.
#[allow(clippy::cast_possible_truncation)]
fn room_strategy() -> impl Strategy<Value = Room> {
    let shape = (30..150i32, 30..150i32, any::<bool>(), 0.4..0.7f64, 0.4..0.7f64).prop_map(
        |(w, l, l_shaped, fx, fy)| {
            let notch = l_shaped.then(|| ((f64::from(w) * fx) as i32, (f64::from(l) * fy) as i32));
            (w, l, notch)
        },
    );
    let settings = prop::sample::select(vec![32u32, 64, 96, 128]).prop_flat_map(|pitch| {
        let shift = 0..i32::try_from(pitch).unwrap_or(i32::MAX);
        (shift.clone(), shift).prop_map(move |(tx, ty)| GridSettings {
            spacing_32nds: pitch,
            tx_32nds: tx,
            ty_32nds: ty,
            confirmed: true,
        })
    });
    (shape, settings, any::<bool>(), 0.0..1.0f64, 0.0..1.0f64).prop_map(
        |((w, l, notch), settings, furnished, fx, fy)| {
            // Keep the cabinet in the full-width strip below the notch.
            let strip = notch.map_or(l, |(_, cy)| cy);
            let obstacle = furnished.then(|| {
                (
                    (f64::from(w - 12) * fx) as i32,
                    (f64::from(strip - 12) * fy) as i32,
                )
            });
            confirmed_room(outline(w, l, notch), obstacle, settings)
        },
    )
}

proptest! {
    #[test]
    fn orientation_is_antisymmetric(p in point(), q in point(), r in point()) {
        let forward = orientation(p, q, r);
        let swapped = orientation(q, p, r);
        let expected = match forward {
            Orientation::Collinear => Orientation::Collinear,
            Orientation::Clockwise => Orientation::CounterClockwise,
            Orientation::CounterClockwise => Orientation::Clockwise,
        };
        prop_assert_eq!(swapped, expected);
    }

    #[test]
    fn intersection_is_symmetric(a in point(), b in point(), c in point(), d in point()) {
        prop_assert_eq!(segments_intersect(a, b, c, d), segments_intersect(c, d, a, b));
        prop_assert_eq!(segments_intersect(a, b, c, d), segments_intersect(b, a, d, c));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn grid_links_are_symmetric(room in room_strategy()) {
        let grid = room.grid();
        let step = i32::try_from(grid.settings().spacing_32nds / 32).unwrap();
        for a in grid.node_indices() {
            for b in grid.neighbours(a) {
                prop_assert!(grid.neighbours(b).contains(&a));
                let (pa, pb) = (grid.position(a), grid.position(b));
                let (dx, dy) = ((pa.x - pb.x).abs(), (pa.y - pb.y).abs());
                prop_assert!((dx == step && dy == 0) || (dx == 0 && dy == step));
            }
        }
    }

    #[test]
    fn confirmed_nodes_are_legal(room in room_strategy()) {
        for n in room.grid().intersections() {
            prop_assert!(floorwire_planner::is_legal_point(n.position, &room, 3));
        }
    }

    #[test]
    fn planner_invariants(
        room in room_strategy(),
        spacing in prop::sample::select(vec![3u32, 6, 9]),
        target in 60u32..800,
        vertical in any::<bool>(),
    ) {
        let config = PlanConfig {
            spacing,
            target_length: target,
            axis: if vertical { LaneAxis::Vertical } else { LaneAxis::Horizontal },
        };
        let plan = planner::plan(&room, &config).unwrap();
        let again = planner::plan(&room, &config).unwrap();
        prop_assert_eq!(&plan, &again);

        let route = &plan.route;
        prop_assert!(route.is_axis_aligned());
        prop_assert!(route.length() <= f64::from(target) * 1.05 + 1e-9);

        let distinct: HashSet<Point> = route.points().iter().copied().collect();
        prop_assert_eq!(distinct.len(), route.len());

        let segments: Vec<_> = route.segments().collect();
        for i in 0..segments.len() {
            for j in i + 2..segments.len() {
                let (a, b) = segments[i];
                let (c, d) = segments[j];
                prop_assert!(!segments_intersect(a, b, c, d));
            }
        }

        let errors = validate(&room, route);
        prop_assert!(errors.is_empty(), "validation errors: {:?}", errors);

        // Short of half the target is always reported, and only then.
        let half = f64::from(target) * 0.5;
        if plan.diagnostic.is_none() {
            prop_assert!(route.length() >= half - 1e-9, "{} of {}", route.length(), target);
        } else {
            prop_assert!(route.length() < half + 1e-9, "{} of {}", route.length(), target);
        }
    }
}
