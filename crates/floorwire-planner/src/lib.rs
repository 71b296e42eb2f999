//! floorwire-planner: bathroom floor-heating wire planner (sans-IO).
//!
//! Models a room (polygon outline, furniture with drains, forbidden and
//! buffer zones, wall-mounted heating elements), lays a snap-point grid
//! over it and routes a heating wire through the grid in a serpentine:
//! room -> grid -> clearance oracle -> planner -> validator.
//!
//! All coordinates are integer inches; grid pitch and translation are
//! kept in 32nds of an inch. The crate does no I/O and installs no
//! logging subscriber: it emits `tracing` events and leaves the rest to
//! the caller.

pub mod diagnostics;
pub mod extend;
pub mod furniture;
pub mod geometry;
pub mod grid;
pub mod heating;
pub mod history;
pub mod ids;
pub mod oracle;
pub mod planner;
pub mod room;
pub mod session;
pub mod snapshot;
pub mod types;
pub mod validate;
pub mod wall;
pub mod zone;

pub use diagnostics::{Clock, RunDiagnostics, RunOutput, run_with_diagnostics};
pub use extend::extend_from;
pub use furniture::{Drain, Furniture, FurnitureKind};
pub use grid::{Grid, GridSettings, Intersection};
pub use heating::{HeatingElement, HeatingKind};
pub use history::History;
pub use ids::ElementId;
pub use oracle::is_legal_point;
pub use planner::{LaneAxis, Plan, PlanConfig, PlanDiagnostic, PlanStats, StopReason};
pub use room::{DrainPosition, ElementRef, Room};
pub use session::Session;
pub use snapshot::RoomSnapshot;
pub use types::{Bounds, GridError, PlanError, Point, Rect, RoomError, WireRoute};
pub use validate::{Rule, Segment, ValidationError, validate};
pub use wall::Wall;
pub use zone::{BufferZone, ForbiddenZone};

/// Build a grid for `room` with the given pitch and translation.
///
/// The room is not modified; install the result with
/// [`Room::set_grid`].
///
/// # Errors
///
/// Returns [`GridError::InvalidSpacing`] for a pitch under one inch.
pub fn build_grid(
    room: &Room,
    spacing_32nds: u32,
    tx_32nds: i32,
    ty_32nds: i32,
    confirmed: bool,
) -> Result<Grid, GridError> {
    let mut grid = Grid::new(GridSettings {
        spacing_32nds,
        tx_32nds,
        ty_32nds,
        confirmed,
    })?;
    grid.generate(room);
    Ok(grid)
}

/// Plan a serpentine route of about `length` inches with `spacing`
/// inches between lanes.
///
/// The returned [`Plan`] carries the route and, when the route falls
/// short of half the target, a [`PlanDiagnostic`].
///
/// # Errors
///
/// Returns [`PlanError::GridNotReady`] unless the room's grid is
/// generated and confirmed.
pub fn plan_wire(room: &Room, spacing: u32, length: u32) -> Result<Plan, PlanError> {
    planner::plan(
        room,
        &PlanConfig {
            spacing,
            target_length: length,
            axis: LaneAxis::Horizontal,
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn build_grid_leaves_room_alone() {
        let room = Room::rectangle(30, 30).unwrap();
        let grid = build_grid(&room, 96, 0, 0, true).unwrap();
        assert!(grid.is_ready());
        assert!(grid.node_count() > 0);
        assert!(!room.grid().is_generated());
    }

    #[test]
    fn build_grid_rejects_sub_inch_pitch() {
        let room = Room::rectangle(30, 30).unwrap();
        assert_eq!(
            build_grid(&room, 16, 0, 0, true).unwrap_err(),
            GridError::InvalidSpacing(16)
        );
    }

    #[test]
    fn plan_wire_uses_installed_grid() {
        let mut room = Room::rectangle(60, 60).unwrap();
        assert_eq!(plan_wire(&room, 6, 200).unwrap_err(), PlanError::GridNotReady);
        let grid = build_grid(&room, 96, 0, 0, true).unwrap();
        room.set_grid(grid);
        let plan = plan_wire(&room, 6, 200).unwrap();
        assert!(plan.route.length() >= 190.0);
    }
}
