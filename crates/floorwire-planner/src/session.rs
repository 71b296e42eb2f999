//! Editor-facing facade: the current room plus its undo history.
//!
//! Every successful change records the state before it, so one undo
//! reverts one editor action. Failed changes leave both the room and
//! the history untouched.

use crate::extend::extend_from;
use crate::grid::GridSettings;
use crate::history::History;
use crate::planner::{self, Plan, PlanConfig};
use crate::room::Room;
use crate::snapshot::RoomSnapshot;
use crate::types::{PlanError, Point, RoomError, WireRoute};
use crate::validate::{ValidationError, validate};

/// The room being edited, if any, and its history.
#[derive(Debug, Clone, Default)]
pub struct Session {
    room: Option<Room>,
    history: History,
}

impl Session {
    /// A session without a room.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            room: None,
            history: History::new(),
        }
    }

    /// The current room.
    #[must_use]
    pub const fn room(&self) -> Option<&Room> {
        self.room.as_ref()
    }

    /// The undo history.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    fn replace_room(&mut self, room: Room) {
        if let Some(old) = self.room.replace(room) {
            self.history.record(old.snapshot());
        }
    }

    /// Start over with a rectangular room.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::InvalidDimensions`] for a bad size.
    pub fn create_rectangle(&mut self, width: i32, length: i32) -> Result<(), RoomError> {
        let room = Room::rectangle(width, length)?;
        self.replace_room(room);
        Ok(())
    }

    /// Start over with a polygonal room.
    ///
    /// # Errors
    ///
    /// Returns the [`Room::from_polygon`] errors.
    pub fn create_polygon(&mut self, polygon: Vec<Point>) -> Result<(), RoomError> {
        let room = Room::from_polygon(polygon)?;
        self.replace_room(room);
        Ok(())
    }

    /// Replace the room with one restored from a snapshot, e.g. after
    /// loading a file.
    ///
    /// # Errors
    ///
    /// Returns the [`Room::from_snapshot`] errors.
    pub fn load(&mut self, snapshot: RoomSnapshot) -> Result<(), RoomError> {
        let room = Room::from_snapshot(snapshot)?;
        self.replace_room(room);
        Ok(())
    }

    /// Snapshot of the current room.
    #[must_use]
    pub fn snapshot(&self) -> Option<RoomSnapshot> {
        self.room.as_ref().map(Room::snapshot)
    }

    /// Apply one editor action to the room.
    ///
    /// The state before the action is recorded only if `action`
    /// succeeds. Room operations leave the room unchanged when they
    /// fail, so nothing needs rolling back.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::NoRoom`] without a room, otherwise whatever
    /// `action` returns.
    pub fn edit<T>(&mut self, action: impl FnOnce(&mut Room) -> Result<T, RoomError>) -> Result<T, RoomError> {
        let room = self.room.as_mut().ok_or(RoomError::NoRoom)?;
        let before = room.snapshot();
        let out = action(room)?;
        self.history.record(before);
        Ok(out)
    }

    /// Apply grid parameters and regenerate the grid.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::NoRoom`] or [`RoomError::Grid`].
    pub fn configure_grid(&mut self, settings: GridSettings) -> Result<(), RoomError> {
        self.edit(|room| {
            room.configure_grid(settings)?;
            room.generate_grid();
            Ok(())
        })
    }

    /// Plan a route and store it as the room's wire.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::NoRoom`] or the planner's errors.
    pub fn plan(&mut self, config: &PlanConfig) -> Result<Plan, PlanError> {
        let room = self.room.as_mut().ok_or(PlanError::NoRoom)?;
        let outcome = planner::plan(room, config)?;
        let before = room.snapshot();
        room.set_wire(outcome.route.clone());
        self.history.record(before);
        Ok(outcome)
    }

    /// Regrow the room's wire from `anchor` and store the result.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::NoRoom`] or the extender's errors.
    pub fn extend(&mut self, anchor: Point, remaining: u32) -> Result<WireRoute, PlanError> {
        let room = self.room.as_mut().ok_or(PlanError::NoRoom)?;
        let route = extend_from(room, room.wire(), anchor, remaining)?;
        let before = room.snapshot();
        room.set_wire(route.clone());
        self.history.record(before);
        Ok(route)
    }

    /// Check the room's wire.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::NoRoom`] without a room.
    pub fn validate(&self) -> Result<Vec<ValidationError>, PlanError> {
        let room = self.room.as_ref().ok_or(PlanError::NoRoom)?;
        Ok(validate(room, room.wire()))
    }

    /// Revert the last action. Returns `false` when there is nothing to
    /// undo.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::NoRoom`] without a room, or the outline and
    /// grid errors of [`Room::from_snapshot`].
    pub fn undo(&mut self) -> Result<bool, RoomError> {
        let current = self.room.as_ref().ok_or(RoomError::NoRoom)?.snapshot();
        let Some(previous) = self.history.undo(current) else {
            return Ok(false);
        };
        self.room = Some(Room::restore(previous)?);
        Ok(true)
    }

    /// Re-apply the last undone action. Returns `false` when there is
    /// nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::NoRoom`] without a room, or the outline and
    /// grid errors of [`Room::from_snapshot`].
    pub fn redo(&mut self) -> Result<bool, RoomError> {
        let current = self.room.as_ref().ok_or(RoomError::NoRoom)?.snapshot();
        let Some(next) = self.history.redo(current) else {
            return Ok(false);
        };
        self.room = Some(Room::restore(next)?);
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::furniture::{Furniture, FurnitureKind};
    use crate::types::Rect;

    #[test]
    fn operations_need_a_room() {
        let mut session = Session::new();
        assert_eq!(
            session.edit(|room| room.add_forbidden_zone(Rect::new(1, 1, 2, 2))),
            Err(RoomError::NoRoom)
        );
        assert_eq!(session.plan(&PlanConfig::default()).unwrap_err(), PlanError::NoRoom);
        assert_eq!(session.validate().unwrap_err(), PlanError::NoRoom);
        assert_eq!(session.undo(), Err(RoomError::NoRoom));
    }

    #[test]
    fn edits_are_undoable() {
        let mut session = Session::new();
        session.create_rectangle(80, 60).unwrap();
        let id = session
            .edit(|room| room.add_furniture(Furniture::new(FurnitureKind::Bath, Rect::new(0, 0, 30, 60))))
            .unwrap();
        assert_eq!(session.room().unwrap().furniture().count(), 1);

        assert!(session.undo().unwrap());
        assert_eq!(session.room().unwrap().furniture().count(), 0);
        assert!(session.redo().unwrap());
        assert_eq!(session.room().unwrap().furniture().next().unwrap().id, id);
        assert!(!session.redo().unwrap());
    }

    #[test]
    fn failed_edits_are_not_recorded() {
        let mut session = Session::new();
        session.create_rectangle(80, 60).unwrap();
        let err = session
            .edit(|room| {
                room.add_furniture(Furniture::new(FurnitureKind::Cabinet, Rect::new(70, 50, 20, 20)))
            })
            .unwrap_err();
        assert_eq!(err, RoomError::OutOfBounds);
        assert!(!session.history().can_undo());
    }

    #[test]
    fn shrunk_rooms_undo_and_redo() {
        let mut session = Session::new();
        session.create_rectangle(80, 60).unwrap();
        session
            .edit(|room| room.add_furniture(Furniture::new(FurnitureKind::Cabinet, Rect::new(0, 0, 30, 20))))
            .unwrap();
        session
            .edit(|room| room.add_furniture(Furniture::new(FurnitureKind::Cabinet, Rect::new(40, 0, 30, 20))))
            .unwrap();
        // Shrinking pushes the second cabinet onto the first.
        session.edit(|room| room.resize(40, 60)).unwrap();

        assert!(session.undo().unwrap());
        assert_eq!(session.room().unwrap().width(), 80);
        assert!(session.redo().unwrap());
        assert_eq!(session.room().unwrap().width(), 40);
        assert_eq!(session.room().unwrap().furniture().count(), 2);
    }

    #[test]
    fn plan_validate_and_undo() {
        let mut session = Session::new();
        session.create_rectangle(72, 60).unwrap();
        session
            .configure_grid(GridSettings {
                confirmed: true,
                ..GridSettings::default()
            })
            .unwrap();
        let plan = session
            .plan(&PlanConfig {
                target_length: 300,
                ..PlanConfig::default()
            })
            .unwrap();
        assert_eq!(session.room().unwrap().wire(), &plan.route);
        assert!(session.validate().unwrap().is_empty());

        let last = *plan.route.last().unwrap();
        let extended = session.extend(last, 30).unwrap();
        assert!(extended.length() >= plan.route.length());

        assert!(session.undo().unwrap());
        assert_eq!(session.room().unwrap().wire(), &plan.route);
        assert!(session.undo().unwrap());
        assert!(session.room().unwrap().wire().is_empty());
        // The confirmed grid comes back with the restored room.
        assert!(session.room().unwrap().grid().is_ready());
    }
}
