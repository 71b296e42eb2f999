//! Deep copies of a room for undo/redo and persistence.
//!
//! A snapshot holds everything needed to rebuild a room: the outline,
//! the element registries in insertion order, the grid parameters and
//! the wire. The generated grid itself is not stored; restoring a
//! snapshot regenerates it when the parameters are confirmed.

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;

use crate::furniture::Furniture;
use crate::grid::GridSettings;
use crate::heating::HeatingElement;
use crate::ids::ElementId;
use crate::room::Room;
use crate::types::{Point, RoomError, WireRoute, check_dimensions};
use crate::zone::{BufferZone, ForbiddenZone};

/// Serializable state of a [`Room`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomSnapshot {
    /// Outline vertices.
    pub polygon: Vec<Point>,
    /// Furniture in insertion order.
    #[serde(default)]
    pub furniture: Vec<Furniture>,
    /// Forbidden zones in insertion order.
    #[serde(default)]
    pub forbidden_zones: Vec<ForbiddenZone>,
    /// Buffer zones in insertion order.
    #[serde(default)]
    pub buffer_zones: Vec<BufferZone>,
    /// Heating elements in insertion order.
    #[serde(default)]
    pub heating_elements: Vec<HeatingElement>,
    /// Grid parameters.
    #[serde(default)]
    pub grid: GridSettings,
    /// The wire route.
    #[serde(default)]
    pub wire: WireRoute,
}

impl RoomSnapshot {
    /// Stable 64-bit fingerprint of the snapshot contents.
    ///
    /// Uses SipHash-1-3 with fixed keys, so equal snapshots give equal
    /// fingerprints across runs.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(0, 0);
        self.hash(&mut hasher);
        hasher.finish()
    }
}

fn registry<T>(items: Vec<T>, id: impl Fn(&T) -> ElementId) -> IndexMap<ElementId, T> {
    items
        .into_iter()
        .map(|item| {
            let key = id(&item);
            key.observe();
            (key, item)
        })
        .collect()
}

impl Room {
    /// Deep copy of the room's state.
    #[must_use]
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            polygon: self.polygon().to_vec(),
            furniture: self.furniture.values().cloned().collect(),
            forbidden_zones: self.forbidden_zones.values().cloned().collect(),
            buffer_zones: self.buffer_zones.values().cloned().collect(),
            heating_elements: self.heating_elements.values().cloned().collect(),
            grid: *self.grid().settings(),
            wire: self.wire().clone(),
        }
    }

    /// Rebuild a room from a snapshot read from outside, e.g. a file.
    ///
    /// Every record goes through the same checks as when it is added to
    /// a room. Element ids are kept and the id generator is advanced past
    /// them. The grid is regenerated when its parameters are confirmed.
    ///
    /// # Errors
    ///
    /// - [`RoomError::TooFewVertices`] or [`RoomError::InvalidDimensions`]
    ///   for a bad outline or element size.
    /// - [`RoomError::Grid`] for invalid grid parameters.
    /// - [`RoomError::OutOfBounds`] or [`RoomError::Overlap`] for
    ///   misplaced furniture.
    /// - [`RoomError::NotAgainstWall`] or
    ///   [`RoomError::DuplicateThermostat`] for misplaced heating
    ///   elements.
    pub fn from_snapshot(snapshot: RoomSnapshot) -> Result<Self, RoomError> {
        let mut room = Self::from_polygon(snapshot.polygon)?;
        room.configure_grid(snapshot.grid)?;
        for item in snapshot.furniture {
            item.id.observe();
            room.add_furniture(item)?;
        }
        for zone in &snapshot.forbidden_zones {
            check_dimensions(zone.rect.width, zone.rect.length)?;
        }
        for zone in &snapshot.buffer_zones {
            check_dimensions(zone.rect.width, zone.rect.length)?;
        }
        room.forbidden_zones = registry(snapshot.forbidden_zones, |z| z.id);
        room.buffer_zones = registry(snapshot.buffer_zones, |z| z.id);
        for element in snapshot.heating_elements {
            element.id.observe();
            room.add_heating_element(element)?;
        }
        room.set_wire(snapshot.wire);
        if snapshot.grid.confirmed {
            room.generate_grid();
        }
        Ok(room)
    }

    /// Rebuild a room from a snapshot this process took itself, as undo
    /// and redo do. Element placement is taken as is: a resize may have
    /// left furniture where it could not be added.
    ///
    /// # Errors
    ///
    /// As for [`Room::from_snapshot`], for the outline and grid only.
    pub(crate) fn restore(snapshot: RoomSnapshot) -> Result<Self, RoomError> {
        let mut room = Self::from_polygon(snapshot.polygon)?;
        room.configure_grid(snapshot.grid)?;
        room.furniture = registry(snapshot.furniture, |f| f.id);
        room.forbidden_zones = registry(snapshot.forbidden_zones, |z| z.id);
        room.buffer_zones = registry(snapshot.buffer_zones, |z| z.id);
        room.heating_elements = registry(snapshot.heating_elements, |h| h.id);
        room.set_wire(snapshot.wire);
        if snapshot.grid.confirmed {
            room.generate_grid();
        }
        Ok(room)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::furniture::FurnitureKind;
    use crate::heating::HeatingKind;
    use crate::types::Rect;

    fn furnished() -> Room {
        let mut room = Room::rectangle(100, 80).unwrap();
        room.add_furniture(Furniture::new(FurnitureKind::Toilet, Rect::new(60, 0, 20, 25)))
            .unwrap();
        room.add_furniture(Furniture::new(FurnitureKind::Vanity, Rect::new(0, 50, 30, 20)))
            .unwrap();
        room.add_forbidden_zone(Rect::new(40, 40, 10, 10)).unwrap();
        room.add_heating_element(HeatingElement::new(HeatingKind::Thermostat, Point::new(0, 10)))
            .unwrap();
        room
    }

    #[test]
    fn round_trip_preserves_order_and_ids() {
        let room = furnished();
        let snapshot = room.snapshot();
        let restored = Room::from_snapshot(snapshot.clone()).unwrap();
        assert_eq!(restored.snapshot(), snapshot);
        let ids: Vec<ElementId> = restored.furniture().map(|f| f.id).collect();
        let original: Vec<ElementId> = room.furniture().map(|f| f.id).collect();
        assert_eq!(ids, original);
    }

    #[test]
    fn restored_ids_are_not_reissued() {
        let room = furnished();
        let max = room.snapshot().heating_elements[0].id;
        let _restored = Room::from_snapshot(room.snapshot()).unwrap();
        assert!(ElementId::next() > max);
    }

    #[test]
    fn confirmed_grid_is_regenerated() {
        let mut room = furnished();
        room.configure_grid(GridSettings {
            confirmed: true,
            ..GridSettings::default()
        })
        .unwrap();
        room.generate_grid();
        let restored = Room::from_snapshot(room.snapshot()).unwrap();
        assert!(restored.grid().is_ready());
        assert_eq!(restored.grid().node_count(), room.grid().node_count());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let mut room = furnished();
        let a = room.snapshot().fingerprint();
        assert_eq!(a, room.snapshot().fingerprint());
        room.add_forbidden_zone(Rect::new(10, 10, 5, 5)).unwrap();
        assert_ne!(a, room.snapshot().fingerprint());
    }

    #[test]
    fn json_round_trip() {
        let snapshot = furnished().snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: RoomSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn loaded_furniture_is_checked() {
        let snapshot = furnished().snapshot();
        let toilet = snapshot.furniture[0].clone();

        let mut stacked = snapshot.clone();
        let mut copy = toilet.clone();
        copy.id = ElementId::next();
        copy.rect = copy.rect.moved_to(Point::new(65, 5));
        stacked.furniture.push(copy);
        assert_eq!(
            Room::from_snapshot(stacked.clone()).unwrap_err(),
            RoomError::Overlap(toilet.id)
        );
        // Undo history trusts its own snapshots.
        assert_eq!(Room::restore(stacked).unwrap().furniture().count(), 3);

        let mut outside = snapshot;
        outside.furniture[0].rect = toilet.rect.moved_to(Point::new(90, 0));
        assert_eq!(
            Room::from_snapshot(outside).unwrap_err(),
            RoomError::OutOfBounds
        );
    }

    #[test]
    fn loaded_heating_is_checked() {
        let mut twice = furnished().snapshot();
        let second = HeatingElement::new(HeatingKind::Thermostat, Point::new(0, 30));
        twice.heating_elements.push(second);
        assert_eq!(
            Room::from_snapshot(twice).unwrap_err(),
            RoomError::DuplicateThermostat
        );

        let mut floating = furnished().snapshot();
        floating.heating_elements[0].rect = floating.heating_elements[0]
            .rect
            .moved_to(Point::new(30, 30));
        assert_eq!(
            Room::from_snapshot(floating).unwrap_err(),
            RoomError::NotAgainstWall
        );
    }

    #[test]
    fn minimal_json_uses_defaults() {
        let json = r#"{"polygon":[{"x":0,"y":0},{"x":50,"y":0},{"x":50,"y":40},{"x":0,"y":40}]}"#;
        let snapshot: RoomSnapshot = serde_json::from_str(json).unwrap();
        let room = Room::from_snapshot(snapshot).unwrap();
        assert_eq!((room.width(), room.length()), (50, 40));
        assert!(!room.grid().is_generated());
    }
}
