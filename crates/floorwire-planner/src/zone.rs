//! Forbidden and buffer zones.

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;
use crate::types::Rect;

/// A rectangle the wire must neither enter nor cross.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForbiddenZone {
    /// Stable identifier.
    pub id: ElementId,
    /// Display label.
    pub name: String,
    /// Extent of the zone.
    pub rect: Rect,
}

impl ForbiddenZone {
    /// Create a zone with a fresh id.
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self {
            id: ElementId::next(),
            name: "Forbidden zone".to_owned(),
            rect,
        }
    }
}

/// A rectangle with an associated clearance distance.
///
/// Kept for display and persistence only; planning does not consult it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferZone {
    /// Stable identifier.
    pub id: ElementId,
    /// Display label.
    pub name: String,
    /// Extent of the zone.
    pub rect: Rect,
    /// Clearance distance in inches.
    pub distance: i32,
}

impl BufferZone {
    /// Create a buffer zone with a fresh id.
    #[must_use]
    pub fn new(rect: Rect, distance: i32) -> Self {
        Self {
            id: ElementId::next(),
            name: "Buffer zone".to_owned(),
            rect,
            distance,
        }
    }
}
