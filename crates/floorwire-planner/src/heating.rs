//! Wall-mounted heating elements and the thermostat.

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;
use crate::types::{Point, Rect};

/// What a wall-mounted element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingKind {
    /// The wire's controller. At most one per room; the planner starts
    /// next to it.
    Thermostat,
    /// Any other wall-mounted heating component.
    Element,
}

impl HeatingKind {
    /// Default footprint `(width, length)` in inches.
    #[must_use]
    pub const fn default_size(self) -> (i32, i32) {
        match self {
            Self::Thermostat => (8, 6),
            Self::Element => (2, 10),
        }
    }

    /// Human-readable name used as the default label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Thermostat => "Thermostat",
            Self::Element => "Heating element",
        }
    }
}

/// A heating element or thermostat mounted against a wall.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeatingElement {
    /// Stable identifier.
    pub id: ElementId,
    /// What this element is.
    pub kind: HeatingKind,
    /// Display label.
    pub name: String,
    /// Footprint.
    pub rect: Rect,
}

impl HeatingElement {
    /// Create an element of the default size for its kind at `origin`.
    #[must_use]
    pub fn new(kind: HeatingKind, origin: Point) -> Self {
        let (width, length) = kind.default_size();
        Self::with_rect(kind, Rect::new(origin.x, origin.y, width, length))
    }

    /// Create an element with an explicit footprint.
    #[must_use]
    pub fn with_rect(kind: HeatingKind, rect: Rect) -> Self {
        Self {
            id: ElementId::next(),
            kind,
            name: kind.label().to_owned(),
            rect,
        }
    }

    /// Returns `true` for the thermostat.
    #[must_use]
    pub const fn is_thermostat(&self) -> bool {
        matches!(self.kind, HeatingKind::Thermostat)
    }
}
