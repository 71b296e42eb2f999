//! Furniture items and their drains.

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;
use crate::types::{Point, Rect};

/// Default drain diameter in inches.
pub const DEFAULT_DRAIN_DIAMETER: i32 = 4;

/// The kinds of furniture a bathroom can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FurnitureKind {
    /// Wall cabinet.
    Cabinet,
    /// Closet.
    Closet,
    /// Shower (drained).
    Shower,
    /// Bathtub (drained).
    Bath,
    /// Toilet (drained, larger clearance).
    Toilet,
    /// Vanity (drained).
    Vanity,
}

impl FurnitureKind {
    /// Returns `true` for kinds that carry a drain.
    #[must_use]
    pub const fn has_drain(self) -> bool {
        matches!(self, Self::Shower | Self::Bath | Self::Toilet | Self::Vanity)
    }

    /// Returns `true` for toilets.
    #[must_use]
    pub const fn is_toilet(self) -> bool {
        matches!(self, Self::Toilet)
    }

    /// Human-readable name used as the default label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cabinet => "Cabinet",
            Self::Closet => "Closet",
            Self::Shower => "Shower",
            Self::Bath => "Bath",
            Self::Toilet => "Toilet",
            Self::Vanity => "Vanity",
        }
    }
}

/// A drain attached to a furniture item.
///
/// The position is stored relative to the furniture origin and may lie
/// outside the furniture rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Drain {
    /// Offset from the furniture origin.
    pub offset: Point,
    /// Diameter in inches.
    pub diameter: i32,
    /// Set once the user repositions the drain; resizing then keeps it.
    pub manually_moved: bool,
}

impl Drain {
    /// A drain centred in a `width` x `length` rectangle.
    #[must_use]
    pub const fn centred(width: i32, length: i32) -> Self {
        Self {
            offset: Point::new(width / 2, length / 2),
            diameter: DEFAULT_DRAIN_DIAMETER,
            manually_moved: false,
        }
    }
}

/// A furniture item placed in a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Furniture {
    /// Stable identifier.
    pub id: ElementId,
    /// Display label.
    pub name: String,
    /// What this item is.
    pub kind: FurnitureKind,
    /// Footprint.
    pub rect: Rect,
    /// Rotation in degrees. Only used when rendering.
    #[serde(default)]
    pub rotation_degrees: i32,
    /// Drain, present iff [`FurnitureKind::has_drain`].
    pub drain: Option<Drain>,
}

impl Furniture {
    /// Create a furniture item with a fresh id.
    ///
    /// Drained kinds get a drain centred in the rectangle.
    #[must_use]
    pub fn new(kind: FurnitureKind, rect: Rect) -> Self {
        Self {
            id: ElementId::next(),
            name: kind.label().to_owned(),
            kind,
            rect,
            rotation_degrees: 0,
            drain: kind
                .has_drain()
                .then(|| Drain::centred(rect.width, rect.length)),
        }
    }

    /// Replace the display label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the drain offset (relative to the furniture origin).
    ///
    /// Ignored for kinds without a drain.
    #[must_use]
    pub fn with_drain_offset(mut self, offset: Point) -> Self {
        if let Some(drain) = &mut self.drain {
            drain.offset = offset;
            drain.manually_moved = true;
        }
        self
    }

    /// Absolute drain position, derived from the origin and the offset.
    #[must_use]
    pub const fn drain_position(&self) -> Option<Point> {
        match &self.drain {
            Some(drain) => Some(self.rect.origin().offset(drain.offset.x, drain.offset.y)),
            None => None,
        }
    }

    /// Minimum wire clearance around the drain, if any.
    #[must_use]
    pub const fn drain_clearance(&self) -> Option<i32> {
        if self.drain.is_none() {
            return None;
        }
        if self.kind.is_toilet() {
            Some(crate::oracle::MIN_DRAIN_TOILET)
        } else {
            Some(crate::oracle::MIN_DRAIN)
        }
    }

    /// Resize the footprint. The drain is re-centred unless it was placed
    /// by hand.
    pub fn resize(&mut self, width: i32, length: i32) {
        self.rect = self.rect.resized(width, length);
        if let Some(drain) = &mut self.drain
            && !drain.manually_moved
        {
            drain.offset = Point::new(width / 2, length / 2);
        }
    }
}
