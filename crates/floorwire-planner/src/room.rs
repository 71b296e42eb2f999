//! The room: polygon, registered elements, grid and wire.
//!
//! Every editing operation validates its input first and returns a
//! [`RoomError`] without touching the room when the input is rejected.
//! Element registries are insertion-ordered so that every iteration over
//! furniture or zones (and therefore every plan) is deterministic.
//!
//! Changes to the polygon propagate to the grid bounds and to the wire's
//! recorded bounds. Changes that affect clearance (polygon, furniture,
//! forbidden zones) regenerate the grid when it had been generated.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::furniture::{DEFAULT_DRAIN_DIAMETER, Furniture};
use crate::geometry;
use crate::grid::{Grid, GridSettings};
use crate::heating::HeatingElement;
use crate::ids::ElementId;
use crate::oracle;
use crate::types::{Bounds, GridError, Point, Rect, RoomError, WireRoute, check_dimensions};
use crate::wall::{Wall, walls_of};
use crate::zone::{BufferZone, ForbiddenZone};

/// Farthest distance at which [`Room::nearest_wall`] reports a wall.
pub const WALL_SNAP_DISTANCE: f64 = 50.0;

/// Extra hit-test margin around heating elements, in inches.
pub const HEATING_CLICK_MARGIN: i32 = 10;

/// Largest distance between an irregular-room wall and the side of a
/// heating element that counts as touching.
const WALL_CONTACT_TOLERANCE: f64 = 2.0;

/// What a hit-test landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ElementRef {
    /// A furniture item.
    Furniture(ElementId),
    /// A heating element or the thermostat.
    HeatingElement(ElementId),
    /// A forbidden zone.
    ForbiddenZone(ElementId),
    /// A buffer zone.
    BufferZone(ElementId),
}

impl ElementRef {
    /// The id of the element, whatever its kind.
    #[must_use]
    pub const fn id(self) -> ElementId {
        match self {
            Self::Furniture(id)
            | Self::HeatingElement(id)
            | Self::ForbiddenZone(id)
            | Self::BufferZone(id) => id,
        }
    }
}

/// Where to put a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainPosition {
    /// Offset from the furniture origin.
    Relative(Point),
    /// Room coordinates.
    Absolute(Point),
}

/// A bathroom floor plan.
#[derive(Debug, Clone)]
pub struct Room {
    polygon: Vec<Point>,
    bounds: Bounds,
    pub(crate) furniture: IndexMap<ElementId, Furniture>,
    pub(crate) forbidden_zones: IndexMap<ElementId, ForbiddenZone>,
    pub(crate) buffer_zones: IndexMap<ElementId, BufferZone>,
    pub(crate) heating_elements: IndexMap<ElementId, HeatingElement>,
    grid: Grid,
    wire: WireRoute,
}

fn rectangle_polygon(min: Point, width: i32, length: i32) -> Vec<Point> {
    Rect::new(min.x, min.y, width, length).corners().to_vec()
}

fn bounds_of(polygon: &[Point]) -> Result<Bounds, RoomError> {
    if polygon.len() < 3 {
        return Err(RoomError::TooFewVertices(polygon.len()));
    }
    let bounds = Bounds::of_points(polygon).ok_or(RoomError::TooFewVertices(0))?;
    check_dimensions(bounds.width, bounds.length)?;
    Ok(bounds)
}

// ---------------------------------------------------------------------------
// Construction and shape queries
// ---------------------------------------------------------------------------

impl Room {
    /// A `width` x `length` rectangular room with its corner at the origin.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::InvalidDimensions`] if either side is outside
    /// `1..=10000`.
    pub fn rectangle(width: i32, length: i32) -> Result<Self, RoomError> {
        check_dimensions(width, length)?;
        Self::from_polygon(rectangle_polygon(Point::new(0, 0), width, length))
    }

    /// A room with an arbitrary simple polygon outline.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::TooFewVertices`] for fewer than three vertices
    /// and [`RoomError::InvalidDimensions`] if the bounding box is empty
    /// or too large.
    pub fn from_polygon(polygon: Vec<Point>) -> Result<Self, RoomError> {
        let bounds = bounds_of(&polygon)?;
        let mut grid = Grid::default();
        grid.update_dimensions(bounds);
        Ok(Self {
            polygon,
            bounds,
            furniture: IndexMap::new(),
            forbidden_zones: IndexMap::new(),
            buffer_zones: IndexMap::new(),
            heating_elements: IndexMap::new(),
            grid,
            wire: WireRoute::new(Vec::new(), 0, 0, bounds),
        })
    }

    /// Outline vertices.
    #[must_use]
    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }

    /// Bounding box of the outline.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Bounding-box width.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.bounds.width
    }

    /// Bounding-box length.
    #[must_use]
    pub const fn length(&self) -> i32 {
        self.bounds.length
    }

    /// Returns `true` if the outline is exactly its bounding box.
    #[must_use]
    pub fn is_rectangular(&self) -> bool {
        self.polygon.len() == 4
            && self
                .bounds
                .as_rect()
                .corners()
                .iter()
                .all(|c| self.polygon.contains(c))
    }

    /// Returns `true` if `p` is inside the room.
    ///
    /// Rectangular rooms include their border; irregular rooms use the
    /// even-odd polygon test.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        if self.is_rectangular() {
            self.bounds.as_rect().contains(p)
        } else {
            geometry::point_in_polygon(p, &self.polygon)
        }
    }

    /// One wall per polygon edge.
    #[must_use]
    pub fn walls(&self) -> Vec<Wall> {
        walls_of(&self.polygon)
    }

    /// Closest wall to `p` and the projection of `p` onto it, if that
    /// projection is within [`WALL_SNAP_DISTANCE`].
    #[must_use]
    pub fn nearest_wall(&self, p: Point) -> Option<(Wall, Point)> {
        let mut best: Option<(Wall, Point, f64)> = None;
        for wall in self.walls() {
            let projected = wall.project(p);
            let d = p.distance(projected);
            if best.is_none_or(|(_, _, best_d)| d < best_d) {
                best = Some((wall, projected, d));
            }
        }
        best.filter(|(_, _, d)| *d <= WALL_SNAP_DISTANCE)
            .map(|(wall, projected, _)| (wall, projected))
    }

    /// Hit-test: furniture first, then heating elements (with a click
    /// margin), then forbidden zones, then buffer zones.
    #[must_use]
    pub fn element_at(&self, p: Point) -> Option<ElementRef> {
        if let Some(f) = self.furniture.values().find(|f| f.rect.contains(p)) {
            return Some(ElementRef::Furniture(f.id));
        }
        let m = HEATING_CLICK_MARGIN;
        if let Some(h) = self.heating_elements.values().find(|h| {
            Rect::new(h.rect.x - m, h.rect.y - m, h.rect.width + 2 * m, h.rect.length + 2 * m)
                .contains(p)
        }) {
            return Some(ElementRef::HeatingElement(h.id));
        }
        if let Some(z) = self.forbidden_zones.values().find(|z| z.rect.contains(p)) {
            return Some(ElementRef::ForbiddenZone(z.id));
        }
        self.buffer_zones
            .values()
            .find(|z| z.rect.contains(p))
            .map(|z| ElementRef::BufferZone(z.id))
    }
}

// ---------------------------------------------------------------------------
// Outline editing
// ---------------------------------------------------------------------------

impl Room {
    /// Resize the room to a new bounding box.
    ///
    /// Rectangular rooms keep their corner and pull overflowing furniture
    /// back inside. Irregular rooms scale every vertex from the
    /// bounding-box minimum corner.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::InvalidDimensions`] if either side is outside
    /// `1..=10000`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn resize(&mut self, width: i32, length: i32) -> Result<(), RoomError> {
        check_dimensions(width, length)?;
        let min = self.bounds.min;
        if self.is_rectangular() {
            self.polygon = rectangle_polygon(min, width, length);
            for f in self.furniture.values_mut() {
                let mut origin = f.rect.origin();
                if f.rect.right() > min.x + width {
                    origin.x = min.x.max(min.x + width - f.rect.width);
                }
                if f.rect.top() > min.y + length {
                    origin.y = min.y.max(min.y + length - f.rect.length);
                }
                f.rect = f.rect.moved_to(origin);
            }
        } else {
            let sx = f64::from(width) / f64::from(self.bounds.width);
            let sy = f64::from(length) / f64::from(self.bounds.length);
            for v in &mut self.polygon {
                v.x = min.x + (f64::from(v.x - min.x) * sx).round() as i32;
                v.y = min.y + (f64::from(v.y - min.y) * sy).round() as i32;
            }
        }
        self.outline_changed()
    }

    /// Append a vertex to the outline.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::InvalidDimensions`] if the new bounding box
    /// would be too large.
    pub fn add_vertex(&mut self, p: Point) -> Result<(), RoomError> {
        let mut polygon = self.polygon.clone();
        polygon.push(p);
        self.replace_polygon(polygon)
    }

    /// Remove the vertex at `index`, keeping at least three.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::VertexIndex`] for an out-of-range index and
    /// [`RoomError::TooFewVertices`] if only three vertices remain.
    pub fn remove_vertex(&mut self, index: usize) -> Result<Point, RoomError> {
        self.check_vertex_index(index)?;
        if self.polygon.len() <= 3 {
            return Err(RoomError::TooFewVertices(self.polygon.len() - 1));
        }
        let mut polygon = self.polygon.clone();
        let removed = polygon.remove(index);
        self.replace_polygon(polygon)?;
        Ok(removed)
    }

    /// Move the vertex at `index` to `p`.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::VertexIndex`] for an out-of-range index and
    /// [`RoomError::InvalidDimensions`] if the bounding box would collapse.
    pub fn modify_vertex(&mut self, index: usize, p: Point) -> Result<(), RoomError> {
        self.check_vertex_index(index)?;
        let mut polygon = self.polygon.clone();
        polygon[index] = p;
        self.replace_polygon(polygon)
    }

    /// Replace the outline with the positions of grid intersections.
    ///
    /// The intersections are marked active in the grid.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::Grid`] when the grid rejects the ids (see
    /// [`Grid::assemble`]) and [`RoomError::InvalidDimensions`] when the
    /// intersections span no area.
    pub fn assemble_from_intersections(&mut self, ids: &[String]) -> Result<(), RoomError> {
        let mut grid = self.grid.clone();
        let polygon = grid.assemble(ids)?;
        let bounds = bounds_of(&polygon)?;
        self.grid = grid;
        self.polygon = polygon;
        self.bounds = bounds;
        self.grid.update_dimensions(bounds);
        self.wire.bounds = bounds;
        Ok(())
    }

    const fn check_vertex_index(&self, index: usize) -> Result<(), RoomError> {
        if index >= self.polygon.len() {
            return Err(RoomError::VertexIndex {
                index,
                len: self.polygon.len(),
            });
        }
        Ok(())
    }

    fn replace_polygon(&mut self, polygon: Vec<Point>) -> Result<(), RoomError> {
        bounds_of(&polygon)?;
        self.polygon = polygon;
        self.outline_changed()
    }

    fn outline_changed(&mut self) -> Result<(), RoomError> {
        let bounds = bounds_of(&self.polygon)?;
        self.bounds = bounds;
        let regenerate = self.grid.is_generated();
        self.grid.update_dimensions(bounds);
        self.wire.bounds = bounds;
        if regenerate {
            self.generate_grid();
        }
        Ok(())
    }

    fn clearance_changed(&mut self) {
        if self.grid.is_generated() {
            self.generate_grid();
        }
    }
}

// ---------------------------------------------------------------------------
// Furniture
// ---------------------------------------------------------------------------

impl Room {
    /// Furniture in insertion order.
    pub fn furniture(&self) -> impl Iterator<Item = &Furniture> + '_ {
        self.furniture.values()
    }

    /// Furniture item by id.
    #[must_use]
    pub fn furniture_by_id(&self, id: ElementId) -> Option<&Furniture> {
        self.furniture.get(&id)
    }

    fn check_furniture_rect(&self, rect: &Rect, exclude: Option<ElementId>) -> Result<(), RoomError> {
        check_dimensions(rect.width, rect.length)?;
        if !oracle::rect_inside_room(rect, self) {
            return Err(RoomError::OutOfBounds);
        }
        if let Some(other) = self
            .furniture
            .values()
            .find(|f| Some(f.id) != exclude && f.rect.overlaps(rect))
        {
            return Err(RoomError::Overlap(other.id));
        }
        Ok(())
    }

    fn furniture_mut(&mut self, id: ElementId) -> Result<&mut Furniture, RoomError> {
        self.furniture
            .get_mut(&id)
            .ok_or(RoomError::UnknownElement(id))
    }

    /// Register a furniture item.
    ///
    /// # Errors
    ///
    /// - [`RoomError::InvalidDimensions`] for a bad size.
    /// - [`RoomError::OutOfBounds`] if it would not be entirely inside.
    /// - [`RoomError::Overlap`] if it would overlap another item.
    pub fn add_furniture(&mut self, furniture: Furniture) -> Result<ElementId, RoomError> {
        self.check_furniture_rect(&furniture.rect, None)?;
        let id = furniture.id;
        self.furniture.insert(id, furniture);
        self.clearance_changed();
        Ok(id)
    }

    /// Move a furniture item. The drain moves with it.
    ///
    /// # Errors
    ///
    /// As for [`Room::add_furniture`], plus [`RoomError::UnknownElement`].
    pub fn move_furniture(&mut self, id: ElementId, origin: Point) -> Result<(), RoomError> {
        let rect = self
            .furniture_by_id(id)
            .ok_or(RoomError::UnknownElement(id))?
            .rect
            .moved_to(origin);
        self.check_furniture_rect(&rect, Some(id))?;
        self.furniture_mut(id)?.rect = rect;
        self.clearance_changed();
        Ok(())
    }

    /// Resize a furniture item, re-centring an automatically placed drain.
    ///
    /// # Errors
    ///
    /// As for [`Room::add_furniture`], plus [`RoomError::UnknownElement`].
    pub fn resize_furniture(&mut self, id: ElementId, width: i32, length: i32) -> Result<(), RoomError> {
        let rect = self
            .furniture_by_id(id)
            .ok_or(RoomError::UnknownElement(id))?
            .rect
            .resized(width, length);
        self.check_furniture_rect(&rect, Some(id))?;
        self.furniture_mut(id)?.resize(width, length);
        self.clearance_changed();
        Ok(())
    }

    /// Set the rendering rotation of a furniture item.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::UnknownElement`] for an unknown id.
    pub fn rotate_furniture(&mut self, id: ElementId, degrees: i32) -> Result<(), RoomError> {
        self.furniture_mut(id)?.rotation_degrees = degrees.rem_euclid(360);
        Ok(())
    }

    /// Remove a furniture item, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::UnknownElement`] for an unknown id.
    pub fn remove_furniture(&mut self, id: ElementId) -> Result<Furniture, RoomError> {
        let removed = self
            .furniture
            .shift_remove(&id)
            .ok_or(RoomError::UnknownElement(id))?;
        self.clearance_changed();
        Ok(removed)
    }

    /// Reposition a drain and set its diameter. The drain is marked as
    /// placed by hand, so later resizes keep it. A non-positive diameter
    /// falls back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::UnknownElement`] for an unknown id and
    /// [`RoomError::NoDrain`] for a kind without a drain.
    pub fn set_drain(&mut self, id: ElementId, position: DrainPosition, diameter: i32) -> Result<(), RoomError> {
        let furniture = self.furniture_mut(id)?;
        let origin = furniture.rect.origin();
        let drain = furniture.drain.as_mut().ok_or(RoomError::NoDrain(id))?;
        drain.offset = match position {
            DrainPosition::Relative(offset) => offset,
            DrainPosition::Absolute(p) => Point::new(p.x - origin.x, p.y - origin.y),
        };
        drain.diameter = if diameter > 0 {
            diameter
        } else {
            DEFAULT_DRAIN_DIAMETER
        };
        drain.manually_moved = true;
        self.clearance_changed();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

impl Room {
    /// Forbidden zones in insertion order.
    pub fn forbidden_zones(&self) -> impl Iterator<Item = &ForbiddenZone> + '_ {
        self.forbidden_zones.values()
    }

    /// Buffer zones in insertion order.
    pub fn buffer_zones(&self) -> impl Iterator<Item = &BufferZone> + '_ {
        self.buffer_zones.values()
    }

    /// Register a forbidden zone.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::InvalidDimensions`] for a bad size.
    pub fn add_forbidden_zone(&mut self, rect: Rect) -> Result<ElementId, RoomError> {
        check_dimensions(rect.width, rect.length)?;
        let zone = ForbiddenZone::new(rect);
        let id = zone.id;
        self.forbidden_zones.insert(id, zone);
        self.clearance_changed();
        Ok(id)
    }

    /// Move a forbidden zone.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::UnknownElement`] for an unknown id.
    pub fn move_forbidden_zone(&mut self, id: ElementId, origin: Point) -> Result<(), RoomError> {
        let zone = self
            .forbidden_zones
            .get_mut(&id)
            .ok_or(RoomError::UnknownElement(id))?;
        zone.rect = zone.rect.moved_to(origin);
        self.clearance_changed();
        Ok(())
    }

    /// Resize a forbidden zone.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::InvalidDimensions`] for a bad size and
    /// [`RoomError::UnknownElement`] for an unknown id.
    pub fn resize_forbidden_zone(&mut self, id: ElementId, width: i32, length: i32) -> Result<(), RoomError> {
        check_dimensions(width, length)?;
        let zone = self
            .forbidden_zones
            .get_mut(&id)
            .ok_or(RoomError::UnknownElement(id))?;
        zone.rect = zone.rect.resized(width, length);
        self.clearance_changed();
        Ok(())
    }

    /// Remove a forbidden zone.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::UnknownElement`] for an unknown id.
    pub fn remove_forbidden_zone(&mut self, id: ElementId) -> Result<ForbiddenZone, RoomError> {
        let removed = self
            .forbidden_zones
            .shift_remove(&id)
            .ok_or(RoomError::UnknownElement(id))?;
        self.clearance_changed();
        Ok(removed)
    }

    /// Register a buffer zone.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::InvalidDimensions`] for a bad size.
    pub fn add_buffer_zone(&mut self, rect: Rect, distance: i32) -> Result<ElementId, RoomError> {
        check_dimensions(rect.width, rect.length)?;
        let zone = BufferZone::new(rect, distance);
        let id = zone.id;
        self.buffer_zones.insert(id, zone);
        Ok(id)
    }

    /// Move a buffer zone.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::UnknownElement`] for an unknown id.
    pub fn move_buffer_zone(&mut self, id: ElementId, origin: Point) -> Result<(), RoomError> {
        let zone = self
            .buffer_zones
            .get_mut(&id)
            .ok_or(RoomError::UnknownElement(id))?;
        zone.rect = zone.rect.moved_to(origin);
        Ok(())
    }

    /// Resize a buffer zone.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::InvalidDimensions`] for a bad size and
    /// [`RoomError::UnknownElement`] for an unknown id.
    pub fn resize_buffer_zone(&mut self, id: ElementId, width: i32, length: i32) -> Result<(), RoomError> {
        check_dimensions(width, length)?;
        let zone = self
            .buffer_zones
            .get_mut(&id)
            .ok_or(RoomError::UnknownElement(id))?;
        zone.rect = zone.rect.resized(width, length);
        Ok(())
    }

    /// Remove a buffer zone.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::UnknownElement`] for an unknown id.
    pub fn remove_buffer_zone(&mut self, id: ElementId) -> Result<BufferZone, RoomError> {
        self.buffer_zones
            .shift_remove(&id)
            .ok_or(RoomError::UnknownElement(id))
    }
}

// ---------------------------------------------------------------------------
// Heating elements
// ---------------------------------------------------------------------------

impl Room {
    /// Heating elements (thermostat included) in insertion order.
    pub fn heating_elements(&self) -> impl Iterator<Item = &HeatingElement> + '_ {
        self.heating_elements.values()
    }

    /// The thermostat, if one is mounted.
    #[must_use]
    pub fn thermostat(&self) -> Option<&HeatingElement> {
        self.heating_elements.values().find(|h| h.is_thermostat())
    }

    /// Returns `true` if `rect` touches a wall.
    ///
    /// Rectangular rooms require a side flush with the bounding box.
    /// Irregular rooms accept any side parallel to a wall and within
    /// two inches of it.
    fn touches_wall(&self, rect: &Rect) -> bool {
        if self.is_rectangular() {
            let b = self.bounds;
            return rect.x == b.min.x
                || rect.right() == b.max_x()
                || rect.y == b.min.y
                || rect.top() == b.max_y();
        }
        let c = rect.corners();
        let sides = [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])];
        let walls = self.walls();
        sides.iter().any(|&(a, b)| {
            walls.iter().any(|w| {
                w.is_parallel_to(a, b) && w.distance_to_segment(a, b) < WALL_CONTACT_TOLERANCE
            })
        })
    }

    fn check_heating_rect(&self, rect: &Rect) -> Result<(), RoomError> {
        check_dimensions(rect.width, rect.length)?;
        if self.is_rectangular() && !oracle::rect_inside_room(rect, self) {
            return Err(RoomError::OutOfBounds);
        }
        if !self.touches_wall(rect) {
            return Err(RoomError::NotAgainstWall);
        }
        Ok(())
    }

    fn heating_mut(&mut self, id: ElementId) -> Result<&mut HeatingElement, RoomError> {
        self.heating_elements
            .get_mut(&id)
            .ok_or(RoomError::UnknownElement(id))
    }

    /// Mount a heating element or the thermostat against a wall.
    ///
    /// # Errors
    ///
    /// - [`RoomError::DuplicateThermostat`] for a second thermostat.
    /// - [`RoomError::InvalidDimensions`] for a bad size.
    /// - [`RoomError::OutOfBounds`] if it sticks out of a rectangular room.
    /// - [`RoomError::NotAgainstWall`] if it does not touch a wall.
    pub fn add_heating_element(&mut self, element: HeatingElement) -> Result<ElementId, RoomError> {
        if element.is_thermostat() && self.thermostat().is_some() {
            return Err(RoomError::DuplicateThermostat);
        }
        self.check_heating_rect(&element.rect)?;
        let id = element.id;
        self.heating_elements.insert(id, element);
        Ok(id)
    }

    /// Move a heating element.
    ///
    /// # Errors
    ///
    /// As for [`Room::add_heating_element`], plus
    /// [`RoomError::UnknownElement`].
    pub fn move_heating_element(&mut self, id: ElementId, origin: Point) -> Result<(), RoomError> {
        let rect = self
            .heating_elements
            .get(&id)
            .ok_or(RoomError::UnknownElement(id))?
            .rect
            .moved_to(origin);
        self.check_heating_rect(&rect)?;
        self.heating_mut(id)?.rect = rect;
        Ok(())
    }

    /// Resize a heating element.
    ///
    /// # Errors
    ///
    /// As for [`Room::add_heating_element`], plus
    /// [`RoomError::UnknownElement`].
    pub fn resize_heating_element(&mut self, id: ElementId, width: i32, length: i32) -> Result<(), RoomError> {
        let rect = self
            .heating_elements
            .get(&id)
            .ok_or(RoomError::UnknownElement(id))?
            .rect
            .resized(width, length);
        self.check_heating_rect(&rect)?;
        self.heating_mut(id)?.rect = rect;
        Ok(())
    }

    /// Remove a heating element.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::UnknownElement`] for an unknown id.
    pub fn remove_heating_element(&mut self, id: ElementId) -> Result<HeatingElement, RoomError> {
        self.heating_elements
            .shift_remove(&id)
            .ok_or(RoomError::UnknownElement(id))
    }
}

// ---------------------------------------------------------------------------
// Grid and wire
// ---------------------------------------------------------------------------

impl Room {
    /// The snap-point grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access for activation and parameter changes.
    pub const fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Replace the grid parameters. The grid must be regenerated.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSpacing`] for a pitch under one inch.
    pub fn configure_grid(&mut self, settings: GridSettings) -> Result<(), GridError> {
        self.grid.apply(settings)
    }

    /// Install a grid built elsewhere, e.g. by [`crate::build_grid`].
    pub fn set_grid(&mut self, grid: Grid) {
        self.grid = grid;
    }

    /// Rebuild the grid for the current outline and elements.
    pub fn generate_grid(&mut self) {
        let mut grid = std::mem::take(&mut self.grid);
        grid.generate(self);
        self.grid = grid;
    }

    /// The current wire route.
    #[must_use]
    pub const fn wire(&self) -> &WireRoute {
        &self.wire
    }

    /// Replace the wire route. Its recorded bounds follow the room.
    pub fn set_wire(&mut self, mut wire: WireRoute) {
        wire.bounds = self.bounds;
        self.wire = wire;
    }
}
