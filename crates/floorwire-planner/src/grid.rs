//! Snap-point grid the wire is routed on.
//!
//! Intersections sit on a square lattice whose pitch and translation are
//! stored in 32nds of an inch. A lattice index `(i, j)` maps to the
//! offset `(tx + i·s, ty + j·s)` from the room's bounding-box minimum,
//! rounded half up to whole inches. Both generation modes use this one
//! mapping, so confirming a previewed grid keeps every surviving node
//! where the user saw it.
//!
//! - **Preview** keeps every index whose untranslated offset lies inside
//!   the bounding box, including nodes the translation pushes past a
//!   wall. The editor draws these so the user can see where the grid
//!   comes from while dragging it.
//! - **Confirmed** keeps the indices whose translated offset lies inside
//!   the bounding box, then drops every node outside the polygon or
//!   failing the clearance rules at [`MIN_WALL`](crate::oracle::MIN_WALL).
//!
//! Edges join lattice neighbours `(i±1, j)` and `(i, j±1)` that both
//! survive, so every edge is horizontal or vertical.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::geometry::snap_id;
use crate::oracle;
use crate::room::Room;
use crate::types::{Bounds, GridError, Point};

/// Units per inch for grid spacing and translation.
pub const UNITS_PER_INCH: i64 = 32;

/// Grid parameters persisted with the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Lattice pitch in 32nds of an inch.
    pub spacing_32nds: u32,
    /// Horizontal translation in 32nds of an inch.
    pub tx_32nds: i32,
    /// Vertical translation in 32nds of an inch.
    pub ty_32nds: i32,
    /// Whether the grid has been confirmed for planning.
    pub confirmed: bool,
}

impl GridSettings {
    /// Default pitch: 3 inches.
    pub const DEFAULT_SPACING_32NDS: u32 = 96;

    /// Smallest accepted pitch: 1 inch. Finer pitches would round
    /// distinct lattice points onto the same whole-inch position.
    pub const MIN_SPACING_32NDS: u32 = 32;

    /// Pitch in inches.
    #[must_use]
    pub fn spacing_inches(&self) -> f64 {
        f64::from(self.spacing_32nds) / 32.0
    }

    /// Reject pitches below [`Self::MIN_SPACING_32NDS`].
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSpacing`] for a pitch under one inch.
    pub const fn validate(&self) -> Result<(), GridError> {
        if self.spacing_32nds < Self::MIN_SPACING_32NDS {
            return Err(GridError::InvalidSpacing(self.spacing_32nds));
        }
        Ok(())
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            spacing_32nds: Self::DEFAULT_SPACING_32NDS,
            tx_32nds: 0,
            ty_32nds: 0,
            confirmed: false,
        }
    }
}

/// A grid node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intersection {
    /// Client-facing id, `"I_<x>_<y>"`.
    pub id: String,
    /// Position in room coordinates.
    pub position: Point,
    /// Lattice index.
    pub lattice: (i32, i32),
    /// Marked by the legacy assemble operation.
    pub active: bool,
}

/// The snap-point graph of a room.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    settings: GridSettings,
    bounds: Bounds,
    /// Edge weights are segment lengths in inches.
    graph: UnGraph<Intersection, f64>,
    by_lattice: HashMap<(i32, i32), NodeIndex>,
    by_position: HashMap<Point, NodeIndex>,
    generated: bool,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

impl Grid {
    /// Create an empty, not yet generated grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSpacing`] for a pitch under one inch.
    pub fn new(settings: GridSettings) -> Result<Self, GridError> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    /// Current parameters.
    #[must_use]
    pub const fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Replace every parameter at once. Clears the generated state.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSpacing`] for a pitch under one inch;
    /// the grid is left unchanged.
    pub fn apply(&mut self, settings: GridSettings) -> Result<(), GridError> {
        settings.validate()?;
        self.settings = settings;
        self.generated = false;
        Ok(())
    }

    /// Change the pitch. Clears the generated state.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSpacing`] for a pitch under one inch.
    pub fn set_spacing(&mut self, spacing_32nds: u32) -> Result<(), GridError> {
        self.apply(GridSettings {
            spacing_32nds,
            ..self.settings
        })
    }

    /// Change the horizontal translation. Clears the generated state.
    pub const fn set_tx(&mut self, tx_32nds: i32) {
        self.settings.tx_32nds = tx_32nds;
        self.generated = false;
    }

    /// Change the vertical translation. Clears the generated state.
    pub const fn set_ty(&mut self, ty_32nds: i32) {
        self.settings.ty_32nds = ty_32nds;
        self.generated = false;
    }

    /// Confirm or un-confirm the grid. Clears the generated state.
    pub const fn set_confirmed(&mut self, confirmed: bool) {
        self.settings.confirmed = confirmed;
        self.generated = false;
    }

    /// Record new room bounds. Clears the generated state.
    pub const fn update_dimensions(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.generated = false;
    }

    /// Returns `true` once [`Grid::generate`] ran after the last change.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.generated
    }

    /// Returns `true` if the grid is generated and confirmed, i.e. ready
    /// for planning.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.generated && self.settings.confirmed
    }

    /// Room bounds the grid was last generated or resized for.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Round a 32nds offset half up to whole inches.
#[allow(clippy::cast_possible_truncation)]
const fn to_inches(units: i64) -> i32 {
    (units + UNITS_PER_INCH / 2).div_euclid(UNITS_PER_INCH) as i32
}

const fn ceil_div(a: i64, b: i64) -> i64 {
    -(-a).div_euclid(b)
}

/// Lattice indices along one axis.
///
/// `extent` is the room extent in inches, `t` the translation in 32nds.
#[allow(clippy::cast_possible_truncation)]
fn axis_indices(extent: i32, t: i32, s: i64, confirmed: bool) -> Vec<i32> {
    let extent_units = i64::from(extent) * UNITS_PER_INCH;
    let t = i64::from(t);
    if confirmed {
        return (ceil_div(-t, s)..=(extent_units - t).div_euclid(s))
            .map(|k| k as i32)
            .collect();
    }
    let window = (t.min(0) - 2 * s)..=((extent_units + t).max(extent_units) + 2 * s);
    (0..=extent_units.div_euclid(s))
        .filter(|k| window.contains(&(k * s + t)))
        .map(|k| k as i32)
        .collect()
}

impl Grid {
    /// Map a lattice index to room coordinates.
    #[must_use]
    pub fn lattice_position(&self, lattice: (i32, i32)) -> Point {
        let s = i64::from(self.settings.spacing_32nds);
        let ox = i64::from(self.settings.tx_32nds) + i64::from(lattice.0) * s;
        let oy = i64::from(self.settings.ty_32nds) + i64::from(lattice.1) * s;
        self.bounds.min.offset(to_inches(ox), to_inches(oy))
    }

    /// Rebuild all intersections and edges for `room`.
    ///
    /// Active flags are reset.
    pub fn generate(&mut self, room: &Room) {
        self.bounds = room.bounds();
        self.graph = UnGraph::new_undirected();
        self.by_lattice.clear();
        self.by_position.clear();

        let s = i64::from(self.settings.spacing_32nds.max(GridSettings::MIN_SPACING_32NDS));
        let confirmed = self.settings.confirmed;
        let columns = axis_indices(self.bounds.width, self.settings.tx_32nds, s, confirmed);
        let rows = axis_indices(self.bounds.length, self.settings.ty_32nds, s, confirmed);

        for &i in &columns {
            for &j in &rows {
                let position = self.lattice_position((i, j));
                if confirmed
                    && !(room.contains_point(position)
                        && oracle::is_legal_point(position, room, oracle::MIN_WALL))
                {
                    continue;
                }
                let idx = self.graph.add_node(Intersection {
                    id: snap_id(position),
                    position,
                    lattice: (i, j),
                    active: false,
                });
                self.by_lattice.insert((i, j), idx);
                self.by_position.insert(position, idx);
            }
        }

        let nodes: Vec<NodeIndex> = self.graph.node_indices().collect();
        for a in nodes {
            let (i, j) = self.graph[a].lattice;
            for key in [(i + 1, j), (i, j + 1)] {
                if let Some(&b) = self.by_lattice.get(&key) {
                    let length = self.graph[a].position.distance(self.graph[b].position);
                    self.graph.add_edge(a, b, length);
                }
            }
        }

        self.generated = true;
        tracing::debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            confirmed,
            "grid generated"
        );
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Sort rank of a neighbour direction: +x, -x, +y, -y.
const fn direction_rank(from: (i32, i32), to: (i32, i32)) -> u8 {
    match (to.0 - from.0, to.1 - from.1) {
        (1, _) => 0,
        (-1, _) => 1,
        (_, 1) => 2,
        _ => 3,
    }
}

impl Grid {
    /// Number of intersections.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All node indices in generation order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// All intersections in generation order.
    pub fn intersections(&self) -> impl Iterator<Item = &Intersection> + '_ {
        self.graph.node_weights()
    }

    /// Intersection at a node index.
    #[must_use]
    pub fn intersection(&self, idx: NodeIndex) -> Option<&Intersection> {
        self.graph.node_weight(idx)
    }

    /// Position of a node. Unknown indices map to the origin of the bounds.
    #[must_use]
    pub fn position(&self, idx: NodeIndex) -> Point {
        self.graph
            .node_weight(idx)
            .map_or(self.bounds.min, |n| n.position)
    }

    /// Node at a room position, if any.
    #[must_use]
    pub fn node_at(&self, p: Point) -> Option<NodeIndex> {
        self.by_position.get(&p).copied()
    }

    /// Node with a client-facing id, if any.
    #[must_use]
    pub fn node_by_id(&self, id: &str) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|&idx| self.graph[idx].id == id)
    }

    /// Neighbours of a node, ordered +x, -x, +y, -y.
    #[must_use]
    pub fn neighbours(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let Some(node) = self.graph.node_weight(idx) else {
            return Vec::new();
        };
        let mut out: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        out.sort_by_key(|&n| direction_rank(node.lattice, self.graph[n].lattice));
        out
    }

    /// Length of the edge between two nodes, if they are neighbours.
    #[must_use]
    pub fn edge_length(&self, a: NodeIndex, b: NodeIndex) -> Option<f64> {
        self.graph
            .find_edge(a, b)
            .and_then(|e| self.graph.edge_weight(e).copied())
    }

    /// Returns `true` if the two nodes share an edge.
    #[must_use]
    pub fn are_neighbours(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    /// All edges as endpoint pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&Intersection, &Intersection)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()]))
    }
}

// ---------------------------------------------------------------------------
// Legacy active-intersection selection
// ---------------------------------------------------------------------------

impl Grid {
    /// Mark the intersection at `p` active. Returns `false` if no
    /// intersection sits there.
    pub fn activate_intersection(&mut self, p: Point) -> bool {
        match self.by_position.get(&p) {
            Some(&idx) => {
                self.graph[idx].active = true;
                true
            }
            None => false,
        }
    }

    /// Clear every active flag.
    pub fn deactivate_all(&mut self) {
        for node in self.graph.node_weights_mut() {
            node.active = false;
        }
    }

    /// Ids of the active intersections in generation order.
    #[must_use]
    pub fn active_intersection_ids(&self) -> Vec<String> {
        self.graph
            .node_weights()
            .filter(|n| n.active)
            .map(|n| n.id.clone())
            .collect()
    }

    /// Activate the intersections named by `ids` and return their
    /// positions in the given order.
    ///
    /// # Errors
    ///
    /// - [`GridError::TooFewIntersections`] for fewer than three ids.
    /// - [`GridError::UnknownIntersection`] for an id not in the grid.
    /// - [`GridError::AllNeighbours`] if every pair shares an edge.
    ///
    /// Nothing is activated when an error is returned.
    pub fn assemble(&mut self, ids: &[String]) -> Result<Vec<Point>, GridError> {
        if ids.len() < 3 {
            return Err(GridError::TooFewIntersections(ids.len()));
        }
        let nodes = ids
            .iter()
            .map(|id| {
                self.node_by_id(id)
                    .ok_or_else(|| GridError::UnknownIntersection(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let all_neighbours = nodes.iter().enumerate().all(|(k, &a)| {
            nodes[k + 1..]
                .iter()
                .all(|&b| self.are_neighbours(a, b))
        });
        if all_neighbours {
            return Err(GridError::AllNeighbours);
        }

        for &idx in &nodes {
            self.graph[idx].active = true;
        }
        Ok(nodes.iter().map(|&idx| self.graph[idx].position).collect())
    }
}
