//! Serpentine wire planner.
//!
//! Walks the confirmed grid from the node nearest the thermostat and lays
//! the wire in parallel lanes:
//!
//! 1. **Lane move**: step to the closest unvisited legal neighbour on the
//!    current lane, in the current direction.
//! 2. **Perpendicular hop**: at the end of a lane near a wall, jump to a
//!    node `perp_steps` grid hops away across the lane and reverse.
//! 3. **Escape**: otherwise move to whichever legal unvisited neighbour
//!    scores best, favouring the periphery, and continue from there.
//!
//! Every chosen move must pass admission (segment length, length budget,
//! no crossing or folding back over the path, wire separation, no
//! forbidden-zone contact). Lane moves running straight on are merged
//! into one segment.
//! A rejected candidate is marked visited and the search restarts from
//! the lane move. Planning stops once the wire reaches 95% of the target
//! length, when no candidate remains, or after [`MAX_ITERATIONS`].
//!
//! The planner only reads the room. The same room, grid and parameters
//! always produce the same route.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::geometry::{continues_straight, dist_segment_segment, segments_intersect};
use crate::grid::Grid;
use crate::oracle::{self, MAX_SEGMENT, MIN_WALL, MIN_WIRE_SEPARATION};
use crate::room::Room;
use crate::types::{PlanError, Point, WireRoute};

/// Safety bound on planner and extender iterations.
pub const MAX_ITERATIONS: usize = 5000;

/// Distance from the bounding box at which a lane counts as ending at a
/// wall.
pub const WALL_TURN_MARGIN: i32 = MIN_WALL + 5;

/// Planning stops once the wire reaches this share of the target.
pub(crate) const STOP_RATIO: f64 = 0.95;
/// Hard cap on the wire length as a share of the target.
pub(crate) const LENGTH_CAP_RATIO: f64 = 1.05;
/// Candidates must fit within this share of the budget.
pub(crate) const FIT_RATIO: f64 = 1.1;
/// Candidates shorter than this share of what is left get a bonus.
pub(crate) const BONUS_RATIO: f64 = 0.9;
/// A plan shorter than this share of the target is reported infeasible.
pub const INFEASIBLE_RATIO: f64 = 0.5;

// ---------------------------------------------------------------------------
// Configuration and results
// ---------------------------------------------------------------------------

/// Orientation of the first lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneAxis {
    /// Lanes are rows; hops are vertical.
    #[default]
    Horizontal,
    /// Lanes are columns; hops are horizontal.
    Vertical,
}

/// Planner parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Distance between adjacent lanes in inches. Also the minimum wall
    /// clearance when larger than [`MIN_WALL`].
    pub spacing: u32,
    /// Desired wire length in inches.
    pub target_length: u32,
    /// Orientation of the first lane.
    pub axis: LaneAxis,
}

impl PlanConfig {
    /// Default lane spacing: 6 inches.
    pub const DEFAULT_SPACING: u32 = 6;

    /// Default target length: 1000 inches.
    pub const DEFAULT_TARGET_LENGTH: u32 = 1000;
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            spacing: Self::DEFAULT_SPACING,
            target_length: Self::DEFAULT_TARGET_LENGTH,
            axis: LaneAxis::default(),
        }
    }
}

/// Why planning stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The wire reached 95% of the target length.
    ReachedTarget,
    /// No admissible move was left.
    NoCandidates,
    /// The iteration bound was hit.
    IterationLimit,
    /// No grid node satisfies the clearance rules.
    NoLegalStart,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ReachedTarget => "reached target",
            Self::NoCandidates => "no candidates",
            Self::IterationLimit => "iteration limit",
            Self::NoLegalStart => "no legal start",
        };
        f.write_str(s)
    }
}

/// Non-fatal findings about a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanDiagnostic {
    /// The route is shorter than half the target. It is still returned
    /// so the user can inspect it.
    Infeasible {
        /// Length reached, in inches.
        actual_length: f64,
        /// Requested length, in inches.
        target_length: u32,
        /// Why planning stopped.
        stop: StopReason,
    },
}

impl fmt::Display for PlanDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infeasible {
                actual_length,
                target_length,
                stop,
            } => write!(
                f,
                "route reaches {actual_length:.1}\" of {target_length}\" ({stop})"
            ),
        }
    }
}

/// Counters collected while planning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStats {
    /// Loop iterations.
    pub iterations: usize,
    /// Committed lane moves.
    pub lane_moves: usize,
    /// Committed perpendicular hops.
    pub hops: usize,
    /// Committed escape moves.
    pub escapes: usize,
    /// Candidates rejected at admission.
    pub rejections: usize,
}

/// Result of a planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// The planned route.
    pub route: WireRoute,
    /// Set when the route falls short of the target.
    pub diagnostic: Option<PlanDiagnostic>,
    /// Why planning stopped.
    pub stop: StopReason,
    /// Run counters.
    pub stats: PlanStats,
}

/// Planner state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    /// Extending along the current lane.
    InLane,
    /// At a wall, looking for the next lane.
    TurningAtWall,
    /// Off the serpentine, looking for any good neighbour.
    Escaping,
    /// Finished.
    Done,
}

// ---------------------------------------------------------------------------
// Admission
// ---------------------------------------------------------------------------

/// Why a candidate move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    SegmentTooLong,
    OverLength,
    Crossing,
    TooClose,
    ForbiddenZone,
}

/// An accepted move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Admission {
    /// Length added to the wire.
    pub(crate) edge: f64,
    /// The move runs straight on from the last segment and replaces its
    /// end point instead of starting a new segment.
    pub(crate) extends_last: bool,
}

impl Admission {
    /// Append `next` to `points` as admitted.
    pub(crate) fn apply(self, points: &mut Vec<Point>, next: Point) {
        match points.last_mut() {
            Some(last) if self.extends_last => *last = next,
            _ => points.push(next),
        }
    }
}

/// Check whether the wire may move from the last point of `points` to
/// `next`.
///
/// A move continuing the last segment straight on is merged into it
/// while the merged run stays within [`MAX_SEGMENT`], so a lane is one
/// segment however fine the grid. The segment that results must not
/// cross the path before it, and must keep [`MIN_WIRE_SEPARATION`] from
/// every segment that does not share its start. Turns share only an
/// endpoint with the previous segment and pass, while a move folding back
/// over it is refused.
///
/// `length` is the length already laid against `budget`. The first
/// `keep` points are fixed and never merged away.
pub(crate) fn admit(
    room: &Room,
    points: &[Point],
    keep: usize,
    length: f64,
    budget: f64,
    next: Point,
) -> Result<Admission, Rejection> {
    let Some(&last) = points.last() else {
        return Ok(Admission {
            edge: 0.0,
            extends_last: false,
        });
    };
    let edge = last.distance(next);
    if edge > f64::from(MAX_SEGMENT) {
        return Err(Rejection::SegmentTooLong);
    }
    if length + edge > budget * LENGTH_CAP_RATIO {
        return Err(Rejection::OverLength);
    }

    let n = points.len();
    let extends_last = n >= 2
        && n > keep
        && continues_straight(points[n - 2], last, next)
        && points[n - 2].distance(next) <= f64::from(MAX_SEGMENT);
    let start = if extends_last { n - 2 } else { n - 1 };
    let from = points[start];

    if points[..=start]
        .windows(2)
        .any(|w| segments_intersect(from, next, w[0], w[1]))
    {
        return Err(Rejection::Crossing);
    }
    let separation = f64::from(MIN_WIRE_SEPARATION);
    if points[..start]
        .windows(2)
        .any(|w| dist_segment_segment(from, next, w[0], w[1]) < separation)
    {
        return Err(Rejection::TooClose);
    }
    if oracle::forbidden_zone_crossed(last, next, room).is_some() {
        return Err(Rejection::ForbiddenZone);
    }
    Ok(Admission { edge, extends_last })
}

/// Coverage score shared by escape moves and the extender.
pub(crate) fn coverage_score(room: &Room, candidate: Point, edge: f64, remaining: f64) -> f64 {
    let centre = room.bounds().centre();
    let bonus = if edge < remaining * BONUS_RATIO { 10.0 } else { 0.0 };
    candidate.distance(centre).mul_add(0.1, bonus) + 5.0
}

/// Legality of every grid node at `min_wall`, indexed by node index.
pub(crate) fn legal_nodes(room: &Room, grid: &Grid, min_wall: i32) -> Vec<bool> {
    let mut legal = vec![false; grid.node_count()];
    for idx in grid.node_indices() {
        legal[idx.index()] = oracle::is_legal_point(grid.position(idx), room, min_wall);
    }
    legal
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveKind {
    Lane,
    Hop,
    Escape,
}

struct Serpentine<'a> {
    room: &'a Room,
    grid: &'a Grid,
    target: f64,
    perp_steps: usize,
    legal: Vec<bool>,
    visited: Vec<bool>,
    points: Vec<Point>,
    current: NodeIndex,
    length: f64,
    axis: LaneAxis,
    forward: bool,
    lane_ref: i32,
    state: PlannerState,
    stats: PlanStats,
}

impl Serpentine<'_> {
    fn remaining(&self) -> f64 {
        self.target - self.length
    }

    fn on_lane(&self, from: Point, to: Point) -> bool {
        match self.axis {
            LaneAxis::Horizontal => {
                to.y == self.lane_ref && (to.x > from.x) == self.forward && to.x != from.x
            }
            LaneAxis::Vertical => {
                to.x == self.lane_ref && (to.y > from.y) == self.forward && to.y != from.y
            }
        }
    }

    fn open(&self, idx: NodeIndex) -> bool {
        !self.visited[idx.index()] && self.legal[idx.index()]
    }

    /// Closest open neighbour on the lane that fits the budget.
    fn lane_candidate(&self) -> Option<NodeIndex> {
        let here = self.grid.position(self.current);
        let mut best: Option<(NodeIndex, f64)> = None;
        for n in self.grid.neighbours(self.current) {
            let there = self.grid.position(n);
            if !self.open(n) || !self.on_lane(here, there) {
                continue;
            }
            let edge = here.distance(there);
            if self.length + edge > self.target * FIT_RATIO {
                continue;
            }
            if best.is_none_or(|(_, d)| edge < d) {
                best = Some((n, edge));
            }
        }
        best.map(|(n, _)| n)
    }

    /// Returns `true` if the current node is close to the bounding-box
    /// edge the lane is heading for.
    fn at_wall(&self) -> bool {
        let p = self.grid.position(self.current);
        let b = self.room.bounds();
        match (self.axis, self.forward) {
            (LaneAxis::Horizontal, true) => p.x >= b.max_x() - WALL_TURN_MARGIN,
            (LaneAxis::Horizontal, false) => p.x <= b.min.x + WALL_TURN_MARGIN,
            (LaneAxis::Vertical, true) => p.y >= b.max_y() - WALL_TURN_MARGIN,
            (LaneAxis::Vertical, false) => p.y <= b.min.y + WALL_TURN_MARGIN,
        }
    }

    fn crosses_lanes(&self, a: NodeIndex, b: NodeIndex) -> bool {
        let (Some(a), Some(b)) = (self.grid.intersection(a), self.grid.intersection(b)) else {
            return false;
        };
        match self.axis {
            LaneAxis::Horizontal => a.lattice.0 == b.lattice.0,
            LaneAxis::Vertical => a.lattice.1 == b.lattice.1,
        }
    }

    fn off_lane(&self, p: Point) -> bool {
        match self.axis {
            LaneAxis::Horizontal => p.y != self.lane_ref,
            LaneAxis::Vertical => p.x != self.lane_ref,
        }
    }

    /// Breadth-first search across the lanes for an open node exactly
    /// `perp_steps` hops away, falling back to the closest hop count.
    fn hop_candidate(&self) -> Option<NodeIndex> {
        let mut depth: HashMap<NodeIndex, usize> = HashMap::from([(self.current, 0)]);
        let mut queue = VecDeque::from([self.current]);
        let mut best: Option<(NodeIndex, usize)> = None;

        while let Some(n) = queue.pop_front() {
            let d = depth.get(&n).copied().unwrap_or_default();
            if self.open(n) && self.off_lane(self.grid.position(n)) {
                if d == self.perp_steps {
                    return Some(n);
                }
                let gap = d.abs_diff(self.perp_steps);
                if best.is_none_or(|(_, g)| gap < g) {
                    best = Some((n, gap));
                }
            }
            if d < self.perp_steps + 2 {
                for m in self.grid.neighbours(n) {
                    if !depth.contains_key(&m) && self.crosses_lanes(n, m) {
                        depth.insert(m, d + 1);
                        queue.push_back(m);
                    }
                }
            }
        }
        best.map(|(n, _)| n)
    }

    /// Best-scoring open neighbour that fits the budget.
    fn escape_candidate(&self) -> Option<NodeIndex> {
        let here = self.grid.position(self.current);
        let mut best: Option<(NodeIndex, f64)> = None;
        for n in self.grid.neighbours(self.current) {
            if !self.open(n) {
                continue;
            }
            let there = self.grid.position(n);
            let edge = here.distance(there);
            if self.length + edge > self.target * FIT_RATIO {
                continue;
            }
            let score = coverage_score(self.room, there, edge, self.remaining());
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((n, score));
            }
        }
        best.map(|(n, _)| n)
    }

    /// Try to append `candidate`. On success the lane bookkeeping is
    /// updated for `kind`; on rejection the candidate is marked visited.
    fn try_commit(&mut self, candidate: NodeIndex, kind: MoveKind) {
        let next = self.grid.position(candidate);
        match admit(self.room, &self.points, 0, self.length, self.target, next) {
            Ok(admission) => {
                admission.apply(&mut self.points, next);
                self.length += admission.edge;
                self.visited[candidate.index()] = true;
                self.current = candidate;
                match kind {
                    MoveKind::Lane => self.stats.lane_moves += 1,
                    MoveKind::Hop => {
                        self.stats.hops += 1;
                        self.forward = !self.forward;
                        self.re_anchor(next);
                    }
                    MoveKind::Escape => {
                        self.stats.escapes += 1;
                        self.re_anchor(next);
                    }
                }
            }
            Err(reason) => {
                self.stats.rejections += 1;
                self.visited[candidate.index()] = true;
                tracing::debug!(?reason, ?kind, at = %next, "candidate rejected");
            }
        }
        self.set_state(PlannerState::InLane);
    }

    const fn re_anchor(&mut self, p: Point) {
        self.lane_ref = match self.axis {
            LaneAxis::Horizontal => p.y,
            LaneAxis::Vertical => p.x,
        };
    }

    fn set_state(&mut self, state: PlannerState) {
        if state != self.state {
            tracing::debug!(from = ?self.state, to = ?state, length = self.length, "planner state");
            self.state = state;
        }
    }

    fn run(&mut self) -> StopReason {
        loop {
            if self.length >= self.target * STOP_RATIO {
                self.set_state(PlannerState::Done);
                return StopReason::ReachedTarget;
            }
            if self.stats.iterations >= MAX_ITERATIONS {
                tracing::warn!(iterations = self.stats.iterations, "planner hit the iteration limit");
                self.set_state(PlannerState::Done);
                return StopReason::IterationLimit;
            }
            self.stats.iterations += 1;

            match self.state {
                PlannerState::InLane => {
                    if let Some(c) = self.lane_candidate() {
                        self.try_commit(c, MoveKind::Lane);
                    } else if self.at_wall() {
                        self.set_state(PlannerState::TurningAtWall);
                    } else {
                        self.set_state(PlannerState::Escaping);
                    }
                }
                PlannerState::TurningAtWall => match self.hop_candidate() {
                    Some(c) => self.try_commit(c, MoveKind::Hop),
                    None => self.set_state(PlannerState::Escaping),
                },
                PlannerState::Escaping => match self.escape_candidate() {
                    Some(c) => self.try_commit(c, MoveKind::Escape),
                    None => {
                        self.set_state(PlannerState::Done);
                        return StopReason::NoCandidates;
                    }
                },
                PlannerState::Done => return StopReason::NoCandidates,
            }
        }
    }
}

/// Grid step count between lanes for a spacing in inches.
#[allow(clippy::cast_possible_truncation)]
fn perpendicular_steps(spacing: u32, grid: &Grid) -> usize {
    let pitch = u64::from(grid.settings().spacing_32nds.max(1));
    let steps = u64::from(spacing) * 32 / pitch;
    (steps as usize).max(1)
}

/// Plan a serpentine route through the room's confirmed grid.
///
/// # Errors
///
/// Returns [`PlanError::GridNotReady`] unless the grid is generated and
/// confirmed. A route that falls short is not an error; see
/// [`Plan::diagnostic`].
pub fn plan(room: &Room, config: &PlanConfig) -> Result<Plan, PlanError> {
    let grid = room.grid();
    if !grid.is_ready() {
        return Err(PlanError::GridNotReady);
    }

    let min_wall = oracle::planning_wall_clearance(config.spacing);
    let legal = legal_nodes(room, grid, min_wall);
    let hint = room
        .thermostat()
        .map_or(Point::new(min_wall, min_wall), |t| t.rect.origin());

    let mut start: Option<(NodeIndex, f64)> = None;
    for idx in grid.node_indices() {
        if !legal[idx.index()] {
            continue;
        }
        let d = grid.position(idx).distance(hint);
        if start.is_none_or(|(_, best)| d < best) {
            start = Some((idx, d));
        }
    }

    let target = f64::from(config.target_length);
    let route = |points: Vec<Point>| {
        WireRoute::new(points, config.target_length, config.spacing, room.bounds())
    };

    let Some((start, _)) = start else {
        tracing::warn!("no grid node satisfies the clearance rules");
        return Ok(Plan {
            route: route(Vec::new()),
            diagnostic: Some(PlanDiagnostic::Infeasible {
                actual_length: 0.0,
                target_length: config.target_length,
                stop: StopReason::NoLegalStart,
            }),
            stop: StopReason::NoLegalStart,
            stats: PlanStats::default(),
        });
    };

    let start_point = grid.position(start);
    let mut visited = vec![false; grid.node_count()];
    visited[start.index()] = true;
    let mut planner = Serpentine {
        room,
        grid,
        target,
        perp_steps: perpendicular_steps(config.spacing, grid),
        legal,
        visited,
        points: vec![start_point],
        current: start,
        length: 0.0,
        axis: config.axis,
        forward: true,
        lane_ref: match config.axis {
            LaneAxis::Horizontal => start_point.y,
            LaneAxis::Vertical => start_point.x,
        },
        state: PlannerState::InLane,
        stats: PlanStats::default(),
    };
    tracing::debug!(start = %start_point, perp_steps = planner.perp_steps, min_wall, "planning");

    let stop = planner.run();
    let length = planner.length;
    let stats = planner.stats;
    let diagnostic = (length < target * INFEASIBLE_RATIO).then(|| {
        tracing::warn!(length, target, %stop, "plan is shorter than half the target");
        PlanDiagnostic::Infeasible {
            actual_length: length,
            target_length: config.target_length,
            stop,
        }
    });
    tracing::info!(
        length,
        target,
        points = planner.points.len(),
        %stop,
        "plan complete"
    );

    Ok(Plan {
        route: route(planner.points),
        diagnostic,
        stop,
        stats,
    })
}
