//! Rule-by-rule check of a finished route.
//!
//! Each rule reports at most one [`ValidationError`]: the first segment
//! (in route order) that breaks it. Errors come back in [`Rule`] order.
//! The validator never mutates the room.

use std::fmt;

use geo::line_measures::Distance;
use geo::{Euclidean, Line};
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use serde::{Deserialize, Serialize};

use crate::geometry::segments_intersect;
use crate::oracle::{self, MAX_SEGMENT, MIN_FURNITURE, MIN_WALL, MIN_WIRE_SEPARATION};
use crate::room::Room;
use crate::types::{Point, WireRoute};

/// A clearance or shape rule checked by [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// No segment longer than [`MAX_SEGMENT`].
    SegmentLength,
    /// Every vertex at least [`MIN_WALL`] from the walls.
    WallClearance,
    /// Every vertex at least [`MIN_FURNITURE`] from furniture.
    FurnitureClearance,
    /// Every vertex clear of every drain.
    DrainClearance,
    /// No segment touches a forbidden zone.
    ForbiddenZone,
    /// No two segments cross or overlap.
    SelfCrossing,
    /// Non-adjacent segments at least [`MIN_WIRE_SEPARATION`] apart.
    WireSeparation,
}

impl Rule {
    /// Every rule, in reporting order.
    pub const ALL: [Self; 7] = [
        Self::SegmentLength,
        Self::WallClearance,
        Self::FurnitureClearance,
        Self::DrainClearance,
        Self::ForbiddenZone,
        Self::SelfCrossing,
        Self::WireSeparation,
    ];
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SegmentLength => "segment length",
            Self::WallClearance => "wall clearance",
            Self::FurnitureClearance => "furniture clearance",
            Self::DrainClearance => "drain clearance",
            Self::ForbiddenZone => "forbidden zone",
            Self::SelfCrossing => "self crossing",
            Self::WireSeparation => "wire separation",
        };
        f.write_str(s)
    }
}

/// A route segment named in a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint in route order.
    pub start: Point,
    /// Second endpoint in route order.
    pub end: Point,
}

impl Segment {
    /// Create a segment.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

impl From<(Point, Point)> for Segment {
    fn from((start, end): (Point, Point)) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

/// One broken rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[error("{rule}: segment {segment} measured {measured:.2}, threshold {threshold}")]
pub struct ValidationError {
    /// The rule that failed.
    pub rule: Rule,
    /// The offending segment.
    pub segment: Segment,
    /// For pair rules, the segment it conflicts with.
    pub other: Option<Segment>,
    /// The required value. For [`Rule::SegmentLength`] it is a maximum,
    /// for [`Rule::ForbiddenZone`] and [`Rule::SelfCrossing`] it is
    /// zero, otherwise a minimum distance.
    pub threshold: f64,
    /// The measured value.
    pub measured: f64,
}

type IndexedSegment = GeomWithData<Line<f64>, usize>;

fn to_line(a: Point, b: Point) -> Line<f64> {
    Line::new(
        geo::Coord {
            x: f64::from(a.x),
            y: f64::from(a.y),
        },
        geo::Coord {
            x: f64::from(b.x),
            y: f64::from(b.y),
        },
    )
}

/// Check `route` against every rule on `room`.
#[must_use]
pub fn validate(room: &Room, route: &WireRoute) -> Vec<ValidationError> {
    let segments: Vec<(Point, Point)> = route.segments().collect();
    let errors: Vec<ValidationError> = Rule::ALL
        .iter()
        .filter_map(|&rule| first_violation(rule, room, &segments))
        .collect();
    tracing::debug!(
        segments = segments.len(),
        errors = errors.len(),
        "route validated"
    );
    errors
}

fn first_violation(rule: Rule, room: &Room, segments: &[(Point, Point)]) -> Option<ValidationError> {
    match rule {
        Rule::SegmentLength => segments.iter().find_map(|&(a, b)| {
            let d = a.distance(b);
            (d > f64::from(MAX_SEGMENT)).then(|| error(rule, (a, b), f64::from(MAX_SEGMENT), d))
        }),
        Rule::WallClearance => endpoint_rule(rule, segments, |p| {
            let d = oracle::wall_distance(p, room).unwrap_or(0.0);
            (d < f64::from(MIN_WALL)).then_some((f64::from(MIN_WALL), d))
        }),
        Rule::FurnitureClearance => endpoint_rule(rule, segments, |p| {
            oracle::furniture_violation(p, room).map(|(_, d)| (f64::from(MIN_FURNITURE), d))
        }),
        Rule::DrainClearance => endpoint_rule(rule, segments, |p| {
            oracle::drain_violation(p, room).map(|(_, d, min)| (f64::from(min), d))
        }),
        Rule::ForbiddenZone => segments.iter().find_map(|&(a, b)| {
            oracle::forbidden_zone_crossed(a, b, room).map(|_| error(rule, (a, b), 0.0, 0.0))
        }),
        Rule::SelfCrossing => self_crossing(segments),
        Rule::WireSeparation => separation(segments),
    }
}

const fn error(rule: Rule, (start, end): (Point, Point), threshold: f64, measured: f64) -> ValidationError {
    ValidationError {
        rule,
        segment: Segment::new(start, end),
        other: None,
        threshold,
        measured,
    }
}

/// First segment with an endpoint failing `check`, which returns the
/// threshold and the measured value on failure.
fn endpoint_rule(
    rule: Rule,
    segments: &[(Point, Point)],
    check: impl Fn(Point) -> Option<(f64, f64)>,
) -> Option<ValidationError> {
    segments.iter().find_map(|&(a, b)| {
        check(a)
            .or_else(|| check(b))
            .map(|(threshold, measured)| error(rule, (a, b), threshold, measured))
    })
}

/// Any two segments crossing, including a segment folding back over its
/// predecessor. Turns at a shared vertex are not crossings.
fn self_crossing(segments: &[(Point, Point)]) -> Option<ValidationError> {
    for (i, &(a, b)) in segments.iter().enumerate() {
        for &(c, d) in &segments[i + 1..] {
            if segments_intersect(a, b, c, d) {
                return Some(ValidationError {
                    other: Some(Segment::new(c, d)),
                    ..error(Rule::SelfCrossing, (a, b), 0.0, 0.0)
                });
            }
        }
    }
    None
}

/// Closest pair of non-adjacent segments under the separation minimum.
///
/// Candidates come from an R-tree query on each segment's envelope grown
/// by the minimum, so only nearby segments are measured.
fn separation(segments: &[(Point, Point)]) -> Option<ValidationError> {
    let lines: Vec<Line<f64>> = segments.iter().map(|&(a, b)| to_line(a, b)).collect();
    let tree = RTree::bulk_load(
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| IndexedSegment::new(*line, i))
            .collect(),
    );
    let min = f64::from(MIN_WIRE_SEPARATION);

    for (i, line) in lines.iter().enumerate() {
        let (lo_x, hi_x) = (line.start.x.min(line.end.x), line.start.x.max(line.end.x));
        let (lo_y, hi_y) = (line.start.y.min(line.end.y), line.start.y.max(line.end.y));
        let envelope = AABB::from_corners(
            geo::Point::new(lo_x - min, lo_y - min),
            geo::Point::new(hi_x + min, hi_y + min),
        );

        let mut nearest: Option<(usize, f64)> = None;
        for candidate in tree.locate_in_envelope_intersecting(&envelope) {
            let j = candidate.data;
            if j <= i + 1 {
                continue;
            }
            let d = Euclidean.distance(line, candidate.geom());
            if d < min && nearest.is_none_or(|(k, best)| (d, j) < (best, k)) {
                nearest = Some((j, d));
            }
        }
        if let Some((j, d)) = nearest {
            return Some(ValidationError {
                other: Some(segments[j].into()),
                ..error(Rule::WireSeparation, segments[i], min, d)
            });
        }
    }
    None
}
