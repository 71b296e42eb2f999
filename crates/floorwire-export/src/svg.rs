//! SVG export serializer.
//!
//! Draws a room with the [`svg`] crate: the outline, furniture and
//! drains, forbidden and buffer zones, heating elements, optionally the
//! grid, and the wire route as a single `<path>`. The violation variant
//! additionally highlights the segments named by validation errors.
//!
//! Coordinates are room inches; the `viewBox` is the room's bounding box
//! grown by a margin. SVG's y axis points down, and so does the room's.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements for
//! accessibility and to help file managers identify exported files.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Group, Line, Path, Rectangle, Title};
use svg::node::{Text, Value};

use floorwire_planner::{Point, Rect, Room, ValidationError, WireRoute};

/// Metadata to embed in the SVG document.
///
/// Both fields are optional. When present, a `<title>` and/or `<desc>`
/// element is emitted immediately after the opening `<svg>` tag.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    ///
    /// Typically the planning parameters, so exported files are
    /// distinguishable.
    pub description: Option<&'a str>,
}

/// What to draw besides the room and the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draw every grid intersection as a dot.
    pub show_grid: bool,
    /// Space around the room's bounding box, in inches.
    pub margin: i32,
}

impl RenderOptions {
    /// Default margin: 6 inches.
    pub const DEFAULT_MARGIN: i32 = 6;
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_grid: false,
            margin: Self::DEFAULT_MARGIN,
        }
    }
}

const WIRE_COLOR: &str = "#c0392b";
const VIOLATION_COLOR: &str = "#ff00ff";

/// Build an SVG path `d` attribute string from route points.
///
/// Uses `M` for the first point and `L` for subsequent points.
/// Returns an empty string for fewer than 2 points.
///
/// # Examples
///
/// ```
/// use floorwire_planner::Point;
/// use floorwire_export::build_path_data;
///
/// let d = build_path_data(&[Point::new(10, 20), Point::new(30, 40)]);
/// assert_eq!(d, "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(points: &[Point]) -> String {
    if points.len() < 2 {
        return String::new();
    }

    let first = &points[0];
    let mut data = Data::new().move_to(coords(*first));
    for p in &points[1..] {
        data = data.line_to(coords(*p));
    }
    String::from(Value::from(data))
}

fn coords(p: Point) -> (f64, f64) {
    (f64::from(p.x), f64::from(p.y))
}

/// Closed outline path for a polygon.
fn polygon_data(polygon: &[Point]) -> String {
    let Some(first) = polygon.first() else {
        return String::new();
    };
    let mut data = Data::new().move_to(coords(*first));
    for p in &polygon[1..] {
        data = data.line_to(coords(*p));
    }
    String::from(Value::from(data.close()))
}

fn rectangle(rect: &Rect) -> Rectangle {
    Rectangle::new()
        .set("x", rect.x)
        .set("y", rect.y)
        .set("width", rect.width)
        .set("height", rect.length)
}

fn document(room: &Room, metadata: &SvgMetadata<'_>, options: &RenderOptions) -> Document {
    let b = room.bounds();
    let m = options.margin.max(0);
    let (w, h) = (b.width + 2 * m, b.length + 2 * m);
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (b.min.x - m, b.min.y - m, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }
    doc
}

fn room_layers(mut doc: Document, room: &Room, options: &RenderOptions) -> Document {
    doc = doc.add(
        Path::new()
            .set("id", "outline")
            .set("d", polygon_data(room.polygon()))
            .set("fill", "#fafafa")
            .set("stroke", "black")
            .set("stroke-width", 1),
    );

    let mut furniture = Group::new().set("id", "furniture");
    for f in room.furniture() {
        furniture = furniture.add(
            rectangle(&f.rect)
                .set("data-id", f.id.get())
                .set("data-kind", f.kind.label())
                .set("fill", "#d9d9d9")
                .set("stroke", "#555555")
                .set("stroke-width", 0.5),
        );
        if let (Some(drain), Some(centre)) = (&f.drain, f.drain_position()) {
            furniture = furniture.add(
                Circle::new()
                    .set("cx", centre.x)
                    .set("cy", centre.y)
                    .set("r", f64::from(drain.diameter) / 2.0)
                    .set("fill", "#4a90d9"),
            );
        }
    }
    doc = doc.add(furniture);

    let mut zones = Group::new().set("id", "zones");
    for z in room.forbidden_zones() {
        zones = zones.add(
            rectangle(&z.rect)
                .set("data-id", z.id.get())
                .set("fill", "red")
                .set("fill-opacity", 0.2)
                .set("stroke", "red")
                .set("stroke-width", 0.5),
        );
    }
    for z in room.buffer_zones() {
        zones = zones.add(
            rectangle(&z.rect)
                .set("data-id", z.id.get())
                .set("data-distance", z.distance)
                .set("fill", "none")
                .set("stroke", "#e67e22")
                .set("stroke-dasharray", "2 1")
                .set("stroke-width", 0.5),
        );
    }
    doc = doc.add(zones);

    let mut heating = Group::new().set("id", "heating");
    for h in room.heating_elements() {
        let fill = if h.is_thermostat() { "#27ae60" } else { "#f39c12" };
        heating = heating.add(
            rectangle(&h.rect)
                .set("data-id", h.id.get())
                .set("data-kind", h.kind.label())
                .set("fill", fill),
        );
    }
    doc = doc.add(heating);

    if options.show_grid {
        let mut grid = Group::new().set("id", "grid").set("fill", "#bbbbbb");
        for n in room.grid().intersections() {
            grid = grid.add(
                Circle::new()
                    .set("cx", n.position.x)
                    .set("cy", n.position.y)
                    .set("r", 0.4),
            );
        }
        doc = doc.add(grid);
    }
    doc
}

fn wire_layer(doc: Document, route: &WireRoute) -> Document {
    let d = build_path_data(route.points());
    if d.is_empty() {
        return doc;
    }
    doc.add(
        Path::new()
            .set("id", "wire")
            .set("d", d)
            .set("fill", "none")
            .set("stroke", WIRE_COLOR)
            .set("stroke-width", 1),
    )
}

fn finish(doc: &Document) -> String {
    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

/// Serialize a room and a wire route into an SVG document string.
///
/// The route is usually the room's own wire, but any route can be drawn
/// over the room, e.g. a plan that has not been stored yet.
#[must_use]
pub fn to_svg(
    room: &Room,
    route: &WireRoute,
    metadata: &SvgMetadata<'_>,
    options: &RenderOptions,
) -> String {
    let doc = document(room, metadata, options);
    let doc = room_layers(doc, room, options);
    finish(&wire_layer(doc, route))
}

/// Like [`to_svg`], with each offending segment from `errors` drawn on
/// top as a thick `<line>` under `<g id="violations">`.
///
/// Each line carries a `data-rule` attribute naming the broken rule.
/// Pair rules also draw the conflicting segment.
#[must_use]
pub fn to_violation_svg(
    room: &Room,
    route: &WireRoute,
    errors: &[ValidationError],
    metadata: &SvgMetadata<'_>,
    options: &RenderOptions,
) -> String {
    let doc = document(room, metadata, options);
    let doc = wire_layer(room_layers(doc, room, options), route);

    let mut group = Group::new()
        .set("id", "violations")
        .set("stroke", VIOLATION_COLOR)
        .set("stroke-width", 2)
        .set("stroke-linecap", "round");
    for error in errors {
        let rule = error.rule.to_string();
        for segment in std::iter::once(error.segment).chain(error.other) {
            group = group.add(
                Line::new()
                    .set("x1", segment.start.x)
                    .set("y1", segment.start.y)
                    .set("x2", segment.end.x)
                    .set("y2", segment.end.y)
                    .set("data-rule", rule.as_str()),
            );
        }
    }
    finish(&doc.add(group))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use floorwire_planner::{
        Furniture, FurnitureKind, HeatingElement, HeatingKind, Rule, Segment,
    };

    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    /// Shorthand: no metadata.
    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    fn route(room: &Room, points: &[Point]) -> WireRoute {
        WireRoute::new(points.to_vec(), 100, 6, room.bounds())
    }

    // --- build_path_data ---

    #[test]
    fn build_path_data_short_routes() {
        assert_eq!(build_path_data(&[]), "");
        assert_eq!(build_path_data(&[p(5, 5)]), "");
    }

    #[test]
    fn build_path_data_three_points() {
        assert_eq!(
            build_path_data(&[p(10, 15), p(40, 15), p(40, 21)]),
            "M10,15 L40,15 L40,21"
        );
    }

    // --- Documents ---

    #[test]
    fn empty_room_document() {
        let room = Room::rectangle(100, 50).unwrap();
        let svg = to_svg(&room, room.wire(), &no_meta(), &RenderOptions::default());
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"width="112""#));
        assert!(svg.contains(r#"height="62""#));
        assert!(svg.contains(r#"viewBox="-6 -6 112 62""#));
        assert!(svg.contains(r#"id="outline""#));
        assert!(svg.contains("M0,0 L100,0 L100,50 L0,50 z"));
        assert!(!svg.contains(r#"id="wire""#));
    }

    #[test]
    fn elements_and_wire() {
        let mut room = Room::rectangle(100, 80).unwrap();
        room.add_furniture(Furniture::new(FurnitureKind::Shower, Rect::new(60, 40, 40, 40)))
            .unwrap();
        room.add_forbidden_zone(Rect::new(10, 60, 10, 10)).unwrap();
        room.add_buffer_zone(Rect::new(30, 60, 10, 10), 4).unwrap();
        room.add_heating_element(HeatingElement::new(HeatingKind::Thermostat, p(0, 10)))
            .unwrap();
        let r = route(&room, &[p(6, 6), p(50, 6), p(50, 12)]);

        let svg = to_svg(&room, &r, &no_meta(), &RenderOptions::default());
        assert!(svg.contains(r#"data-kind="Shower""#));
        assert!(svg.contains("<circle"));
        assert!(svg.contains(r#"fill-opacity="0.2""#));
        assert!(svg.contains(r#"stroke-dasharray="2 1""#));
        assert!(svg.contains(r#"data-kind="Thermostat""#));
        assert!(svg.contains(r#"d="M6,6 L50,6 L50,12""#));
        assert!(!svg.contains(r#"id="grid""#));
    }

    #[test]
    fn grid_dots_on_request() {
        let mut room = Room::rectangle(12, 12).unwrap();
        room.generate_grid();
        let options = RenderOptions {
            show_grid: true,
            ..RenderOptions::default()
        };
        let svg = to_svg(&room, room.wire(), &no_meta(), &options);
        assert!(svg.contains(r#"id="grid""#));
        assert_eq!(svg.matches(r#"r="0.4""#).count(), room.grid().node_count());
    }

    #[test]
    fn metadata_is_escaped() {
        let room = Room::rectangle(20, 20).unwrap();
        let meta = SvgMetadata {
            title: Some("bath <1>"),
            description: Some("spacing=6 & length=800"),
        };
        let svg = to_svg(&room, room.wire(), &meta, &RenderOptions::default());
        assert!(svg.contains("<title>bath &lt;1&gt;</title>"));
        assert!(svg.contains("spacing=6 &amp; length=800"));
    }

    #[test]
    fn violations_are_highlighted() {
        let room = Room::rectangle(100, 100).unwrap();
        let r = route(&room, &[p(10, 10), p(50, 10), p(50, 50), p(30, 50), p(30, 5)]);
        let errors = vec![ValidationError {
            rule: Rule::SelfCrossing,
            segment: Segment::new(p(10, 10), p(50, 10)),
            other: Some(Segment::new(p(30, 50), p(30, 5))),
            threshold: 0.0,
            measured: 0.0,
        }];
        let svg = to_violation_svg(&room, &r, &errors, &no_meta(), &RenderOptions::default());
        assert!(svg.contains(r#"id="violations""#));
        assert_eq!(svg.matches(r#"data-rule="self crossing""#).count(), 2);
        assert!(svg.contains(r#"x1="30""#));
    }
}
