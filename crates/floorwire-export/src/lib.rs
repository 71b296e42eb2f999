//! floorwire-export: Pure format serializers (sans-IO)
//!
//! Renders a room and its wire route to SVG for inspection. Rendering
//! reads the model only and returns a `String`; writing it anywhere is
//! the caller's business.

pub mod svg;

pub use svg::{RenderOptions, SvgMetadata, build_path_data, to_svg, to_violation_svg};
