//! SVG construction for chord diagrams.
//!
//! - [`ChordDiagram`] turns a [`DiagramLayout`](crate::layout::DiagramLayout)
//!   into an `svg::Document`.
//! - [`DiagramStyle`] holds geometry, colors and fonts.
//! - [`LayeredOutput`] / [`RenderLayer`] keep z-order explicit.
//! - [`StrokeDefinition`] and [`apply_stroke!`](crate::apply_stroke!) style lines.

mod diagram;
mod layer;
mod stroke;
mod style;

pub use diagram::ChordDiagram;
pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use stroke::{StrokeCap, StrokeDefinition};
pub use style::DiagramStyle;
