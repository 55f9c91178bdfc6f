//! Stroke definitions for diagram lines.
//!
//! Chord diagrams only need solid strokes, so a [`StrokeDefinition`] is a
//! color, a width and a line cap. Use [`apply_stroke!`](crate::apply_stroke!)
//! to set all stroke attributes on an SVG element at once:
//!
//! ```
//! use fretwork_core::color::Color;
//! use fretwork_core::draw::StrokeDefinition;
//! use svg::node::element as svg_element;
//!
//! let nut = StrokeDefinition::solid(Color::default(), 3.0);
//! let line = svg_element::Line::new().set("x1", 0).set("x2", 100);
//! let line = fretwork_core::apply_stroke!(line, &nut);
//! ```

use crate::color::Color;

/// Defines how line endpoints are rendered.
///
/// Maps directly to SVG `stroke-linecap` attribute values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeCap {
    /// Flat cap at the exact endpoint (SVG default)
    #[default]
    Butt,
    /// Rounded cap extending beyond the endpoint by half the stroke width
    Round,
    /// Square cap extending beyond the endpoint by half the stroke width
    Square,
}

impl StrokeCap {
    /// Returns the SVG stroke-linecap value
    pub fn to_svg_value(&self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

/// A solid stroke used for strings, frets and the nut.
#[derive(Debug, Clone)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    cap: StrokeCap,
}

impl StrokeDefinition {
    /// Creates a solid stroke with a butt cap.
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            cap: StrokeCap::Butt,
        }
    }

    /// Returns a copy of this stroke with the given cap.
    pub fn with_cap(mut self, cap: StrokeCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn cap(&self) -> StrokeCap {
        self.cap
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self::solid(Color::default(), 1.0)
    }
}

/// Applies all stroke attributes of a [`StrokeDefinition`] to an SVG element.
#[macro_export]
macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {{
        $element
            .set("stroke", $stroke.color().to_string())
            .set("stroke-opacity", $stroke.color().alpha())
            .set("stroke-width", $stroke.width())
            .set("stroke-linecap", $stroke.cap().to_svg_value())
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use svg::node::element::Line;

    #[test]
    fn test_stroke_default() {
        let stroke = StrokeDefinition::default();
        assert_eq!(stroke.width(), 1.0);
        assert_eq!(stroke.color(), Color::default());
        assert_eq!(stroke.cap(), StrokeCap::Butt);
    }

    #[test]
    fn test_stroke_with_cap() {
        let stroke = StrokeDefinition::solid(Color::default(), 3.0).with_cap(StrokeCap::Square);
        assert_eq!(stroke.width(), 3.0);
        assert_eq!(stroke.cap(), StrokeCap::Square);
    }

    #[test]
    fn test_apply_stroke_sets_attributes() {
        let stroke = StrokeDefinition::solid(Color::default(), 2.5).with_cap(StrokeCap::Round);
        let line = crate::apply_stroke!(Line::new(), &stroke).to_string();

        assert!(line.contains("stroke-width=\"2.5\""));
        assert!(line.contains("stroke-linecap=\"round\""));
        assert!(line.contains("stroke-opacity=\"1\""));
    }
}
