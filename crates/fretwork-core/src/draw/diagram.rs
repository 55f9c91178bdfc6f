//! Chord diagram drawing.
//!
//! A [`ChordDiagram`] paints a [`DiagramLayout`] onto an SVG canvas: six
//! vertical string lines, one horizontal line per fret boundary (the first one
//! heavier when the window starts at the nut), `x`/`o` markers above the grid,
//! a dot per fretted note, an optional `Nfr` label to the right of the first
//! fret row, and the chord name as a title.

use log::debug;
use svg::{Document, node::element as svg_element};

use crate::{
    apply_stroke,
    draw::{LayeredOutput, RenderLayer, StrokeCap, StrokeDefinition, style::DiagramStyle},
    fingering::STRING_COUNT,
    layout::DiagramLayout,
};

/// Distance from the top fret line to the baseline of the string markers.
const MARKER_BASELINE_GAP: f32 = 9.0;

/// Distance from the top fret line to the baseline of the title.
const TITLE_BASELINE_GAP: f32 = 40.0;

/// Horizontal gap between the highest string and the fret label.
const LABEL_GAP: f32 = 12.0;

/// Drawable view of a laid-out chord.
#[derive(Debug, Clone, Copy)]
pub struct ChordDiagram<'a> {
    layout: &'a DiagramLayout,
}

impl<'a> ChordDiagram<'a> {
    pub fn new(layout: &'a DiagramLayout) -> Self {
        Self { layout }
    }

    /// Canvas size `(width, height)` for the given style.
    pub fn canvas_size(&self, style: &DiagramStyle) -> (f32, f32) {
        (
            style.canvas_width(),
            style.canvas_height(self.layout.fret_count()),
        )
    }

    /// Renders the diagram into a complete SVG document.
    pub fn render_svg(&self, style: &DiagramStyle) -> Document {
        let (width, height) = self.canvas_size(style);

        let document = self
            .render_to_layers(style)
            .render()
            .into_iter()
            .fold(
                Document::new()
                    .set("width", width)
                    .set("height", height)
                    .set("viewBox", (0.0, 0.0, width, height)),
                |doc, node| doc.add(node),
            );

        debug!(title = self.layout.title(), width, height; "Chord diagram drawn");
        document
    }

    /// Produces every diagram element, tagged with its layer.
    pub fn render_to_layers(&self, style: &DiagramStyle) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        self.draw_background(style, &mut output);
        self.draw_grid(style, &mut output);
        self.draw_markers(style, &mut output);
        self.draw_dots(style, &mut output);
        self.draw_text(style, &mut output);
        output
    }

    fn string_x(style: &DiagramStyle, string_idx: usize) -> f32 {
        style.margin_left + style.string_spacing * string_idx as f32
    }

    fn fret_y(&self, style: &DiagramStyle, fret_line: f32) -> f32 {
        style.margin_top + style.fret_spacing_for(self.layout.fret_count()) * fret_line
    }

    fn draw_background(&self, style: &DiagramStyle, output: &mut LayeredOutput) {
        if style.background_color.is_transparent() {
            return;
        }
        let (width, height) = self.canvas_size(style);
        let rect = svg_element::Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", width)
            .set("height", height)
            .set("fill", &style.background_color);
        output.add_to_layer(RenderLayer::Background, Box::new(rect));
    }

    fn draw_grid(&self, style: &DiagramStyle, output: &mut LayeredOutput) {
        let fret_count = self.layout.fret_count();
        let top = self.fret_y(style, 0.0);
        let bottom = self.fret_y(style, fret_count as f32);
        let left = Self::string_x(style, 0);
        let right = Self::string_x(style, STRING_COUNT - 1);

        let line_stroke = StrokeDefinition::solid(style.ink_color, style.line_width);
        let nut_stroke =
            StrokeDefinition::solid(style.ink_color, style.nut_width).with_cap(StrokeCap::Square);

        for string_idx in 0..STRING_COUNT {
            let x = Self::string_x(style, string_idx);
            let line = svg_element::Line::new()
                .set("x1", x)
                .set("y1", top)
                .set("x2", x)
                .set("y2", bottom);
            output.add_to_layer(RenderLayer::Grid, Box::new(apply_stroke!(line, &line_stroke)));
        }

        for fret_line in 0..=fret_count {
            let y = self.fret_y(style, fret_line as f32);
            let stroke = if fret_line == 0 && self.layout.nut_at_top() {
                &nut_stroke
            } else {
                &line_stroke
            };
            let line = svg_element::Line::new()
                .set("x1", left)
                .set("y1", y)
                .set("x2", right)
                .set("y2", y);
            output.add_to_layer(RenderLayer::Grid, Box::new(apply_stroke!(line, stroke)));
        }
    }

    fn draw_markers(&self, style: &DiagramStyle, output: &mut LayeredOutput) {
        let baseline = self.fret_y(style, 0.0) - MARKER_BASELINE_GAP;
        let marks = self
            .layout
            .mute_marks()
            .iter()
            .map(|&idx| (idx, "x"))
            .chain(self.layout.open_marks().iter().map(|&idx| (idx, "o")));

        for (string_idx, glyph) in marks {
            let text = svg_element::Text::new(glyph)
                .set("x", Self::string_x(style, string_idx))
                .set("y", baseline)
                .set("text-anchor", "middle")
                .set("font-family", style.font_family.as_str())
                .set("font-size", style.marker_font_size)
                .set("font-weight", "bold")
                .set("fill", &style.ink_color);
            output.add_to_layer(RenderLayer::Marker, Box::new(text));
        }
    }

    fn draw_dots(&self, style: &DiagramStyle, output: &mut LayeredOutput) {
        for &(string_idx, relative) in self.layout.dots() {
            let circle = svg_element::Circle::new()
                .set("cx", Self::string_x(style, string_idx))
                .set("cy", self.fret_y(style, relative as f32 + 0.5))
                .set("r", style.dot_radius())
                .set("fill", &style.dot_color);
            output.add_to_layer(RenderLayer::Dot, Box::new(circle));
        }
    }

    fn draw_text(&self, style: &DiagramStyle, output: &mut LayeredOutput) {
        let center_x = style.margin_left + style.grid_width() / 2.0;
        let title = svg_element::Text::new(self.layout.title())
            .set("x", center_x)
            .set("y", self.fret_y(style, 0.0) - TITLE_BASELINE_GAP)
            .set("text-anchor", "middle")
            .set("font-family", style.font_family.as_str())
            .set("font-size", style.title_font_size)
            .set("font-weight", "bold")
            .set("fill", &style.ink_color);
        output.add_to_layer(RenderLayer::Text, Box::new(title));

        if let Some(label) = self.layout.label() {
            // Baseline sits roughly a third of the font size below the row center.
            let y = self.fret_y(style, 0.5) + style.label_font_size * 0.35;
            let text = svg_element::Text::new(label)
                .set("x", Self::string_x(style, STRING_COUNT - 1) + LABEL_GAP)
                .set("y", y)
                .set("text-anchor", "start")
                .set("font-family", style.font_family.as_str())
                .set("font-size", style.label_font_size)
                .set("fill", &style.ink_color);
            output.add_to_layer(RenderLayer::Text, Box::new(text));
        }
    }
}
