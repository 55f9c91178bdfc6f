//! Visual styling for chord diagrams.

use serde::Deserialize;

use crate::color::Color;

/// Geometry, colors and fonts used to draw a chord diagram.
///
/// All lengths are in SVG user units (pixels at scale 1). Every field has a
/// default, so a partially specified TOML table is valid:
///
/// ```toml
/// [style]
/// dot_color = "#1f3a93"
/// fret_spacing = 32.0
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiagramStyle {
    /// Horizontal distance between adjacent strings.
    pub string_spacing: f32,
    /// Vertical distance between adjacent fret lines.
    pub fret_spacing: f32,
    /// Tallest grid drawn. Windows that would exceed it get narrower fret
    /// rows, so a diagram never grows past a fixed height.
    pub max_grid_height: f32,
    /// Space left of the lowest string.
    pub margin_left: f32,
    /// Space right of the highest string, room for the `Nfr` label.
    pub margin_right: f32,
    /// Space above the top fret line, room for the title and string markers.
    pub margin_top: f32,
    /// Space below the bottom fret line.
    pub margin_bottom: f32,
    /// Dot radius as a fraction of the string spacing.
    pub dot_radius_ratio: f32,
    /// Width of strings and ordinary fret lines.
    pub line_width: f32,
    /// Width of the nut line.
    pub nut_width: f32,
    pub font_family: String,
    pub title_font_size: f32,
    pub marker_font_size: f32,
    pub label_font_size: f32,
    /// Lines, markers and text.
    pub ink_color: Color,
    pub dot_color: Color,
    pub background_color: Color,
}

impl DiagramStyle {
    /// Total canvas width.
    pub fn canvas_width(&self) -> f32 {
        self.margin_left + self.grid_width() + self.margin_right
    }

    /// Total canvas height for a diagram showing `fret_count` frets.
    pub fn canvas_height(&self, fret_count: i32) -> f32 {
        self.margin_top + self.grid_height(fret_count) + self.margin_bottom
    }

    /// Distance between the lowest and highest string lines.
    pub fn grid_width(&self) -> f32 {
        self.string_spacing * 5.0
    }

    /// Distance between the top and bottom fret lines.
    pub fn grid_height(&self, fret_count: i32) -> f32 {
        self.fret_spacing_for(fret_count) * fret_count.max(0) as f32
    }

    /// Fret row height used for a window of `fret_count` frets.
    pub fn fret_spacing_for(&self, fret_count: i32) -> f32 {
        if fret_count <= 0 {
            return self.fret_spacing;
        }
        self.fret_spacing.min(self.max_grid_height / fret_count as f32)
    }

    pub fn dot_radius(&self) -> f32 {
        self.string_spacing * self.dot_radius_ratio
    }
}

impl Default for DiagramStyle {
    fn default() -> Self {
        let black = Color::default();
        Self {
            string_spacing: 30.0,
            fret_spacing: 36.0,
            max_grid_height: 360.0,
            margin_left: 30.0,
            margin_right: 60.0,
            margin_top: 78.0,
            margin_bottom: 16.0,
            dot_radius_ratio: 0.35,
            line_width: 1.0,
            nut_width: 4.0,
            font_family: String::from("sans-serif"),
            title_font_size: 22.0,
            marker_font_size: 17.0,
            label_font_size: 15.0,
            ink_color: black,
            dot_color: black,
            background_color: Color::new("white").expect("'white' is a valid CSS color"),
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_default_canvas_size() {
        let style = DiagramStyle::default();
        assert_approx_eq!(f32, style.grid_width(), 150.0);
        assert_approx_eq!(f32, style.canvas_width(), 240.0);
        assert_approx_eq!(f32, style.canvas_height(5), 78.0 + 180.0 + 16.0);
    }

    #[test]
    fn test_canvas_grows_with_fret_count() {
        let style = DiagramStyle::default();
        assert!(style.canvas_height(8) > style.canvas_height(5));
        assert_approx_eq!(f32, style.grid_height(-1), 0.0);
    }

    #[test]
    fn test_tall_windows_are_squeezed() {
        let style = DiagramStyle::default();
        assert_approx_eq!(f32, style.fret_spacing_for(10), 36.0);
        assert_approx_eq!(f32, style.fret_spacing_for(20), 18.0);
        assert_approx_eq!(f32, style.grid_height(65536), 360.0);
        assert_approx_eq!(f32, style.canvas_height(65536), 78.0 + 360.0 + 16.0);
    }

    #[test]
    fn test_dot_radius_scales_with_string_spacing() {
        let style = DiagramStyle {
            string_spacing: 20.0,
            ..DiagramStyle::default()
        };
        assert_approx_eq!(f32, style.dot_radius(), 7.0);
    }
}
