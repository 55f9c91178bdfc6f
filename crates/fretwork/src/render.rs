//! Fingering-to-image rendering.

use log::trace;

use fretwork_core::{
    RenderError,
    draw::{ChordDiagram, DiagramStyle},
    layout::DiagramLayout,
    raster::{PngImage, Rasterizer},
};

use crate::FretworkError;

/// Widest fret window drawn. A guitar neck has about two dozen frets, so a
/// wider window comes from a fingering nobody can play.
const MAX_DRAWN_FRETS: i32 = 32;

/// Renders voicings as PNG chord diagrams.
///
/// Each call lays out, draws and rasterizes independently; the renderer
/// itself holds only immutable settings, so it can be shared between threads.
#[derive(Debug, Clone)]
pub struct DiagramRenderer {
    style: DiagramStyle,
    scale: f32,
    rasterizer: Rasterizer,
}

impl DiagramRenderer {
    pub fn new(style: DiagramStyle, scale: f32) -> Self {
        Self {
            style,
            scale,
            rasterizer: Rasterizer::new(),
        }
    }

    /// Replaces the rasterizer, e.g. to use a specific font database.
    pub fn with_rasterizer(mut self, rasterizer: Rasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn style(&self) -> &DiagramStyle {
        &self.style
    }

    /// Renders one voicing.
    ///
    /// # Arguments
    ///
    /// * `notation` - Six whitespace-separated fret tokens, low string first.
    /// * `starting_fret` - Preferred first fret of the diagram window.
    /// * `title` - Chord name shown above the diagram.
    ///
    /// # Errors
    ///
    /// Returns [`FretworkError::Layout`] for a notation without exactly six
    /// tokens and [`FretworkError::Render`] if the window spans more than
    /// [`MAX_DRAWN_FRETS`] frets or rasterization fails.
    pub fn render(
        &self,
        notation: &str,
        starting_fret: i32,
        title: &str,
    ) -> Result<PngImage, FretworkError> {
        let layout = DiagramLayout::parse(notation, starting_fret, title)?;
        trace!(title, window:? = layout.window(); "Rendering voicing");

        if layout.fret_count() > MAX_DRAWN_FRETS {
            return Err(RenderError::TooManyFrets {
                frets: layout.fret_count(),
                max: MAX_DRAWN_FRETS,
            }
            .into());
        }

        let svg = ChordDiagram::new(&layout).render_svg(&self.style);
        Ok(self.rasterizer.rasterize(&svg, self.scale)?)
    }
}

impl Default for DiagramRenderer {
    fn default() -> Self {
        Self::new(DiagramStyle::default(), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> DiagramRenderer {
        DiagramRenderer::default().with_rasterizer(Rasterizer::without_fonts())
    }

    #[test]
    fn test_render_voicing() {
        let png = renderer().render("x 7 9 9 x x", 1, "E/B").unwrap();
        assert_eq!(png.width(), 240);
        assert_eq!(png.height(), 78 + 180 + 16);
    }

    #[test]
    fn test_unplayable_stretch_rejected() {
        let result = renderer().render("1 x x x x 65535", 1, "odd");
        assert!(matches!(
            result,
            Err(FretworkError::Render(RenderError::TooManyFrets {
                frets: 65536,
                max: 32
            }))
        ));

        // The widest window still drawn
        assert!(renderer().render("1 x x x x 31", 1, "wide").is_ok());
    }

    #[test]
    fn test_malformed_notation() {
        assert!(matches!(
            renderer().render("x 3 2", 1, "C"),
            Err(FretworkError::Layout(_))
        ));
    }
}
