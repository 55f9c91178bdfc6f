//! Error types for the layout engine and the rasterizer.

use thiserror::Error;

/// Errors produced while turning a fingering string into a diagram layout.
///
/// This is the only way layout can fail: every six-token fingering, however
/// unusual, yields a layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("fingering must have exactly 6 tokens, found {found}")]
    MalformedFingering { found: usize },
}

/// Errors produced while rasterizing a diagram to PNG.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("SVG error: {0}")]
    Svg(#[from] resvg::usvg::Error),

    #[error("cannot allocate a {width}x{height} render surface")]
    Surface { width: u32, height: u32 },

    #[error("diagram spans {frets} frets, at most {max} can be drawn")]
    TooManyFrets { frets: i32, max: i32 },

    #[error("PNG encoding error: {0}")]
    Encode(#[from] png::EncodingError),
}
