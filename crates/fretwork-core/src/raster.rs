//! PNG rasterization of chord diagrams.
//!
//! [`Rasterizer`] turns an `svg::Document` into a PNG and is cheap to share
//! across threads: the only long-lived state is an immutable font database.
//! Each call renders into its own [`RenderSurface`], which is released when
//! the call returns, successful or not.
//!
//! ```no_run
//! # use fretwork_core::{draw::{ChordDiagram, DiagramStyle}, layout::DiagramLayout};
//! # use fretwork_core::raster::Rasterizer;
//! let layout = DiagramLayout::parse("x 3 2 0 1 0", 1, "C").unwrap();
//! let svg = ChordDiagram::new(&layout).render_svg(&DiagramStyle::default());
//! let png = Rasterizer::new().rasterize(&svg, 1.0).unwrap();
//! assert!(png.data_uri().starts_with("data:image/png;base64,"));
//! ```

use std::sync::{Arc, OnceLock};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::{debug, info};
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use resvg::{
    tiny_skia::{Pixmap, Transform},
    usvg::{self, fontdb},
};

use crate::error::RenderError;

/// Largest surface a single diagram may allocate, 64 MiB of RGBA.
pub const MAX_SURFACE_PIXELS: u64 = 4096 * 4096;

/// System font database, loaded on first use.
static SYSTEM_FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();

fn system_fonts() -> Arc<fontdb::Database> {
    Arc::clone(SYSTEM_FONTS.get_or_init(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        info!(faces = db.len(); "Loaded system fonts");
        Arc::new(db)
    }))
}

/// An encoded PNG image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl PngImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Standard base64 encoding of the PNG bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// A `data:` URI suitable for an `<img src>` attribute.
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }
}

/// A pixel buffer owned by a single render call.
pub struct RenderSurface {
    pixmap: Pixmap,
}

impl RenderSurface {
    /// Allocates a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] for zero dimensions or more than
    /// [`MAX_SURFACE_PIXELS`] pixels.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if u64::from(width) * u64::from(height) > MAX_SURFACE_PIXELS {
            return Err(RenderError::Surface { width, height });
        }
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
        Ok(Self { pixmap })
    }

    /// Paints a parsed SVG tree scaled by `scale`.
    pub fn draw(&mut self, tree: &usvg::Tree, scale: f32) {
        resvg::render(
            tree,
            Transform::from_scale(scale, scale),
            &mut self.pixmap.as_mut(),
        );
    }

    /// Encodes the surface as an RGBA8 PNG, consuming it.
    ///
    /// Encoding is deterministic: no adaptive filtering, default compression.
    pub fn into_png(self) -> Result<PngImage, RenderError> {
        let width = self.pixmap.width();
        let height = self.pixmap.height();

        // tiny-skia stores premultiplied alpha; PNG expects straight alpha.
        let data: Vec<u8> = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let color = pixel.demultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect();

        let mut bytes = Vec::new();
        {
            let mut encoder = Encoder::new(&mut bytes, width, height);
            encoder.set_color(ColorType::Rgba);
            encoder.set_depth(BitDepth::Eight);
            encoder.set_filter(FilterType::NoFilter);
            encoder.set_compression(Compression::Default);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&data)?;
            writer.finish()?;
        }

        Ok(PngImage {
            bytes,
            width,
            height,
        })
    }
}

/// Converts SVG documents into PNG images.
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<fontdb::Database>,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("font_faces", &self.fontdb.len())
            .finish()
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    /// Creates a rasterizer backed by the system fonts.
    pub fn new() -> Self {
        Self {
            fontdb: system_fonts(),
        }
    }

    /// Creates a rasterizer with an explicit font database.
    pub fn with_fontdb(fontdb: Arc<fontdb::Database>) -> Self {
        Self { fontdb }
    }

    /// Creates a rasterizer without fonts. Text elements are not drawn, but
    /// output no longer depends on the fonts installed on the host.
    pub fn without_fonts() -> Self {
        Self::with_fontdb(Arc::new(fontdb::Database::new()))
    }

    /// Rasterizes an SVG document.
    ///
    /// # Arguments
    ///
    /// * `document` - The SVG to render; its `width`/`height` define the canvas.
    /// * `scale` - Output pixels per SVG unit.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the SVG cannot be parsed, the surface cannot
    /// be allocated, or PNG encoding fails.
    pub fn rasterize(&self, document: &svg::Document, scale: f32) -> Result<PngImage, RenderError> {
        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(&document.to_string(), &options)?;

        let size = tree.size();
        let width = (size.width() * scale).ceil() as u32;
        let height = (size.height() * scale).ceil() as u32;

        let mut surface = RenderSurface::new(width, height)?;
        surface.draw(&tree, scale);
        let png = surface.into_png()?;

        debug!(width, height, bytes = png.bytes().len(); "Diagram rasterized");
        Ok(png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        draw::{ChordDiagram, DiagramStyle},
        layout::DiagramLayout,
    };

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn render(notation: &str, scale: f32) -> PngImage {
        let layout = DiagramLayout::parse(notation, 1, "G").unwrap();
        let svg = ChordDiagram::new(&layout).render_svg(&DiagramStyle::default());
        Rasterizer::without_fonts().rasterize(&svg, scale).unwrap()
    }

    #[test]
    fn test_rasterize_produces_png() {
        let png = render("3 2 0 0 3 3", 1.0);
        assert_eq!(&png.bytes()[..8], &PNG_SIGNATURE);
        assert_eq!(png.width(), 240);
        assert_eq!(png.height(), 78 + 180 + 16);
    }

    #[test]
    fn test_rasterize_scales_output() {
        let png = render("3 2 0 0 3 3", 0.5);
        assert_eq!(png.width(), 120);
        assert_eq!(png.height(), 137);
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        assert_eq!(render("x 7 9 9 x x", 1.0), render("x 7 9 9 x x", 1.0));
    }

    #[test]
    fn test_data_uri() {
        let png = render("x x 0 2 3 2", 1.0);
        let uri = png.data_uri();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!(
            STANDARD.decode(png.to_base64()).unwrap(),
            png.bytes().to_vec()
        );
    }

    #[test]
    fn test_zero_sized_surface_rejected() {
        assert!(matches!(
            RenderSurface::new(0, 10),
            Err(RenderError::Surface {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn test_oversized_surface_rejected() {
        assert!(matches!(
            RenderSurface::new(240, 2_359_390),
            Err(RenderError::Surface {
                width: 240,
                height: 2_359_390
            })
        ));
        assert!(RenderSurface::new(4096, 4096).is_ok());
        assert!(RenderSurface::new(4096, 4097).is_err());
    }

    #[test]
    fn test_oversized_scale_rejected() {
        let layout = DiagramLayout::parse("3 2 0 0 3 3", 1, "G").unwrap();
        let svg = ChordDiagram::new(&layout).render_svg(&DiagramStyle::default());
        assert!(matches!(
            Rasterizer::without_fonts().rasterize(&svg, 100.0),
            Err(RenderError::Surface { .. })
        ));
    }

    #[test]
    fn test_wide_window_keeps_bounded_height() {
        let png = render("1 x x x x 479", 1.0);
        assert_eq!(png.width(), 240);
        assert_eq!(png.height(), 78 + 360 + 16);
    }

    #[test]
    fn test_invalid_svg_rejected() {
        let document = svg::Document::new().set("width", 0).set("height", 0);
        assert!(Rasterizer::without_fonts().rasterize(&document, 1.0).is_err());
    }
}
