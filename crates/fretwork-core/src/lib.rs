//! Fretwork Core Types and Definitions
//!
//! This crate provides the fretboard side of fretwork. It includes:
//!
//! - **Fingerings**: Six-string fret assignments ([`fingering::Fingering`])
//! - **Layout**: Fret-window selection and dot placement ([`layout::DiagramLayout`])
//! - **Draw**: SVG chord diagram construction ([`draw`] module)
//! - **Raster**: PNG rasterization and base64 encoding ([`raster`] module)
//! - **Colors**: Color handling with CSS color support ([`color::Color`])

pub mod color;
pub mod draw;
pub mod error;
pub mod fingering;
pub mod layout;
pub mod raster;

pub use error::{LayoutError, RenderError};
