//! # Fretwork Parser
//!
//! Reads chord-annotated song sheets. The markup is tokenized without loss,
//! so a document can be written back byte for byte with only the inserted
//! content added.
//!
//! ## Usage
//!
//! ```
//! use fretwork_parser::{SongDocument, extract};
//!
//! let source = "<table><tr class=ch><td>G&nbsp;</td><td>C/G</td></tr></table>";
//! let document = SongDocument::parse(source);
//!
//! let tokens = extract(&document);
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[1].text, "C/G");
//! assert_eq!(document.apply(&[]), source);
//! ```

pub mod document;
pub mod entity;
pub mod extract;
pub mod lexer;
mod span;

pub use document::{Cell, ParseConfig, Patch, Row, RowRole, SongDocument};
pub use extract::{ChordToken, extract, is_chord_name, normalize_cell_text};
pub use span::Span;
