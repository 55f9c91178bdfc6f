//! Document annotation.
//!
//! For every chord row with suggestions, the voicings that render are
//! collected into a strip of inline images and appended to the row as one
//! new trailing cell. Rows without suggestions, and rows whose suggestions
//! all fail or are skipped, keep their exact original bytes.

use std::fmt::Write as _;

use log::{debug, info, warn};

use fretwork_core::raster::PngImage;
use fretwork_parser::{ChordToken, Patch, SongDocument, entity::escape};

use crate::{
    reconcile::{SuggestionsByRow, VoicingFingering, VoicingSuggestion},
    render::DiagramRenderer,
};

const STRIP_CELL_OPEN: &str = r#"<td class="voicings" style="vertical-align: top; padding-left: 20px;"><div style="display: flex; gap: 10px;">"#;
const STRIP_CELL_CLOSE: &str = "</div></td>";

/// Marks the banner so it is only ever added once.
const BANNER_CLASS: &str = "chord-challenge";

/// A rendered voicing ready to be embedded.
struct StripImage {
    png: PngImage,
    name: String,
}

/// Name for a suggestion without one: the row's token at the same position,
/// else the row's last token, else nothing.
fn fallback_name<'a>(row_tokens: &[&'a ChordToken], position: usize) -> &'a str {
    row_tokens
        .get(position)
        .or_else(|| row_tokens.last())
        .map(|token| token.text.as_str())
        .unwrap_or_default()
}

/// Renders the suggestions of one row, skipping `SKIP` entries and failures.
fn render_row(
    row_index: usize,
    suggestions: &[VoicingSuggestion],
    row_tokens: &[&ChordToken],
    renderer: &DiagramRenderer,
) -> Vec<StripImage> {
    suggestions
        .iter()
        .enumerate()
        .filter_map(|(position, suggestion)| {
            let VoicingFingering::Notation(notation) = suggestion.fingering() else {
                return None;
            };
            let name = suggestion
                .display_name()
                .unwrap_or_else(|| fallback_name(row_tokens, position));

            match renderer.render(notation, suggestion.starting_fret(), name) {
                Ok(png) => Some(StripImage {
                    png,
                    name: name.to_string(),
                }),
                Err(err) => {
                    warn!(row = row_index, chord = name, notation = notation.as_str(), err:err; "Skipping voicing");
                    None
                }
            }
        })
        .collect()
}

/// Markup of the trailing cell holding a row's diagrams.
fn strip_markup(images: &[StripImage], image_height: u32) -> String {
    let mut cell = String::from(STRIP_CELL_OPEN);
    for image in images {
        let alt = format!("{} voicing", image.name);
        // Writing to a String cannot fail
        let _ = write!(
            cell,
            r#"<img src="{src}" alt="{alt}" style="height: {image_height}px; width: auto;">"#,
            src = image.png.data_uri(),
            alt = escape(&alt),
        );
    }
    cell.push_str(STRIP_CELL_CLOSE);
    cell
}

/// Appends a diagram strip to each chord row that has suggestions.
///
/// `tokens` are the chord tokens extracted from `document` and provide
/// display names for suggestions that lack one. Suggestions for row indices
/// past the last chord row are ignored.
///
/// Returns the document markup with the strips inserted.
pub fn annotate_rows(
    document: &SongDocument<'_>,
    tokens: &[ChordToken],
    suggestions: &SuggestionsByRow,
    renderer: &DiagramRenderer,
    image_height: u32,
) -> String {
    let chord_rows = document.chord_rows().count();
    for ignored in suggestions.rows().filter(|&row| row >= chord_rows) {
        debug!(row = ignored, chord_rows; "Ignoring suggestions for a row that does not exist");
    }

    let mut patches = Vec::new();
    let mut diagrams = 0;
    for (row_index, row) in document.chord_rows().enumerate() {
        let row_suggestions = suggestions.get(row_index);
        if row_suggestions.is_empty() {
            continue;
        }

        let row_tokens: Vec<&ChordToken> = tokens
            .iter()
            .filter(|token| token.row_index == row_index)
            .collect();
        let images = render_row(row_index, row_suggestions, &row_tokens, renderer);
        if images.is_empty() {
            debug!(row = row_index; "No diagrams for row");
            continue;
        }

        diagrams += images.len();
        patches.push(Patch::insert(
            row.insertion_offset(),
            strip_markup(&images, image_height),
        ));
    }

    info!(rows = patches.len(), diagrams; "Annotated song");
    document.apply(&patches)
}

/// Markup of the challenge banner.
fn banner_markup(challenge: &str) -> String {
    format!(
        r#"<div class="{BANNER_CLASS}" style="background-color: #ffffe0; border: 2px solid #e6db55; padding: 10px; margin: 10px; font-family: sans-serif;"><strong>Chord Challenge:</strong> {}</div>"#,
        escape(challenge)
    )
}

/// Inserts the challenge banner right after the `<body>` start tag.
///
/// Markup without a body, or that already carries the banner, is returned
/// unchanged.
pub fn inject_banner(markup: &str, challenge: &str) -> String {
    let document = SongDocument::parse(markup);
    let Some(offset) = document.body_insertion_offset() else {
        debug!("No body tag, banner not added");
        return markup.to_string();
    };
    if markup.contains(&format!(r#"<div class="{BANNER_CLASS}""#)) {
        debug!("Banner already present");
        return markup.to_string();
    }
    document.apply(&[Patch::insert(offset, banner_markup(challenge))])
}
