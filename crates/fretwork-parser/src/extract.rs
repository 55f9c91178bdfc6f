//! Chord extraction.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::document::SongDocument;

/// A chord name found in a chord row.
///
/// `row_index` counts chord rows only: the first chord row of the song is 0
/// no matter how many other rows precede it. Serializes as
/// `{"row": 0, "chord": "G"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordToken {
    #[serde(rename = "row")]
    pub row_index: usize,
    #[serde(rename = "chord")]
    pub text: String,
}

impl ChordToken {
    pub fn new(row_index: usize, text: impl Into<String>) -> Self {
        Self {
            row_index,
            text: text.into(),
        }
    }
}

/// Turns non-breaking spaces into spaces and trims.
pub fn normalize_cell_text(text: &str) -> String {
    text.replace('\u{a0}', " ").trim().to_string()
}

/// Returns `true` if `text` looks like a chord name: it starts with one of
/// the note letters `A` through `G`.
///
/// Blank spacer cells, arrows and annotations are rejected. So are chords
/// written with lowercase roots, solfège or Nashville numbers.
pub fn is_chord_name(text: &str) -> bool {
    text.chars().next().is_some_and(|c| matches!(c, 'A'..='G'))
}

/// Collects the chord tokens of every chord row, in document order.
pub fn extract(document: &SongDocument<'_>) -> Vec<ChordToken> {
    let tokens: Vec<ChordToken> = document
        .chord_rows()
        .enumerate()
        .flat_map(|(row_index, row)| {
            row.cells()
                .iter()
                .map(|cell| normalize_cell_text(cell.text()))
                .filter(|text| is_chord_name(text))
                .map(move |text| ChordToken::new(row_index, text))
        })
        .collect();

    debug!(
        chord_rows = document.chord_rows().count(),
        tokens = tokens.len();
        "Extracted chord tokens"
    );
    tokens
}
