//! Voicing reconciliation.
//!
//! The suggestion service answers with a flat list of voicings, each tagged
//! with the chord-row index it belongs to. The list is not aligned with the
//! chord tokens that were sent: it may insert voicings, drop some, or repeat
//! them. Reconciliation therefore never zips the two lists. It parses the
//! reply and regroups it by row, keeping the service's order within a row.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;

use fretwork_parser::ChordToken;

use crate::suggestion::{ServiceError, SuggestionRequest, SuggestionService};

/// Marker the service uses for "no diagram for this chord".
const SKIP: &str = "SKIP";

/// What to draw for one suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoicingFingering {
    /// Draw nothing.
    Skip,
    /// A fingering string, not yet validated.
    Notation(String),
}

/// One voicing proposed by the suggestion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicingSuggestion {
    row_index: usize,
    display_name: Option<String>,
    fingering: VoicingFingering,
    starting_fret: i32,
}

impl VoicingSuggestion {
    pub fn new(
        row_index: usize,
        display_name: Option<String>,
        fingering: VoicingFingering,
        starting_fret: i32,
    ) -> Self {
        Self {
            row_index,
            display_name,
            fingering,
            starting_fret,
        }
    }

    pub fn row_index(&self) -> usize {
        self.row_index
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn fingering(&self) -> &VoicingFingering {
        &self.fingering
    }

    pub fn starting_fret(&self) -> i32 {
        self.starting_fret
    }
}

/// A suggestion as it appears on the wire.
///
/// Both snake_case and camelCase keys are accepted.
#[derive(Debug, Deserialize)]
struct WireSuggestion {
    row: usize,
    #[serde(default, alias = "chordDisplayName")]
    chord_display_name: Option<String>,
    #[serde(default)]
    chord: Option<String>,
    #[serde(default)]
    fingering: Option<String>,
    #[serde(default, alias = "startingFret")]
    starting_fret: Option<Value>,
}

impl From<WireSuggestion> for VoicingSuggestion {
    fn from(wire: WireSuggestion) -> Self {
        let fingering = match wire.fingering {
            Some(notation) if !notation.trim().eq_ignore_ascii_case(SKIP) => {
                VoicingFingering::Notation(notation)
            }
            _ => VoicingFingering::Skip,
        };

        // Lenient: models sometimes quote numbers
        let starting_fret = wire
            .starting_fret
            .as_ref()
            .and_then(|value| match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .map_or(1, clamp_fret);

        let display_name = wire
            .chord_display_name
            .or(wire.chord)
            .filter(|name| !name.trim().is_empty());

        Self::new(wire.row, display_name, fingering, starting_fret)
    }
}

/// Clamps a starting-fret hint to the range a fingering can express.
fn clamp_fret(fret: i64) -> i32 {
    let clamped = fret.clamp(0, i64::from(u16::MAX));
    i32::try_from(clamped).unwrap_or(1)
}

/// Removes a surrounding Markdown code fence (```` ```json ```` or ```` ``` ````).
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parses a service reply into suggestions.
///
/// Elements that are not valid suggestions (for example with a missing or
/// negative `row`) are dropped one by one.
///
/// # Errors
///
/// Returns [`ServiceError::Malformed`] if the reply, once unfenced, is not a
/// JSON array.
pub fn try_parse_suggestions(text: &str) -> Result<Vec<VoicingSuggestion>, ServiceError> {
    let body = strip_code_fence(text);
    let items = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            return Err(ServiceError::Malformed(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )));
        }
        Err(err) => return Err(ServiceError::Malformed(err.to_string())),
    };

    let total = items.len();
    let suggestions: Vec<VoicingSuggestion> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<WireSuggestion>(item) {
            Ok(wire) => Some(wire.into()),
            Err(err) => {
                warn!(index, err:err; "Dropping malformed suggestion");
                None
            }
        })
        .collect();

    debug!(total, kept = suggestions.len(); "Parsed suggestions");
    Ok(suggestions)
}

/// Parses a service reply into suggestions; anything unparseable yields none.
pub fn parse_suggestions(text: &str) -> Vec<VoicingSuggestion> {
    try_parse_suggestions(text).unwrap_or_else(|err| {
        warn!(err:err; "Ignoring suggestion response");
        Vec::new()
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Suggestions grouped by chord-row index.
///
/// Rows without suggestions are absent. Within a row, suggestions keep the
/// order the service returned them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionsByRow {
    rows: BTreeMap<usize, Vec<VoicingSuggestion>>,
}

impl SuggestionsByRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups suggestions by their row index.
    pub fn group(suggestions: impl IntoIterator<Item = VoicingSuggestion>) -> Self {
        let mut rows: BTreeMap<usize, Vec<VoicingSuggestion>> = BTreeMap::new();
        for suggestion in suggestions {
            rows.entry(suggestion.row_index)
                .or_default()
                .push(suggestion);
        }
        Self { rows }
    }

    /// Suggestions for a row, empty if there are none.
    pub fn get(&self, row_index: usize) -> &[VoicingSuggestion] {
        self.rows.get(&row_index).map(Vec::as_slice).unwrap_or_default()
    }

    /// Row indices with at least one suggestion, ascending.
    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[VoicingSuggestion])> {
        self.rows.iter().map(|(row, list)| (*row, list.as_slice()))
    }

    /// Number of rows with suggestions.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of suggestions across all rows.
    pub fn suggestion_count(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }
}

/// Asks `service` for voicings and groups the reply by row.
///
/// No request is made when `tokens` is empty.
///
/// # Errors
///
/// Returns the service's error, or [`ServiceError::Malformed`] if the reply
/// is not a JSON array.
pub fn request_suggestions(
    service: &dyn SuggestionService,
    challenge: &str,
    tokens: &[ChordToken],
) -> Result<SuggestionsByRow, ServiceError> {
    if tokens.is_empty() {
        return Ok(SuggestionsByRow::new());
    }

    let request = SuggestionRequest::new(challenge, tokens.to_vec());
    let reply = service.suggest(&request)?;
    let grouped = SuggestionsByRow::group(try_parse_suggestions(&reply)?);

    info!(
        tokens = tokens.len(),
        rows = grouped.len(),
        suggestions = grouped.suggestion_count();
        "Reconciled voicings"
    );
    Ok(grouped)
}

/// Like [`request_suggestions`], but every failure yields an empty map.
///
/// Service errors, timeouts, and empty or unparseable replies are logged and
/// treated as "no suggestions".
pub fn reconcile(
    service: &dyn SuggestionService,
    challenge: &str,
    tokens: &[ChordToken],
) -> SuggestionsByRow {
    request_suggestions(service, challenge, tokens).unwrap_or_else(|err| {
        warn!(err:err; "Voicing suggestions unavailable");
        SuggestionsByRow::new()
    })
}
