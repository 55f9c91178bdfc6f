//! Voicing suggestion requests.
//!
//! A [`SuggestionService`] receives the song's chord tokens together with a
//! challenge and answers with raw text, expected to be a JSON array of
//! voicing objects. Making sense of that text is the job of
//! [`reconcile`](crate::reconcile).

use log::debug;
use thiserror::Error;

use fretwork_parser::ChordToken;

/// Failures of a suggestion request.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("suggestion service unavailable: {0}")]
    Unavailable(String),

    #[error("suggestion request timed out")]
    Timeout,

    #[error("suggestion service returned no text")]
    EmptyResponse,

    #[error("no API key configured")]
    MissingCredentials,

    #[error("malformed suggestion response: {0}")]
    Malformed(String),
}

/// One request for voicings: the challenge and every chord of the song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    challenge: String,
    chords: Vec<ChordToken>,
}

impl SuggestionRequest {
    pub fn new(challenge: impl Into<String>, chords: Vec<ChordToken>) -> Self {
        Self {
            challenge: challenge.into(),
            chords,
        }
    }

    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    pub fn chords(&self) -> &[ChordToken] {
        &self.chords
    }

    /// Builds the instruction text sent to a language model.
    pub fn build_prompt(&self) -> String {
        // ChordToken serializes to plain strings and integers, which cannot fail
        let chords = serde_json::to_string(&self.chords).unwrap_or_else(|_| String::from("[]"));

        let prompt = format!(
            r#"You are an expert guitar instructor.

Challenge: "{challenge}"

Here is the sequence of chords in a song, organized by row (line number):
{chords}

Please provide a specific guitar voicing for each chord in the sequence that satisfies the challenge.
Return the result strictly as a JSON list of objects.

Each object must have:
- "row": The integer row index corresponding to the input chord.
- "chord_display_name": The name of the chord to display. This can be different from the input chord (e.g. if the challenge is to add extensions, input "G" might become "Gmaj9").
- "fingering": A string of 6 numbers or 'x' separated by spaces, representing frets from Low E (6th string) to High e (1st string). Use 'x' for muted strings and '0' for open strings.
- "starting_fret": An integer indicating the fret number of the lowest displayed fret in the diagram (usually 1, unless playing high up the neck).

Important rules:
1. You may return more chords than provided if the challenge implies insertion (e.g. secondary dominants). Ensure they have the correct "row" index.
2. You may return fewer chords if the challenge implies simplification.
3. The "row" index is crucial for placing the chord correctly in the lyrics.

If a chord is repeated many times and the challenge implies keeping the same voicing, simply repeat the voicing object.
If the challenge suggests "skipping" a chord (e.g. for a sparse arrangement), you can simply omit it from the list, or return it with "fingering": "SKIP".

Do not include markdown formatting (like ```json) in the response, just the raw JSON string."#,
            challenge = self.challenge,
        );

        debug!(chords = self.chords.len(), bytes = prompt.len(); "Built suggestion prompt");
        prompt
    }
}

/// Something that can propose voicings for a song.
///
/// Implementations return the service's raw reply. Closures with the same
/// signature implement the trait, which keeps test doubles short:
///
/// ```
/// # use fretwork::suggestion::{ServiceError, SuggestionRequest, SuggestionService};
/// let canned = |_: &SuggestionRequest| -> Result<String, ServiceError> {
///     Ok(String::from("[]"))
/// };
/// let request = SuggestionRequest::new("triads", Vec::new());
/// assert_eq!(canned.suggest(&request).unwrap(), "[]");
/// ```
pub trait SuggestionService: Send + Sync {
    /// Asks for voicings.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when no usable reply was received.
    fn suggest(&self, request: &SuggestionRequest) -> Result<String, ServiceError>;
}

impl<F> SuggestionService for F
where
    F: Fn(&SuggestionRequest) -> Result<String, ServiceError> + Send + Sync,
{
    fn suggest(&self, request: &SuggestionRequest) -> Result<String, ServiceError> {
        self(request)
    }
}
