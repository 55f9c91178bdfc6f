//! Challenge list generation.
//!
//! Asks a language model for a list of practice challenges, one per line,
//! and cleans the reply into the format the challenge list file uses.

use log::{debug, info};

use crate::suggestion::ServiceError;

/// Number of challenges asked for by default.
pub const DEFAULT_CHALLENGE_COUNT: usize = 50;

/// Something that can write a list of challenges.
///
/// Implementations return the model's raw text. Closures with the same
/// signature implement the trait.
pub trait ChallengeService: Send + Sync {
    /// Sends `prompt` and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when no usable reply was received.
    fn challenges(&self, prompt: &str) -> Result<String, ServiceError>;
}

impl<F> ChallengeService for F
where
    F: Fn(&str) -> Result<String, ServiceError> + Send + Sync,
{
    fn challenges(&self, prompt: &str) -> Result<String, ServiceError> {
        self(prompt)
    }
}

/// Builds the instruction text asking for `count` challenges.
pub fn challenge_prompt(count: usize) -> String {
    format!(
        r#"I am a guitar player looking for creative chord voicing and extension challenges.
Please generate a list of {count} distinct challenges.

Examples of the types of challenges I want:
* Play all the chords without the fifth
* Add 9ths to every other chord
* Play all the chords as triads using only the 2nd, 3rd, and 5th strings
* Voice the chords such that there's always a note on the sixth string, and that note walks up the fretboard making minimal steps, jumping back to the bottom of the neck when you get to the 12th fret.
* About once per verse, add an interesting passing chord with at least one non-diatonic note.

Challenges should cover:
1. Voicing challenges (specific intervals, string sets, inversions)
2. Extension challenges (adding 7ths, 9ths, 11ths, 13ths)
3. Insertion/Substitution challenges (passing chords, tritone subs, secondary dominants)

Output strictly the list of {count} challenges, one per line, with no numbering or introductory text."#
    )
}

/// Removes a leading list marker: `1.`, `12)`, `3:`, `-` or `*`.
///
/// Digits are only stripped when a marker character follows them, so
/// "7ths everywhere" stays intact.
fn strip_list_marker(line: &str) -> &str {
    if let Some(rest) = line.strip_prefix(['-', '*', '•']) {
        return rest.trim_start();
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return line;
    }
    match line[digits..].strip_prefix(['.', ')', ':']) {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}

/// Splits a model reply into challenges.
///
/// Lines are trimmed, list markers removed and blank lines skipped.
pub fn parse_challenges(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Asks `service` for `count` challenges.
///
/// The model may return more or fewer lines than asked for; every usable
/// line is kept.
///
/// # Errors
///
/// Returns the service's error, or [`ServiceError::EmptyResponse`] if the
/// reply holds no challenge.
pub fn generate_challenges(
    service: &dyn ChallengeService,
    count: usize,
) -> Result<Vec<String>, ServiceError> {
    let reply = service.challenges(&challenge_prompt(count))?;
    let challenges = parse_challenges(&reply);
    debug!(lines = reply.lines().count(), kept = challenges.len(); "Parsed challenge reply");

    if challenges.is_empty() {
        return Err(ServiceError::EmptyResponse);
    }
    info!(requested = count, received = challenges.len(); "Generated challenges");
    Ok(challenges)
}
