//! Challenge list handling.

use std::{fs, io, path::Path};

use log::{info, warn};
use rand::seq::IndexedRandom;

use fretwork::{
    FretworkError,
    challenge::{self, ChallengeService},
};

/// Used when no challenge list is available.
pub const FALLBACK_CHALLENGE: &str = "Play all chords as triads";

/// The challenges songs are annotated with, one picked at random per song.
#[derive(Debug, Clone)]
pub struct ChallengeDeck {
    challenges: Vec<String>,
}

impl ChallengeDeck {
    /// Builds a deck from text with one challenge per line.
    ///
    /// Lines are trimmed and blank lines skipped. Text without any challenge
    /// yields the fallback deck.
    pub fn parse(text: &str) -> Self {
        let challenges: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if challenges.is_empty() {
            return Self::fallback();
        }
        Self { challenges }
    }

    /// Loads the challenge list at `path`.
    ///
    /// A missing or unreadable file is not an error: a warning is logged and
    /// the fallback deck is used.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let deck = Self::parse(&text);
                info!(path = path.display().to_string(), challenges = deck.len(); "Loaded challenges");
                deck
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = path.display().to_string(); "Challenge list not found, using fallback challenge");
                Self::fallback()
            }
            Err(err) => {
                warn!(path = path.display().to_string(), err:err; "Failed to read challenge list, using fallback challenge");
                Self::fallback()
            }
        }
    }

    /// Asks `service` for a fresh deck of `count` challenges.
    ///
    /// # Errors
    ///
    /// Returns [`FretworkError::Service`] if the service fails or its reply
    /// holds no challenge.
    pub fn generate(service: &dyn ChallengeService, count: usize) -> Result<Self, FretworkError> {
        let challenges = challenge::generate_challenges(service, count)?;
        Ok(Self { challenges })
    }

    /// Writes the deck to `path`, one challenge per line.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let mut text = self.challenges.join("\n");
        text.push('\n');
        fs::write(path, text)?;
        info!(path = path.display().to_string(), challenges = self.len(); "Saved challenges");
        Ok(())
    }

    /// A deck holding only [`FALLBACK_CHALLENGE`].
    pub fn fallback() -> Self {
        Self {
            challenges: vec![FALLBACK_CHALLENGE.to_string()],
        }
    }

    /// Picks a challenge at random.
    pub fn pick(&self) -> &str {
        self.pick_with(&mut rand::rng())
    }

    /// Picks a challenge using `rng`.
    pub fn pick_with<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.challenges
            .choose(rng)
            .map_or(FALLBACK_CHALLENGE, String::as_str)
    }

    pub fn challenges(&self) -> &[String] {
        &self.challenges
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    /// Always false; an empty list becomes the fallback deck.
    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use fretwork::ServiceError;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_parse_skips_blank_lines() {
        let deck = ChallengeDeck::parse("  Add 9ths to every other chord \n\n\t\nPlay without the fifth\r\n");
        assert_eq!(
            deck.challenges(),
            ["Add 9ths to every other chord", "Play without the fifth"]
        );
    }

    #[test]
    fn test_blank_text_falls_back() {
        let deck = ChallengeDeck::parse("\n   \n");
        assert_eq!(deck.challenges(), [FALLBACK_CHALLENGE]);
        assert!(!deck.is_empty());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempdir().unwrap();
        let deck = ChallengeDeck::load(dir.path().join("challenges.txt"));
        assert_eq!(deck.pick(), FALLBACK_CHALLENGE);
    }

    #[test]
    fn test_generate_and_save() {
        let canned = |_: &str| -> Result<String, ServiceError> {
            Ok(String::from("1. Play without the fifth\n\n2. Add 9ths to every other chord\n"))
        };
        let deck = ChallengeDeck::generate(&canned, 2).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("challenges.txt");
        deck.save(&path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Play without the fifth\nAdd 9ths to every other chord\n"
        );
        assert_eq!(ChallengeDeck::load(&path).challenges(), deck.challenges());
    }

    #[test]
    fn test_generate_failure_is_reported() {
        let offline = |_: &str| -> Result<String, ServiceError> {
            Err(ServiceError::MissingCredentials)
        };
        assert!(matches!(
            ChallengeDeck::generate(&offline, 50),
            Err(FretworkError::Service(ServiceError::MissingCredentials))
        ));
    }

    #[test]
    fn test_load_and_pick() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("challenges.txt");
        std::fs::write(&path, "Use drop 2 voicings\nAdd a passing chord\n").unwrap();

        let deck = ChallengeDeck::load(&path);
        assert_eq!(deck.len(), 2);
        for _ in 0..20 {
            assert!(deck.challenges().iter().any(|c| c == deck.pick()));
        }
    }
}
