//! Six-string fingerings.
//!
//! A [`Fingering`] assigns one [`StringState`] to each guitar string, ordered
//! from the low E string to the high e string. Fingerings are written as six
//! whitespace-separated tokens, e.g. `"x 3 2 0 1 0"`.
//!
//! # Token rules
//!
//! | Token | State |
//! |-------|-------|
//! | `x` / `X` | [`StringState::Muted`] |
//! | `0` | [`StringState::Open`] |
//! | `1`, `2`, ... | [`StringState::Fretted`] |
//! | anything else | [`StringState::Muted`] |
//!
//! Only the token count is validated.
//!
//! ```
//! # use fretwork_core::fingering::{Fingering, StringState};
//! let c_major: Fingering = "x 3 2 0 1 0".parse().unwrap();
//! assert_eq!(c_major.strings()[0], StringState::Muted);
//! assert_eq!(c_major.strings()[1], StringState::Fretted(3));
//! assert!("x 3 2 0 1".parse::<Fingering>().is_err());
//! ```

use std::{fmt, str::FromStr};

use crate::error::LayoutError;

/// Number of strings on a standard guitar.
pub const STRING_COUNT: usize = 6;

/// What a single string does in a voicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringState {
    /// Not played.
    Muted,
    /// Played without fretting.
    Open,
    /// Fretted at the given fret (always `>= 1`).
    Fretted(u16),
}

impl StringState {
    /// Parses a single fingering token. Unrecognized tokens are muted.
    pub fn from_token(token: &str) -> Self {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Self::Muted;
        }
        match token.parse::<u16>() {
            Ok(0) => Self::Open,
            Ok(fret) => Self::Fretted(fret),
            Err(_) => Self::Muted,
        }
    }

    /// Returns the fret number if the string is fretted.
    pub fn fret(self) -> Option<u16> {
        match self {
            Self::Fretted(fret) => Some(fret),
            Self::Muted | Self::Open => None,
        }
    }
}

impl fmt::Display for StringState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Muted => write!(f, "x"),
            Self::Open => write!(f, "0"),
            Self::Fretted(fret) => write!(f, "{fret}"),
        }
    }
}

/// A complete six-string fingering, low string first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingering {
    strings: [StringState; STRING_COUNT],
}

impl Fingering {
    /// Creates a fingering from explicit string states.
    pub fn new(strings: [StringState; STRING_COUNT]) -> Self {
        Self { strings }
    }

    /// Returns the per-string states, low string first.
    pub fn strings(&self) -> &[StringState; STRING_COUNT] {
        &self.strings
    }

    /// Iterates over the fret numbers of all fretted strings.
    pub fn fretted(&self) -> impl Iterator<Item = u16> + '_ {
        self.strings.iter().filter_map(|state| state.fret())
    }

    /// Returns `true` if no string is fretted.
    pub fn is_unfretted(&self) -> bool {
        self.fretted().next().is_none()
    }
}

impl FromStr for Fingering {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.len() != STRING_COUNT {
            return Err(LayoutError::MalformedFingering {
                found: tokens.len(),
            });
        }

        let mut strings = [StringState::Muted; STRING_COUNT];
        for (state, token) in strings.iter_mut().zip(tokens) {
            *state = StringState::from_token(token);
        }
        Ok(Self { strings })
    }
}

impl fmt::Display for Fingering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, state) in self.strings.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{state}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_c_major() {
        let fingering: Fingering = "x 3 2 0 1 0".parse().unwrap();
        assert_eq!(
            fingering.strings(),
            &[
                StringState::Muted,
                StringState::Fretted(3),
                StringState::Fretted(2),
                StringState::Open,
                StringState::Fretted(1),
                StringState::Open,
            ]
        );
    }

    #[test]
    fn test_parse_uppercase_mute() {
        let fingering: Fingering = "X X 0 2 3 2".parse().unwrap();
        assert_eq!(fingering.strings()[0], StringState::Muted);
        assert_eq!(fingering.strings()[1], StringState::Muted);
    }

    #[test]
    fn test_unknown_tokens_are_muted() {
        let fingering: Fingering = "- 3 ? -1 1a 0".parse().unwrap();
        assert_eq!(fingering.strings()[0], StringState::Muted);
        assert_eq!(fingering.strings()[2], StringState::Muted);
        assert_eq!(fingering.strings()[3], StringState::Muted);
        assert_eq!(fingering.strings()[4], StringState::Muted);
        assert_eq!(fingering.strings()[5], StringState::Open);
    }

    #[test]
    fn test_oversized_fret_is_muted() {
        assert_eq!(StringState::from_token("99999999"), StringState::Muted);
        assert_eq!(StringState::from_token("12"), StringState::Fretted(12));
    }

    #[test]
    fn test_wrong_token_count_rejected() {
        assert_eq!(
            "x 3 2 0 1".parse::<Fingering>(),
            Err(LayoutError::MalformedFingering { found: 5 })
        );
        assert_eq!(
            "3 2 0 0 3 3 3".parse::<Fingering>(),
            Err(LayoutError::MalformedFingering { found: 7 })
        );
        assert_eq!(
            "".parse::<Fingering>(),
            Err(LayoutError::MalformedFingering { found: 0 })
        );
    }

    #[test]
    fn test_extra_whitespace_tolerated() {
        let fingering: Fingering = "  3\t2  0 0\u{a0}3 3\n".parse().unwrap();
        assert_eq!(fingering.to_string(), "3 2 0 0 3 3");
    }

    #[test]
    fn test_display_canonical_form() {
        let fingering: Fingering = "X 3 2 0 1 0".parse().unwrap();
        assert_eq!(fingering.to_string(), "x 3 2 0 1 0");
    }

    #[test]
    fn test_fretted_iterator() {
        let fingering: Fingering = "x 7 9 9 x 0".parse().unwrap();
        assert_eq!(fingering.fretted().collect::<Vec<_>>(), vec![7, 9, 9]);
        assert!(!fingering.is_unfretted());

        let open: Fingering = "0 0 0 x x x".parse().unwrap();
        assert!(open.is_unfretted());
    }
}
