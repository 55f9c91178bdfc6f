//! Fret-window selection and diagram layout.
//!
//! Given a [`Fingering`], a starting-fret hint and a title, [`DiagramLayout`]
//! decides which contiguous range of frets a chord diagram shows and where
//! every marker goes. Layout is deterministic and independent of rendering.
//!
//! # Window rules
//!
//! 1. No fretted strings: frets 1 through 4.
//! 2. Highest fretted note at or below fret 5 and a hint of 1: frets 1 through 5,
//!    whatever the exact shape.
//! 3. Otherwise the window starts at the hint when it is above 1, else at the
//!    lowest fretted note, and ends at `max(start + 4, highest + 1)`.
//!
//! Fretted notes that still fall outside the window are not drawn.
//!
//! ```
//! # use fretwork_core::layout::DiagramLayout;
//! let layout = DiagramLayout::parse("x 7 9 9 x x", 1, "E/B").unwrap();
//! assert_eq!((layout.min_fret(), layout.max_fret()), (7, 11));
//! assert_eq!(layout.label(), Some("7fr"));
//! ```

use std::collections::BTreeSet;

use log::trace;

use crate::{
    error::LayoutError,
    fingering::{Fingering, StringState},
};

/// Highest fret that still qualifies a shape for the fixed nut window.
const LOW_CHORD_MAX_FRET: i32 = 5;

/// Minimum number of frets past the window start that are always shown.
const MIN_WINDOW_SPAN: i32 = 4;

/// A contiguous, inclusive range of frets shown in a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FretWindow {
    start: i32,
    end: i32,
}

impl FretWindow {
    /// Computes the window for a fingering and a starting-fret hint.
    pub fn compute(fingering: &Fingering, starting_fret_hint: i32) -> Self {
        let (min_active, max_active) = match (
            fingering.fretted().min(),
            fingering.fretted().max(),
        ) {
            (Some(min), Some(max)) => (i32::from(min), i32::from(max)),
            _ => return Self { start: 1, end: 4 },
        };

        if max_active <= LOW_CHORD_MAX_FRET && starting_fret_hint == 1 {
            return Self { start: 1, end: 5 };
        }

        let start = if starting_fret_hint > 1 {
            starting_fret_hint
        } else {
            min_active.max(1)
        };
        let end = start
            .saturating_add(MIN_WINDOW_SPAN)
            .max(max_active.saturating_add(1));

        Self { start, end }
    }

    /// First fret shown.
    pub fn start(&self) -> i32 {
        self.start
    }

    /// Last fret shown.
    pub fn end(&self) -> i32 {
        self.end
    }

    /// Number of fret rows drawn.
    pub fn len(&self) -> i32 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }

    /// Returns `true` if the window shows no frets.
    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    /// Position of `fret` relative to the window start, if it is visible.
    pub fn relative(&self, fret: u16) -> Option<i32> {
        let relative = i32::from(fret).saturating_sub(self.start);
        (0..self.len()).contains(&relative).then_some(relative)
    }
}

/// A fully resolved chord diagram description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramLayout {
    window: FretWindow,
    dots: BTreeSet<(usize, i32)>,
    open_marks: BTreeSet<usize>,
    mute_marks: BTreeSet<usize>,
    label: Option<String>,
    title: String,
}

impl DiagramLayout {
    /// Lays out a parsed fingering.
    ///
    /// # Arguments
    ///
    /// * `fingering` - Per-string states, low string first.
    /// * `starting_fret_hint` - Suggested first fret; `1` lets the engine decide.
    /// * `title` - Display name drawn above the grid.
    pub fn new(fingering: &Fingering, starting_fret_hint: i32, title: impl Into<String>) -> Self {
        let window = FretWindow::compute(fingering, starting_fret_hint);
        let mut dots = BTreeSet::new();
        let mut open_marks = BTreeSet::new();
        let mut mute_marks = BTreeSet::new();

        for (string_idx, state) in fingering.strings().iter().enumerate() {
            match *state {
                StringState::Muted => {
                    mute_marks.insert(string_idx);
                }
                StringState::Open => {
                    open_marks.insert(string_idx);
                }
                StringState::Fretted(fret) => {
                    if let Some(relative) = window.relative(fret) {
                        dots.insert((string_idx, relative));
                    } else {
                        trace!(string_idx, fret; "Fretted note outside window, not drawn");
                    }
                }
            }
        }

        let label = (window.start() > 1).then(|| format!("{}fr", window.start()));
        let title = title.into();

        trace!(
            title = title.as_str(),
            min_fret = window.start(),
            max_fret = window.end();
            "Diagram laid out"
        );

        Self {
            window,
            dots,
            open_marks,
            mute_marks,
            label,
            title,
        }
    }

    /// Parses a fingering string and lays it out.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::MalformedFingering`] when the string does not
    /// contain exactly six tokens.
    pub fn parse(
        notation: &str,
        starting_fret_hint: i32,
        title: impl Into<String>,
    ) -> Result<Self, LayoutError> {
        let fingering: Fingering = notation.parse()?;
        Ok(Self::new(&fingering, starting_fret_hint, title))
    }

    /// The computed fret window.
    pub fn window(&self) -> FretWindow {
        self.window
    }

    /// First fret shown.
    pub fn min_fret(&self) -> i32 {
        self.window.start()
    }

    /// Last fret shown.
    pub fn max_fret(&self) -> i32 {
        self.window.end()
    }

    /// Number of fret rows drawn.
    pub fn fret_count(&self) -> i32 {
        self.window.len()
    }

    /// Dots as `(string_index, relative_fret)` pairs.
    pub fn dots(&self) -> &BTreeSet<(usize, i32)> {
        &self.dots
    }

    /// Strings marked `o`.
    pub fn open_marks(&self) -> &BTreeSet<usize> {
        &self.open_marks
    }

    /// Strings marked `x`.
    pub fn mute_marks(&self) -> &BTreeSet<usize> {
        &self.mute_marks
    }

    /// Whether the top line is drawn as a nut.
    pub fn nut_at_top(&self) -> bool {
        self.window.start() == 1
    }

    /// Side label naming the starting fret, e.g. `"7fr"`.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    /// Strategy for a single fingering token, including junk.
    fn token_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("x".to_string()),
            Just("X".to_string()),
            Just("0".to_string()),
            (1u16..=24).prop_map(|fret| fret.to_string()),
            "[a-z?-]{1,3}",
        ]
    }

    /// Strategy for unfretted tokens only.
    fn unfretted_token_strategy() -> impl Strategy<Value = String> {
        prop_oneof![Just("x".to_string()), Just("0".to_string())]
    }

    // ===================
    // Property Test Functions
    // ===================

    fn check_wrong_count_rejected(tokens: &[String]) -> Result<(), TestCaseError> {
        let notation = tokens.join(" ");
        let result = DiagramLayout::parse(&notation, 1, "t");
        prop_assert_eq!(
            result,
            Err(LayoutError::MalformedFingering {
                found: tokens.len()
            })
        );
        Ok(())
    }

    fn check_unfretted_window(tokens: &[String], hint: i32) -> Result<(), TestCaseError> {
        let layout = DiagramLayout::parse(&tokens.join(" "), hint, "t").unwrap();
        prop_assert_eq!((layout.min_fret(), layout.max_fret()), (1, 4));
        prop_assert!(layout.dots().is_empty());
        Ok(())
    }

    fn check_layout_invariants(tokens: &[String], hint: i32) -> Result<(), TestCaseError> {
        let layout = DiagramLayout::parse(&tokens.join(" "), hint, "t").unwrap();
        prop_assert!(layout.max_fret() >= layout.min_fret() + 3);
        for &(string_idx, relative) in layout.dots() {
            prop_assert!(string_idx < 6);
            prop_assert!((0..layout.fret_count()).contains(&relative));
        }
        prop_assert_eq!(layout.nut_at_top(), layout.label().is_none());
        prop_assert!(
            layout.dots().len() + layout.open_marks().len() + layout.mute_marks().len() <= 6
        );
        Ok(())
    }

    fn check_lowest_note_visible_without_hint(tokens: &[String]) -> Result<(), TestCaseError> {
        let fingering: Fingering = tokens.join(" ").parse().unwrap();
        let layout = DiagramLayout::new(&fingering, 1, "t");
        // Without a hint every fretted note is on screen.
        prop_assert_eq!(layout.dots().len(), fingering.fretted().count());
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn wrong_count_rejected(
            tokens in prop::collection::vec(token_strategy(), 0..12)
                .prop_filter("not six", |t| t.len() != 6)
        ) {
            check_wrong_count_rejected(&tokens)?;
        }

        #[test]
        fn unfretted_window(
            tokens in prop::collection::vec(unfretted_token_strategy(), 6),
            hint in -5i32..20,
        ) {
            check_unfretted_window(&tokens, hint)?;
        }

        #[test]
        fn layout_invariants(
            tokens in prop::collection::vec(token_strategy(), 6),
            hint in -5i32..20,
        ) {
            check_layout_invariants(&tokens, hint)?;
        }

        #[test]
        fn lowest_note_visible_without_hint(
            tokens in prop::collection::vec(token_strategy(), 6),
        ) {
            check_lowest_note_visible_without_hint(&tokens)?;
        }
    }
}
