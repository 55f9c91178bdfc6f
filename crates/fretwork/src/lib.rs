//! Fretwork - alternate guitar voicings for chord song sheets.
//!
//! Given a song sheet and a musical challenge ("voice everything as a triad
//! on strings 2/3/5"), fretwork extracts the chords, asks a suggestion
//! service for voicings that meet the challenge, and appends a strip of
//! chord diagrams to each chord row.

pub mod annotate;
pub mod challenge;
pub mod config;
pub mod gemini;
pub mod reconcile;
pub mod render;
pub mod suggestion;

mod error;

pub use fretwork_core::{color, draw, fingering, layout, raster};
pub use fretwork_parser::{ChordToken, SongDocument};

pub use challenge::ChallengeService;
pub use error::FretworkError;
pub use render::DiagramRenderer;
pub use suggestion::{ServiceError, SuggestionRequest, SuggestionService};

use std::panic::{self, AssertUnwindSafe};

use log::{debug, error, info, warn};

use config::AppConfig;
use raster::Rasterizer;

/// Annotates song sheets with voicing diagrams.
///
/// # Examples
///
/// ```rust,no_run
/// use fretwork::{SongAnnotator, config::AppConfig, gemini::GeminiClient};
///
/// let config = AppConfig::default();
/// let service = GeminiClient::new(config.suggestion(), Some("api-key".to_string()));
/// let annotator = SongAnnotator::new(config, Box::new(service));
///
/// let song = "<body><table><tr class=ch><td>G</td></tr></table></body>";
///
/// // Original markup back on any failure
/// let annotated = annotator.annotate(song, "Play all chords as triads");
///
/// // Same, plus the challenge banner
/// let page = annotator.annotate_page(song, "Play all chords as triads");
/// ```
pub struct SongAnnotator {
    config: AppConfig,
    service: Box<dyn SuggestionService>,
    renderer: DiagramRenderer,
}

impl SongAnnotator {
    /// Create a new annotator.
    ///
    /// # Arguments
    ///
    /// * `config` - Suggestion, document and style settings
    /// * `service` - Where voicing suggestions come from
    pub fn new(config: AppConfig, service: Box<dyn SuggestionService>) -> Self {
        let renderer = DiagramRenderer::new(
            config.style().clone(),
            config.document().diagram_scale(),
        );
        Self {
            config,
            service,
            renderer,
        }
    }

    /// Use a specific rasterizer for diagrams.
    pub fn with_rasterizer(mut self, rasterizer: Rasterizer) -> Self {
        self.renderer = self.renderer.with_rasterizer(rasterizer);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Annotate a song sheet, reporting suggestion failures.
    ///
    /// A song without chord tokens is returned unchanged without contacting
    /// the suggestion service. Suggestions that are skipped or fail to render
    /// only drop their own diagram.
    ///
    /// # Errors
    ///
    /// Returns [`FretworkError::Service`] if the suggestion service fails or
    /// its reply is not a JSON array.
    pub fn try_annotate(&self, markup: &str, challenge: &str) -> Result<String, FretworkError> {
        let document = SongDocument::parse_with(markup, self.config.document().classes());
        let tokens = fretwork_parser::extract(&document);
        if tokens.is_empty() {
            info!("No chords found, leaving song unchanged");
            return Ok(markup.to_string());
        }

        info!(chords = tokens.len(), challenge; "Requesting voicings for song");
        let suggestions =
            reconcile::request_suggestions(self.service.as_ref(), challenge, &tokens)?;
        if suggestions.is_empty() {
            debug!("No usable suggestions, leaving song unchanged");
            return Ok(markup.to_string());
        }

        Ok(annotate::annotate_rows(
            &document,
            &tokens,
            &suggestions,
            &self.renderer,
            self.config.document().image_height(),
        ))
    }

    /// Annotate a song sheet, returning it unchanged on any failure.
    ///
    /// Failures are logged only. A panic anywhere in the pipeline counts as a
    /// failure too.
    pub fn annotate(&self, markup: &str, challenge: &str) -> String {
        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| self.try_annotate(markup, challenge)));
        match outcome {
            Ok(Ok(annotated)) => annotated,
            Ok(Err(err)) => {
                warn!(err:err; "Annotation failed, returning original song");
                markup.to_string()
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_default();
                error!(reason; "Annotation panicked, returning original song");
                markup.to_string()
            }
        }
    }

    /// Annotate a song page for display and add the challenge banner.
    ///
    /// The banner is inserted after `<body>` even when no diagrams could be
    /// added; the challenge still applies to the song.
    pub fn annotate_page(&self, markup: &str, challenge: &str) -> String {
        annotate::inject_banner(&self.annotate(markup, challenge), challenge)
    }
}
