//! Configuration types for song annotation.
//!
//! All types implement [`serde::Deserialize`] and every field has a default,
//! so a configuration file only needs the values it changes:
//!
//! ```toml
//! [suggestion]
//! model = "gemini-2.5-flash"
//! timeout_secs = 30
//!
//! [document]
//! chord_class = "ch"
//! image_height = 120
//!
//! [style]
//! dot_color = "#1f3a93"
//! ```
//!
//! # Example
//!
//! ```
//! # use fretwork::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.document().image_height(), 100);
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use serde::Deserialize;

use fretwork_core::draw::DiagramStyle;
use fretwork_parser::ParseConfig;

use crate::FretworkError;

/// Top-level configuration: suggestion service, document handling and
/// diagram style.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    suggestion: SuggestionConfig,

    #[serde(default)]
    document: DocumentConfig,

    #[serde(default)]
    style: DiagramStyle,
}

impl AppConfig {
    pub fn new(suggestion: SuggestionConfig, document: DocumentConfig, style: DiagramStyle) -> Self {
        Self {
            suggestion,
            document,
            style,
        }
    }

    pub fn suggestion(&self) -> &SuggestionConfig {
        &self.suggestion
    }

    pub fn document(&self) -> &DocumentConfig {
        &self.document
    }

    pub fn style(&self) -> &DiagramStyle {
        &self.style
    }

    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`FretworkError::Config`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), FretworkError> {
        if self.suggestion.timeout_secs == 0 {
            return Err(FretworkError::Config(
                "suggestion.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.suggestion.endpoint.trim().is_empty() || self.suggestion.model.trim().is_empty() {
            return Err(FretworkError::Config(
                "suggestion.endpoint and suggestion.model must not be empty".to_string(),
            ));
        }
        if !(self.document.diagram_scale.is_finite() && self.document.diagram_scale > 0.0) {
            return Err(FretworkError::Config(format!(
                "document.diagram_scale must be a positive number, got {}",
                self.document.diagram_scale
            )));
        }
        if self.document.image_height == 0 {
            return Err(FretworkError::Config(
                "document.image_height must be at least 1".to_string(),
            ));
        }
        if !(self.style.max_grid_height.is_finite() && self.style.max_grid_height > 0.0) {
            return Err(FretworkError::Config(format!(
                "style.max_grid_height must be a positive number, got {}",
                self.style.max_grid_height
            )));
        }
        if self.document.classes.chord_class.trim().is_empty() {
            return Err(FretworkError::Config(
                "document.chord_class must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where and how to ask for voicing suggestions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Base URL of the generative language API.
    endpoint: String,
    /// Model name, as used in `models/{model}:generateContent`.
    model: String,
    /// Upper bound for one suggestion request, connection included.
    timeout_secs: u64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("https://generativelanguage.googleapis.com/v1beta"),
            model: String::from("gemini-3-pro-preview"),
            timeout_secs: 120,
        }
    }
}

impl SuggestionConfig {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            timeout_secs,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How song sheets are read and how diagrams are embedded in them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Row classes, given as `chord_class`/`lyric_class` keys.
    #[serde(flatten)]
    classes: ParseConfig,
    /// Displayed height of each diagram image, in CSS pixels.
    image_height: u32,
    /// Raster pixels per diagram unit.
    diagram_scale: f32,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            classes: ParseConfig::default(),
            image_height: 100,
            diagram_scale: 1.0,
        }
    }
}

impl DocumentConfig {
    pub fn new(classes: ParseConfig, image_height: u32, diagram_scale: f32) -> Self {
        Self {
            classes,
            image_height,
            diagram_scale,
        }
    }

    pub fn classes(&self) -> &ParseConfig {
        &self.classes
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn diagram_scale(&self) -> f32 {
        self.diagram_scale
    }
}
