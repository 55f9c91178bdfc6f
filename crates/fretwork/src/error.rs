//! Error types for fretwork operations.
//!
//! [`FretworkError`] wraps the failures of every pipeline stage. Most of them
//! never reach callers of the fail-open entry points: they are logged and the
//! affected suggestion, or the whole annotation, is skipped instead.

use std::io;

use thiserror::Error;

use fretwork_core::{LayoutError, RenderError};

use crate::suggestion::ServiceError;

/// The main error type for fretwork operations.
#[derive(Debug, Error)]
pub enum FretworkError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Suggestion service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
