//! Errors surfaced by the CLI.

use thiserror::Error;

use fretwork::FretworkError;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Fretwork(#[from] FretworkError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to start server on {addr}: {message}")]
    Server { addr: String, message: String },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Fretwork(FretworkError::Io(err))
    }
}
