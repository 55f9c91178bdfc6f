//! Error adapter for converting CLI errors to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Configuration
//! parse errors carry the file content and the offending span, so they are
//! rendered with a source snippet; everything else is a plain report.

use std::{fmt, ops::Range, path::Path};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, NamedSource, SourceSpan};

use fretwork::FretworkError;

use crate::{config::ConfigError, error::CliError};

/// Adapter for a configuration file that failed to parse.
pub struct ConfigDiagnostic<'a> {
    message: &'a str,
    span: Option<Range<usize>>,
    src: NamedSource<String>,
}

impl<'a> ConfigDiagnostic<'a> {
    /// Create a new configuration diagnostic.
    pub fn new(path: &Path, src: &str, message: &'a str, span: Option<Range<usize>>) -> Self {
        Self {
            message,
            span,
            src: NamedSource::new(path.display().to_string(), src.to_string()),
        }
    }
}

impl fmt::Debug for ConfigDiagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDiagnostic")
            .field("message", &self.message)
            .field("span", &self.span)
            .finish()
    }
}

impl fmt::Display for ConfigDiagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid configuration file: {}", self.message.trim())
    }
}

impl std::error::Error for ConfigDiagnostic<'_> {}

impl MietteDiagnostic for ConfigDiagnostic<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("fretwork::config"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(
            "every setting is optional; remove it to use the default",
        ))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span.clone()?;
        let span = SourceSpan::new(span.start.into(), span.len());
        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some(self.message.trim().to_string()), span),
        )))
    }
}

/// Adapter for errors without source locations.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            CliError::Fretwork(FretworkError::Io(_)) => "fretwork::io",
            CliError::Fretwork(FretworkError::Layout(_)) => "fretwork::layout",
            CliError::Fretwork(FretworkError::Render(_)) => "fretwork::render",
            CliError::Fretwork(FretworkError::Service(_)) => "fretwork::service",
            CliError::Fretwork(FretworkError::Config(_)) | CliError::Config(_) => {
                "fretwork::config"
            }
            CliError::Server { .. } => "fretwork::server",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A configuration error with a source snippet.
    Config(ConfigDiagnostic<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Config(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Config(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Config(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Config(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Config(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Config(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`CliError`] into a reportable error.
pub fn to_reportable(err: &CliError) -> Reportable<'_> {
    match err {
        CliError::Config(ConfigError::Parse {
            path,
            src,
            message,
            span,
        }) => Reportable::Config(ConfigDiagnostic::new(path, src, message, span.clone())),
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn parse_error(span: Option<Range<usize>>) -> CliError {
        CliError::Config(ConfigError::Parse {
            path: PathBuf::from("fretwork/config.toml"),
            src: String::from("[document]\nimage_height = \"tall\"\n"),
            message: String::from("invalid type: string \"tall\", expected u32\n"),
            span,
        })
    }

    #[test]
    fn test_parse_error_is_labeled() {
        let err = parse_error(Some(26..32));

        let reportable = to_reportable(&err);
        let Reportable::Config(diagnostic) = &reportable else {
            panic!("Expected Config");
        };
        assert_eq!(
            reportable.to_string(),
            "Invalid configuration file: invalid type: string \"tall\", expected u32"
        );

        let labels: Vec<_> = diagnostic.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        assert_eq!(labels[0].offset(), 26);
        assert_eq!(labels[0].len(), 6);
    }

    #[test]
    fn test_parse_error_without_span() {
        let err = parse_error(None);
        let reportable = to_reportable(&err);
        assert!(reportable.labels().is_none());
        assert!(reportable.source_code().is_some());
    }

    #[test]
    fn test_other_errors() {
        let err = CliError::Fretwork(FretworkError::Config(String::from(
            "document.image_height must be at least 1",
        )));

        let reportable = to_reportable(&err);
        match &reportable {
            Reportable::Error(e) => {
                assert_eq!(
                    e.to_string(),
                    "Invalid configuration: document.image_height must be at least 1"
                );
                assert_eq!(e.code().unwrap().to_string(), "fretwork::config");
            }
            Reportable::Config(_) => panic!("Expected Error"),
        }
    }
}
