//! CLI logic for the fretwork tool.
//!
//! This module wires configuration, credentials and the challenge list to a
//! [`SongAnnotator`] and runs the selected command. The challenge list itself
//! can be generated with the same suggestion service.

pub mod error_adapter;

mod args;
mod challenges;
mod config;
mod credentials;
mod error;
mod server;

pub use args::{Args, Command};
pub use challenges::ChallengeDeck;
pub use config::ConfigError;
pub use error::CliError;
pub use server::{Reply, SongServer};

use std::{fs, io::Write as _};

use log::info;

use fretwork::{SongAnnotator, gemini::GeminiClient};

/// Run the fretwork CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CliError` for:
/// - Configuration loading or validation errors
/// - File I/O errors
/// - A failed challenge list request
/// - A server address that cannot be bound
pub fn run(args: &Args) -> Result<(), CliError> {
    let app_config = config::load_config(args.config.as_ref())?;
    app_config.validate()?;

    let api_key = credentials::load_api_key(args.api_key_file.as_ref());
    let service = GeminiClient::new(app_config.suggestion(), api_key);

    match &args.command {
        Command::Annotate {
            input,
            output,
            challenge,
            page,
        } => {
            let deck = ChallengeDeck::load(&args.challenges);
            let challenge = challenge.as_deref().unwrap_or_else(|| deck.pick());
            info!(input_path = input, challenge; "Annotating song");

            let song = fs::read_to_string(input)?;
            let annotator = SongAnnotator::new(app_config, Box::new(service));
            let annotated = if *page {
                annotator.annotate_page(&song, challenge)
            } else {
                annotator.annotate(&song, challenge)
            };

            match output {
                Some(output) => {
                    fs::write(output, annotated)?;
                    info!(output_file = output; "Annotated song written");
                }
                None => std::io::stdout().write_all(annotated.as_bytes())?,
            }
            Ok(())
        }
        Command::GenerateChallenges { output, count } => {
            let output = output.as_deref().unwrap_or(&args.challenges);
            info!(output_file = output, count; "Generating challenges");

            let deck = ChallengeDeck::generate(&service, *count)?;
            deck.save(output)?;
            Ok(())
        }
        Command::Serve { root, host, port } => {
            let deck = ChallengeDeck::load(&args.challenges);
            let annotator = SongAnnotator::new(app_config, Box::new(service));
            let server = SongServer::new(root, annotator, deck);
            server.serve(&format!("{host}:{port}"))
        }
    }
}
