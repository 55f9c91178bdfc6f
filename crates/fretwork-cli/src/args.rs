//! Command-line argument definitions for the fretwork CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects between annotating a single song file,
//! generating the challenge list and serving a songbook directory; the
//! remaining options are shared.

use clap::{Parser, Subcommand};

use fretwork::challenge::DEFAULT_CHALLENGE_COUNT;

/// Command-line arguments for the fretwork tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Challenge list, one challenge per line
    #[arg(long, global = true, default_value = "challenges.txt")]
    pub challenges: String,

    /// File holding the suggestion service API key
    #[arg(long, global = true)]
    pub api_key_file: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Annotate one song file with voicing diagrams
    Annotate {
        /// Path to the input song file
        input: String,

        /// Path to the output file, standard output if omitted
        #[arg(short, long)]
        output: Option<String>,

        /// Challenge to apply, a random one from the challenge list if omitted
        #[arg(long)]
        challenge: Option<String>,

        /// Also add the challenge banner
        #[arg(long)]
        page: bool,
    },

    /// Ask the suggestion service for a fresh challenge list
    GenerateChallenges {
        /// Where to write the list, the `--challenges` path if omitted
        #[arg(short, long)]
        output: Option<String>,

        /// Number of challenges to ask for
        #[arg(short = 'n', long, default_value_t = DEFAULT_CHALLENGE_COUNT)]
        count: usize,
    },

    /// Serve a songbook directory, annotating song pages on the fly
    Serve {
        /// Songbook directory
        #[arg(long, default_value = ".")]
        root: String,

        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 5000)]
        port: u16,
    },
}
