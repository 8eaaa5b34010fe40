//! Tune Sorter - identify audio files against a music catalog, then file
//! them into a library and rewrite their tags.
//!
//! Filenames are cleaned into search terms, matched against Spotify or
//! MusicBrainz, and confirmed automatically when unambiguous or by the
//! operator otherwise.

pub mod batch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod identify;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod organizer;
pub mod scanner;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so prompts and the summary stay readable on stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("tune_sorter=info".parse()?))
        .init();

    cli::run(&args)
}
