//! CLI argument definitions and dispatch.
//!
//! Values given on the command line win over the config file, which wins
//! over built-in defaults.

mod organize;

use clap::Parser;
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::batch::OrganizeOptions;
use crate::catalog::{Backend, SpotifyCredentials};
use crate::config::Config;

pub use organize::cmd_organize;

/// Identify audio files against a music catalog, then file and retag them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the audio files to organize
    pub source_dir: PathBuf,

    /// Root directory of the organized library
    pub destination_dir: PathBuf,

    /// Run identification and print planned actions without touching files
    #[arg(long)]
    pub dry_run: bool,

    /// Files processed concurrently
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Match threshold (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,

    /// Move files instead of copying them
    #[arg(long = "move")]
    pub move_files: bool,

    /// Put every file directly in the destination as "Artist - Title"
    #[arg(long)]
    pub gather: bool,

    /// Catalog to search
    #[arg(long, value_enum)]
    pub api: Option<Backend>,

    /// Spotify client ID (or set SPOTIFY_CLIENT_ID env var)
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Spotify client secret (or set SPOTIFY_CLIENT_SECRET env var)
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Never prompt; ambiguous files are skipped
    #[arg(long)]
    pub non_interactive: bool,

    /// Store the given Spotify credentials in the config file
    #[arg(long)]
    pub remember_credentials: bool,
}

impl Cli {
    /// Merge flags over config values.
    pub fn organize_options(&self, config: &Config) -> OrganizeOptions {
        OrganizeOptions {
            source_dir: self.source_dir.clone(),
            destination_dir: self.destination_dir.clone(),
            dry_run: self.dry_run,
            workers: self.workers.unwrap_or(config.organize.workers),
            threshold: self.threshold.unwrap_or(config.organize.threshold),
            move_files: self.move_files,
            gather: self.gather,
            backend: self.api.unwrap_or(config.organize.backend),
        }
    }

    /// Credentials from flags/env, falling back to the config file.
    pub fn spotify_credentials(&self, config: &Config) -> Option<SpotifyCredentials> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Some(SpotifyCredentials {
                client_id: id.clone(),
                client_secret: secret.clone(),
            }),
            _ => config.credentials.spotify(),
        }
    }
}

/// Run the CLI.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    cmd_organize(&rt, cli)
}
