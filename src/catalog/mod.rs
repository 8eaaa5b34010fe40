//! External music catalogs.
//!
//! Every backend implements [`CatalogClient`] and is held as
//! `Arc<dyn CatalogClient>`; nothing above this module knows which service
//! it is talking to.
//!
//! # Architecture
//!
//! Each backend follows the same layering:
//!
//! - `dto` - types matching the service's JSON exactly
//! - `adapter` - the only place DTOs become [`Candidate`](crate::model::Candidate)s
//! - `client` - HTTP calls, status mapping, auth
//!
//! # Backends
//!
//! - [`spotify`] - Spotify Web API (client-credentials flow)
//! - [`musicbrainz`] - MusicBrainz recordings + Cover Art Archive images

pub mod coverart;
pub mod musicbrainz;
pub mod spotify;
pub mod traits;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use traits::CatalogClient;

/// Results requested for the automatic search.
pub const SEARCH_LIMIT: usize = 5;

/// Results requested for an operator-typed search.
pub const CUSTOM_SEARCH_LIMIT: usize = 20;

/// Errors from catalog lookups.
///
/// Callers degrade these to "no suggestion"; they never abort a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not found")]
    NotFound,

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid track identifier: {0}")]
    InvalidId(String),
}

/// Which catalog to query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Spotify,
    #[value(name = "musicbrainz")]
    MusicBrainz,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Spotify => write!(f, "spotify"),
            Backend::MusicBrainz => write!(f, "musicbrainz"),
        }
    }
}

/// Spotify application credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Construct the client for a backend.
pub fn build_catalog(
    backend: Backend,
    spotify: Option<SpotifyCredentials>,
) -> Result<Arc<dyn CatalogClient>, CatalogError> {
    match backend {
        Backend::Spotify => {
            let creds = spotify.ok_or_else(|| {
                CatalogError::Auth(
                    "Spotify client id and secret are required (--client-id/--client-secret \
                     or SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET)"
                        .to_string(),
                )
            })?;
            Ok(Arc::new(spotify::SpotifyClient::new(creds)?))
        }
        Backend::MusicBrainz => Ok(Arc::new(musicbrainz::MusicBrainzCatalog::new()?)),
    }
}
