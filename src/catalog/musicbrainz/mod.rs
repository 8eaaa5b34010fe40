//! MusicBrainz API integration
//!
//! Recording search and lookup against MusicBrainz, with artwork from the
//! Cover Art Archive. All MusicBrainz requests share one rate limiter.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

mod adapter;
mod client;
pub mod dto;
mod rate_limiter;

pub use client::MusicBrainzClient;
pub(crate) use client::USER_AGENT;

use super::CatalogError;
use super::coverart::{CoverArtClient, CoverSize};
use crate::model::Candidate;

/// MusicBrainz recordings plus Cover Art Archive images.
pub struct MusicBrainzCatalog {
    client: MusicBrainzClient,
    cover_art: CoverArtClient,
}

impl MusicBrainzCatalog {
    pub fn new() -> Result<Self, CatalogError> {
        Ok(Self {
            client: MusicBrainzClient::new()?,
            cover_art: CoverArtClient::new()?,
        })
    }

    #[cfg(test)]
    pub fn from_clients(client: MusicBrainzClient, cover_art: CoverArtClient) -> Self {
        Self { client, cover_art }
    }

    pub async fn search_recordings(
        &self,
        terms: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, CatalogError> {
        let terms = terms.trim();
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let recordings = self.client.search_recordings(terms, limit).await?;
        Ok(recordings.into_iter().map(adapter::to_candidate).collect())
    }

    /// Look up by MBID or `https://musicbrainz.org/recording/{mbid}` URL.
    pub async fn lookup_recording(
        &self,
        id_or_url: &str,
    ) -> Result<Option<Candidate>, CatalogError> {
        let mbid = parse_recording_id(id_or_url)
            .ok_or_else(|| CatalogError::InvalidId(id_or_url.trim().to_string()))?;

        let recording = self.client.lookup_recording(&mbid).await?;
        if let Some(r) = &recording {
            tracing::info!("Found recording by ID: '{}'", r.title);
        }
        Ok(recording.map(adapter::to_candidate))
    }

    /// Front cover (500px) of a release.
    pub async fn front_cover(&self, release_id: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        self.cover_art
            .get_front_cover(release_id, CoverSize::Medium)
            .await
    }
}

/// Extract an MBID from a bare id or a musicbrainz.org recording URL.
pub fn parse_recording_id(input: &str) -> Option<String> {
    let input = input.trim();

    let id = if input.contains("musicbrainz.org/") {
        let (_, rest) = input.split_once("/recording/")?;
        rest.split(['?', '/', '#']).next().unwrap_or_default()
    } else {
        input
    };

    is_mbid(id).then(|| id.to_ascii_lowercase())
}

/// 8-4-4-4-12 hex groups.
fn is_mbid(s: &str) -> bool {
    let groups: Vec<&str> = s.split('-').collect();
    groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()))
}
