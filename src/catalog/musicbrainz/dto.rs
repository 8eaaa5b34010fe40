//! MusicBrainz API Data Transfer Objects
//!
//! These types match what the MusicBrainz API returns.
//! DO NOT use these types outside the musicbrainz module - convert via the adapter.
//!
//! API Reference: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! Two endpoints are used:
//! - `/recording?query=` for free-text search
//! - `/recording/{mbid}` for direct lookup

use serde::{Deserialize, Serialize};

/// Recording search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordingSearchResponse {
    pub count: Option<u32>,
    pub offset: Option<u32>,
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

/// A recording, as returned by both search and lookup
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Recording {
    /// MusicBrainz recording ID
    pub id: String,
    /// Track title
    pub title: String,
    /// Search relevance (0-100), search only
    pub score: Option<u32>,
    /// Duration in milliseconds
    pub length: Option<u64>,
    /// Artist credits
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    /// Releases this recording appears on
    #[serde(default)]
    pub releases: Vec<Release>,
    /// Folksonomy tags (used as genre)
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Artist credit (can be multiple for collaborations)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistCredit {
    pub artist: Artist,
    /// How this artist is credited (may differ from official name)
    pub name: Option<String>,
    /// Join phrase (e.g., " & ", " feat. ")
    pub joinphrase: Option<String>,
}

/// Artist info
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub sort_name: Option<String>,
}

/// Release (album/single/EP)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Release {
    pub id: String,
    pub title: String,
    /// Official, Bootleg, Promotion...
    pub status: Option<String>,
    /// YYYY, YYYY-MM, or YYYY-MM-DD
    pub date: Option<String>,
    pub artist_credit: Option<Vec<ArtistCredit>>,
    pub release_group: Option<ReleaseGroup>,
    /// Media containing this recording
    #[serde(default)]
    pub media: Vec<Medium>,
}

/// Release group (groups the same album across editions)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseGroup {
    pub id: String,
    pub title: Option<String>,
    /// Album, Single, EP...
    pub primary_type: Option<String>,
    pub first_release_date: Option<String>,
}

/// Medium (disc) within a release
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Medium {
    pub position: Option<u32>,
    pub format: Option<String>,
    pub track_count: Option<u32>,
    /// Zero-based offset of the first listed track
    pub track_offset: Option<u32>,
    /// Search responses call this `track`, lookups `tracks`
    #[serde(default, alias = "track")]
    pub tracks: Vec<Track>,
}

/// Track on a medium
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: Option<String>,
    /// Track number as printed (may be "A1" on vinyl)
    pub number: Option<String>,
    pub position: Option<u32>,
    pub title: Option<String>,
    pub length: Option<u64>,
}

/// Folksonomy tag
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub count: i32,
}

/// Error response from MusicBrainz API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: String,
    pub help: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// ============================================================================
