//! Spotify Web API Data Transfer Objects
//!
//! These types match what the Spotify Web API returns. Only the fields we
//! read are declared; serde ignores the rest.
//! DO NOT use these types outside the spotify module - convert via the adapter.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api

use serde::{Deserialize, Serialize};

/// `POST /api/token` response (client-credentials flow)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// `GET /v1/search?type=track` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    pub tracks: Paging<Track>,
}

/// Paged result container
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub total: Option<u32>,
}

/// Full track object (`GET /v1/tracks/{id}` and search items)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    pub album: SimpleAlbum,
    pub track_number: Option<u32>,
    pub duration_ms: Option<u64>,
}

/// Artist as embedded in tracks and albums
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimpleArtist {
    pub id: Option<String>,
    pub name: String,
}

/// Album as embedded in a track
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimpleAlbum {
    pub id: Option<String>,
    pub name: String,
    /// "YYYY", "YYYY-MM" or "YYYY-MM-DD"
    pub release_date: Option<String>,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// `GET /v1/albums/{id}` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    /// Widest first
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Artwork reference
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// `GET /v1/artists/{id}` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Error body of the Web API (`{"error": {"status": 400, "message": ...}}`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub message: String,
}

/// Error body of the accounts service (`{"error": "invalid_client", ...}`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}
