//! Spotify Web API HTTP client
//!
//! Uses the client-credentials flow: an app token is requested from the
//! accounts service and cached until shortly before it expires.
//! See: https://developer.spotify.com/documentation/web-api/tutorials/client-credentials-flow

use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{adapter, dto};
use crate::catalog::{CatalogError, SpotifyCredentials};
use crate::model::Candidate;

const API_URL: &str = "https://api.spotify.com/v1";
const AUTH_URL: &str = "https://accounts.spotify.com/api/token";

/// Upper bound for any single request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Refresh tokens this long before Spotify says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("TuneSorter/", env!("CARGO_PKG_VERSION"));

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Spotify API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    api_url: String,
    auth_url: String,
    credentials: SpotifyCredentials,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    /// Create a client for the public Spotify endpoints.
    pub fn new(credentials: SpotifyCredentials) -> Result<Self, CatalogError> {
        Self::with_urls(credentials, API_URL, AUTH_URL)
    }

    /// Create a client for testing with custom endpoints
    #[cfg(test)]
    pub fn with_base_urls(
        credentials: SpotifyCredentials,
        api_url: impl Into<String>,
        auth_url: impl Into<String>,
    ) -> Self {
        Self::with_urls(credentials, api_url, auth_url).expect("Failed to build HTTP client")
    }

    fn with_urls(
        credentials: SpotifyCredentials,
        api_url: impl Into<String>,
        auth_url: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_url: api_url.into(),
            auth_url: auth_url.into(),
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Search tracks, preserving Spotify's ranking.
    pub async fn search_tracks(
        &self,
        terms: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, CatalogError> {
        let terms = terms.trim();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/search?q={}&type=track&limit={}",
            self.api_url,
            urlencoding::encode(terms),
            limit
        );

        let response: Option<dto::SearchResponse> = self.get_json(&url).await?;
        Ok(response
            .map(|r| {
                r.tracks
                    .items
                    .into_iter()
                    .map(adapter::to_candidate)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Look up a track by id, `spotify:track:` URI or open.spotify.com URL.
    pub async fn get_track(&self, id_or_url: &str) -> Result<Option<Candidate>, CatalogError> {
        let id = parse_track_id(id_or_url)
            .ok_or_else(|| CatalogError::InvalidId(id_or_url.trim().to_string()))?;

        let url = format!("{}/tracks/{}", self.api_url, id);
        let track: Option<dto::Track> = self.get_json(&url).await?;

        if let Some(track) = &track {
            tracing::info!(
                "Found track by ID: '{}' ({} artist credits)",
                track.name,
                track.artists.len()
            );
        }
        Ok(track.map(adapter::to_candidate))
    }

    /// Download the largest image of an album.
    pub async fn get_album_cover(&self, album_id: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        let url = format!("{}/albums/{}", self.api_url, album_id);

        let Some(album) = self.get_json::<dto::Album>(&url).await? else {
            return Ok(None);
        };
        let Some(image_url) = adapter::largest_image(&album) else {
            tracing::debug!("Album {} has no images", album.id);
            return Ok(None);
        };

        self.download_image(image_url).await
    }

    /// Fill the genre from the primary artist.
    ///
    /// Lookup failures are logged and leave the candidate unchanged.
    pub async fn fill_genre(&self, mut candidate: Candidate) -> Candidate {
        if candidate.genre.is_some() {
            return candidate;
        }
        let Some(artist_id) = candidate.artist_ref.as_deref() else {
            return candidate;
        };
        let url = format!("{}/artists/{}", self.api_url, artist_id);

        match self.get_json::<dto::Artist>(&url).await {
            Ok(Some(artist)) => candidate.genre = adapter::primary_genre(artist),
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not fetch genre for '{}': {}", candidate.artist, e),
        }
        candidate
    }

    /// Return a valid app token, requesting a new one when needed.
    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!("Requesting Spotify access token");
        let response = self
            .http_client
            .post(&self.auth_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<dto::AuthErrorResponse>().await {
                Ok(body) => body.error_description.unwrap_or(body.error),
                Err(_) => format!("HTTP {}", status),
            };
            return Err(CatalogError::Auth(message));
        }

        let token: dto::TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    /// Authenticated GET. `404` maps to `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, CatalogError> {
        let token = self.access_token().await?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Force a fresh token on the next call
            *self.token.lock().await = None;
            return Err(CatalogError::Auth("access token rejected".to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            if let Ok(body) = response.json::<dto::ApiErrorResponse>().await {
                return Err(CatalogError::ApiError(body.error.message));
            }
            return Err(CatalogError::ApiError(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// Download image bytes from the CDN (no auth).
    async fn download_image(&self, url: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CatalogError::Network(format!("HTTP {} for {}", status, url)));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        Ok(Some(data.to_vec()))
    }
}

/// Extract a track id from a bare id, a `spotify:track:` URI or an
/// `https://open.spotify.com/track/{id}?si=...` URL.
pub fn parse_track_id(input: &str) -> Option<String> {
    let input = input.trim();

    let id = if input.contains("spotify.com/") {
        let (_, rest) = input.split_once("/track/")?;
        rest.split(['?', '/', '#']).next().unwrap_or_default()
    } else if let Some(rest) = input.strip_prefix("spotify:track:") {
        rest
    } else {
        input
    };

    let id = id.trim();
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(id.to_string())
    } else {
        None
    }
}
