//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to 1 req/sec.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::dto;
use super::rate_limiter::RateLimiter;
use crate::catalog::CatalogError;

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

/// User agent string - MusicBrainz requires this
pub(crate) const USER_AGENT: &str = concat!(
    "TuneSorter/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/tune-sorter)"
);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

impl MusicBrainzClient {
    /// Create a new client
    pub fn new() -> Result<Self, CatalogError> {
        Self::build(
            "https://musicbrainz.org/ws/2",
            RateLimiter::musicbrainz_default(),
        )
    }

    /// Create a client for testing with custom base URL and no request spacing
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::build(base_url, RateLimiter::new(Duration::ZERO)).expect("Failed to build HTTP client")
    }

    fn build(base_url: impl Into<String>, rate_limiter: RateLimiter) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            rate_limiter,
        })
    }

    /// Free-text recording search, in MusicBrainz relevance order.
    pub async fn search_recordings(
        &self,
        terms: &str,
        limit: usize,
    ) -> Result<Vec<dto::Recording>, CatalogError> {
        let url = format!(
            "{}/recording?query={}&limit={}&fmt=json",
            self.base_url,
            urlencoding::encode(terms),
            limit
        );

        let response: Option<dto::RecordingSearchResponse> = self.get_json(&url).await?;
        Ok(response.map(|r| r.recordings).unwrap_or_default())
    }

    /// Look up a recording by MusicBrainz ID. `None` when it does not exist.
    pub async fn lookup_recording(
        &self,
        recording_id: &str,
    ) -> Result<Option<dto::Recording>, CatalogError> {
        let url = format!(
            "{}/recording/{}?fmt=json&inc=artists+releases+release-groups+media+tags",
            self.base_url, recording_id
        );
        self.get_json(&url).await
    }

    /// Send a rate-limited GET and parse the response
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, CatalogError> {
        self.rate_limiter.acquire().await;

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

        // MusicBrainz answers 503 when the rate limit is exceeded
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(CatalogError::ApiError(error.error));
            }
            return Err(CatalogError::Network(format!(
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
}
