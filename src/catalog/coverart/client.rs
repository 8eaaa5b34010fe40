//! Cover Art Archive HTTP client
//!
//! Fetches album artwork for MusicBrainz releases.
//! No API key required.
//!
//! API: https://coverartarchive.org

use std::time::Duration;

use crate::catalog::CatalogError;

/// Desired cover art size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverSize {
    /// 250px thumbnail
    Small,
    /// 500px thumbnail (default)
    #[default]
    Medium,
    /// 1200px thumbnail
    Large,
    /// Original full-size image
    Original,
}

impl CoverSize {
    fn suffix(self) -> &'static str {
        match self {
            CoverSize::Small => "-250",
            CoverSize::Medium => "-500",
            CoverSize::Large => "-1200",
            CoverSize::Original => "",
        }
    }
}

/// Cover Art Archive client
pub struct CoverArtClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CoverArtClient {
    /// Create a new client
    pub fn new() -> Result<Self, CatalogError> {
        Self::build("https://coverartarchive.org")
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::build(base_url).expect("Failed to build HTTP client")
    }

    fn build(base_url: impl Into<String>) -> Result<Self, CatalogError> {
        // The archive redirects to the image host
        let http_client = reqwest::Client::builder()
            .user_agent(crate::catalog::musicbrainz::USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    /// Front cover of a release. `None` when the release has no artwork.
    pub async fn get_front_cover(
        &self,
        release_id: &str,
        size: CoverSize,
    ) -> Result<Option<Vec<u8>>, CatalogError> {
        let url = format!(
            "{}/release/{}/front{}",
            self.base_url,
            release_id,
            size.suffix()
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            return Err(CatalogError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Some(data.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_creation() {
        let client = CoverArtClient::new().unwrap();
        assert_eq!(client.base_url, "https://coverartarchive.org");
    }

    #[test]
    fn test_cover_size_default() {
        assert_eq!(CoverSize::default(), CoverSize::Medium);
        assert_eq!(CoverSize::default().suffix(), "-500");
        assert_eq!(CoverSize::Original.suffix(), "");
    }

    #[tokio::test]
    async fn test_front_cover() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/release/rel-1/front-500"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(vec![0xFF, 0xD8, 0xFF]),
            )
            .mount(&server)
            .await;

        let client = CoverArtClient::with_base_url(server.uri());
        let data = client
            .get_front_cover("rel-1", CoverSize::Medium)
            .await
            .unwrap();
        assert_eq!(data, Some(vec![0xFF, 0xD8, 0xFF]));
    }

    #[tokio::test]
    async fn test_missing_cover() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/release/rel-2/front-500"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = CoverArtClient::with_base_url(server.uri());
        let data = client
            .get_front_cover("rel-2", CoverSize::Medium)
            .await
            .unwrap();
        assert!(data.is_none());
    }
}
