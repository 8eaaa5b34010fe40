//! The catalog capability shared by all backends.
//!
//! Production code holds an `Arc<dyn CatalogClient>`; tests substitute
//! [`mocks::MockCatalog`].
//!
//! # Example
//!
//! ```ignore
//! use tune_sorter::catalog::{CatalogClient, SEARCH_LIMIT};
//!
//! async fn first_hit(catalog: &dyn CatalogClient, q: &SearchQuery) -> Option<Candidate> {
//!     catalog.search(q, SEARCH_LIMIT).await.ok()?.into_iter().next()
//! }
//! ```

use async_trait::async_trait;

use super::CatalogError;
use crate::model::{Candidate, SearchQuery};

/// Search, lookup and artwork for one catalog service.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &'static str;

    /// Ranked candidates for a query (catalog order preserved).
    async fn search(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<Candidate>, CatalogError>;

    /// Look up a track by bare id or by a URL containing the id.
    async fn fetch_by_id(&self, id_or_url: &str) -> Result<Option<Candidate>, CatalogError>;

    /// Front cover bytes for an album reference.
    async fn fetch_cover_art(&self, album_ref: &str) -> Result<Option<Vec<u8>>, CatalogError>;

    /// Fill in details a search result does not carry (e.g. genre).
    ///
    /// Best effort: failures leave the candidate as it was.
    async fn complete(&self, candidate: Candidate) -> Candidate {
        candidate
    }
}

#[async_trait]
impl CatalogClient for super::spotify::SpotifyClient {
    fn name(&self) -> &'static str {
        "Spotify"
    }

    async fn search(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<Candidate>, CatalogError> {
        self.search_tracks(&query.terms, limit).await
    }

    async fn fetch_by_id(&self, id_or_url: &str) -> Result<Option<Candidate>, CatalogError> {
        self.get_track(id_or_url).await
    }

    async fn fetch_cover_art(&self, album_ref: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        self.get_album_cover(album_ref).await
    }

    async fn complete(&self, candidate: Candidate) -> Candidate {
        self.fill_genre(candidate).await
    }
}

#[async_trait]
impl CatalogClient for super::musicbrainz::MusicBrainzCatalog {
    fn name(&self) -> &'static str {
        "MusicBrainz"
    }

    async fn search(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<Candidate>, CatalogError> {
        self.search_recordings(&query.terms, limit).await
    }

    async fn fetch_by_id(&self, id_or_url: &str) -> Result<Option<Candidate>, CatalogError> {
        self.lookup_recording(id_or_url).await
    }

    async fn fetch_cover_art(&self, album_ref: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        self.front_cover(album_ref).await
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::{MockCall, MockCatalog};
    use super::*;
    use crate::test_utils::candidate;

    #[tokio::test]
    async fn test_mock_limits_and_records() {
        let mock = MockCatalog::with_results(vec![
            candidate("1", "A", "T1", "Al"),
            candidate("2", "A", "T2", "Al"),
        ]);
        let results = mock.search(&SearchQuery::new("a t"), 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            mock.calls(),
            vec![MockCall::Search {
                terms: "a t".into(),
                limit: 1
            }]
        );
    }

    #[tokio::test]
    async fn test_mock_error_takes_precedence() {
        let mock = MockCatalog::failing(CatalogError::RateLimited);
        let err = mock.search(&SearchQuery::new("x"), 5).await.unwrap_err();
        assert_eq!(err, CatalogError::RateLimited);
    }

    #[tokio::test]
    async fn test_default_complete_is_identity() {
        struct Bare;

        #[async_trait]
        impl CatalogClient for Bare {
            fn name(&self) -> &'static str {
                "Bare"
            }
            async fn search(
                &self,
                _: &SearchQuery,
                _: usize,
            ) -> Result<Vec<Candidate>, CatalogError> {
                Ok(vec![])
            }
            async fn fetch_by_id(&self, _: &str) -> Result<Option<Candidate>, CatalogError> {
                Ok(None)
            }
            async fn fetch_cover_art(&self, _: &str) -> Result<Option<Vec<u8>>, CatalogError> {
                Ok(None)
            }
        }

        let c = candidate("1", "A", "T", "Al");
        assert_eq!(Bare.complete(c.clone()).await, c);
    }
}
