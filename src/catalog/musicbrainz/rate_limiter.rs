//! Request spacing for the MusicBrainz web service.
//!
//! MusicBrainz allows one request per second per client; going faster gets
//! every request rejected with 503.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, sleep};

/// Enforces a minimum interval between requests across all clones.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// One request per second.
    pub fn musicbrainz_default() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Wait until the next request may be sent.
    ///
    /// The lock is held while sleeping, so concurrent callers queue up.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::trace!(target: "musicbrainz", "rate limiting: waiting {:?}", wait);
                sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
    }
}
