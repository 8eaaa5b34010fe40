//! Per-file identification: normalize, search, score, ask.
//!
//! ```text
//! Start -> Searched -> AutoMatched ---------> Resolved(outcome)
//!                  \-> NeedsDisambiguation -/
//! ```
//!
//! Every call ends in exactly one [`ResolutionOutcome`], unless the run is
//! cancelled while the file waits for the operator. Catalog failures are
//! logged and treated as "no results".

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use super::prompt::FileContext;
use super::resolver::{Decision, DisambiguationResolver};
use super::scorer::find_auto_match;
use crate::catalog::{CatalogClient, SEARCH_LIMIT};
use crate::model::{Candidate, OriginalMetadata, ResolutionOutcome, TrackInfo};
use crate::normalize::build_query;

pub struct TrackResolutionPipeline {
    catalog: Arc<dyn CatalogClient>,
    resolver: DisambiguationResolver,
}

impl TrackResolutionPipeline {
    pub fn new(catalog: Arc<dyn CatalogClient>, resolver: DisambiguationResolver) -> Self {
        Self { catalog, resolver }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogClient> {
        &self.catalog
    }

    /// Shared with the resolver; set it to stop prompting for new files.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.resolver.cancel_flag()
    }

    /// Identify one file.
    ///
    /// `position` is the 1-based (index, total) shown to the operator.
    /// `None` means the run was cancelled before the operator saw the file.
    pub async fn resolve(
        &self,
        path: &Path,
        original: &OriginalMetadata,
        position: Option<(usize, usize)>,
    ) -> Option<ResolutionOutcome> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let query = build_query(&filename);
        if query.is_empty() {
            tracing::warn!("Nothing searchable left in '{}'", filename);
            return Some(ResolutionOutcome::NotFound);
        }

        let candidates = match self.catalog.search(&query, SEARCH_LIMIT).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(
                    "{} search for '{}' failed: {}",
                    self.catalog.name(),
                    query.terms,
                    e
                );
                Vec::new()
            }
        };

        if candidates.is_empty() {
            tracing::info!("No matches found for {}", filename);
            return Some(ResolutionOutcome::NotFound);
        }

        let original_label = original.label();
        let scoring_label = (!original.is_unknown()).then_some(original_label.as_str());

        if let Some(auto) = find_auto_match(&filename, scoring_label, &candidates) {
            tracing::info!(
                "Auto-selecting '{}' by {}",
                auto.candidate.title,
                auto.candidate.artist
            );
            return Some(self.matched(auto.candidate.clone()).await);
        }

        let context = FileContext {
            position,
            original_label,
            display_name: filename,
            duration: original.duration_display(),
        };

        let outcome = match self
            .resolver
            .resolve(&context, &candidates, self.catalog.as_ref())
            .await
        {
            Decision::Chosen(candidate) => self.matched(candidate).await,
            Decision::TransferOnly => ResolutionOutcome::TransferOnly,
            Decision::Skip => ResolutionOutcome::Skipped,
            Decision::Cancelled => {
                tracing::debug!("Cancelled before prompting for {}", context.display_name);
                return None;
            }
        };
        Some(outcome)
    }

    async fn matched(&self, candidate: Candidate) -> ResolutionOutcome {
        let completed = self.catalog.complete(candidate).await;
        ResolutionOutcome::Matched(TrackInfo::from(completed))
    }
}
