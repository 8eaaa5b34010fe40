//! Operator disambiguation when no candidate is an auto-match.
//!
//! Shows the ranked candidates plus escape options and loops until the
//! operator reaches a decision. Sessions are serialized process-wide: a
//! worker holds the gate from the first menu to the final answer, so
//! prompts from concurrent workers never interleave. Once the run is
//! cancelled, files still waiting for the gate are dropped unprompted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use super::prompt::{FileContext, InputRequest, MenuRequest, Prompter};
use crate::catalog::{CUSTOM_SEARCH_LIMIT, CatalogClient};
use crate::model::{Candidate, SearchQuery};

pub const CUSTOM_SEARCH: &str = "Custom search...";
pub const ENTER_ID: &str = "Enter track ID/URL...";
pub const TRANSFER_ONLY: &str = "Transfer only (no retag)";
pub const SKIP: &str = "Skip";
pub const TRY_ANOTHER: &str = "Try another search";

const SELECT_MESSAGE: &str = "Select the correct match:";
const ID_MESSAGE: &str =
    "Enter track URL or ID (e.g. https://open.spotify.com/track/1fRHO3Bi9Pze9cCbk0qzTf):";
const QUERY_MESSAGE: &str = "Enter search query (e.g. artist song):";

/// The operator's answer for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Chosen(Candidate),
    TransferOnly,
    Skip,
    /// The run was cancelled before this file reached the operator
    Cancelled,
}

/// What a menu line stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Candidate(usize),
    CustomSearch,
    EnterId,
    TryAnother,
    TransferOnly,
    Skip,
}

impl Entry {
    fn label(self, candidates: &[Candidate]) -> String {
        match self {
            Entry::Candidate(i) => candidates[i].display_label(),
            Entry::CustomSearch => CUSTOM_SEARCH.to_string(),
            Entry::EnterId => ENTER_ID.to_string(),
            Entry::TryAnother => TRY_ANOTHER.to_string(),
            Entry::TransferOnly => TRANSFER_ONLY.to_string(),
            Entry::Skip => SKIP.to_string(),
        }
    }
}

/// Presents candidates to an operator through a [`Prompter`].
pub struct DisambiguationResolver {
    prompter: Arc<dyn Prompter>,
    gate: Mutex<()>,
    cancelled: Arc<AtomicBool>,
}

impl DisambiguationResolver {
    pub fn new(prompter: Arc<dyn Prompter>) -> Self {
        Self {
            prompter,
            gate: Mutex::new(()),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops new sessions from opening.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run one disambiguation session.
    ///
    /// No answer at any menu means [`Decision::Skip`]. A cancelled run
    /// yields [`Decision::Cancelled`] before or right after waiting for
    /// the gate, without prompting.
    pub async fn resolve(
        &self,
        context: &FileContext,
        candidates: &[Candidate],
        catalog: &dyn CatalogClient,
    ) -> Decision {
        if self.is_cancelled() {
            return Decision::Cancelled;
        }
        let _session = self.gate.lock().await;
        if self.is_cancelled() {
            return Decision::Cancelled;
        }

        let mut entries: Vec<Entry> = (0..candidates.len()).map(Entry::Candidate).collect();
        entries.extend([
            Entry::CustomSearch,
            Entry::EnterId,
            Entry::TransferOnly,
            Entry::Skip,
        ]);

        loop {
            match self.choose(context, &entries, candidates).await {
                Entry::Candidate(i) => return Decision::Chosen(candidates[i].clone()),
                Entry::TransferOnly => return Decision::TransferOnly,
                Entry::CustomSearch => return self.custom_search(context, catalog).await,
                Entry::EnterId => {
                    if let Some(decision) = self.enter_id(context, catalog).await {
                        return decision;
                    }
                }
                Entry::Skip | Entry::TryAnother => return Decision::Skip,
            }
        }
    }

    /// Show a menu; no answer or an out-of-range answer reads as Skip.
    async fn choose(
        &self,
        context: &FileContext,
        entries: &[Entry],
        candidates: &[Candidate],
    ) -> Entry {
        let request = MenuRequest {
            context: context.clone(),
            message: SELECT_MESSAGE.to_string(),
            options: entries.iter().map(|e| e.label(candidates)).collect(),
        };

        self.prompter
            .select(&request)
            .await
            .and_then(|i| entries.get(i).copied())
            .unwrap_or(Entry::Skip)
    }

    /// Ask for an id/URL and look it up.
    ///
    /// `None` means "show the main menu again".
    async fn enter_id(&self, context: &FileContext, catalog: &dyn CatalogClient) -> Option<Decision> {
        let request = InputRequest {
            context: context.clone(),
            message: ID_MESSAGE.to_string(),
        };

        let Some(raw) = self.prompter.input(&request).await else {
            return Some(Decision::Skip);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            self.prompter
                .notify("No track ID entered. Returning to the match list...");
            return None;
        }

        match catalog.fetch_by_id(raw).await {
            Ok(Some(candidate)) => Some(Decision::Chosen(candidate)),
            Ok(None) => {
                self.prompter
                    .notify(&format!("No track found for '{raw}'. Returning to the match list..."));
                None
            }
            Err(e) => {
                tracing::warn!("{} lookup of '{}' failed: {}", catalog.name(), raw, e);
                self.prompter.notify(&format!(
                    "Invalid track URL or ID ({e}). Returning to the match list..."
                ));
                None
            }
        }
    }

    /// Free-text search loop with the reduced menu.
    async fn custom_search(&self, context: &FileContext, catalog: &dyn CatalogClient) -> Decision {
        loop {
            let request = InputRequest {
                context: context.clone(),
                message: QUERY_MESSAGE.to_string(),
            };
            let Some(query) = self.prompter.input(&request).await else {
                return Decision::Skip;
            };
            let query = SearchQuery::new(query.trim());
            if query.is_empty() {
                return Decision::Skip;
            }

            let results = match catalog.search(&query, CUSTOM_SEARCH_LIMIT).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!("{} search for '{}' failed: {}", catalog.name(), query.terms, e);
                    Vec::new()
                }
            };
            if results.is_empty() {
                self.prompter
                    .notify(&format!("No results for '{}'.", query.terms));
                return Decision::Skip;
            }

            let mut entries: Vec<Entry> = (0..results.len()).map(Entry::Candidate).collect();
            entries.extend([Entry::TryAnother, Entry::TransferOnly, Entry::Skip]);

            match self.choose(context, &entries, &results).await {
                Entry::Candidate(i) => return Decision::Chosen(results[i].clone()),
                Entry::TryAnother => continue,
                Entry::TransferOnly => return Decision::TransferOnly,
                Entry::CustomSearch | Entry::EnterId | Entry::Skip => return Decision::Skip,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::catalog::traits::mocks::{MockCall, MockCatalog};
    use crate::catalog::CatalogError;
    use crate::identify::prompt::{PromptRecord, ScriptedAnswer, ScriptedPrompter};
    use crate::test_utils::candidate;

    fn context() -> FileContext {
        FileContext {
            position: Some((1, 2)),
            original_label: "Unknown - x (Unknown Album)".into(),
            display_name: "x.mp3".into(),
            duration: None,
        }
    }

    fn candidates() -> Vec<Candidate> {
        vec![
            candidate("a", "Toto", "Africa", "Toto IV"),
            candidate("b", "Weezer", "Africa", "Teal"),
        ]
    }

    fn resolver(answers: Vec<ScriptedAnswer>) -> (DisambiguationResolver, Arc<ScriptedPrompter>) {
        let prompter = Arc::new(ScriptedPrompter::new(answers));
        (DisambiguationResolver::new(prompter.clone()), prompter)
    }

    #[tokio::test]
    async fn test_menu_layout() {
        let (resolver, prompter) = resolver(vec![ScriptedAnswer::Choose(1)]);
        let decision = resolver
            .resolve(&context(), &candidates(), &MockCatalog::empty())
            .await;

        assert_eq!(decision, Decision::Chosen(candidates()[1].clone()));
        let menus = prompter.menus();
        assert_eq!(menus.len(), 1);
        assert_eq!(
            menus[0].options,
            vec![
                "Toto - Africa (Toto IV)",
                "Weezer - Africa (Teal)",
                CUSTOM_SEARCH,
                ENTER_ID,
                TRANSFER_ONLY,
                SKIP,
            ]
        );
        assert_eq!(menus[0].context, context());
    }

    #[tokio::test]
    async fn test_transfer_and_skip() {
        let (r, _) = resolver(vec![ScriptedAnswer::ChooseLabel(TRANSFER_ONLY.into())]);
        assert_eq!(
            r.resolve(&context(), &candidates(), &MockCatalog::empty()).await,
            Decision::TransferOnly
        );

        let (r, _) = resolver(vec![ScriptedAnswer::ChooseLabel(SKIP.into())]);
        assert_eq!(
            r.resolve(&context(), &candidates(), &MockCatalog::empty()).await,
            Decision::Skip
        );
    }

    #[tokio::test]
    async fn test_cancelled_resolver_never_prompts() {
        let (r, prompter) = resolver(vec![ScriptedAnswer::Choose(0)]);
        r.cancel_flag().store(true, Ordering::SeqCst);

        assert_eq!(
            r.resolve(&context(), &candidates(), &MockCatalog::empty()).await,
            Decision::Cancelled
        );
        assert!(prompter.transcript().is_empty());
        assert_eq!(prompter.remaining(), 1);
    }

    #[tokio::test]
    async fn test_no_response_skips() {
        let (r, _) = resolver(vec![]);
        assert_eq!(
            r.resolve(&context(), &candidates(), &MockCatalog::empty()).await,
            Decision::Skip
        );
    }

    #[tokio::test]
    async fn test_enter_id_success() {
        let found = candidate("xyz", "Fleetwood Mac", "Peacekeeper", "Say You Will");
        let catalog = MockCatalog::empty().with_track(found.clone());
        let (r, _) = resolver(vec![
            ScriptedAnswer::ChooseLabel(ENTER_ID.into()),
            ScriptedAnswer::Text(" xyz ".into()),
        ]);

        let decision = r.resolve(&context(), &candidates(), &catalog).await;
        assert_eq!(decision, Decision::Chosen(found));
        assert_eq!(catalog.calls(), vec![MockCall::FetchById("xyz".into())]);
    }

    #[tokio::test]
    async fn test_enter_id_miss_reshows_same_menu() {
        let catalog = MockCatalog::empty();
        let (r, prompter) = resolver(vec![
            ScriptedAnswer::ChooseLabel(ENTER_ID.into()),
            ScriptedAnswer::Text("nope".into()),
            ScriptedAnswer::Choose(0),
        ]);

        let decision = r.resolve(&context(), &candidates(), &catalog).await;
        assert_eq!(decision, Decision::Chosen(candidates()[0].clone()));

        let menus = prompter.menus();
        assert_eq!(menus.len(), 2);
        assert_eq!(menus[0], menus[1]);
        assert!(prompter
            .transcript()
            .iter()
            .any(|r| matches!(r, PromptRecord::Notice(n) if n.contains("nope"))));
    }

    #[tokio::test]
    async fn test_enter_id_lookup_error_reshows_menu() {
        let catalog = MockCatalog::failing(CatalogError::InvalidId("bad".into()));
        let (r, prompter) = resolver(vec![
            ScriptedAnswer::ChooseLabel(ENTER_ID.into()),
            ScriptedAnswer::Text("bad".into()),
            ScriptedAnswer::ChooseLabel(TRANSFER_ONLY.into()),
        ]);

        let decision = r.resolve(&context(), &candidates(), &catalog).await;
        assert_eq!(decision, Decision::TransferOnly);
        assert_eq!(prompter.menus().len(), 2);
    }

    #[tokio::test]
    async fn test_enter_id_empty_input_reshows_menu() {
        let (r, prompter) = resolver(vec![
            ScriptedAnswer::ChooseLabel(ENTER_ID.into()),
            ScriptedAnswer::Text("   ".into()),
            ScriptedAnswer::ChooseLabel(SKIP.into()),
        ]);

        let decision = r
            .resolve(&context(), &candidates(), &MockCatalog::empty())
            .await;
        assert_eq!(decision, Decision::Skip);
        assert_eq!(prompter.menus().len(), 2);
    }

    #[tokio::test]
    async fn test_custom_search_reduced_menu() {
        let hit = candidate("c", "Toto", "Africa (Live)", "Live in Amsterdam");
        let catalog = MockCatalog::empty().with_query("toto africa live", vec![hit.clone()]);
        let (r, prompter) = resolver(vec![
            ScriptedAnswer::ChooseLabel(CUSTOM_SEARCH.into()),
            ScriptedAnswer::Text("toto africa live".into()),
            ScriptedAnswer::Choose(0),
        ]);

        let decision = r.resolve(&context(), &candidates(), &catalog).await;
        assert_eq!(decision, Decision::Chosen(hit));

        let menus = prompter.menus();
        assert_eq!(
            menus[1].options,
            vec![
                "Toto - Africa (Live) (Live in Amsterdam)",
                TRY_ANOTHER,
                TRANSFER_ONLY,
                SKIP,
            ]
        );
        assert!(!menus[1].options.iter().any(|o| o == ENTER_ID));
        assert_eq!(
            catalog.calls(),
            vec![MockCall::Search {
                terms: "toto africa live".into(),
                limit: CUSTOM_SEARCH_LIMIT
            }]
        );
    }

    #[tokio::test]
    async fn test_try_another_search_loops() {
        let first = candidate("1", "A", "One", "X");
        let second = candidate("2", "B", "Two", "Y");
        let catalog = MockCatalog::empty()
            .with_query("first", vec![first])
            .with_query("second", vec![second.clone()]);
        let (r, _) = resolver(vec![
            ScriptedAnswer::ChooseLabel(CUSTOM_SEARCH.into()),
            ScriptedAnswer::Text("first".into()),
            ScriptedAnswer::ChooseLabel(TRY_ANOTHER.into()),
            ScriptedAnswer::Text("second".into()),
            ScriptedAnswer::Choose(0),
        ]);

        assert_eq!(
            r.resolve(&context(), &candidates(), &catalog).await,
            Decision::Chosen(second)
        );
    }

    #[tokio::test]
    async fn test_custom_search_empty_query_or_results_skip() {
        let (r, _) = resolver(vec![
            ScriptedAnswer::ChooseLabel(CUSTOM_SEARCH.into()),
            ScriptedAnswer::Text("  ".into()),
        ]);
        assert_eq!(
            r.resolve(&context(), &candidates(), &MockCatalog::empty()).await,
            Decision::Skip
        );

        let (r, prompter) = resolver(vec![
            ScriptedAnswer::ChooseLabel(CUSTOM_SEARCH.into()),
            ScriptedAnswer::Text("nothing here".into()),
        ]);
        assert_eq!(
            r.resolve(&context(), &candidates(), &MockCatalog::empty()).await,
            Decision::Skip
        );
        assert_eq!(prompter.menus().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_search_transfer_only() {
        let catalog = MockCatalog::with_results(vec![candidate("1", "A", "B", "C")]);
        let (r, _) = resolver(vec![
            ScriptedAnswer::ChooseLabel(CUSTOM_SEARCH.into()),
            ScriptedAnswer::Text("a b".into()),
            ScriptedAnswer::ChooseLabel(TRANSFER_ONLY.into()),
        ]);
        assert_eq!(
            r.resolve(&context(), &candidates(), &catalog).await,
            Decision::TransferOnly
        );
    }

    /// Prompter that tracks how many menus are open at once.
    struct SlowPrompter {
        open: AtomicUsize,
        max_open: AtomicUsize,
    }

    #[async_trait]
    impl Prompter for SlowPrompter {
        async fn select(&self, _request: &MenuRequest) -> Option<usize> {
            let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_open.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.open.fetch_sub(1, Ordering::SeqCst);
            None
        }

        async fn input(&self, _request: &InputRequest) -> Option<String> {
            None
        }

        fn notify(&self, _message: &str) {}
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sessions_are_serialized() {
        let prompter = Arc::new(SlowPrompter {
            open: AtomicUsize::new(0),
            max_open: AtomicUsize::new(0),
        });
        let resolver = Arc::new(DisambiguationResolver::new(prompter.clone()));
        let catalog = Arc::new(MockCatalog::empty());

        let mut handles = Vec::new();
        for _ in 0..4 {
            let resolver = resolver.clone();
            let catalog = catalog.clone();
            handles.push(tokio::spawn(async move {
                resolver
                    .resolve(&context(), &candidates(), catalog.as_ref())
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Decision::Skip);
        }

        assert_eq!(prompter.max_open.load(Ordering::SeqCst), 1);
    }
}
