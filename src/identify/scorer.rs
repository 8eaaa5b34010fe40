//! Auto-match decision for catalog candidates.
//!
//! Precision over recall: a candidate is only accepted without asking when
//! one of three string rules holds. Anything else goes to the operator.

use crate::model::Candidate;
use crate::normalize::normalize_filename;

/// Which rule accepted a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Title and artist both appear in the filename
    NamesInFilename,
    /// Embedded tags already describe this candidate
    OriginalMetadata,
    /// Top result and the cleaned filename line up with "artist title"
    TopResult,
}

/// An accepted candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoMatch<'a> {
    /// Position in the catalog ranking
    pub index: usize,
    pub candidate: &'a Candidate,
    pub rule: MatchRule,
}

/// Scan candidates top-down and return the first one any rule accepts.
///
/// `original_label` must be `None` when the file's label is the
/// "unknown" placeholder.
pub fn find_auto_match<'a>(
    filename: &str,
    original_label: Option<&str>,
    candidates: &'a [Candidate],
) -> Option<AutoMatch<'a>> {
    let filename_lower = filename.to_lowercase();
    let cleaned = normalize_filename(filename)
        .to_lowercase()
        .replace(" - ", " ");

    candidates.iter().enumerate().find_map(|(index, candidate)| {
        let rule = if names_in_filename(&filename_lower, candidate) {
            MatchRule::NamesInFilename
        } else if label_matches(original_label, candidate) {
            MatchRule::OriginalMetadata
        } else if index == 0 && top_result_matches(&cleaned, candidate) {
            MatchRule::TopResult
        } else {
            return None;
        };

        tracing::debug!(
            "Auto-match '{}' by {} ({:?}, rank {})",
            candidate.title,
            candidate.artist,
            rule,
            index + 1
        );
        Some(AutoMatch {
            index,
            candidate,
            rule,
        })
    })
}

fn names_in_filename(filename_lower: &str, candidate: &Candidate) -> bool {
    let title = candidate.title.trim().to_lowercase();
    let artist = candidate.artist.trim().to_lowercase();
    !title.is_empty()
        && !artist.is_empty()
        && filename_lower.contains(&title)
        && filename_lower.contains(&artist)
}

fn label_matches(original_label: Option<&str>, candidate: &Candidate) -> bool {
    original_label.is_some_and(|label| label.to_lowercase() == candidate.display_label().to_lowercase())
}

fn top_result_matches(cleaned: &str, candidate: &Candidate) -> bool {
    if cleaned.is_empty() {
        return false;
    }
    let expected = format!("{} {}", candidate.artist, candidate.title).to_lowercase();
    cleaned == expected || cleaned.starts_with(&expected) || expected.starts_with(cleaned)
}
