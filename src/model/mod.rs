//! Core data models for track identification.
//!
//! Defines the values that flow through one batch run: the [`SearchQuery`]
//! derived from a filename, the [`Candidate`]s a catalog returns, the
//! resolved [`TrackInfo`], and the per-file [`ProcessingResult`].
//!
//! # Lifecycle
//!
//! - `Candidate` and `TrackInfo` live for a single file; nothing is cached
//!   across files.
//! - `ProcessingResult` lives for the batch and is immutable once appended
//!   to the [`BatchSummary`].

use std::path::PathBuf;
use std::time::Duration;

/// Search terms derived from a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Cleaned free-text terms
    pub terms: String,
}

impl SearchQuery {
    pub fn new(terms: impl Into<String>) -> Self {
        Self {
            terms: terms.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.trim().is_empty()
    }
}

/// A possible identification returned by a catalog search.
///
/// Catalog order is preserved by every caller: the first result is
/// favored on ties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    /// Catalog-specific track identifier
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Album artist as reported by the catalog
    pub album_artist: Option<String>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    pub track_number: Option<u32>,
    pub bpm: Option<u32>,
    /// Musical key (e.g. "Am")
    pub key: Option<String>,
    /// Reference used to fetch cover art (album/release id)
    pub album_ref: Option<String>,
    /// Reference used to complete details such as genre (primary artist id)
    pub artist_ref: Option<String>,
}

impl Candidate {
    /// Label shown to the operator: `"Artist - Title (Album)"`.
    pub fn display_label(&self) -> String {
        format!("{} - {} ({})", self.artist, self.title, self.album)
    }
}

/// Canonical metadata for a resolved file. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_artist: Option<String>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    pub track_number: Option<u32>,
    pub bpm: Option<u32>,
    pub key: Option<String>,
    pub album_ref: Option<String>,
}

impl TrackInfo {
    pub fn display_label(&self) -> String {
        format!("{} - {} ({})", self.artist, self.title, self.album)
    }
}

impl From<Candidate> for TrackInfo {
    fn from(c: Candidate) -> Self {
        Self {
            id: c.id,
            title: c.title,
            artist: c.artist,
            album: c.album,
            album_artist: c.album_artist,
            year: c.year,
            genre: c.genre,
            track_number: c.track_number,
            bpm: c.bpm,
            key: c.key,
            album_ref: c.album_ref,
        }
    }
}

/// Result of running one file through identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Identified; relocate and retag
    Matched(TrackInfo),
    /// Operator chose to relocate without retagging
    TransferOnly,
    /// Operator skipped the file (or gave no answer)
    Skipped,
    /// Catalog returned nothing usable
    NotFound,
}

/// Tags already embedded in a source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginalMetadata {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    /// File name without extension
    pub stem: String,
    pub duration: Option<Duration>,
}

impl OriginalMetadata {
    /// Metadata for a file whose tags could not be read.
    pub fn unknown(stem: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            ..Default::default()
        }
    }

    /// True when no artist, title or album could be read.
    pub fn is_unknown(&self) -> bool {
        self.artist.is_none() && self.title.is_none() && self.album.is_none()
    }

    /// `"Artist - Title (Album)"`, or `"Unknown - {stem} (Unknown Album)"`
    /// when nothing was read. Missing parts fall back individually.
    pub fn label(&self) -> String {
        format!(
            "{} - {} ({})",
            self.artist.as_deref().unwrap_or("Unknown"),
            self.title.as_deref().unwrap_or(&self.stem),
            self.album.as_deref().unwrap_or("Unknown Album"),
        )
    }

    /// Duration as `m:ss`.
    pub fn duration_display(&self) -> Option<String> {
        self.duration.map(|d| {
            let secs = d.as_secs();
            format!("{}:{:02}", secs / 60, secs % 60)
        })
    }
}

/// What happened to a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// Relocated (and retagged when matched)
    Completed,
    /// Dry run: destination computed, nothing touched
    Planned,
    /// No destination (skipped / not found)
    Untouched,
    /// Copy/move failed, source intact
    RelocationFailed(String),
    /// Relocated, but tags were not fully updated
    TagWriteFailed(String),
}

/// Per-file record produced by the batch runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    pub source_path: PathBuf,
    pub original_label: String,
    pub outcome: ResolutionOutcome,
    pub destination: Option<PathBuf>,
    pub status: ProcessingStatus,
}

impl ProcessingResult {
    /// Relocated (or planned) with a matched or transfer-only outcome.
    pub fn is_success(&self) -> bool {
        matches!(
            self.outcome,
            ResolutionOutcome::Matched(_) | ResolutionOutcome::TransferOnly
        ) && matches!(
            self.status,
            ProcessingStatus::Completed | ProcessingStatus::Planned
        )
    }

    /// Right-hand side of the summary line.
    pub fn new_label(&self) -> String {
        match (&self.outcome, &self.status) {
            (_, ProcessingStatus::RelocationFailed(msg)) => format!("Failed: {msg}"),
            (ResolutionOutcome::Matched(info), ProcessingStatus::TagWriteFailed(msg)) => {
                format!("{} (metadata not fully updated: {msg})", info.display_label())
            }
            (ResolutionOutcome::Matched(info), _) => info.display_label(),
            (ResolutionOutcome::TransferOnly, _) => "Transferred (tags unchanged)".to_string(),
            (ResolutionOutcome::Skipped, _) => "Skipped".to_string(),
            (ResolutionOutcome::NotFound, _) => "No match found".to_string(),
        }
    }
}

/// Aggregated results of one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Results in input order
    pub results: Vec<ProcessingResult>,
    /// Files never started because the run was cancelled
    pub not_processed: usize,
}

impl BatchSummary {
    pub fn successful(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.successful()
    }

    pub fn total(&self) -> usize {
        self.results.len() + self.not_processed
    }
}
