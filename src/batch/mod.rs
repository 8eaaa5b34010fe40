//! Batch processing of a source directory.
//!
//! Each file goes through identification, destination planning,
//! relocation and tag writing. Files are processed by a bounded pool of
//! workers; results are reported in input order. A failure in one file
//! never stops the batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;

use crate::catalog::Backend;
use crate::error::{Error, Result};
use crate::identify::TrackResolutionPipeline;
use crate::metadata::{self, Container, writer_for};
use crate::model::{
    BatchSummary, OriginalMetadata, ProcessingResult, ProcessingStatus, ResolutionOutcome,
    TrackInfo,
};
use crate::organizer::{TransferMode, plan_destination, relocate};
use crate::scanner;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_THRESHOLD: u8 = 98;

/// Everything one organize run needs.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    /// Run the full pipeline but touch nothing on disk
    pub dry_run: bool,
    /// Files processed concurrently
    pub workers: usize,
    /// Match confidence threshold, 0-100. Validated but not consulted by
    /// the string-based scorer.
    pub threshold: u8,
    /// Delete sources after a successful transfer
    pub move_files: bool,
    /// Flat `Artist - Title` layout instead of `Artist/Album/Title`
    pub gather: bool,
    pub backend: Backend,
}

impl OrganizeOptions {
    pub fn new(source_dir: impl Into<PathBuf>, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            destination_dir: destination_dir.into(),
            dry_run: false,
            workers: DEFAULT_WORKERS,
            threshold: DEFAULT_THRESHOLD,
            move_files: false,
            gather: false,
            backend: Backend::default(),
        }
    }

    pub fn transfer_mode(&self) -> TransferMode {
        if self.move_files {
            TransferMode::Move
        } else {
            TransferMode::Copy
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::config("workers must be at least 1"));
        }
        if self.threshold > 100 {
            return Err(Error::config(format!(
                "threshold must be between 0 and 100, got {}",
                self.threshold
            )));
        }
        if !self.source_dir.is_dir() {
            return Err(Error::config(format!(
                "source directory {} does not exist",
                self.source_dir.display()
            )));
        }
        Ok(())
    }
}

/// Drives the pipeline over every file of a run.
pub struct BatchRunner {
    pipeline: Arc<TrackResolutionPipeline>,
    options: OrganizeOptions,
    cancelled: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(pipeline: TrackResolutionPipeline, options: OrganizeOptions) -> Self {
        let cancelled = pipeline.cancel_flag();
        Self {
            pipeline: Arc::new(pipeline),
            options,
            cancelled,
        }
    }

    /// Set to stop starting new files. Files already past the operator
    /// finish; files still waiting for a prompt are not processed.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn options(&self) -> &OrganizeOptions {
        &self.options
    }

    /// Discover files under the source directory and process them.
    pub async fn run(&self) -> Result<BatchSummary> {
        self.options.validate()?;

        let files = scanner::discover(&self.options.source_dir);
        if files.is_empty() {
            tracing::warn!(
                "No supported audio files found in {}",
                self.options.source_dir.display()
            );
            return Ok(BatchSummary::default());
        }

        tracing::info!(
            "Processing {} files with {} workers{}",
            files.len(),
            self.options.workers,
            if self.options.dry_run { " (dry run)" } else { "" }
        );
        tracing::debug!("Match threshold {}", self.options.threshold);

        Ok(self.run_files(files).await)
    }

    /// Process an explicit file list in order.
    pub async fn run_files(&self, files: Vec<PathBuf>) -> BatchSummary {
        let total = files.len();
        let workers = self.options.workers.max(1);

        let outcomes: Vec<Option<ProcessingResult>> =
            futures::stream::iter(files.into_iter().enumerate())
                .map(|(index, path)| async move {
                    if self.cancelled.load(Ordering::SeqCst) {
                        return None;
                    }
                    self.process(path, index + 1, total).await
                })
                .buffered(workers)
                .collect()
                .await;

        let not_processed = outcomes.iter().filter(|r| r.is_none()).count();
        if not_processed > 0 {
            tracing::warn!("Cancelled; {} files not processed", not_processed);
        }

        BatchSummary {
            results: outcomes.into_iter().flatten().collect(),
            not_processed,
        }
    }

    /// `None` when cancellation caught the file before it was resolved.
    async fn process(
        &self,
        path: PathBuf,
        index: usize,
        total: usize,
    ) -> Option<ProcessingResult> {
        let original = read_original_blocking(&path).await;
        let original_label = original.label();

        let outcome = self
            .pipeline
            .resolve(&path, &original, Some((index, total)))
            .await?;

        let planned = plan_destination(
            &outcome,
            &path,
            &original,
            &self.options.destination_dir,
            self.options.gather,
        );

        let Some(planned) = planned else {
            return Some(ProcessingResult {
                source_path: path,
                original_label,
                outcome,
                destination: None,
                status: ProcessingStatus::Untouched,
            });
        };

        if self.options.dry_run {
            tracing::info!("Would place {} at {}", path.display(), planned.display());
            return Some(ProcessingResult {
                source_path: path,
                original_label,
                outcome,
                destination: Some(planned),
                status: ProcessingStatus::Planned,
            });
        }

        let cover = match &outcome {
            ResolutionOutcome::Matched(info) => self.cover_for(&path, info).await,
            _ => None,
        };

        let (destination, status) = self.transfer(&path, planned, &outcome, cover).await;

        Some(ProcessingResult {
            source_path: path,
            original_label,
            outcome,
            destination,
            status,
        })
    }

    /// Cover art for a matched file, when its container can hold it.
    async fn cover_for(&self, path: &Path, info: &TrackInfo) -> Option<Vec<u8>> {
        let container = Container::from_path(path)?;
        if !container.supports_tags() {
            return None;
        }
        let album_ref = info.album_ref.as_deref()?;

        match self.pipeline.catalog().fetch_cover_art(album_ref).await {
            Ok(cover) => cover,
            Err(e) => {
                tracing::warn!("Cover art for {} unavailable: {}", info.display_label(), e);
                None
            }
        }
    }

    /// Relocate, then retag matched files. Runs on the blocking pool.
    async fn transfer(
        &self,
        source: &Path,
        planned: PathBuf,
        outcome: &ResolutionOutcome,
        cover: Option<Vec<u8>>,
    ) -> (Option<PathBuf>, ProcessingStatus) {
        let source = source.to_path_buf();
        let mode = self.options.transfer_mode();
        let info = match outcome {
            ResolutionOutcome::Matched(info) => Some(info.clone()),
            _ => None,
        };

        let joined = tokio::task::spawn_blocking(move || {
            let destination = match relocate(&source, &planned, mode) {
                Ok(destination) => destination,
                Err(e) => {
                    tracing::error!("Failed to relocate {}: {}", source.display(), e);
                    return (None, ProcessingStatus::RelocationFailed(e.to_string()));
                }
            };

            let Some(info) = info else {
                return (Some(destination), ProcessingStatus::Completed);
            };

            let writer = Container::from_path(&destination).map(writer_for);
            let written = match writer {
                Some(writer) => writer.write(&destination, &info, cover.as_deref()),
                None => Ok(()),
            };

            match written {
                Ok(()) => (Some(destination), ProcessingStatus::Completed),
                Err(e) => {
                    tracing::warn!(
                        "Relocated {} but metadata not fully updated: {}",
                        destination.display(),
                        e
                    );
                    (
                        Some(destination),
                        ProcessingStatus::TagWriteFailed(e.to_string()),
                    )
                }
            }
        })
        .await;

        joined.unwrap_or_else(|e| {
            tracing::error!("Transfer task failed: {}", e);
            (None, ProcessingStatus::RelocationFailed(e.to_string()))
        })
    }
}

async fn read_original_blocking(path: &Path) -> OriginalMetadata {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || metadata::read_original(&owned))
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Tag read for {} failed: {}", path.display(), e);
            OriginalMetadata::unknown(
                path.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )
        })
}

/// Human-readable report of a run.
pub fn render_summary(summary: &BatchSummary, dry_run: bool) -> String {
    let mut out = String::new();

    out.push_str(if dry_run {
        "\nPlanned Changes (dry run):\n"
    } else {
        "\nMetadata Changes Summary:\n"
    });
    out.push_str("------------------------\n");

    for result in &summary.results {
        out.push_str(&format!(
            "{} → {}\n",
            result.original_label,
            result.new_label()
        ));
        if let (ProcessingStatus::Planned, Some(dest)) = (&result.status, &result.destination) {
            out.push_str(&format!("    would go to {}\n", dest.display()));
        }
    }

    out.push_str("\nSummary:\n");
    out.push_str(&format!("Successfully processed: {}\n", summary.successful()));
    out.push_str(&format!("Failed to process: {}\n", summary.failed()));
    if summary.not_processed > 0 {
        out.push_str(&format!("Not processed (cancelled): {}\n", summary.not_processed));
    }
    out.push_str(&format!("Total files: {}\n", summary.total()));
    out
}
