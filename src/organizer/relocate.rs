//! Copy-or-move onto a reserved destination.
//!
//! The destination is claimed with create-new semantics before any data is
//! written, so two workers planning the same path never overwrite each
//! other: the loser gets `"{stem} (2){ext}"`, `"{stem} (3){ext}"`, ...
//!
//! On failure the reserved (or partially written) destination is removed
//! and the source is left where it was.

use std::fs::{self, File, FileTimes, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Highest numbered suffix tried before giving up.
const MAX_SUFFIX: u32 = 9_999;

/// Whether the source survives relocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferMode {
    #[default]
    Copy,
    Move,
}

/// Relocate `source` to `planned` (or the first free suffixed variant).
///
/// Returns the path actually written.
pub fn relocate(source: &Path, planned: &Path, mode: TransferMode) -> Result<PathBuf> {
    if let Some(parent) = planned.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            Error::relocation(source, format!("cannot create {}: {}", parent.display(), e))
        })?;
    }

    let destination = reserve(source, planned)?;

    let transferred = match mode {
        TransferMode::Copy => copy_preserving(source, &destination),
        TransferMode::Move => move_file(source, &destination),
    };

    match transferred {
        Ok(()) => {
            tracing::info!(
                "{} {} -> {}",
                if mode == TransferMode::Move { "Moved" } else { "Copied" },
                source.display(),
                destination.display()
            );
            Ok(destination)
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&destination) {
                tracing::warn!(
                    "Failed to remove partial file {}: {}",
                    destination.display(),
                    cleanup
                );
            }
            Err(e)
        }
    }
}

/// Atomically claim the planned path or the first free suffixed variant.
fn reserve(source: &Path, planned: &Path) -> Result<PathBuf> {
    for n in 1..=MAX_SUFFIX {
        let candidate = if n == 1 {
            planned.to_path_buf()
        } else {
            suffixed(planned, n)
        };

        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => {
                if n > 1 {
                    tracing::info!(
                        "{} exists, using {}",
                        planned.display(),
                        candidate.display()
                    );
                }
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(Error::relocation(
                    source,
                    format!("cannot create {}: {}", candidate.display(), e),
                ));
            }
        }
    }

    Err(Error::relocation(
        source,
        format!("no free name for {}", planned.display()),
    ))
}

/// `dir/name.ext` -> `dir/name (n).ext`
fn suffixed(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem} ({n}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({n})"),
    };
    path.with_file_name(name)
}

/// Copy contents and permissions, then carry over access/modify times.
fn copy_preserving(source: &Path, destination: &Path) -> Result<()> {
    let fail = |what: &str, e: std::io::Error| Error::relocation(source, format!("{what}: {e}"));

    fs::copy(source, destination).map_err(|e| fail("copy failed", e))?;

    let meta = fs::metadata(source).map_err(|e| fail("cannot stat source", e))?;
    let mut times = FileTimes::new();
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }

    File::options()
        .write(true)
        .open(destination)
        .and_then(|f| f.set_times(times))
        .map_err(|e| fail("cannot preserve timestamps", e))
}

/// Rename; across devices fall back to copy then delete.
fn move_file(source: &Path, destination: &Path) -> Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::debug!(
                "Rename of {} failed ({}), copying instead",
                source.display(),
                e
            );
            copy_preserving(source, destination)?;
            fs::remove_file(source)
                .map_err(|e| Error::relocation(source, format!("cannot remove source: {e}")))
        }
    }
}
