use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::metadata::Container;

/// Recursively collect supported audio files under `root`, sorted by path.
///
/// Supported extensions: mp3, m4a, wav (case-insensitive). Unreadable
/// entries are logged and skipped.
pub fn discover(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| Container::from_path(path).is_some())
        .collect();

    files.sort();
    files
}
