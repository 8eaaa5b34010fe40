//! Audio container detection and embedded tag access.
//!
//! Uses the lofty crate for format-independent metadata access.
//! Three containers are handled:
//!
//! | Container | Tags | Written as |
//! |-----------|------|------------|
//! | `.mp3` | yes | ID3v2 |
//! | `.m4a` | yes | iTunes ilst atoms |
//! | `.wav` | no | untouched |

pub mod writer;

pub use writer::{TagWriter, writer_for};

use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;

use crate::error::{Error, Result};
use crate::model::OriginalMetadata;

/// Supported audio containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Mp3,
    M4a,
    Wav,
}

impl Container {
    /// Detect from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp3" => Some(Self::Mp3),
            "m4a" => Some(Self::M4a),
            "wav" => Some(Self::Wav),
            _ => None,
        }
    }

    /// Whether tags are read from and written to this container.
    pub fn supports_tags(self) -> bool {
        !matches!(self, Self::Wav)
    }
}

/// Raw fields read from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSnapshot {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
}

/// Read artist/title/album and duration.
pub fn read_tags(path: &Path) -> Result<TagSnapshot> {
    let tagged_file = Probe::open(path)
        .and_then(|probe| probe.read())
        .map_err(|e| Error::metadata(path, e.to_string()))?;

    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let duration = tagged_file.properties().duration();

    Ok(TagSnapshot {
        artist: tag.and_then(|t| non_empty(t.artist())),
        title: tag.and_then(|t| non_empty(t.title())),
        album: tag.and_then(|t| non_empty(t.album())),
        duration: (!duration.is_zero()).then_some(duration),
    })
}

fn non_empty(value: Option<Cow<'_, str>>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// What the file already says about itself. Never fails.
///
/// Unreadable files and tagless containers produce the "unknown"
/// placeholder; the duration is still kept when it could be probed.
pub fn read_original(path: &Path) -> OriginalMetadata {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let snapshot = match read_tags(path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::debug!("No readable tags in {}: {}", path.display(), e);
            return OriginalMetadata::unknown(stem);
        }
    };

    if !Container::from_path(path).is_some_and(Container::supports_tags) {
        return OriginalMetadata {
            duration: snapshot.duration,
            ..OriginalMetadata::unknown(stem)
        };
    }

    OriginalMetadata {
        artist: snapshot.artist,
        title: snapshot.title,
        album: snapshot.album,
        stem,
        duration: snapshot.duration,
    }
}
