//! Destination planning and file relocation.
//!
//! Matched files are filed by their canonical metadata:
//!
//! ```text
//! {dest}/{Artist}/{Album}/{Title}.{ext}     (default)
//! {dest}/{Artist} - {Title}.{ext}           (--gather)
//! ```
//!
//! Transfer-only files keep their name and go under the original artist
//! (or straight into `{dest}` when gathering). Planning is pure; all disk
//! mutation lives in [`relocate`].

pub mod relocate;

pub use relocate::{TransferMode, relocate};

use std::path::{Path, PathBuf};

use crate::model::{OriginalMetadata, ResolutionOutcome};

/// Fallback for components that sanitize to nothing.
const UNKNOWN_COMPONENT: &str = "Unknown";

/// Compute where a file should go, or `None` when it stays put.
pub fn plan_destination(
    outcome: &ResolutionOutcome,
    source: &Path,
    original: &OriginalMetadata,
    destination_root: &Path,
    gather: bool,
) -> Option<PathBuf> {
    match outcome {
        ResolutionOutcome::Matched(info) => {
            let suffix = source
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            let artist = sanitize_component(&info.artist);
            let title = sanitize_component(&info.title);

            let path = if gather {
                destination_root.join(format!("{artist} - {title}{suffix}"))
            } else {
                destination_root
                    .join(artist)
                    .join(sanitize_component(&info.album))
                    .join(format!("{title}{suffix}"))
            };
            Some(path)
        }
        ResolutionOutcome::TransferOnly => {
            let file_name = source.file_name()?;
            if gather {
                return Some(destination_root.join(file_name));
            }
            let folder = if original.is_unknown() {
                UNKNOWN_COMPONENT.to_string()
            } else {
                sanitize_component(original.artist.as_deref().unwrap_or_default())
            };
            Some(destination_root.join(folder).join(file_name))
        }
        ResolutionOutcome::Skipped | ResolutionOutcome::NotFound => None,
    }
}

/// Make one path component safe on every common filesystem.
///
/// Drops `<>:"/\|?*`, trims surrounding whitespace, and maps anything that
/// ends up empty (or only dots) to `Unknown`.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        UNKNOWN_COMPONENT.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrackInfo;
    use crate::test_utils::{mock_track_info, original};

    fn matched(artist: &str, title: &str, album: &str) -> ResolutionOutcome {
        ResolutionOutcome::Matched(TrackInfo {
            artist: artist.into(),
            title: title.into(),
            album: album.into(),
            ..mock_track_info()
        })
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("AC/DC"), "ACDC");
        assert_eq!(sanitize_component("What?"), "What");
        assert_eq!(sanitize_component("a<b>c:d\"e|f*g\\h"), "abcdefgh");
        assert_eq!(sanitize_component("  Valid Name "), "Valid Name");
        assert_eq!(sanitize_component("???"), "Unknown");
        assert_eq!(sanitize_component(""), "Unknown");
        assert_eq!(sanitize_component(".."), "Unknown");
    }

    #[test]
    fn test_matched_hierarchy() {
        let dest = plan_destination(
            &matched("Queen", "Under Pressure", "Hot Space"),
            Path::new("/in/under pressure.mp3"),
            &OriginalMetadata::unknown("under pressure"),
            Path::new("/music"),
            false,
        );
        assert_eq!(
            dest,
            Some(PathBuf::from("/music/Queen/Hot Space/Under Pressure.mp3"))
        );
    }

    #[test]
    fn test_matched_gathered() {
        let dest = plan_destination(
            &matched("AC/DC", "T.N.T.", "High Voltage"),
            Path::new("/in/tnt.M4A"),
            &OriginalMetadata::unknown("tnt"),
            Path::new("/out"),
            true,
        );
        assert_eq!(dest, Some(PathBuf::from("/out/ACDC - T.N.T..M4A")));
    }

    #[test]
    fn test_transfer_only_uses_original_artist() {
        let dest = plan_destination(
            &ResolutionOutcome::TransferOnly,
            Path::new("/in/demo take 3.mp3"),
            &original("Local Band", "Demo", "Tapes", "demo take 3"),
            Path::new("/out"),
            false,
        );
        assert_eq!(dest, Some(PathBuf::from("/out/Local Band/demo take 3.mp3")));
    }

    #[test]
    fn test_transfer_only_sentinel_goes_to_unknown() {
        let dest = plan_destination(
            &ResolutionOutcome::TransferOnly,
            Path::new("/in/x.wav"),
            &OriginalMetadata::unknown("x"),
            Path::new("/out"),
            false,
        );
        assert_eq!(dest, Some(PathBuf::from("/out/Unknown/x.wav")));
    }

    #[test]
    fn test_transfer_only_gathered_keeps_name() {
        let dest = plan_destination(
            &ResolutionOutcome::TransferOnly,
            Path::new("/in/sub/x.wav"),
            &original("A", "B", "C", "x"),
            Path::new("/out"),
            true,
        );
        assert_eq!(dest, Some(PathBuf::from("/out/x.wav")));
    }

    #[test]
    fn test_unresolved_outcomes_have_no_destination() {
        for outcome in [ResolutionOutcome::Skipped, ResolutionOutcome::NotFound] {
            let dest = plan_destination(
                &outcome,
                Path::new("/in/a.mp3"),
                &OriginalMetadata::unknown("a"),
                Path::new("/out"),
                false,
            );
            assert!(dest.is_none());
        }
    }
}
