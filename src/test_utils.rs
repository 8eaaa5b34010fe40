//! Test utilities and fixtures for tune-sorter tests.
//!
//! Candidate factories, original-metadata helpers and synthetic MP3/M4A
//! writers so tag round-trips run without binary fixtures.
//!
//! # Example
//!
//! ```ignore
//! use tune_sorter::test_utils::{candidate, write_silent_mp3};
//!
//! #[test]
//! fn test_something() {
//!     let dir = tempfile::tempdir().unwrap();
//!     let path = dir.path().join("song.mp3");
//!     write_silent_mp3(&path);
//!     let c = candidate("1", "Queen", "Bohemian Rhapsody", "A Night at the Opera");
//!     // ... test logic
//! }
//! ```

use std::path::Path;

use crate::model::{Candidate, OriginalMetadata, TrackInfo};

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, joint stereo, no CRC.
const MP3_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];

/// 144 * 128000 / 44100, rounded down (no padding bit).
const MP3_FRAME_LEN: usize = 417;

/// Creates a candidate with the given identity and no optional details.
///
/// `album_ref` and `artist_ref` are derived from the id so cover/genre
/// lookups can be keyed in mocks.
pub fn candidate(id: &str, artist: &str, title: &str, album: &str) -> Candidate {
    Candidate {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        album: album.to_string(),
        album_ref: Some(format!("album-{id}")),
        artist_ref: Some(format!("artist-{id}")),
        ..Default::default()
    }
}

/// Creates fully populated track info.
///
/// Customize using struct update syntax:
///
/// ```ignore
/// let info = TrackInfo { genre: None, ..mock_track_info() };
/// ```
pub fn mock_track_info() -> TrackInfo {
    TrackInfo {
        id: "trk-1".to_string(),
        title: "Under Pressure".to_string(),
        artist: "Queen & David Bowie".to_string(),
        album: "Hot Space".to_string(),
        album_artist: Some("Queen".to_string()),
        year: Some(1982),
        genre: Some("Rock".to_string()),
        track_number: Some(11),
        bpm: Some(114),
        key: Some("D".to_string()),
        album_ref: Some("alb-1".to_string()),
    }
}

/// Original metadata with every field read.
pub fn original(artist: &str, title: &str, album: &str, stem: &str) -> OriginalMetadata {
    OriginalMetadata {
        artist: Some(artist.to_string()),
        title: Some(title.to_string()),
        album: Some(album.to_string()),
        stem: stem.to_string(),
        duration: None,
    }
}

/// Writes a tagless MP3 of ~0.5s of silent frames.
pub fn write_silent_mp3(path: &Path) {
    let mut bytes = Vec::with_capacity(MP3_FRAME_LEN * 20);
    for _ in 0..20 {
        bytes.extend_from_slice(&MP3_FRAME_HEADER);
        bytes.resize(bytes.len() + MP3_FRAME_LEN - MP3_FRAME_HEADER.len(), 0);
    }
    std::fs::write(path, bytes).expect("Failed to write synthetic mp3");
}

/// One MP4 atom: 32-bit size, fourcc, payload.
fn atom(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(fourcc);
    out.extend_from_slice(payload);
    out
}

/// Writes a tagless M4A with a single one-second sound track and a few
/// bytes of media data.
///
/// Only the atoms needed to identify the file and its audio track are
/// present (`ftyp`, `moov/trak/mdia/{mdhd,hdlr}`, `mdat`).
pub fn write_minimal_m4a(path: &Path) {
    let ftyp = atom(b"ftyp", b"M4A \0\0\0\0M4A isom");

    let mut mdhd = vec![0u8; 4]; // version 0, flags
    mdhd.extend_from_slice(&0u32.to_be_bytes()); // creation
    mdhd.extend_from_slice(&0u32.to_be_bytes()); // modification
    mdhd.extend_from_slice(&44_100u32.to_be_bytes()); // timescale
    mdhd.extend_from_slice(&44_100u32.to_be_bytes()); // duration
    mdhd.extend_from_slice(&[0x55, 0xC4, 0, 0]); // language "und", quality

    let mut hdlr = vec![0u8; 8]; // version, flags, pre_defined
    hdlr.extend_from_slice(b"soun");
    hdlr.extend_from_slice(&[0u8; 12]);
    hdlr.push(0); // empty name

    let mdia = atom(b"mdia", &[atom(b"mdhd", &mdhd), atom(b"hdlr", &hdlr)].concat());
    let moov = atom(b"moov", &atom(b"trak", &mdia));
    let mdat = atom(b"mdat", &[0u8; 16]);

    std::fs::write(path, [ftyp, moov, mdat].concat()).expect("Failed to write synthetic m4a");
}

/// Writes arbitrary bytes, creating parent directories.
pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(path, contents).expect("Failed to write test file");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_factory() {
        let c = candidate("7", "Adele", "Hello", "25");
        assert_eq!(c.display_label(), "Adele - Hello (25)");
        assert_eq!(c.album_ref.as_deref(), Some("album-7"));
        assert!(c.genre.is_none());
    }

    #[test]
    fn test_silent_mp3_is_whole_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silent.mp3");
        write_silent_mp3(&path);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), MP3_FRAME_LEN * 20);
        assert_eq!(&bytes[..4], &MP3_FRAME_HEADER);
        assert_eq!(&bytes[MP3_FRAME_LEN..MP3_FRAME_LEN + 4], &MP3_FRAME_HEADER);
    }

    #[test]
    fn test_minimal_m4a_atom_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silent.m4a");
        write_minimal_m4a(&path);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[4..8], b"ftyp");
        let ftyp_len = u32::from_be_bytes(bytes[..4].try_into().unwrap()) as usize;
        assert_eq!(&bytes[ftyp_len + 4..ftyp_len + 8], b"moov");
        let moov_len =
            u32::from_be_bytes(bytes[ftyp_len..ftyp_len + 4].try_into().unwrap()) as usize;
        assert_eq!(&bytes[ftyp_len + moov_len + 4..ftyp_len + moov_len + 8], b"mdat");
        assert_eq!(bytes.len(), ftyp_len + moov_len + 24);
    }
}
