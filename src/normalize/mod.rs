//! Filename cleanup for catalog search.
//!
//! Turns a noisy file name such as
//! `"03 - Daft Punk - One More Time [Official Video] (HD).mp3"` into search
//! terms (`"Daft Punk One More Time"`). Pure, no I/O.
//!
//! The cleanup passes are re-applied until nothing changes, so
//! `normalize_filename(normalize_filename(x)) == normalize_filename(x)`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::SearchQuery;

/// Audio extensions recognised as a file extension.
///
/// Anything else after a dot is part of the name ("Mr. Brightside").
static AUDIO_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(?:mp3|m4a|wav|flac|ogg|aac)$").unwrap());

/// Leading track index: "01 ", "3_", "12-".
static TRACK_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}[\s_-]+").unwrap());

/// Noise removed from anywhere in the name (applied in order).
static NOISE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // "[Official Video]", "[320kbps]"
        Regex::new(r"\[[^\]]*\]").unwrap(),
        // "(feat. X)", "(ft X)", "(featuring X)", "(with X)"
        Regex::new(r"(?i)\(\s*(?:feat\.|ft\.|(?:feat|ft|featuring|with)\s)[^)]*\)").unwrap(),
        // "(Official Music Video)", "(Official Audio)"
        Regex::new(r"(?i)\(\s*official[^)]*(?:video|audio)\s*\)").unwrap(),
        // "(Lyric Video)", "(Lyrics)", "(Audio)"
        Regex::new(r"(?i)\(\s*(?:lyric\s+video|lyrics|audio)\s*\)").unwrap(),
        // Quality tokens
        Regex::new(r"(?i)\b(?:hd|hq|\d{3,4}p)\b").unwrap(),
        // Channel/uploader suffix after a pipe
        Regex::new(r"\|.*$").unwrap(),
        // Brackets left empty by the token pass: "(HD)" -> "()"
        Regex::new(r"\(\s*\)").unwrap(),
    ]
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clean a raw file name into search terms.
///
/// Returns an empty string when nothing searchable remains.
pub fn normalize_filename(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = clean_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Build the search query for a file name.
pub fn build_query(raw: &str) -> SearchQuery {
    SearchQuery::new(normalize_filename(raw))
}

/// One cleanup pass. Never makes the string longer.
fn clean_once(input: &str) -> String {
    let mut s = AUDIO_EXTENSION.replace(input, "").into_owned();
    s = TRACK_INDEX.replace(&s, "").into_owned();

    for pattern in NOISE_PATTERNS.iter() {
        s = pattern.replace_all(&s, " ").into_owned();
    }

    let s = WHITESPACE.replace_all(&s, " ");
    let s = s.trim();

    join_artist_title(s)
}

/// "Artist - Title" becomes "Artist Title" when there is exactly one
/// separator; anything else is returned unchanged.
fn join_artist_title(s: &str) -> String {
    if s.matches(" - ").count() == 1 {
        if let Some((artist, title)) = s.split_once(" - ") {
            return format!("{} {}", artist.trim(), title.trim());
        }
    }
    s.to_string()
}
