//! Adapter layer: Convert Spotify DTOs to candidates
//!
//! This is the ONLY place Spotify DTO types become domain types.

use super::dto;
use crate::model::Candidate;

/// Convert a Spotify track object into a candidate.
///
/// The primary (first) artist names the track; the first album artist
/// becomes the album artist.
pub fn to_candidate(track: dto::Track) -> Candidate {
    let primary = track.artists.into_iter().next();
    let album = track.album;

    let year = album.release_date.as_deref().and_then(parse_year);
    let album_artist = album.artists.into_iter().next().map(|a| a.name);

    Candidate {
        id: track.id.unwrap_or_default(),
        title: track.name,
        artist: primary
            .as_ref()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        album: album.name,
        album_artist,
        year,
        genre: None,
        track_number: track.track_number,
        bpm: None,
        key: None,
        album_ref: album.id,
        artist_ref: primary.and_then(|a| a.id),
    }
}

/// First genre of an artist, if any.
pub fn primary_genre(artist: dto::Artist) -> Option<String> {
    artist.genres.into_iter().find(|g| !g.trim().is_empty())
}

/// URL of the largest album image (Spotify lists the widest first).
pub fn largest_image(album: &dto::Album) -> Option<&str> {
    album.images.first().map(|i| i.url.as_str())
}

/// Year from "YYYY", "YYYY-MM" or "YYYY-MM-DD".
fn parse_year(date: &str) -> Option<u32> {
    date.get(..4)
        .and_then(|y| y.parse().ok())
        .filter(|&y| y > 0)
}
