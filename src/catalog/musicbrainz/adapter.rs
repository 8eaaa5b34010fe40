//! Adapter layer: Convert MusicBrainz DTOs to candidates
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! If MusicBrainz changes their response format, only this file and
//! dto.rs need to change.

use super::dto;
use crate::model::Candidate;

/// Release info extracted from MusicBrainz
struct ReleaseInfo {
    album: Option<String>,
    album_artist: Option<String>,
    release_id: Option<String>,
    track_number: Option<u32>,
    year: Option<u32>,
}

/// Convert a recording into a candidate.
pub fn to_candidate(recording: dto::Recording) -> Candidate {
    let artist = build_artist_string(&recording.artist_credit);
    let artist_ref = recording.artist_credit.first().map(|c| c.artist.id.clone());

    let release = extract_release_info(&recording.releases);
    let genre = top_genre(&recording.tags);

    Candidate {
        id: recording.id,
        title: recording.title,
        artist: artist.unwrap_or_else(|| "Unknown".to_string()),
        album: release.album.unwrap_or_else(|| "Unknown Album".to_string()),
        album_artist: release.album_artist,
        year: release.year,
        genre,
        track_number: release.track_number,
        bpm: None,
        key: None,
        album_ref: release.release_id,
        artist_ref,
    }
}

/// Build a combined artist string from artist credits
fn build_artist_string(credits: &[dto::ArtistCredit]) -> Option<String> {
    if credits.is_empty() {
        return None;
    }

    let mut result = String::new();
    for credit in credits {
        // Use credited name if available, otherwise official name
        let name = credit.name.as_ref().unwrap_or(&credit.artist.name);
        result.push_str(name);

        if let Some(ref join) = credit.joinphrase {
            result.push_str(join);
        }
    }

    Some(result)
}

/// Pick the best release: official album, then any official release, then
/// whatever comes first.
fn extract_release_info(releases: &[dto::Release]) -> ReleaseInfo {
    let release = releases
        .iter()
        .find(|r| {
            r.status.as_deref() == Some("Official")
                && r.release_group
                    .as_ref()
                    .and_then(|rg| rg.primary_type.as_deref())
                    == Some("Album")
        })
        .or_else(|| {
            releases
                .iter()
                .find(|r| r.status.as_deref() == Some("Official"))
        })
        .or_else(|| releases.first());

    let Some(release) = release else {
        return ReleaseInfo {
            album: None,
            album_artist: None,
            release_id: None,
            track_number: None,
            year: None,
        };
    };

    let album_artist = release
        .artist_credit
        .as_deref()
        .and_then(build_artist_string);

    let track_number = release.media.iter().find_map(track_number_on);

    // Release date first, release group's first date as fallback
    let year = release
        .date
        .as_deref()
        .and_then(parse_year)
        .or_else(|| {
            release
                .release_group
                .as_ref()
                .and_then(|rg| rg.first_release_date.as_deref())
                .and_then(parse_year)
        });

    ReleaseInfo {
        album: Some(release.title.clone()),
        album_artist,
        release_id: Some(release.id.clone()),
        track_number,
        year,
    }
}

/// Track number of the (single) listed track on a medium.
fn track_number_on(medium: &dto::Medium) -> Option<u32> {
    let track = medium.tracks.first();
    track
        .and_then(|t| t.number.as_deref())
        .and_then(|n| n.trim().parse().ok())
        .or_else(|| track.and_then(|t| t.position))
        .or_else(|| medium.track_offset.map(|o| o + 1))
}

fn parse_year(date: &str) -> Option<u32> {
    date.split('-').next().and_then(|y| y.parse().ok())
}

/// Most-voted tag, capitalized for display.
fn top_genre(tags: &[dto::Tag]) -> Option<String> {
    tags.iter()
        .filter(|t| t.count > 0 && !t.name.trim().is_empty())
        .max_by_key(|t| t.count)
        .map(|t| {
            t.name
                .split_whitespace()
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
}
