//! Format-specific tag writing for identified tracks.
//!
//! Every writer maps the same [`TrackInfo`] onto its container's native
//! fields, replaces embedded artwork with a single JPEG front cover, and
//! drops composer/comment fields. Fields the track info does not carry are
//! left as they were.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag, TagExt, TagType};
use once_cell::sync::Lazy;
use regex::Regex;

use super::Container;
use crate::error::{Error, Result};
use crate::model::TrackInfo;

/// Splits "A & B", "A feat. B", "A ft. B" at the first separator.
static FEATURED_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)&|feat\.|ft\.").unwrap());

const COVER_DESCRIPTION: &str = "Cover";

/// Writes [`TrackInfo`] into one container format.
pub trait TagWriter: Send + Sync {
    /// Tag format written, or `None` for containers left untouched.
    fn tag_type(&self) -> Option<TagType>;

    /// Map track info (and optional JPEG cover) onto an in-memory tag.
    fn apply(&self, tag: &mut Tag, info: &TrackInfo, cover: Option<&[u8]>);

    /// Read the file, apply the mapping, save in place.
    fn write(&self, path: &Path, info: &TrackInfo, cover: Option<&[u8]>) -> Result<()> {
        let Some(tag_type) = self.tag_type() else {
            tracing::debug!("{} has no tag support; leaving as is", path.display());
            return Ok(());
        };

        let mut tagged_file = Probe::open(path)
            .and_then(|probe| probe.read())
            .map_err(|e| Error::metadata(path, e.to_string()))?;

        let tag = match tagged_file.tag_mut(tag_type) {
            Some(tag) => tag,
            None => {
                tagged_file.insert_tag(Tag::new(tag_type));
                tagged_file.tag_mut(tag_type).ok_or_else(|| {
                    Error::metadata(path, format!("file does not support {tag_type:?} tags"))
                })?
            }
        };

        self.apply(tag, info, cover);

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| Error::metadata(path, e.to_string()))?;

        tracing::info!("Updated tags on {}", path.display());
        Ok(())
    }
}

/// MP3: ID3v2 frames, including the initial key.
#[derive(Debug, Default)]
pub struct Id3v2Writer;

impl TagWriter for Id3v2Writer {
    fn tag_type(&self) -> Option<TagType> {
        Some(TagType::Id3v2)
    }

    fn apply(&self, tag: &mut Tag, info: &TrackInfo, cover: Option<&[u8]>) {
        apply_common(tag, info, cover);
        if let Some(key) = &info.key {
            tag.insert_text(ItemKey::InitialKey, key.clone());
        }
    }
}

/// M4A: iTunes ilst atoms. The key has no standard atom and is not written.
#[derive(Debug, Default)]
pub struct Mp4Writer;

impl TagWriter for Mp4Writer {
    fn tag_type(&self) -> Option<TagType> {
        Some(TagType::Mp4Ilst)
    }

    fn apply(&self, tag: &mut Tag, info: &TrackInfo, cover: Option<&[u8]>) {
        apply_common(tag, info, cover);
    }
}

/// WAV: nothing is written.
#[derive(Debug, Default)]
pub struct NoopTagWriter;

impl TagWriter for NoopTagWriter {
    fn tag_type(&self) -> Option<TagType> {
        None
    }

    fn apply(&self, _tag: &mut Tag, _info: &TrackInfo, _cover: Option<&[u8]>) {}
}

static ID3V2: Id3v2Writer = Id3v2Writer;
static MP4: Mp4Writer = Mp4Writer;
static NOOP: NoopTagWriter = NoopTagWriter;

/// The writer for a container.
pub fn writer_for(container: Container) -> &'static dyn TagWriter {
    match container {
        Container::Mp3 => &ID3V2,
        Container::M4a => &MP4,
        Container::Wav => &NOOP,
    }
}

/// `"Queen & David Bowie"` -> `"Queen"`.
pub fn primary_artist(artist: &str) -> &str {
    FEATURED_SEPARATOR
        .split(artist)
        .next()
        .unwrap_or(artist)
        .trim()
}

fn apply_common(tag: &mut Tag, info: &TrackInfo, cover: Option<&[u8]>) {
    tag.set_title(info.title.clone());
    tag.set_artist(info.artist.clone());
    tag.set_album(info.album.clone());
    tag.insert_text(ItemKey::AlbumArtist, primary_artist(&info.artist).to_string());

    if let Some(year) = info.year {
        tag.set_year(year);
    }
    if let Some(track) = info.track_number {
        tag.set_track(track);
        tag.remove_track_total();
    }
    if let Some(genre) = &info.genre {
        tag.set_genre(genre.clone());
    }
    if let Some(bpm) = info.bpm {
        tag.insert_text(ItemKey::IntegerBpm, bpm.to_string());
    }

    tag.remove_key(&ItemKey::Composer);
    tag.remove_comment();

    if let Some(data) = cover {
        while !tag.pictures().is_empty() {
            tag.remove_picture(0);
        }
        tag.push_picture(Picture::new_unchecked(
            PictureType::CoverFront,
            Some(MimeType::Jpeg),
            Some(COVER_DESCRIPTION.to_string()),
            data.to_vec(),
        ));
    }
}
