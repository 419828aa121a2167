use async_trait::async_trait;
use lofty::file::{TaggedFile, TaggedFileExt};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use std::io::Cursor;

use super::{DecodeError, DurationDecoder, RawTagData, TagDecoder, UserDefinedText};

/// Tag decoder backed by lofty. Parsing runs on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagDecoder;

/// Duration decoder backed by lofty's container properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyDurationDecoder;

#[async_trait]
impl TagDecoder for LoftyTagDecoder {
    async fn decode(&self, buffer: &[u8]) -> Result<Option<RawTagData>, DecodeError> {
        let owned = buffer.to_vec();
        tokio::task::spawn_blocking(move || read_tags(&owned))
            .await
            .map_err(|e| DecodeError::Task(e.to_string()))?
    }
}

#[async_trait]
impl DurationDecoder for LoftyDurationDecoder {
    async fn duration_secs(&self, buffer: &[u8]) -> Result<f64, DecodeError> {
        let owned = buffer.to_vec();
        tokio::task::spawn_blocking(move || read_duration(&owned))
            .await
            .map_err(|e| DecodeError::Task(e.to_string()))?
    }
}

fn read_tagged_file(buffer: &[u8]) -> Result<TaggedFile, DecodeError> {
    Probe::new(Cursor::new(buffer))
        .guess_file_type()?
        .read()
        .map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Read the primary tag (falling back to the first one present).
pub fn read_tags(buffer: &[u8]) -> Result<Option<RawTagData>, DecodeError> {
    let tagged_file = read_tagged_file(buffer)?;

    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    Ok(tag.map(raw_from_tag))
}

pub fn read_duration(buffer: &[u8]) -> Result<f64, DecodeError> {
    let tagged_file = read_tagged_file(buffer)?;
    let secs = tagged_file.properties().duration().as_secs_f64();
    if secs > 0.0 { Ok(secs) } else { Err(DecodeError::NoDuration) }
}

/// Description of the user-defined frame listing every track artist.
pub const ARTISTS_DESCRIPTION: &str = "Artists";

fn raw_from_tag(tag: &Tag) -> RawTagData {
    let get = |key: ItemKey| tag.get_string(&key).map(|s| s.to_string());

    // TXXX frames lofty has no key for surface as Unknown("TXXX:<description>")
    // or Unknown("<description>") depending on the tag format.
    let mut user_defined: Vec<UserDefinedText> = tag
        .items()
        .filter_map(|item| match item.key() {
            ItemKey::Unknown(key) => item.value().text().map(|value| UserDefinedText {
                description: key.strip_prefix("TXXX:").unwrap_or(key).to_string(),
                value: value.to_string(),
            }),
            _ => None,
        })
        .collect();

    // TXXX:Artists is mapped to a known key, so it never shows up as Unknown
    user_defined.extend(tag.get_strings(&ItemKey::TrackArtists).map(|value| UserDefinedText {
        description: ARTISTS_DESCRIPTION.to_string(),
        value: value.to_string(),
    }));

    RawTagData {
        title: tag.title().map(|s| s.into_owned()),
        artist: tag.artist().map(|s| s.into_owned()),
        album: tag.album().map(|s| s.into_owned()),
        year: tag
            .year()
            .map(|y| y.to_string())
            .or_else(|| get(ItemKey::RecordingDate)),
        comment: tag.comment().map(|s| s.into_owned()),
        track: tag.track().map(|t| t.to_string()),
        genre: tag.genre().map(|s| s.into_owned()),
        bpm: get(ItemKey::Bpm).or_else(|| get(ItemKey::IntegerBpm)),
        band: get(ItemKey::AlbumArtist),
        composer: get(ItemKey::Composer),
        original_artist: get(ItemKey::OriginalArtist),
        copyright: get(ItemKey::CopyrightMessage),
        encoder: get(ItemKey::EncoderSoftware),
        publisher: get(ItemKey::Publisher).or_else(|| get(ItemKey::Label)),
        content_group: get(ItemKey::ContentGroup),
        writer: get(ItemKey::Writer),
        remixer: get(ItemKey::Remixer),
        conductor: get(ItemKey::Conductor),
        subtitle: get(ItemKey::TrackSubtitle),
        isrc: get(ItemKey::Isrc),
        initial_key: get(ItemKey::InitialKey),
        lyrics: get(ItemKey::Lyrics),
        user_defined,
        original_filename: get(ItemKey::OriginalFileName),
        original_release_time: get(ItemKey::OriginalReleaseDate),
        release_time: get(ItemKey::ReleaseDate),
        version: Some(format!("{:?}", tag.tag_type())),
    }
}
