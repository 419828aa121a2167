pub mod lofty;

use async_trait::async_trait;
use thiserror::Error;

pub use self::lofty::{ARTISTS_DESCRIPTION, LoftyDurationDecoder, LoftyTagDecoder};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Unsupported or corrupt audio: {0}")]
    Malformed(String),
    #[error("No usable duration in audio stream")]
    NoDuration,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decoder task failed: {0}")]
    Task(String),
}

/// A user-defined text frame (ID3v2 TXXX): free-form description plus value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDefinedText {
    pub description: String,
    pub value: String,
}

/// Tag fields as read from the container, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTagData {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub comment: Option<String>,
    pub track: Option<String>,
    pub genre: Option<String>,
    pub bpm: Option<String>,
    pub band: Option<String>,
    pub composer: Option<String>,
    pub original_artist: Option<String>,
    pub copyright: Option<String>,
    pub encoder: Option<String>,
    pub publisher: Option<String>,
    pub content_group: Option<String>,
    pub writer: Option<String>,
    pub remixer: Option<String>,
    pub conductor: Option<String>,
    pub subtitle: Option<String>,
    pub isrc: Option<String>,
    pub initial_key: Option<String>,
    pub lyrics: Option<String>,
    pub user_defined: Vec<UserDefinedText>,
    pub original_filename: Option<String>,
    pub original_release_time: Option<String>,
    pub release_time: Option<String>,
    /// Tag format/version the fields came from, e.g. "Id3v2".
    pub version: Option<String>,
}

/// Reads tag frames out of an in-memory audio file.
#[async_trait]
pub trait TagDecoder: Send + Sync {
    /// `Ok(None)` means the file carries no tags at all.
    async fn decode(&self, buffer: &[u8]) -> Result<Option<RawTagData>, DecodeError>;
}

/// Measures the playing time of an in-memory audio file.
#[async_trait]
pub trait DurationDecoder: Send + Sync {
    async fn duration_secs(&self, buffer: &[u8]) -> Result<f64, DecodeError>;
}
