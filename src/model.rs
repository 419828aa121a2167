use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Type assigned when no catalog entry matches the title.
pub const DEFAULT_SONG_TYPE: &str = "Original Mix";

/// The uploaded asset being analysed. Never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileDescriptor {
    pub container: String,
    pub blob: String,
    pub original_filename: String,
    pub file_extension: String,
}

impl FileDescriptor {
    pub fn is_mp3(&self) -> bool {
        self.file_extension.eq_ignore_ascii_case("mp3")
    }
}

/// A recognised mix/edit naming convention, e.g. "Remix" with alternatives
/// ["Mix", "Extended Remix"].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongTypeDefinition {
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub has_artists: bool,
    #[serde(default)]
    pub alternative_names: Vec<String>,
}

impl SongTypeDefinition {
    pub fn new(name: &str, group: &str, has_artists: bool, alternative_names: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            group: group.to_string(),
            has_artists,
            alternative_names: alternative_names.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The canonical name followed by every alternative spelling.
    pub fn spellings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.alternative_names.iter().map(String::as_str))
    }
}

/// Per-call reference data: the song-type catalog and the genre list.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub song_types: Vec<SongTypeDefinition>,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistRole {
    Primary,
    Remixer,
    Featuring,
}

/// One artist name produced by the splitter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedArtist {
    pub name: String,
    pub role: ArtistRole,
    /// Free text after a possessive, e.g. "'s Paris at Night" for "EDX's Paris at Night".
    pub suffix: Option<String>,
}

impl ExtractedArtist {
    pub fn new(name: impl Into<String>, role: ArtistRole) -> Self {
        Self {
            name: name.into(),
            role,
            suffix: None,
        }
    }
}

/// Best-effort song metadata. Array fields default to empty; everything else is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// `Some(None)` records a bpm field that was present but unusable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpm: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_rip: Option<bool>,
    pub artists: Vec<String>,
    pub remixer: Vec<String>,
    pub featurings: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub song_type: Option<String>,
    pub genres: Vec<String>,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl ExtractedMetadata {
    /// Fold a split artist into the role-specific list. A possessive suffix replaces any earlier one.
    pub fn push_artist(&mut self, artist: ExtractedArtist) {
        if let Some(suffix) = artist.suffix {
            self.suffix = Some(suffix);
        }
        match artist.role {
            ArtistRole::Primary => self.artists.push(artist.name),
            ArtistRole::Remixer => self.remixer.push(artist.name),
            ArtistRole::Featuring => self.featurings.push(artist.name),
        }
    }

    pub fn extend_artists(&mut self, artists: impl IntoIterator<Item = ExtractedArtist>) {
        for artist in artists {
            self.push_artist(artist);
        }
    }

    /// Merge a later source's partial result into this one.
    ///
    /// Absent values (and an explicit null bpm) are skipped, arrays are
    /// concatenated without de-duplication, and every other present value
    /// overwrites what is already here.
    pub fn merge(&mut self, other: ExtractedMetadata) {
        overwrite(&mut self.title, other.title);
        overwrite(&mut self.suffix, other.suffix);
        overwrite(&mut self.year, other.year);
        if let Some(Some(bpm)) = other.bpm {
            self.bpm = Some(Some(bpm));
        }
        overwrite(&mut self.release_date, other.release_date);
        overwrite(&mut self.is_rip, other.is_rip);
        overwrite(&mut self.song_type, other.song_type);
        overwrite(&mut self.duration, other.duration);

        self.artists.extend(other.artists);
        self.remixer.extend(other.remixer);
        self.featurings.extend(other.featurings);
        self.genres.extend(other.genres);
        self.labels.extend(other.labels);
    }

    /// Drop repeated artists, remixers, featurings and genres, keeping first-seen order.
    pub fn dedup(&mut self) {
        unique(&mut self.artists);
        unique(&mut self.remixer);
        unique(&mut self.featurings);
        unique(&mut self.genres);
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Case-sensitive, order-preserving de-duplication.
pub fn unique(values: &mut Vec<String>) {
    let mut seen = HashSet::new();
    values.retain(|v| seen.insert(v.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_mp3_case_insensitive() {
        let mut file = FileDescriptor::default();
        file.file_extension = "MP3".into();
        assert!(file.is_mp3());
        file.file_extension = "flac".into();
        assert!(!file.is_mp3());
    }

    #[test]
    fn test_push_artist_routes_by_role() {
        let mut meta = ExtractedMetadata::default();
        meta.push_artist(ExtractedArtist::new("A", ArtistRole::Primary));
        meta.push_artist(ExtractedArtist::new("B", ArtistRole::Remixer));
        meta.push_artist(ExtractedArtist::new("C", ArtistRole::Featuring));
        assert_eq!(meta.artists, names(&["A"]));
        assert_eq!(meta.remixer, names(&["B"]));
        assert_eq!(meta.featurings, names(&["C"]));
        assert_eq!(meta.suffix, None);
    }

    #[test]
    fn test_push_artist_carries_suffix() {
        let mut meta = ExtractedMetadata::default();
        meta.push_artist(ExtractedArtist {
            name: "EDX".into(),
            role: ArtistRole::Remixer,
            suffix: Some("'s Paris at Night".into()),
        });
        assert_eq!(meta.suffix.as_deref(), Some("'s Paris at Night"));
    }

    #[test]
    fn test_merge_disjoint_keys_is_union() {
        let mut acc = ExtractedMetadata {
            title: Some("Song".into()),
            artists: names(&["A"]),
            ..Default::default()
        };
        acc.merge(ExtractedMetadata {
            duration: Some(215),
            ..Default::default()
        });
        assert_eq!(acc.title.as_deref(), Some("Song"));
        assert_eq!(acc.artists, names(&["A"]));
        assert_eq!(acc.duration, Some(215));
    }

    #[test]
    fn test_merge_concatenates_arrays_in_order() {
        let mut acc = ExtractedMetadata {
            artists: names(&["A", "B"]),
            ..Default::default()
        };
        acc.merge(ExtractedMetadata {
            artists: names(&["B", "C"]),
            ..Default::default()
        });
        assert_eq!(acc.artists, names(&["A", "B", "B", "C"]));
    }

    #[test]
    fn test_merge_later_scalar_wins() {
        let mut acc = ExtractedMetadata {
            title: Some("First".into()),
            song_type: Some("Original Mix".into()),
            ..Default::default()
        };
        acc.merge(ExtractedMetadata {
            title: Some("Second".into()),
            ..Default::default()
        });
        assert_eq!(acc.title.as_deref(), Some("Second"));
        assert_eq!(acc.song_type.as_deref(), Some("Original Mix"));
    }

    #[test]
    fn test_merge_skips_null_bpm() {
        let mut acc = ExtractedMetadata {
            bpm: Some(Some(128)),
            ..Default::default()
        };
        acc.merge(ExtractedMetadata {
            bpm: Some(None),
            ..Default::default()
        });
        assert_eq!(acc.bpm, Some(Some(128)));
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let mut meta = ExtractedMetadata {
            artists: names(&["B", "A", "B"]),
            genres: names(&["House", "house", "House"]),
            labels: names(&["X", "X"]),
            ..Default::default()
        };
        meta.dedup();
        assert_eq!(meta.artists, names(&["B", "A"]));
        assert_eq!(meta.genres, names(&["House", "house"]));
        // labels are not part of the uniqueness pass
        assert_eq!(meta.labels, names(&["X", "X"]));
    }

    #[test]
    fn test_serialize_camel_case_and_type_key() {
        let meta = ExtractedMetadata {
            title: Some("Song".into()),
            song_type: Some("Remix".into()),
            release_date: NaiveDate::from_ymd_opt(2020, 1, 31),
            bpm: Some(None),
            ..Default::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "Remix");
        assert_eq!(json["releaseDate"], "2020-01-31");
        assert!(json["bpm"].is_null());
        assert!(json.get("bpm").is_some());
        assert!(json.get("year").is_none());
        assert_eq!(json["artists"], serde_json::json!([]));
    }
}
