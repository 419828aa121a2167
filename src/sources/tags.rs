use std::fmt;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::artists::{ArtistNameSplitter, FEATURING_RE};
use crate::decode::{ARTISTS_DESCRIPTION, RawTagData, TagDecoder};
use crate::genre::{self, DEFAULT_GENRE_SIMILARITY_THRESHOLD};
use crate::model::{
    ArtistRole, Catalog, DEFAULT_SONG_TYPE, ExtractedMetadata, FileDescriptor, SongTypeDefinition,
};
use crate::text;

/// How to choose among several song-type spellings found in one title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeMatchPolicy {
    /// Longest matched spelling wins; catalog order breaks ties.
    #[default]
    Longest,
    /// First spelling found in catalog order wins.
    First,
}

/// Why a single tag field was left out of the result.
#[derive(Error, Debug)]
enum FieldError {
    #[error("not a number")]
    NotANumber,
    #[error("{0} is out of range")]
    OutOfRange(i64),
    #[error("unrecognised date")]
    Date,
    #[error("no genre close enough")]
    NoGenre,
    #[error("nothing left after cleanup")]
    Empty,
}

static LEADING_INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+").unwrap());

/// Infers title, artists, mix type and tag-derived fields from the embedded
/// tags of an MP3 and its upload filename.
pub struct TagMetadataSource {
    decoder: Arc<dyn TagDecoder>,
    splitter: ArtistNameSplitter,
    genre_threshold: f64,
    type_match: TypeMatchPolicy,
    spaced_hyphen: bool,
}

/// A song-type spelling located in the working title.
struct TypeMatch<'a> {
    definition: &'a SongTypeDefinition,
    start: usize,
    end: usize,
    chars: usize,
}

impl TagMetadataSource {
    pub fn new(decoder: Arc<dyn TagDecoder>, splitter: ArtistNameSplitter) -> Self {
        Self {
            decoder,
            splitter,
            genre_threshold: DEFAULT_GENRE_SIMILARITY_THRESHOLD,
            type_match: TypeMatchPolicy::default(),
            spaced_hyphen: false,
        }
    }

    pub fn with_genre_threshold(mut self, threshold: f64) -> Self {
        self.genre_threshold = threshold;
        self
    }

    pub fn with_type_match(mut self, policy: TypeMatchPolicy) -> Self {
        self.type_match = policy;
        self
    }

    /// Split leading artists on the first " - " when there is one, so
    /// hyphenated names like "Jay-Z" stay whole. Off by default.
    pub fn with_spaced_hyphen(mut self, enabled: bool) -> Self {
        self.spaced_hyphen = enabled;
        self
    }

    pub fn is_applicable_for_file(&self, file: &FileDescriptor) -> bool {
        file.is_mp3()
    }

    /// Decode the tags and run the extraction pipeline. A failed decode is
    /// logged and the filename is used on its own.
    pub async fn analyse(
        &self,
        file: &FileDescriptor,
        buffer: &[u8],
        catalog: &Catalog,
    ) -> ExtractedMetadata {
        let tags = match self.decoder.decode(buffer).await {
            Ok(tags) => tags,
            Err(e) => {
                log::warn!("Could not read tags from {}: {}", file.original_filename, e);
                None
            }
        };
        self.extract(file, tags.as_ref(), catalog)
    }

    /// The synchronous pipeline: every step takes the working title and
    /// returns what is left of it, recording findings in `meta`.
    pub fn extract(
        &self,
        file: &FileDescriptor,
        tags: Option<&RawTagData>,
        catalog: &Catalog,
    ) -> ExtractedMetadata {
        let (mut meta, mut title) = match tag_title(tags) {
            Some(raw) => {
                let (meta, title) = self.run_title_steps(raw, &catalog.song_types);
                if text::is_bracket_balanced(&title) {
                    (meta, title)
                } else {
                    log::debug!("Tag title left \"{}\" unbalanced, using the filename", title);
                    self.run_title_steps(filename_title(file, tags), &catalog.song_types)
                }
            }
            None => self.run_title_steps(filename_title(file, tags), &catalog.song_types),
        };

        if !text::is_bracket_balanced(&title) {
            let repaired = text::strip_unmatched_brackets(&title);
            title = text::tidy(&text::collapse_empty_brackets(&repaired));
        }
        if !title.is_empty() {
            meta.title = Some(title);
        }

        if let Some(tags) = tags {
            self.enrich_from_tags(tags, &catalog.genres, &mut meta);
        }

        meta.dedup();
        meta
    }

    /// Title steps on a fresh accumulator: leading artists, song type,
    /// featurings. Returns the accumulator and the tidied remaining title.
    fn run_title_steps(
        &self,
        title: String,
        song_types: &[SongTypeDefinition],
    ) -> (ExtractedMetadata, String) {
        let mut meta = ExtractedMetadata {
            song_type: Some(DEFAULT_SONG_TYPE.to_string()),
            ..Default::default()
        };
        let title = self.extract_leading_artists(title, &mut meta);
        let title = self.extract_song_type(title, song_types, &mut meta);
        let title = self.extract_featurings(title, &mut meta);
        (meta, text::tidy(&title))
    }

    /// "Artist A, Artist B - Title" → artists from the left, title from the right.
    /// Splits on the first hyphen unless `spaced_hyphen` prefers " - ".
    fn extract_leading_artists(&self, title: String, meta: &mut ExtractedMetadata) -> String {
        let spaced = if self.spaced_hyphen {
            title.find(" - ").map(|at| (at, 3))
        } else {
            None
        };
        let split = spaced.or_else(|| title.find('-').map(|at| (at, 1)));
        let Some((at, len)) = split else {
            return title;
        };

        meta.extend_artists(self.splitter.extract(&title[..at], ArtistRole::Primary));
        title[at + len..].to_string()
    }

    fn find_song_type<'a>(
        &self,
        title: &str,
        song_types: &'a [SongTypeDefinition],
    ) -> Option<TypeMatch<'a>> {
        let mut best: Option<TypeMatch<'a>> = None;
        for definition in song_types {
            for spelling in definition.spellings() {
                let Some(start) = text::find_ignore_case(title, spelling) else {
                    continue;
                };
                let found = TypeMatch {
                    definition,
                    start,
                    end: start + spelling.len(),
                    chars: spelling.chars().count(),
                };
                match self.type_match {
                    TypeMatchPolicy::First => return Some(found),
                    TypeMatchPolicy::Longest => {
                        if best.as_ref().is_none_or(|b| found.chars > b.chars) {
                            best = Some(found);
                        }
                    }
                }
            }
        }
        best
    }

    /// Match the title against the song-type catalog; for types that name
    /// artists, pull "(Remixer Name Remix)" apart into remixers and type.
    fn extract_song_type(
        &self,
        title: String,
        song_types: &[SongTypeDefinition],
        meta: &mut ExtractedMetadata,
    ) -> String {
        let Some(found) = self.find_song_type(&title, song_types) else {
            return title;
        };
        meta.song_type = Some(found.definition.name.clone());

        let (cut_start, cut_end) = match self.remixer_bracket(&title, &found) {
            Some((open, kind)) => {
                let names = &title[open + kind.len_utf8()..found.start];
                meta.extend_artists(self.splitter.extract(names, ArtistRole::Remixer));
                let close = text::close_bracket_after(&title, found.end, kind)
                    .map_or(found.end, |c| c + kind.len_utf8());
                (open, close)
            }
            None => (found.start, found.end),
        };

        let rest = format!("{}{}", &title[..cut_start], &title[cut_end..]);
        text::tidy(&text::collapse_empty_brackets(&rest))
    }

    /// Opening bracket enclosing the remixer names in front of a type match.
    fn remixer_bracket(&self, title: &str, found: &TypeMatch) -> Option<(usize, char)> {
        if !found.definition.has_artists {
            return None;
        }
        let only = title[found.end..].chars().next().and_then(text::matching_open);
        text::open_bracket_before(title, found.start, only)
    }

    /// Remove the first "feat. X" span, up to the enclosing closing bracket
    /// or the end of the title, and record its artists as featurings. A
    /// bracket pair left empty is dropped.
    fn extract_featurings(&self, title: String, meta: &mut ExtractedMetadata) -> String {
        let Some(marker) = FEATURING_RE.find(&title) else {
            return title;
        };

        let end = text::open_bracket_before(&title, marker.start(), None)
            .and_then(|(_, kind)| text::close_bracket_after(&title, marker.end(), kind))
            .unwrap_or(title.len());

        let names = &title[marker.start()..end];
        meta.extend_artists(self.splitter.extract(names, ArtistRole::Featuring));

        let rest = format!("{}{}", title[..marker.start()].trim_end(), &title[end..]);
        text::tidy(&text::collapse_empty_brackets(&rest))
    }

    fn enrich_from_tags(&self, tags: &RawTagData, genres: &[String], meta: &mut ExtractedMetadata) {
        if let Some(artist) = non_empty(&tags.artist) {
            meta.extend_artists(self.splitter.extract(artist, ArtistRole::Primary));
        }
        for frame in tags
            .user_defined
            .iter()
            .filter(|f| f.description.trim().eq_ignore_ascii_case(ARTISTS_DESCRIPTION))
        {
            meta.extend_artists(self.splitter.extract(&frame.value, ArtistRole::Primary));
        }

        if let Some(year) = field("year", non_empty(&tags.year), parse_year) {
            meta.year = Some(year);
        }

        let genre = field("genre", non_empty(&tags.genre), |raw| {
            genre::match_genre(raw, genres, self.genre_threshold)
                .map(str::to_string)
                .ok_or(FieldError::NoGenre)
        });
        meta.genres.extend(genre);

        // A present-but-unusable bpm is recorded as an explicit null.
        if tags.bpm.is_some() {
            meta.bpm = Some(field("bpm", non_empty(&tags.bpm), parse_bpm));
        }

        let release = non_empty(&tags.release_time).or_else(|| non_empty(&tags.original_release_time));
        if let Some(date) = field("release date", release, parse_release_date) {
            meta.release_date = Some(date);
        }

        let label = field("label", non_empty(&tags.publisher), |raw| {
            let cleaned = text::strip_clutter(raw);
            if cleaned.is_empty() { Err(FieldError::Empty) } else { Ok(cleaned) }
        });
        meta.labels.extend(label);
    }
}

/// Parse one optional tag field; a missing value or parse failure becomes `None`.
fn field<T, E: fmt::Display>(
    name: &str,
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> Option<T> {
    let raw = raw?;
    match parse(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("Ignoring {} \"{}\": {}", name, raw, e);
            None
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// The tag title, when present and bracket-balanced, cleaned up.
fn tag_title(tags: Option<&RawTagData>) -> Option<String> {
    tags.and_then(|t| non_empty(&t.title))
        .filter(|t| text::is_bracket_balanced(t))
        .map(clean_title)
}

/// The original-filename tag, else the upload filename, without its extension.
fn filename_title(file: &FileDescriptor, tags: Option<&RawTagData>) -> String {
    let filename = tags
        .and_then(|t| non_empty(&t.original_filename))
        .unwrap_or(file.original_filename.as_str());
    clean_title(strip_extension(filename, &file.file_extension))
}

/// Links, nulls and "(02)"-style track numbers removed.
fn clean_title(raw: &str) -> String {
    text::tidy(&text::strip_digit_groups(&text::strip_clutter(raw)))
}

fn strip_extension<'a>(filename: &'a str, extension: &str) -> &'a str {
    if extension.is_empty() {
        return filename;
    }
    let cut = filename.len().saturating_sub(extension.len() + 1);
    match (filename.get(cut..cut + 1), filename.get(cut + 1..)) {
        (Some("."), Some(ext)) if ext.eq_ignore_ascii_case(extension) => &filename[..cut],
        _ => filename,
    }
}

/// Integer at the start of `raw`: "2019-05-01" → 2019, "128.00" → 128.
fn leading_int(raw: &str) -> Result<i64, FieldError> {
    LEADING_INT_RE
        .find(raw.trim())
        .and_then(|m| m.as_str().parse().ok())
        .ok_or(FieldError::NotANumber)
}

fn parse_year(raw: &str) -> Result<i32, FieldError> {
    let year = leading_int(raw)?;
    if year > 1800 {
        i32::try_from(year).map_err(|_| FieldError::OutOfRange(year))
    } else {
        Err(FieldError::OutOfRange(year))
    }
}

fn parse_bpm(raw: &str) -> Result<u32, FieldError> {
    let bpm = leading_int(raw)?;
    match u32::try_from(bpm) {
        Ok(bpm) if bpm > 0 => Ok(bpm),
        _ => Err(FieldError::OutOfRange(bpm)),
    }
}

/// Accepts RFC 3339 timestamps, "YYYY-MM-DD[Thh:mm:ss]", "YYYY-MM" and "YYYY".
fn parse_release_date(raw: &str) -> Result<NaiveDate, FieldError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    let head: String = raw.chars().take(10).collect();
    [head.clone(), format!("{head}-01"), format!("{head}-01-01")]
        .iter()
        .find_map(|candidate| NaiveDate::parse_from_str(candidate, "%Y-%m-%d").ok())
        .ok_or(FieldError::Date)
}
