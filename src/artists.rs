use regex::Regex;
use std::sync::LazyLock;

use crate::model::{ArtistRole, ExtractedArtist};
use crate::text;

/// Artist separators, strongest first. A string is split on every
/// occurrence of the first separator it contains, and each piece is
/// examined again.
pub const SEPARATORS: &[&str] = &["vs.", "&", ",", " and ", " x "];

// "feat." / "ft." as whole tokens ("Left." is not a marker).
pub(crate) static FEATURING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:feat|ft)\.").unwrap());

// "EDX's Paris at Night" → name "EDX", suffix "'s Paris at Night"
static POSSESSIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)(?P<suffix>['’]s\s+\S.*)$").unwrap()
});

/// Splits raw artist strings ("A, B feat. C") into individual names.
#[derive(Debug, Clone, Default)]
pub struct ArtistNameSplitter {
    /// Names that contain a separator but must stay whole, e.g. "Lilly Wood & The Prick".
    known_artists: Vec<String>,
}

impl ArtistNameSplitter {
    pub fn new<S: AsRef<str>>(known_artists: &[S]) -> Self {
        Self {
            known_artists: known_artists
                .iter()
                .map(|a| a.as_ref().trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    pub fn known_artists(&self) -> &[String] {
        &self.known_artists
    }

    /// Split `raw` into artists tagged with `role`; anything after a
    /// featuring marker is tagged as featuring instead.
    pub fn extract(&self, raw: &str, role: ArtistRole) -> Vec<ExtractedArtist> {
        let mut artists = Vec::new();
        // Stack of pieces still to examine; pushed in reverse so output keeps input order.
        let mut pending: Vec<(String, ArtistRole)> = vec![(raw.to_string(), role)];

        while let Some((piece, role)) = pending.pop() {
            if self.is_known(&piece) {
                push_normalized(&mut artists, &piece, role, None);
                continue;
            }

            let protected = self.protected_spans(&piece);

            if let Some(m) = FEATURING_RE
                .find_iter(&piece)
                .find(|m| !is_protected(&protected, m.start(), m.end()))
            {
                pending.push((piece[m.end()..].to_string(), ArtistRole::Featuring));
                pending.push((piece[..m.start()].to_string(), role));
                continue;
            }

            if let Some(segments) = split_on_first_separator(&piece, &protected) {
                pending.extend(segments.into_iter().rev().map(|s| (s, role)));
                continue;
            }

            match POSSESSIVE_RE.captures(piece.trim()) {
                Some(caps) => {
                    let suffix = normalize(&caps["suffix"]);
                    push_normalized(&mut artists, &caps["name"], role, Some(suffix));
                }
                None => push_normalized(&mut artists, &piece, role, None),
            }
        }

        artists
    }

    fn is_known(&self, piece: &str) -> bool {
        let trimmed = normalize(piece);
        self.known_artists
            .iter()
            .any(|known| known.eq_ignore_ascii_case(&trimmed))
    }

    /// Byte ranges of `piece` covered by a known artist name.
    fn protected_spans(&self, piece: &str) -> Vec<(usize, usize)> {
        let lower = piece.to_ascii_lowercase();
        let mut spans = Vec::new();
        for known in &self.known_artists {
            let needle = known.to_ascii_lowercase();
            for (start, _) in lower.match_indices(&needle) {
                spans.push((start, start + needle.len()));
            }
        }
        spans
    }
}

fn is_protected(spans: &[(usize, usize)], start: usize, end: usize) -> bool {
    spans.iter().any(|&(s, e)| s <= start && end <= e)
}

/// Split on every unprotected occurrence of the strongest separator present.
fn split_on_first_separator(piece: &str, protected: &[(usize, usize)]) -> Option<Vec<String>> {
    let lower = piece.to_ascii_lowercase();
    for sep in SEPARATORS {
        let cuts: Vec<usize> = lower
            .match_indices(sep)
            .map(|(i, _)| i)
            .filter(|&i| !is_protected(protected, i, i + sep.len()))
            .collect();
        if cuts.is_empty() {
            continue;
        }

        let mut segments = Vec::with_capacity(cuts.len() + 1);
        let mut from = 0;
        for cut in cuts {
            segments.push(piece[from..cut].to_string());
            from = cut + sep.len();
        }
        segments.push(piece[from..].to_string());
        return Some(segments);
    }
    None
}

/// Drop nulls and stray brackets, collapse whitespace.
fn normalize(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '\0' | '(' | ')' | '[' | ']' | '{' | '}'))
        .collect();
    text::tidy(&cleaned)
}

fn push_normalized(
    artists: &mut Vec<ExtractedArtist>,
    raw: &str,
    role: ArtistRole,
    suffix: Option<String>,
) {
    let name = normalize(raw);
    if name.is_empty() {
        return;
    }
    artists.push(ExtractedArtist {
        name,
        role,
        suffix: suffix.filter(|s| !s.is_empty()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(artists: &[ExtractedArtist]) -> Vec<&str> {
        artists.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_single_artist() {
        let splitter = ArtistNameSplitter::default();
        let artists = splitter.extract("  Feint ", ArtistRole::Primary);
        assert_eq!(artists, vec![ExtractedArtist::new("Feint", ArtistRole::Primary)]);
    }

    #[test]
    fn test_comma_split() {
        let splitter = ArtistNameSplitter::default();
        let artists = splitter.extract("Armin van Buuren, Sam Martin", ArtistRole::Primary);
        assert_eq!(names(&artists), vec!["Armin van Buuren", "Sam Martin"]);
        assert!(artists.iter().all(|a| a.role == ArtistRole::Primary));
    }

    #[test]
    fn test_all_separators_in_order() {
        let splitter = ArtistNameSplitter::default();
        let artists = splitter.extract("A vs. B & C, D and E x F", ArtistRole::Primary);
        assert_eq!(names(&artists), vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_word_separators_are_case_insensitive() {
        let splitter = ArtistNameSplitter::default();
        let artists = splitter.extract("Duke Dumont X Gorgon City AND Kaskade", ArtistRole::Primary);
        assert_eq!(names(&artists), vec!["Duke Dumont", "Gorgon City", "Kaskade"]);
    }

    #[test]
    fn test_separator_inside_word_is_not_split() {
        let splitter = ArtistNameSplitter::default();
        let artists = splitter.extract("Alexandra Stan", ArtistRole::Primary);
        assert_eq!(names(&artists), vec!["Alexandra Stan"]);
    }

    #[test]
    fn test_featuring_retags_tail() {
        let splitter = ArtistNameSplitter::default();
        let artists = splitter.extract("Martin Garrix feat. Khalid, Dua Lipa", ArtistRole::Primary);
        assert_eq!(
            artists,
            vec![
                ExtractedArtist::new("Martin Garrix", ArtistRole::Primary),
                ExtractedArtist::new("Khalid", ArtistRole::Featuring),
                ExtractedArtist::new("Dua Lipa", ArtistRole::Featuring),
            ]
        );
    }

    #[test]
    fn test_featuring_overrides_remixer_role() {
        let splitter = ArtistNameSplitter::default();
        let artists = splitter.extract("Tiesto ft. Ava Max", ArtistRole::Remixer);
        assert_eq!(
            artists,
            vec![
                ExtractedArtist::new("Tiesto", ArtistRole::Remixer),
                ExtractedArtist::new("Ava Max", ArtistRole::Featuring),
            ]
        );
    }

    #[test]
    fn test_featuring_marker_at_start() {
        let splitter = ArtistNameSplitter::default();
        let artists = splitter.extract("feat. Laura Brehm)", ArtistRole::Featuring);
        assert_eq!(artists, vec![ExtractedArtist::new("Laura Brehm", ArtistRole::Featuring)]);
    }

    #[test]
    fn test_known_artist_is_not_split() {
        let splitter = ArtistNameSplitter::new(&["Lilly Wood & The Prick"]);
        let artists = splitter.extract("Lilly Wood & The Prick and Robin Schulz", ArtistRole::Primary);
        assert_eq!(names(&artists), vec!["Lilly Wood & The Prick", "Robin Schulz"]);
    }

    #[test]
    fn test_without_known_artist_splits_everything() {
        let splitter = ArtistNameSplitter::default();
        let artists = splitter.extract("Lilly Wood & The Prick and Robin Schulz", ArtistRole::Primary);
        assert_eq!(names(&artists), vec!["Lilly Wood", "The Prick", "Robin Schulz"]);
    }

    #[test]
    fn test_known_artist_matches_case_insensitively() {
        let splitter = ArtistNameSplitter::new(&["Simon & Garfunkel"]);
        let artists = splitter.extract("simon & garfunkel", ArtistRole::Primary);
        assert_eq!(names(&artists), vec!["simon & garfunkel"]);
    }

    #[test]
    fn test_possessive_suffix() {
        let splitter = ArtistNameSplitter::default();
        let artists = splitter.extract("EDX's Paris at Night ", ArtistRole::Remixer);
        assert_eq!(
            artists,
            vec![ExtractedArtist {
                name: "EDX".to_string(),
                role: ArtistRole::Remixer,
                suffix: Some("'s Paris at Night".to_string()),
            }]
        );
    }

    #[test]
    fn test_empty_segments_dropped() {
        let splitter = ArtistNameSplitter::default();
        let artists = splitter.extract(", A,, ( ) ,B,", ArtistRole::Primary);
        assert_eq!(names(&artists), vec!["A", "B"]);
        assert!(splitter.extract("   ", ArtistRole::Primary).is_empty());
    }

    #[test]
    fn test_nulls_and_brackets_stripped() {
        let splitter = ArtistNameSplitter::default();
        let artists = splitter.extract("(Daft\0 Punk]", ArtistRole::Primary);
        assert_eq!(names(&artists), vec!["Daft Punk"]);
    }
}
