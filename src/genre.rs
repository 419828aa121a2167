/// Minimum similarity for a fuzzy genre match. Tuning knob, overridable via config.
pub const DEFAULT_GENRE_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Resolve a free-text genre tag against the reference genre list.
///
/// An exact match wins outright. Otherwise the best [`similarity`] score is
/// accepted if it reaches `threshold`; the first entry wins ties.
pub fn match_genre<'a>(raw: &str, genres: &'a [String], threshold: f64) -> Option<&'a str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(exact) = genres.iter().find(|g| g.as_str() == raw) {
        return Some(exact.as_str());
    }

    let mut best: Option<(&str, f64)> = None;
    for genre in genres {
        let score = similarity(raw, genre);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((genre.as_str(), score));
        }
    }

    match best {
        Some((genre, score)) if score >= threshold => {
            log::debug!("Genre \"{}\" matched \"{}\" (score {:.2})", raw, genre, score);
            Some(genre)
        }
        Some((genre, score)) => {
            log::debug!(
                "Genre \"{}\" rejected, best candidate \"{}\" scored {:.2}",
                raw,
                genre,
                score
            );
            None
        }
        None => None,
    }
}

/// Case-insensitive similarity in 0..=1.
///
/// Symmetric Monge-Elkan over whitespace tokens with Jaro-Winkler as the
/// inner measure, so "Psychedelic" lands near "Psy Trance" through the shared
/// "psy" prefix while a long unrelated phrase stays low.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = tokens(a);
    let b = tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    (monge_elkan(&a, &b) + monge_elkan(&b, &a)) / 2.0
}

fn tokens(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_lowercase).collect()
}

/// Mean over `from` of each token's best match in `to`.
fn monge_elkan(from: &[String], to: &[String]) -> f64 {
    let total: f64 = from
        .iter()
        .map(|x| {
            to.iter()
                .map(|y| strsim::jaro_winkler(x, y))
                .fold(0.0, f64::max)
        })
        .sum();
    total / from.len() as f64
}

/// Built-in reference genres, used when the config does not provide its own list.
pub fn builtin_genres() -> Vec<String> {
    [
        "Ambient", "Bass House", "Big Room", "Breakbeat", "Chill Out", "Dance", "Deep House",
        "Drum & Bass", "Dubstep", "Electro House", "Electronica", "Future Bass", "Future House",
        "Hardstyle", "Hip-Hop", "House", "Indie Dance", "Melodic House", "Minimal", "Pop",
        "Progressive House", "Psy Trance", "R&B", "Rock", "Tech House", "Techno", "Trance",
        "Trap", "UK Garage",
    ]
    .iter()
    .map(|g| g.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<String> {
        ["Psy Trance", "Trance", "House", "Drum & Bass"]
            .iter()
            .map(|g| g.to_string())
            .collect()
    }

    #[test]
    fn test_exact_match() {
        let genres = catalog();
        assert_eq!(match_genre("Trance", &genres, 0.6), Some("Trance"));
    }

    #[test]
    fn test_fuzzy_match_above_threshold() {
        let genres = catalog();
        assert_eq!(match_genre("Psychedelic", &genres, 0.6), Some("Psy Trance"));
    }

    #[test]
    fn test_case_only_difference_matches() {
        let genres = catalog();
        assert_eq!(match_genre("house", &genres, 0.6), Some("House"));
    }

    #[test]
    fn test_unrelated_rejected() {
        let genres = catalog();
        assert_eq!(match_genre("Completely Unrelated Word", &genres, 0.6), None);
    }

    #[test]
    fn test_threshold_is_respected() {
        let genres = catalog();
        assert_eq!(match_genre("Psychedelic", &genres, 0.95), None);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(match_genre("  ", &catalog(), 0.6), None);
        assert_eq!(match_genre("House", &[], 0.6), None);
    }

    #[test]
    fn test_similarity_bounds() {
        assert!((similarity("Trance", "trance") - 1.0).abs() < 1e-9);
        assert!(similarity("abc", "xyz") < 0.1);
        assert_eq!(similarity("", "House"), 0.0);
    }

    #[test]
    fn test_similarity_ignores_token_order() {
        assert!((similarity("Trance Psy", "Psy Trance") - 1.0).abs() < 1e-9);
    }
}
