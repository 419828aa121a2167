use regex::Regex;
use std::sync::LazyLock;

// Anything that looks like a link: explicit scheme/www prefix, or a dotted
// token ending in a common TLD (download-site watermarks in tags and filenames).
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        (?:https?://|www\.)[^\s()\[\]]+
        |
        \b[\w-]+(?:\.[\w-]+)*\.
        (?:com|net|org|info|biz|io|fm|me|to|tv|cc|co|ru|de|uk|eu|pl|fr|nl|xyz|club|online|site|top|pro|music|dj)
        \b(?:/[^\s()\[\]]*)?"
    )
    .unwrap()
});

// Parenthesised track numbers such as "(02)".
static DIGIT_GROUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\s*\d+\s*\)").unwrap());

static EMPTY_BRACKETS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\)|\[\s*\]").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Remove links and null characters, then tidy what is left.
pub fn strip_clutter(s: &str) -> String {
    // "feat.Me" and "ft.to" read like domains but are featuring markers
    let without_urls = URL_RE.replace_all(s, |caps: &regex::Captures| {
        let found = &caps[0];
        let lower = found.to_ascii_lowercase();
        if lower.starts_with("feat.") || lower.starts_with("ft.") {
            found.to_string()
        } else {
            String::new()
        }
    });
    let without_nulls = without_urls.replace('\0', "");
    tidy(&collapse_empty_brackets(&without_nulls))
}

pub fn strip_digit_groups(s: &str) -> String {
    DIGIT_GROUP_RE.replace_all(s, "").into_owned()
}

pub fn collapse_empty_brackets(s: &str) -> String {
    EMPTY_BRACKETS_RE.replace_all(s, "").into_owned()
}

/// Collapse whitespace runs to a single space and trim.
pub fn tidy(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}

/// True when every `(` and `[` is closed, in order, and nothing closes early.
pub fn is_bracket_balanced(s: &str) -> bool {
    let mut parens: i32 = 0;
    let mut squares: i32 = 0;
    for c in s.chars() {
        match c {
            '(' => parens += 1,
            ')' => parens -= 1,
            '[' => squares += 1,
            ']' => squares -= 1,
            _ => {}
        }
        if parens < 0 || squares < 0 {
            return false;
        }
    }
    parens == 0 && squares == 0
}

/// Drop every bracket that has no partner, keeping the text around it.
pub fn strip_unmatched_brackets(s: &str) -> String {
    let mut open: Vec<(usize, char)> = Vec::new();
    let mut unmatched: Vec<usize> = Vec::new();
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' => open.push((i, c)),
            ')' | ']' => match open.last() {
                Some(&(_, o)) if matching_open(c) == Some(o) => {
                    open.pop();
                }
                _ => unmatched.push(i),
            },
            _ => {}
        }
    }
    unmatched.extend(open.into_iter().map(|(i, _)| i));
    s.char_indices()
        .filter(|(i, _)| !unmatched.contains(i))
        .map(|(_, c)| c)
        .collect()
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

pub fn matching_open(close: char) -> Option<char> {
    match close {
        ')' => Some('('),
        ']' => Some('['),
        _ => None,
    }
}

fn matching_close(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        _ => None,
    }
}

/// Nearest unmatched opening bracket left of byte offset `pos`.
///
/// With `only = Some('(')` (or `'['`) just that bracket kind is considered.
pub fn open_bracket_before(s: &str, pos: usize, only: Option<char>) -> Option<(usize, char)> {
    let mut parens = 0;
    let mut squares = 0;
    for (i, c) in s[..pos].char_indices().rev() {
        if only.is_some_and(|kind| kind != c && matching_close(kind) != Some(c)) {
            continue;
        }
        match c {
            ')' => parens += 1,
            ']' => squares += 1,
            '(' if parens > 0 => parens -= 1,
            '[' if squares > 0 => squares -= 1,
            '(' | '[' => return Some((i, c)),
            _ => {}
        }
    }
    None
}

/// Byte offset of the bracket closing `open`, searching from `pos`.
pub fn close_bracket_after(s: &str, pos: usize, open: char) -> Option<usize> {
    let close = matching_close(open)?;
    let mut depth = 0;
    for (i, c) in s[pos..].char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            if depth == 0 {
                return Some(pos + i);
            }
            depth -= 1;
        }
    }
    None
}
