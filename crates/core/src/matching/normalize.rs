//! Text canonicalization shared by every scorer.

use std::collections::HashSet;
use std::ops::Range;

/// Generic words that never identify a particular book.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "of", "and", "book", "series", "audiobook", "audio", "litrpg", "adventure",
    "novel",
];

/// Lowercase, turn every non-alphanumeric run into one space, trim.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }

    out
}

/// Normalized tokens in order.
pub fn tokens(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tokens longer than two characters that are not stop words.
pub fn distinctive_tokens(text: &str) -> Vec<String> {
    tokens(text)
        .into_iter()
        .filter(|t| t.chars().count() > 2 && !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Distinctive tokens as a set.
pub(crate) fn distinctive_set(text: &str) -> HashSet<String> {
    distinctive_tokens(text).into_iter().collect()
}

/// Whole-word containment of one normalized string in another.
pub fn contains_whole_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    format!(" {} ", haystack).contains(&format!(" {} ", needle))
}

/// Normalized tokens with the byte range each one covers in `text`.
///
/// Joining the tokens with spaces yields `normalize(text)`.
pub fn token_spans(text: &str) -> Vec<(String, Range<usize>)> {
    let mut spans = Vec::new();
    let mut current: Option<(String, usize)> = None;

    for (idx, c) in text.char_indices() {
        if c.is_alphanumeric() {
            let (token, _) = current.get_or_insert_with(|| (String::new(), idx));
            token.extend(c.to_lowercase());
        } else if let Some((token, start)) = current.take() {
            spans.push((token, start..idx));
        }
    }
    if let Some((token, start)) = current {
        spans.push((token, start..text.len()));
    }

    spans
}
