//! Series / volume number extraction from noisy text and structured fields.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;

use super::normalize::{normalize, token_spans, tokens};
use super::types::{BookMetadata, Release};

/// Cardinal and ordinal number words.
pub(crate) const NUMBER_WORDS: &[(&str, f64)] = &[
    ("zero", 0.0),
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("first", 1.0),
    ("second", 2.0),
    ("third", 3.0),
    ("fourth", 4.0),
    ("fifth", 5.0),
    ("sixth", 6.0),
    ("seventh", 7.0),
    ("eighth", 8.0),
    ("ninth", 9.0),
    ("tenth", 10.0),
];

pub(crate) const ROMAN_NUMERALS: &[(&str, f64)] = &[
    ("i", 1.0),
    ("ii", 2.0),
    ("iii", 3.0),
    ("iv", 4.0),
    ("v", 5.0),
    ("vi", 6.0),
    ("vii", 7.0),
    ("viii", 8.0),
    ("ix", 9.0),
    ("x", 10.0),
    ("xi", 11.0),
    ("xii", 12.0),
];

/// Largest number accepted right after a series name; larger ones are years.
const MAX_ANCHORED_NUMBER: f64 = 200.0;

const NUM_TOKEN: &str = r"\d+(?:\.\d+)?|zero|one|two|three|four|five|six|seven|eight|nine|ten|first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth|[ivxlc]+";

static MARKER_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:\b(?:book|bk|volume|vol|part)\s*#?\s*|#\s*)({})\b",
        NUM_TOKEN
    ))
    .expect("valid marker pattern")
});

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^[\s:,;.(\[_~-]*(?:(?:book|bk|volume|vol|part|number|no)\b\.?\s*)?#?\s*({})\b",
        NUM_TOKEN
    ))
    .expect("valid leading number pattern")
});

/// Structured release fields that carry a series position.
const RELEASE_NUMBER_FIELDS: &[&str] = &[
    "series_position",
    "series_number",
    "seriesnumber",
    "book_number",
    "volume_number",
];

/// Torznab attributes that carry a series position.
const TORZNAB_NUMBER_FIELDS: &[&str] = &["seriesnumber", "series_number", "booknumber", "volume"];

/// Convert a single token to a number: words, roman numerals, then digits.
pub fn word_to_number(token: &str) -> Option<f64> {
    let token = token.trim().to_lowercase();
    if token.is_empty() {
        return None;
    }

    NUMBER_WORDS
        .iter()
        .chain(ROMAN_NUMERALS)
        .find(|(word, _)| *word == token)
        .map(|(_, n)| *n)
        .or_else(|| token.parse::<f64>().ok().filter(|n| n.is_finite()))
}

/// First `book 4` / `vol. iii` / `#4.5` style number in the text.
///
/// The raw text is tried first so decimals survive; the normalized text
/// catches markers glued to punctuation such as `Book_4`.
pub fn extract_series_number(text: &str) -> Option<f64> {
    first_marker_number(text).or_else(|| first_marker_number(&normalize(text)))
}

fn first_marker_number(text: &str) -> Option<f64> {
    MARKER_NUMBER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| word_to_number(m.as_str()))
}

/// Number directly following the series name in a release title.
///
/// `"Dungeon Life 4: An Isekai LitRPG"` with series `"Dungeon Life"` yields 4.
pub fn extract_series_number_after_series_name(series_name: &str, release_title: &str) -> Option<f64> {
    let series = tokens(series_name);
    if series.is_empty() {
        return None;
    }
    let spans = token_spans(release_title);
    if spans.len() < series.len() {
        return None;
    }

    let end = (0..=spans.len() - series.len()).find_map(|start| {
        let window = &spans[start..start + series.len()];
        window
            .iter()
            .zip(&series)
            .all(|((token, _), wanted)| token == wanted)
            .then(|| window[window.len() - 1].1.end)
    })?;

    let caps = LEADING_NUMBER.captures(&release_title[end..])?;
    let number = word_to_number(caps.get(1)?.as_str())?;
    (number <= MAX_ANCHORED_NUMBER).then_some(number)
}

/// Read a number out of a structured JSON field.
pub(crate) fn value_to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => word_to_number(s).or_else(|| extract_series_number(s)),
        _ => None,
    }
}

/// Series number a release claims, from the most to the least reliable signal.
pub fn release_series_number(release: &Release, series_name: Option<&str>) -> Option<f64> {
    RELEASE_NUMBER_FIELDS
        .iter()
        .find_map(|key| release.extra_value(key).and_then(value_to_number))
        .or_else(|| {
            TORZNAB_NUMBER_FIELDS
                .iter()
                .find_map(|key| release.torznab_attr(key).and_then(value_to_number))
        })
        .or_else(|| extract_series_number(&release.title))
        .or_else(|| {
            series_name.and_then(|name| extract_series_number_after_series_name(name, &release.title))
        })
}

/// Series number the book is looking for.
pub fn book_series_number(book: &BookMetadata) -> Option<f64> {
    book.series_position.filter(|n| n.is_finite()).or_else(|| {
        std::iter::once(Some(book.title.as_str()))
            .chain([book.search_title.as_deref(), book.subtitle.as_deref()])
            .flatten()
            .find_map(extract_series_number)
    })
}
