//! Independent field scorers.
//!
//! Each scorer compares one aspect of a release with the book and returns an
//! integer contribution. The constants are tuned against real tracker
//! listings and are kept exactly as they are.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;

use super::normalize::{contains_whole_words, distinctive_set, normalize, tokens, STOP_WORDS};
use super::numbers::{book_series_number, release_series_number, value_to_number, NUMBER_WORDS, ROMAN_NUMERALS};
use super::scoring_config::{normalize_format_id, normalize_source_id, parse_bool, ReleaseScoringConfig};
use super::similarity::{sequence_ratio, token_overlap};
use super::types::{BookMetadata, Release};

/// Full credit for an exact or whole-word title match.
pub const TITLE_FULL_MATCH: i32 = 60;
/// Ceiling for titles made only of generic words and numbers.
pub const LOW_INFORMATION_TITLE_CAP: i32 = 20;
/// Title score from which a match counts as strong on its own.
pub const STRONG_TITLE_SCORE: i32 = 34;
/// Series name found verbatim in the release.
pub const SERIES_NAME_FULL_MATCH: i32 = 10;

const SERIES_NUMBER_MATCH: i32 = 22;
const SERIES_NUMBER_ADJACENT: i32 = -60;
const SERIES_NUMBER_MISMATCH: i32 = -75;

const YEAR_MISMATCH: i32 = -15;
const FREELEECH_OR_DIRECT_BONUS: i32 = 10;
const FORMAT_RANK_STEP: i32 = 5;
/// Boost by the rank of the best matching source/indexer entry.
const INDEXER_PRIORITY_BOOSTS: [i32; 5] = [12, 9, 6, 3, 1];

/// Longest `"Title - "` prefix that still counts as a title.
const MAX_TITLE_PREFIX_CHARS: usize = 60;

/// `(min ratio, min overlap, score)`, first satisfied step wins.
const TITLE_STEPS: &[(f64, f64, i32)] = &[
    (0.98, 0.0, 58),
    (0.92, 0.55, 52),
    (0.85, 0.45, 44),
    (0.78, 0.35, 34),
    (0.70, 0.25, 24),
];

const AUTHOR_STEPS: &[(f64, i32)] = &[(0.98, 30), (0.9, 24), (0.8, 18), (0.7, 12), (0.6, 8)];

const EXTRA_LOW_INFORMATION_WORDS: &[&str] = &["bk", "vol", "volume", "part", "edition"];

static AUTHOR_DELIMITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:[,;|/&]|\band\b)\s*").expect("valid author delimiter pattern"));

static TITLE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").expect("valid year pattern"));

// =============================================================================
// Title
// =============================================================================

/// Normalized titles the book may be listed under.
pub fn title_candidates(book: &BookMetadata) -> Vec<String> {
    let mut raw: Vec<String> = vec![book.title.clone()];
    if let Some(subtitle) = book.subtitle.as_deref().filter(|s| !s.trim().is_empty()) {
        raw.push(format!("{} {}", book.title, subtitle));
    }
    raw.extend(book.search_title.clone());
    raw.extend(book.titles_by_language.values().cloned());

    let mut candidates: Vec<String> = Vec::new();
    for candidate in raw.iter().map(|t| normalize(t)) {
        if !candidate.is_empty() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// True when a title is at most three tokens of generic words or numbers.
pub fn is_low_information_title(title: &str) -> bool {
    let toks = tokens(title);
    !toks.is_empty()
        && toks.len() <= 3
        && toks.iter().all(|t| {
            t.chars().all(|c| c.is_ascii_digit())
                || STOP_WORDS.contains(&t.as_str())
                || EXTRA_LOW_INFORMATION_WORDS.contains(&t.as_str())
                || NUMBER_WORDS.iter().chain(ROMAN_NUMERALS).any(|(w, _)| w == t)
        })
}

fn score_title_candidate(candidate: &str, release_title: &str, release_distinctive: &HashSet<String>) -> i32 {
    if distinctive_set(candidate).is_disjoint(release_distinctive) {
        return 0;
    }

    let score = if candidate == release_title || contains_whole_words(release_title, candidate) {
        TITLE_FULL_MATCH
    } else {
        let ratio = sequence_ratio(candidate, release_title);
        let overlap = token_overlap(candidate, release_title);
        TITLE_STEPS
            .iter()
            .find(|(min_ratio, min_overlap, _)| ratio >= *min_ratio && overlap >= *min_overlap)
            .map(|(_, _, score)| *score)
            .unwrap_or(0)
    };

    if is_low_information_title(candidate) {
        score.min(LOW_INFORMATION_TITLE_CAP)
    } else {
        score
    }
}

/// Best title score over every candidate title (0–60).
pub fn score_title(book: &BookMetadata, release: &Release) -> i32 {
    let release_title = normalize(&release.title);
    let release_distinctive = distinctive_set(&release_title);

    title_candidates(book)
        .iter()
        .map(|c| score_title_candidate(c, &release_title, &release_distinctive))
        .max()
        .unwrap_or(0)
}

/// Whether any candidate title shares a distinctive token with the release.
pub fn has_distinctive_title_overlap(book: &BookMetadata, release: &Release) -> bool {
    let release_distinctive = distinctive_set(&release.title);
    title_candidates(book)
        .iter()
        .any(|c| !distinctive_set(c).is_disjoint(&release_distinctive))
}

// =============================================================================
// Author
// =============================================================================

fn author_field(value: &Value) -> Option<String> {
    let author = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    };
    (!author.is_empty()).then_some(author)
}

/// Author string the release claims, if any can be found.
pub fn release_author(release: &Release) -> Option<String> {
    release
        .extra_value("author")
        .and_then(author_field)
        .or_else(|| release.torznab_attr("author").and_then(author_field))
        .or_else(|| {
            let (prefix, suffix) = release.title.split_once(" - ")?;
            let suffix = suffix.trim();
            (prefix.chars().count() < MAX_TITLE_PREFIX_CHARS && !suffix.is_empty())
                .then(|| suffix.to_string())
        })
}

/// The full author string plus each name in a multi-author credit.
fn author_variants(author: &str) -> Vec<String> {
    let mut variants = vec![normalize(author)];
    variants.extend(AUTHOR_DELIMITERS.split(author).map(normalize));
    variants.retain(|v| !v.is_empty());
    variants.dedup();
    variants
}

fn book_authors(book: &BookMetadata) -> Vec<String> {
    book.search_author
        .iter()
        .chain(&book.authors)
        .map(|a| normalize(a))
        .filter(|a| !a.is_empty())
        .collect()
}

/// Whether the book has any author to compare against.
pub fn book_has_author(book: &BookMetadata) -> bool {
    !book_authors(book).is_empty()
}

fn author_similarity(a: &str, b: &str) -> f64 {
    sequence_ratio(a, b).max(token_overlap(a, b))
}

/// Author score (0–30). Zero when either side has no author.
pub fn score_author(book: &BookMetadata, release: &Release) -> i32 {
    let Some(claimed) = release_author(release) else {
        return 0;
    };
    let wanted = book_authors(book);
    let best = author_variants(&claimed)
        .iter()
        .flat_map(|variant| wanted.iter().map(move |w| author_similarity(variant, w)))
        .fold(0.0_f64, f64::max);

    AUTHOR_STEPS
        .iter()
        .find(|(min, _)| best >= *min)
        .map(|(_, score)| *score)
        .unwrap_or(0)
}

// =============================================================================
// Series
// =============================================================================

/// Series name score (0, 3, 6 or 10).
pub fn score_series_name(book: &BookMetadata, release: &Release) -> i32 {
    let series = book.series_name.as_deref().map(normalize).unwrap_or_default();
    if series.is_empty() {
        return 0;
    }

    let mut targets = vec![normalize(&release.title)];
    targets.extend(
        [release.extra_value("series"), release.torznab_attr("series")]
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(normalize)
            .filter(|s| !s.is_empty()),
    );

    if targets.iter().any(|t| contains_whole_words(t, &series)) {
        return SERIES_NAME_FULL_MATCH;
    }

    let best = targets
        .iter()
        .map(|t| sequence_ratio(&series, t))
        .fold(0.0_f64, f64::max);
    if best >= 0.9 {
        6
    } else if best >= 0.8 {
        3
    } else {
        0
    }
}

/// Series number score: +22 exact, −60 adjacent, −75 otherwise, 0 if unknown.
pub fn score_series_number(book: &BookMetadata, release: &Release) -> i32 {
    let Some(wanted) = book_series_number(book) else {
        return 0;
    };
    let Some(found) = release_series_number(release, book.series_name.as_deref()) else {
        return 0;
    };

    let delta = (wanted - found).abs();
    if delta < 0.001 {
        SERIES_NUMBER_MATCH
    } else if delta <= 1.0 {
        SERIES_NUMBER_ADJACENT
    } else {
        SERIES_NUMBER_MISMATCH
    }
}

// =============================================================================
// Year
// =============================================================================

fn year_field(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => TITLE_YEAR
            .captures(s)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok()),
        _ => None,
    }
}

/// Publication year the release claims.
pub fn release_year(release: &Release) -> Option<i32> {
    release
        .extra_value("year")
        .and_then(year_field)
        .or_else(|| release.torznab_attr("year").and_then(year_field))
        .or_else(|| {
            TITLE_YEAR
                .captures(&release.title)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok())
        })
}

/// Year score, or `None` when either year is unknown.
pub fn score_year(book: &BookMetadata, release: &Release) -> Option<i32> {
    let wanted = book.publish_year?;
    let found = release_year(release)?;
    Some(match wanted.abs_diff(found) {
        0 => 10,
        1 => 6,
        2 => 3,
        _ => YEAR_MISMATCH,
    })
}

// =============================================================================
// Forbidden terms
// =============================================================================

/// First configured forbidden term found anywhere in the normalized title.
///
/// Plain substring match: `sample` also catches `Samples`.
pub fn find_forbidden_term<'a>(release: &Release, config: &'a ReleaseScoringConfig) -> Option<&'a str> {
    let title = normalize(&release.title);
    config
        .forbidden_words
        .iter()
        .find(|term| {
            let term = normalize(term);
            !term.is_empty() && title.contains(&term)
        })
        .map(String::as_str)
}

// =============================================================================
// Tie-breaks
// =============================================================================

/// Format preference bonus; earlier ranks earn more.
pub fn score_format_priority(release: &Release, config: &ReleaseScoringConfig) -> i32 {
    let priority = config.format_priority(release.content_type());
    release
        .format
        .as_deref()
        .map(normalize_format_id)
        .and_then(|format| priority.rank(&format))
        .map(|rank| (priority.len() - rank) as i32 * FORMAT_RANK_STEP)
        .unwrap_or(0)
}

/// Flat bonus for direct downloads and freeleech torrents when preferred.
pub fn score_freeleech_or_direct(release: &Release, config: &ReleaseScoringConfig) -> i32 {
    if !config.prefer_freeleech_or_direct {
        return 0;
    }

    let direct = release
        .source
        .as_deref()
        .map(normalize_source_id)
        .is_some_and(|s| s == "direct_download");
    let freeleech = release
        .extra_value("freeleech")
        .and_then(parse_bool)
        .unwrap_or(false)
        || release
            .torznab_attr("downloadvolumefactor")
            .and_then(value_to_number)
            .is_some_and(|factor| factor == 0.0);

    if direct || freeleech {
        FREELEECH_OR_DIRECT_BONUS
    } else {
        0
    }
}

/// Priority lookup keys for a release, prefixed and legacy bare forms.
pub fn release_priority_keys(release: &Release) -> Vec<String> {
    let mut keys = Vec::new();
    for (prefix, value) in [("indexer", &release.indexer), ("source", &release.source)] {
        let Some(name) = value.as_deref().map(normalize_source_id).filter(|n| !n.is_empty()) else {
            continue;
        };
        keys.push(format!("{}:{}", prefix, name));
        keys.push(name);
    }
    keys
}

/// Boost for the best-ranked configured source or indexer.
pub fn score_indexer_priority(release: &Release, config: &ReleaseScoringConfig) -> i32 {
    let priority = config.release_priority(release.content_type());
    release_priority_keys(release)
        .iter()
        .filter_map(|key| priority.rank(key))
        .min()
        .and_then(|rank| INDEXER_PRIORITY_BOOSTS.get(rank).copied())
        .unwrap_or(0)
}
