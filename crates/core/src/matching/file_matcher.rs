//! Matching downloaded filenames back to known book titles.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize::normalize;
use super::similarity::sequence_ratio;

const SAME_MARKER_BONUS: f64 = 0.1;
const DIFFERENT_MARKER_PENALTY: f64 = 0.3;

/// Longest trailing segment treated as a file extension.
const MAX_EXTENSION_CHARS: usize = 5;

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)|\{[^}]*\}").expect("valid bracket pattern"));

static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:arc|book|bk|vol|volume|part)\s*(\d+)\b").expect("valid marker pattern")
});

/// Configuration for the filename matcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FileMatcherConfig {
    /// Minimum similarity (0.0-1.0) for a title to count as matched.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
}

fn default_min_similarity() -> f64 {
    0.6
}

impl Default for FileMatcherConfig {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
        }
    }
}

/// Best title found for a filename.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMatch {
    /// Position of the title in the candidate list.
    pub index: usize,
    pub title: String,
    pub score: f64,
}

/// Heuristic filename to title matcher.
pub struct FileMatcher {
    config: FileMatcherConfig,
}

impl Default for FileMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FileMatcher {
    pub fn new() -> Self {
        Self {
            config: FileMatcherConfig::default(),
        }
    }

    pub fn with_config(config: FileMatcherConfig) -> Self {
        Self { config }
    }

    /// Similarity between a filename and one title (0.0-1.0).
    pub fn similarity(&self, filename: &str, title: &str) -> f64 {
        let file = clean_filename(filename);
        let title = normalize(title);
        if file.is_empty() || title.is_empty() {
            return 0.0;
        }

        let mut score = sequence_ratio(&file, &title);
        if let (Some(a), Some(b)) = (marker_number(&file), marker_number(&title)) {
            if a == b {
                score += SAME_MARKER_BONUS;
            } else {
                score -= DIFFERENT_MARKER_PENALTY;
            }
        }
        score.clamp(0.0, 1.0)
    }

    /// Best scoring title at or above the configured threshold.
    ///
    /// Ties go to the earlier title.
    pub fn best_match<S: AsRef<str>>(&self, filename: &str, titles: &[S]) -> Option<FileMatch> {
        let mut best: Option<FileMatch> = None;
        for (index, title) in titles.iter().enumerate() {
            let title = title.as_ref();
            let score = self.similarity(filename, title);
            if score < self.config.min_similarity {
                continue;
            }
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(FileMatch {
                    index,
                    title: title.to_string(),
                    score,
                });
            }
        }

        debug!(
            filename,
            matched = best.as_ref().map(|m| m.title.as_str()),
            "Matched filename"
        );
        best
    }
}

/// Filename without extension and bracketed tags, normalized.
pub fn clean_filename(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.chars().count() <= MAX_EXTENSION_CHARS
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && !ext.chars().all(|c| c.is_ascii_digit()) =>
        {
            stem
        }
        _ => name,
    };
    normalize(&BRACKETED.replace_all(stem, " "))
}

fn marker_number(normalized: &str) -> Option<u32> {
    MARKER
        .captures(normalized)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
