//! Ranking a batch of releases for one book.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::policy::score_release_match;
use super::scoring_config::{ReleaseScoringConfig, SettingsSource};
use super::types::{BookMetadata, Release, ReleaseMatchScore};

/// `extra` keys written by the ranker.
pub mod annotations {
    pub const MATCH_SCORE: &str = "match_score";
    pub const MATCH_CONFIDENCE: &str = "match_confidence";
    pub const MATCH_BREAKDOWN: &str = "match_breakdown";
    pub const MATCH_REJECT_REASON: &str = "match_reject_reason";
}

/// A release together with the score it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRelease {
    pub release: Release,
    pub score: ReleaseMatchScore,
}

/// Record a score on the release so it travels with it downstream.
pub fn annotate_release(release: &mut Release, score: &ReleaseMatchScore) {
    let extra = &mut release.extra;
    extra.insert(annotations::MATCH_SCORE.to_string(), Value::from(score.score));
    extra.insert(
        annotations::MATCH_CONFIDENCE.to_string(),
        Value::from(score.confidence.as_str()),
    );
    extra.insert(
        annotations::MATCH_BREAKDOWN.to_string(),
        Value::Object(
            score
                .breakdown
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(*v)))
                .collect(),
        ),
    );
    match &score.reject_reason {
        Some(reason) => {
            extra.insert(
                annotations::MATCH_REJECT_REASON.to_string(),
                Value::from(reason.to_string()),
            );
        }
        None => {
            extra.remove(annotations::MATCH_REJECT_REASON);
        }
    }
}

/// Score every release for a book and order them best first.
///
/// Every release is annotated. Equal scores keep their input order.
pub fn rank_releases_for_book(
    book: &BookMetadata,
    releases: Vec<Release>,
    config: &ReleaseScoringConfig,
) -> Vec<RankedRelease> {
    let mut ranked: Vec<RankedRelease> = releases
        .into_iter()
        .map(|mut release| {
            let score = score_release_match(book, &release, config);
            annotate_release(&mut release, &score);
            RankedRelease { release, score }
        })
        .collect();

    // Vec::sort_by is stable.
    ranked.sort_by(|a, b| b.score.score.cmp(&a.score.score));

    let rejected = ranked.iter().filter(|r| r.score.hard_reject).count();
    info!(
        book = %book.title,
        releases = ranked.len(),
        rejected,
        best = ranked.first().map(|r| r.score.score).unwrap_or(0),
        "Ranked releases"
    );

    ranked
}

/// Ranks releases with tunables read fresh from a settings source.
pub struct ReleaseMatcher<S> {
    settings: S,
}

impl<S: SettingsSource> ReleaseMatcher<S> {
    pub fn new(settings: S) -> Self {
        Self { settings }
    }

    /// Load the tunables for one batch.
    pub fn scoring_config(&self) -> ReleaseScoringConfig {
        ReleaseScoringConfig::from_settings(&self.settings)
    }

    /// Rank a batch. The settings are read once, so every release in the
    /// batch is scored under the same tunables.
    pub fn rank(&self, book: &BookMetadata, releases: Vec<Release>) -> Vec<RankedRelease> {
        let config = self.scoring_config();
        rank_releases_for_book(book, releases, &config)
    }
}

/// When the top ranked release may be grabbed without asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoDownloadConfig {
    #[serde(default = "default_auto_download_enabled")]
    pub enabled: bool,
    /// Minimum score the top release needs.
    #[serde(default = "default_auto_download_min_score")]
    pub min_score: u32,
}

fn default_auto_download_enabled() -> bool {
    true
}

fn default_auto_download_min_score() -> u32 {
    60
}

impl Default for AutoDownloadConfig {
    fn default() -> Self {
        Self {
            enabled: default_auto_download_enabled(),
            min_score: default_auto_download_min_score(),
        }
    }
}

/// The release to download automatically, if the best one qualifies.
pub fn select_auto_download<'a>(
    ranked: &'a [RankedRelease],
    config: &AutoDownloadConfig,
) -> Option<&'a RankedRelease> {
    if !config.enabled {
        return None;
    }
    ranked
        .first()
        .filter(|top| !top.score.hard_reject && top.score.score >= config.min_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::types::RejectReason;
    use serde_json::{json, Map};
    use std::collections::BTreeMap;

    fn book() -> BookMetadata {
        BookMetadata {
            authors: vec!["Will Wight".to_string()],
            ..BookMetadata::new("Cradle")
        }
    }

    fn ranked(title: &str, score: u32, hard_reject: bool) -> RankedRelease {
        let breakdown = BTreeMap::from([("title".to_string(), score as i32)]);
        RankedRelease {
            release: Release::new(title),
            score: if hard_reject {
                ReleaseMatchScore::rejected(score, breakdown, RejectReason::LowTitleMatch)
            } else {
                ReleaseMatchScore::accepted(score, breakdown)
            },
        }
    }

    #[test]
    fn test_annotate_release_writes_all_fields() {
        let mut release = Release::new("Cradle");
        let score = ReleaseMatchScore::rejected(
            12,
            BTreeMap::from([("title".to_string(), 12), ("author".to_string(), 0)]),
            RejectReason::LowTitleMatch,
        );
        annotate_release(&mut release, &score);

        assert_eq!(release.extra["match_score"], json!(12));
        assert_eq!(release.extra["match_confidence"], json!("none"));
        assert_eq!(release.extra["match_breakdown"], json!({"title": 12, "author": 0}));
        assert_eq!(release.extra["match_reject_reason"], json!("low_title_match"));
    }

    #[test]
    fn test_annotate_release_clears_stale_reject_reason() {
        let mut release = Release::new("Cradle");
        release
            .extra
            .insert("match_reject_reason".to_string(), json!("low_title_match"));
        let score = ReleaseMatchScore::accepted(80, BTreeMap::from([("title".to_string(), 80)]));
        annotate_release(&mut release, &score);
        assert!(!release.extra.contains_key("match_reject_reason"));
        assert_eq!(release.extra["match_confidence"], json!("high"));
    }

    #[test]
    fn test_rank_empty_batch() {
        let ranked = rank_releases_for_book(&book(), vec![], &ReleaseScoringConfig::default());
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_rank_keeps_input_order_for_ties() {
        let releases = vec![
            Release::new("Cradle [EPUB]"),
            Release::new("Unrelated Thing"),
            Release::new("Cradle (Retail)"),
        ];
        let ranked = rank_releases_for_book(&book(), releases, &ReleaseScoringConfig::default());
        assert_eq!(ranked[0].release.title, "Cradle [EPUB]");
        assert_eq!(ranked[1].release.title, "Cradle (Retail)");
        assert_eq!(ranked[2].release.title, "Unrelated Thing");
        assert_eq!(ranked[0].score.score, ranked[1].score.score);
    }

    #[test]
    fn test_matcher_reads_settings_source() {
        let mut settings = Map::new();
        settings.insert("forbidden_words".to_string(), json!("retail"));
        let matcher = ReleaseMatcher::new(settings);

        let ranked = matcher.rank(
            &book(),
            vec![Release::new("Cradle (Retail)"), Release::new("Cradle [EPUB]")],
        );
        assert_eq!(ranked[0].release.title, "Cradle [EPUB]");
        assert_eq!(
            ranked[1].score.reject_reason,
            Some(RejectReason::Forbidden("retail".to_string()))
        );
    }

    #[test]
    fn test_select_auto_download() {
        let config = AutoDownloadConfig::default();
        let list = vec![ranked("a", 90, false), ranked("b", 70, false)];
        assert_eq!(select_auto_download(&list, &config).map(|r| r.release.title.as_str()), Some("a"));

        let list = vec![ranked("a", 50, false)];
        assert!(select_auto_download(&list, &config).is_none());

        let list = vec![ranked("a", 90, true)];
        assert!(select_auto_download(&list, &config).is_none());

        let disabled = AutoDownloadConfig {
            enabled: false,
            ..Default::default()
        };
        let list = vec![ranked("a", 90, false)];
        assert!(select_auto_download(&list, &disabled).is_none());
        assert!(select_auto_download(&[], &config).is_none());
    }
}
