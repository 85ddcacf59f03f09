//! Gating policy combining the field scorers into one result.

use std::collections::BTreeMap;

use tracing::debug;

use super::scorers::{
    book_has_author, find_forbidden_term, has_distinctive_title_overlap, release_author,
    score_author, score_format_priority, score_freeleech_or_direct, score_indexer_priority,
    score_series_name, score_series_number, score_title, score_year, LOW_INFORMATION_TITLE_CAP,
    SERIES_NAME_FULL_MATCH, STRONG_TITLE_SCORE,
};
use super::scoring_config::ReleaseScoringConfig;
use super::types::{BookMetadata, RejectReason, Release, ReleaseMatchScore};

/// Breakdown entry of a forbidden-term rejection.
const FORBIDDEN_PENALTY: i32 = -100;
/// Deducted from the reported score of an author mismatch.
const AUTHOR_MISMATCH_PENALTY: i32 = -20;

/// Breakdown keys.
pub mod components {
    pub const FORBIDDEN: &str = "forbidden";
    pub const TITLE: &str = "title";
    pub const AUTHOR: &str = "author";
    pub const AUTHOR_MISMATCH: &str = "author_mismatch";
    pub const SERIES: &str = "series";
    pub const SERIES_NUMBER: &str = "series_number";
    pub const YEAR: &str = "year";
    pub const FORMAT_PRIORITY: &str = "format_priority";
    pub const FREELEECH_OR_DIRECT: &str = "freeleech_or_direct";
    pub const INDEXER_PRIORITY: &str = "indexer_priority";
}

fn total(breakdown: &BTreeMap<String, i32>) -> u32 {
    breakdown.values().sum::<i32>().max(0) as u32
}

/// Score one release against one book.
///
/// Stages run in order and the first failing gate returns a hard reject:
/// forbidden terms, low-information titles, the title floor, then the author
/// floor. Survivors collect series, year and tie-break contributions.
pub fn score_release_match(
    book: &BookMetadata,
    release: &Release,
    config: &ReleaseScoringConfig,
) -> ReleaseMatchScore {
    if let Some(term) = find_forbidden_term(release, config) {
        debug!(release = %release.title, term, "Rejected release with forbidden term");
        let breakdown = BTreeMap::from([(components::FORBIDDEN.to_string(), FORBIDDEN_PENALTY)]);
        return ReleaseMatchScore::rejected(0, breakdown, RejectReason::Forbidden(term.to_string()));
    }

    let title = score_title(book, release);
    let author = score_author(book, release);
    let mut breakdown = BTreeMap::from([
        (components::TITLE.to_string(), title),
        (components::AUTHOR.to_string(), author),
    ]);

    if title <= LOW_INFORMATION_TITLE_CAP && !has_distinctive_title_overlap(book, release) {
        return reject(release, breakdown, RejectReason::LowInformationTitleMatch);
    }

    if title < config.min_title_score {
        return reject(release, breakdown, RejectReason::LowTitleMatch);
    }

    // A release without author info is neutral; a wrong author is not.
    if book_has_author(book) && release_author(release).is_some() && author < config.min_author_score {
        breakdown.insert(components::AUTHOR_MISMATCH.to_string(), AUTHOR_MISMATCH_PENALTY);
        return reject(release, breakdown, RejectReason::LowAuthorMatch);
    }

    let mut series = 0;
    let mut series_number = 0;
    if book.series_name.as_deref().is_some_and(|s| !s.trim().is_empty()) {
        series = score_series_name(book, release);
        breakdown.insert(components::SERIES.to_string(), series);
        // A volume number only means something inside the right series.
        if series > 0 {
            series_number = score_series_number(book, release);
            breakdown.insert(components::SERIES_NUMBER.to_string(), series_number);
        }
    }

    let strong_metadata =
        title >= STRONG_TITLE_SCORE || (series >= SERIES_NAME_FULL_MATCH && series_number > 0);

    if strong_metadata {
        if let Some(year) = score_year(book, release) {
            breakdown.insert(components::YEAR.to_string(), year);
        }

        breakdown.insert(
            components::FORMAT_PRIORITY.to_string(),
            score_format_priority(release, config),
        );
        breakdown.insert(
            components::FREELEECH_OR_DIRECT.to_string(),
            score_freeleech_or_direct(release, config),
        );
        breakdown.insert(
            components::INDEXER_PRIORITY.to_string(),
            score_indexer_priority(release, config),
        );
    }

    let result = ReleaseMatchScore::accepted(total(&breakdown), breakdown);
    debug!(
        release = %release.title,
        score = result.score,
        confidence = %result.confidence,
        "Scored release"
    );
    result
}

fn reject(release: &Release, breakdown: BTreeMap<String, i32>, reason: RejectReason) -> ReleaseMatchScore {
    let score = total(&breakdown);
    debug!(release = %release.title, score, reason = %reason, "Rejected release");
    ReleaseMatchScore::rejected(score, breakdown, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scoring_config::PriorityMap;
    use crate::matching::types::MatchConfidence;
    use serde_json::json;

    fn dungeon_life() -> BookMetadata {
        BookMetadata {
            authors: vec!["Khenal".to_string()],
            series_name: Some("Dungeon Life".to_string()),
            series_position: Some(4.0),
            ..BookMetadata::new("Dungeon Life")
        }
    }

    fn release(title: &str) -> Release {
        let mut r = Release::new(title);
        r.extra.insert("author".to_string(), json!("Khenal"));
        r
    }

    #[test]
    fn test_full_match_breakdown() {
        let score = score_release_match(
            &dungeon_life(),
            &release("Dungeon Life 4: An Isekai LitRPG"),
            &ReleaseScoringConfig::default(),
        );
        assert!(!score.hard_reject);
        assert_eq!(score.component("title"), Some(60));
        assert_eq!(score.component("author"), Some(30));
        assert_eq!(score.component("series"), Some(10));
        assert_eq!(score.component("series_number"), Some(22));
        assert_eq!(score.component("format_priority"), Some(0));
        assert_eq!(score.component("year"), None);
        assert_eq!(score.score, 122);
        assert_eq!(score.confidence, MatchConfidence::High);
    }

    #[test]
    fn test_forbidden_short_circuits() {
        let score = score_release_match(
            &dungeon_life(),
            &release("Dungeon Life 4 (Sample)"),
            &ReleaseScoringConfig::default(),
        );
        assert!(score.hard_reject);
        assert_eq!(score.score, 0);
        assert_eq!(score.breakdown, BTreeMap::from([("forbidden".to_string(), -100)]));
        assert_eq!(score.reject_reason, Some(RejectReason::Forbidden("sample".to_string())));
    }

    #[test]
    fn test_low_title_floor() {
        let config = ReleaseScoringConfig {
            min_title_score: 60,
            ..Default::default()
        };
        let book = BookMetadata::new("He Who Fights With Monsters");
        let score = score_release_match(&book, &Release::new("He Who Fight With Monsters"), &config);
        assert!(score.hard_reject);
        assert_eq!(score.reject_reason, Some(RejectReason::LowTitleMatch));
        assert_eq!(score.score, score.component("title").unwrap() as u32);
    }

    #[test]
    fn test_author_mismatch_rejects_with_penalty() {
        let mut r = Release::new("Dungeon Life 4");
        r.extra.insert("author".to_string(), json!("Someone Entirely Else"));
        let score = score_release_match(&dungeon_life(), &r, &ReleaseScoringConfig::default());
        assert!(score.hard_reject);
        assert_eq!(score.reject_reason, Some(RejectReason::LowAuthorMatch));
        assert_eq!(score.component("author_mismatch"), Some(-20));
        assert_eq!(score.score, 40);
    }

    #[test]
    fn test_missing_release_author_is_neutral() {
        let score = score_release_match(
            &dungeon_life(),
            &Release::new("Dungeon Life 4"),
            &ReleaseScoringConfig::default(),
        );
        assert!(!score.hard_reject);
        assert_eq!(score.component("author"), Some(0));
        assert_eq!(score.score, 92);
    }

    #[test]
    fn test_book_without_authors_never_rejects_on_author() {
        let mut book = dungeon_life();
        book.authors.clear();
        let mut r = Release::new("Dungeon Life 4");
        r.extra.insert("author".to_string(), json!("Someone Entirely Else"));
        let score = score_release_match(&book, &r, &ReleaseScoringConfig::default());
        assert!(!score.hard_reject);
        assert_eq!(score.component("author"), Some(0));
        assert_eq!(score.component("author_mismatch"), None);
        assert_eq!(score.score, 92);
    }

    #[test]
    fn test_series_match_opens_gate_for_weak_title() {
        let book = BookMetadata {
            series_name: Some("Hunters".to_string()),
            series_position: Some(3.0),
            publish_year: Some(2022),
            ..BookMetadata::new("Primal Hunter")
        };
        let mut r = Release::new("Primal Hunters 3");
        r.extra.insert("year".to_string(), json!(2022));

        let score = score_release_match(&book, &r, &ReleaseScoringConfig::default());
        assert!(!score.hard_reject);
        assert_eq!(score.component("title"), Some(24));
        assert_eq!(score.component("series"), Some(10));
        assert_eq!(score.component("series_number"), Some(22));
        assert_eq!(score.component("year"), Some(10));
        assert_eq!(score.component("format_priority"), Some(0));
        assert_eq!(score.score, 66);

        // A wrong volume keeps the gate closed for the same weak title.
        let book = BookMetadata {
            series_position: Some(4.0),
            ..book
        };
        let score = score_release_match(&book, &r, &ReleaseScoringConfig::default());
        assert_eq!(score.component("series_number"), Some(-60));
        assert_eq!(score.component("year"), None);
        assert_eq!(score.component("format_priority"), None);
    }

    #[test]
    fn test_series_number_needs_series_name() {
        let mut book = dungeon_life();
        book.series_name = Some("Cradle".to_string());
        let score = score_release_match(&book, &release("Dungeon Life, Book 3"), &ReleaseScoringConfig::default());
        assert_eq!(score.component("series"), Some(0));
        assert_eq!(score.component("series_number"), None);
    }

    #[test]
    fn test_tie_breaks_skipped_for_weak_title() {
        let config = ReleaseScoringConfig {
            min_title_score: 0,
            ebook_format_priority: PriorityMap::from_ids(["epub"]),
            ..Default::default()
        };
        let book = BookMetadata::new("The Wandering Inn");
        let mut r = Release::new("Wandering Tales");
        r.format = Some("epub".to_string());
        let score = score_release_match(&book, &r, &config);
        assert!(!score.hard_reject);
        assert!(score.component("title").unwrap() < STRONG_TITLE_SCORE);
        assert_eq!(score.component("format_priority"), None);
    }

    #[test]
    fn test_tie_breaks_stack_without_clamp() {
        let config = ReleaseScoringConfig {
            ebook_format_priority: PriorityMap::from_ids(["epub", "azw3"]),
            ebook_release_priority: PriorityMap::from_ids(["source:direct_download"]),
            ..Default::default()
        };
        let mut r = release("Dungeon Life 4");
        r.format = Some("epub".to_string());
        r.source = Some("direct_download".to_string());
        let score = score_release_match(&dungeon_life(), &r, &config);
        assert_eq!(score.component("format_priority"), Some(10));
        assert_eq!(score.component("freeleech_or_direct"), Some(10));
        assert_eq!(score.component("indexer_priority"), Some(12));
        assert_eq!(score.score, 122 + 32);
    }
}
