//! Release ranking integration tests.
//!
//! These tests drive the public matching API end to end:
//! - Series number discrimination between neighbouring volumes
//! - Structured torznab fields overriding title text
//! - Hard reject gates and their breakdowns
//! - Settings read once per ranking batch

use serde_json::json;

use shelfwatch_core::{
    matching::{annotations, components, ReleaseScoringConfig},
    rank_releases_for_book, score_release_match, select_auto_download,
    testing::{fixtures, MockSettings},
    AutoDownloadConfig, BookMetadata, MatchConfidence, RejectReason, ReleaseMatcher,
};

fn dungeon_life_four() -> BookMetadata {
    fixtures::series_book("Dungeon Life", "Khenal", "Dungeon Life", 4.0)
}

#[test]
fn test_series_number_separates_neighbouring_volumes() {
    let book = dungeon_life_four();
    let config = ReleaseScoringConfig::default();

    let scores: Vec<_> = ["Dungeon Life 4: An Isekai LitRPG", "Dungeon Life 3: An Isekai LitRPG", "Dungeon Life 2: An Isekai LitRPG"]
        .iter()
        .map(|title| score_release_match(&book, &fixtures::release_by(title, "Khenal"), &config))
        .collect();

    let numbers: Vec<_> = scores
        .iter()
        .map(|s| s.component(components::SERIES_NUMBER))
        .collect();
    assert_eq!(numbers, vec![Some(22), Some(-60), Some(-75)]);

    assert!(scores[0].score > scores[1].score);
    assert!(scores[1].score > scores[2].score);
    assert!(scores[0].score >= 75);
    assert_eq!(scores[0].confidence, MatchConfidence::High);
    assert_eq!(scores[1].confidence, MatchConfidence::None);
    assert_eq!(scores[2].confidence, MatchConfidence::None);
    assert!(scores.iter().all(|s| !s.hard_reject));
}

#[test]
fn test_torznab_series_number_overrides_title() {
    let book = dungeon_life_four();
    let config = ReleaseScoringConfig::default();

    let correct = fixtures::with_torznab_attr(
        fixtures::release_by("Dungeon Life 3: An Isekai LitRPG", "Khenal"),
        "seriesnumber",
        json!("4"),
    );
    let score = score_release_match(&book, &correct, &config);
    assert_eq!(score.component(components::SERIES_NUMBER), Some(22));

    let wrong = fixtures::with_torznab_attr(
        fixtures::release_by("Dungeon Life 4: An Isekai LitRPG", "Khenal"),
        "seriesnumber",
        json!(2),
    );
    let score = score_release_match(&book, &wrong, &config);
    assert_eq!(score.component(components::SERIES_NUMBER), Some(-75));
}

#[test]
fn test_year_mismatch_penalty() {
    let mut book = dungeon_life_four();
    book.publish_year = Some(2020);
    let config = ReleaseScoringConfig::default();

    let release = fixtures::with_extra(
        fixtures::release_by("Dungeon Life 4", "Khenal"),
        "year",
        json!(2015),
    );
    let with_year = score_release_match(&book, &release, &config);
    assert_eq!(with_year.component(components::YEAR), Some(-15));

    let without_year = score_release_match(&book, &fixtures::release_by("Dungeon Life 4", "Khenal"), &config);
    assert_eq!(without_year.component(components::YEAR), None);
    assert_eq!(without_year.score - with_year.score, 15);
}

#[test]
fn test_low_information_title_rejected_with_zero_floors() {
    let settings = MockSettings::new();
    settings.set("min_title_score", json!(0));
    settings.set("min_author_score", json!(0));
    let config = ReleaseScoringConfig::from_settings(&settings);

    let book = fixtures::book("Book Six", "Andrew Rowe");
    let score = score_release_match(&book, &fixtures::release("Book 3"), &config);
    assert!(score.hard_reject);
    assert_eq!(score.reject_reason, Some(RejectReason::LowInformationTitleMatch));
    assert_eq!(score.confidence, MatchConfidence::None);
}

#[test]
fn test_forbidden_breakdown_is_exact() {
    let score = score_release_match(
        &dungeon_life_four(),
        &fixtures::release_by("Dungeon Life 4 - Sample Chapters", "Khenal"),
        &ReleaseScoringConfig::default(),
    );
    assert!(score.hard_reject);
    assert_eq!(score.score, 0);
    assert_eq!(score.breakdown.len(), 1);
    assert_eq!(score.component(components::FORBIDDEN), Some(-100));
    assert_eq!(score.reject_reason.map(|r| r.to_string()), Some("forbidden:sample".to_string()));
}

#[test]
fn test_forbidden_terms_match_inside_words() {
    let book = dungeon_life_four();
    let config = ReleaseScoringConfig::default();

    for (title, term) in [
        ("Dungeon Life 4 Samples", "sample"),
        ("Dungeon Life 4 (Excerpts)", "excerpt"),
        ("Dungeon Life 4 Booksummary", "summary"),
    ] {
        let score = score_release_match(&book, &fixtures::release_by(title, "Khenal"), &config);
        assert!(score.hard_reject, "{}", title);
        assert_eq!(score.score, 0);
        assert_eq!(score.reject_reason, Some(RejectReason::Forbidden(term.to_string())));
    }
}

#[test]
fn test_out_of_range_release_year_is_scored_as_mismatch() {
    let mut book = dungeon_life_four();
    book.publish_year = Some(2020);
    let release = fixtures::with_extra(
        fixtures::release_by("Dungeon Life 4", "Khenal"),
        "year",
        json!(i32::MIN as i64),
    );

    let score = score_release_match(&book, &release, &ReleaseScoringConfig::default());
    assert!(!score.hard_reject);
    assert_eq!(score.component(components::YEAR), Some(-15));
}

#[test]
fn test_scoring_is_deterministic() {
    let book = dungeon_life_four();
    let config = ReleaseScoringConfig::default();
    let release = fixtures::direct_release("Dungeon Life 4: An Isekai LitRPG", "Khenal", "epub");

    let first = score_release_match(&book, &release.clone(), &config);
    let second = score_release_match(&book, &release.clone(), &config);
    assert_eq!(first, second);
}

#[test]
fn test_ranker_orders_and_annotates() {
    let book = dungeon_life_four();
    let releases = vec![
        fixtures::release_by("Dungeon Life 3: An Isekai LitRPG", "Khenal"),
        fixtures::release_by("Dungeon Life 4: An Isekai LitRPG", "Khenal"),
        fixtures::release("Dungeon Life 4"),
    ];

    let ranked = rank_releases_for_book(&book, releases, &ReleaseScoringConfig::default());
    let scores: Vec<u32> = ranked.iter().map(|r| r.score.score).collect();
    assert_eq!(scores, vec![122, 92, 40]);

    for entry in &ranked {
        assert_eq!(entry.release.extra[annotations::MATCH_SCORE], json!(entry.score.score));
        assert_eq!(
            entry.release.extra[annotations::MATCH_CONFIDENCE],
            json!(entry.score.confidence.as_str())
        );
        assert!(entry.release.extra.contains_key(annotations::MATCH_BREAKDOWN));
        assert!(!entry.release.extra.contains_key(annotations::MATCH_REJECT_REASON));
    }

    let pick = select_auto_download(&ranked, &AutoDownloadConfig::default()).unwrap();
    assert_eq!(pick.release.title, "Dungeon Life 4: An Isekai LitRPG");
}

#[test]
fn test_content_type_selects_priority_maps() {
    let settings = MockSettings::new();
    settings.set("ebook_format_priority", json!([{"id": "epub", "enabled": true}]));
    settings.set(
        "audiobook_format_priority",
        json!([{"id": "m4b", "enabled": true}, {"id": "mp3", "enabled": true}]),
    );
    settings.set("audiobook_indexer_priority", json!("indexer:mock-indexer"));
    let config = ReleaseScoringConfig::from_settings(&settings);
    let book = dungeon_life_four();

    let audiobook = fixtures::audiobook_release("Dungeon Life 4", "Khenal", "m4b");
    let score = score_release_match(&book, &audiobook, &config);
    assert_eq!(score.component(components::FORMAT_PRIORITY), Some(10));
    assert_eq!(score.component(components::INDEXER_PRIORITY), Some(12));

    let mut ebook = audiobook.clone();
    ebook.content_type = None;
    let score = score_release_match(&book, &ebook, &config);
    assert_eq!(score.component(components::FORMAT_PRIORITY), Some(0));
    assert_eq!(score.component(components::INDEXER_PRIORITY), Some(0));
}

#[test]
fn test_matcher_reloads_settings_per_batch() {
    let settings = MockSettings::new();
    let matcher = ReleaseMatcher::new(settings.clone());
    let book = fixtures::book("He Who Fights With Monsters", "Shirtaloon");
    let releases = || vec![fixtures::release("He Who Fight With Monsters")];

    let ranked = matcher.rank(&book, releases());
    assert!(!ranked[0].score.hard_reject);

    settings.set("min_title_score", json!(60));
    let ranked = matcher.rank(&book, releases());
    assert_eq!(ranked[0].score.reject_reason, Some(RejectReason::LowTitleMatch));
    assert_eq!(
        ranked[0].release.extra[annotations::MATCH_REJECT_REASON],
        json!("low_title_match")
    );
    assert_eq!(settings.read_count("min_title_score"), 2);
}
