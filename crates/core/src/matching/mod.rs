//! Book release matching - scoring indexer results against a wanted book.
//!
//! Every release in a search batch is scored independently against the
//! book's metadata, gated by hard rejects, then ranked best first.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      rank_releases_for_book                  │
//! │                                                              │
//! │   SettingsSource ──► ReleaseScoringConfig                    │
//! │                              │                               │
//! │   BookMetadata ──┐           ▼                               │
//! │                  ├──► score_release_match (per release)      │
//! │   Release ───────┘      │                                    │
//! │                         ├─ forbidden term      → reject      │
//! │                         ├─ low-info title      → reject      │
//! │                         ├─ title floor         → reject      │
//! │                         ├─ author floor        → reject      │
//! │                         ├─ series name / number              │
//! │                         └─ year + tie-breaks (strong only)   │
//! │                                                              │
//! │   annotate extra.match_* ──► stable sort by score desc       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use shelfwatch_core::matching::{ReleaseMatcher, BookMetadata, Release};
//!
//! let matcher = ReleaseMatcher::new(settings);
//! let ranked = matcher.rank(&book, releases);
//! if let Some(best) = ranked.first() {
//!     println!("{} -> {} ({})", best.release.title, best.score.score, best.score.confidence);
//! }
//! ```

mod file_matcher;
mod normalize;
mod numbers;
mod policy;
mod ranker;
mod scorers;
mod scoring_config;
mod similarity;
mod types;

pub use file_matcher::{clean_filename, FileMatch, FileMatcher, FileMatcherConfig};
pub use normalize::{contains_whole_words, distinctive_tokens, normalize, token_spans, tokens};
pub use numbers::{
    book_series_number, extract_series_number, extract_series_number_after_series_name,
    release_series_number, word_to_number,
};
pub use policy::{components, score_release_match};
pub use ranker::{
    annotate_release, annotations, rank_releases_for_book, select_auto_download,
    AutoDownloadConfig, RankedRelease, ReleaseMatcher,
};
pub use scorers::{
    find_forbidden_term, has_distinctive_title_overlap, is_low_information_title,
    release_author, release_priority_keys, release_year, score_author,
    score_format_priority, score_freeleech_or_direct, score_indexer_priority,
    score_series_name, score_series_number, score_title, score_year, title_candidates,
    LOW_INFORMATION_TITLE_CAP, SERIES_NAME_FULL_MATCH, STRONG_TITLE_SCORE, TITLE_FULL_MATCH,
};
pub use scoring_config::{
    keys, load_release_scoring_config, normalize_format_id, normalize_source_id, PriorityMap,
    ReleaseScoringConfig, SettingsSource, DEFAULT_FORBIDDEN_WORDS, DEFAULT_MIN_AUTHOR_SCORE,
    DEFAULT_MIN_TITLE_SCORE, DEFAULT_PREFER_FREELEECH_OR_DIRECT,
};
pub use similarity::{sequence_ratio, token_overlap};
pub use types::{
    BookMetadata, ContentType, MatchConfidence, RejectReason, Release, ReleaseMatchScore,
};
