pub mod config;
pub mod matching;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError,
    ReleaseScoringSettings,
};
pub use matching::{
    rank_releases_for_book, score_release_match, select_auto_download, AutoDownloadConfig,
    BookMetadata, FileMatch, FileMatcher, FileMatcherConfig, MatchConfidence, RankedRelease,
    RejectReason, Release, ReleaseMatchScore, ReleaseMatcher, ReleaseScoringConfig,
    SettingsSource,
};
