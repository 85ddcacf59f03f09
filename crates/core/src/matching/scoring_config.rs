//! Tunables for the scoring policy and the loader that builds them.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::normalize::normalize;
use super::types::ContentType;

/// Terms rejected when no usable list is configured.
pub const DEFAULT_FORBIDDEN_WORDS: &[&str] = &["abridged", "sample", "excerpt", "summary", "book summary"];

pub const DEFAULT_MIN_TITLE_SCORE: i32 = 24;
pub const DEFAULT_MIN_AUTHOR_SCORE: i32 = 8;
pub const DEFAULT_PREFER_FREELEECH_OR_DIRECT: bool = true;

/// Setting keys read by [`ReleaseScoringConfig::from_settings`].
pub mod keys {
    pub const FORBIDDEN_WORDS: &str = "forbidden_words";
    pub const MIN_TITLE_SCORE: &str = "min_title_score";
    pub const MIN_AUTHOR_SCORE: &str = "min_author_score";
    pub const PREFER_FREELEECH_OR_DIRECT: &str = "prefer_freeleech_or_direct";
    pub const EBOOK_RELEASE_PRIORITY: &str = "ebook_release_priority";
    pub const AUDIOBOOK_RELEASE_PRIORITY: &str = "audiobook_release_priority";
    pub const EBOOK_FORMAT_PRIORITY: &str = "ebook_format_priority";
    pub const AUDIOBOOK_FORMAT_PRIORITY: &str = "audiobook_format_priority";
    /// Older name of the audiobook release priority list.
    pub const LEGACY_AUDIOBOOK_INDEXER_PRIORITY: &str = "audiobook_indexer_priority";

    /// All keys understood by the loader.
    pub const ALL: &[&str] = &[
        FORBIDDEN_WORDS,
        MIN_TITLE_SCORE,
        MIN_AUTHOR_SCORE,
        PREFER_FREELEECH_OR_DIRECT,
        EBOOK_RELEASE_PRIORITY,
        AUDIOBOOK_RELEASE_PRIORITY,
        EBOOK_FORMAT_PRIORITY,
        AUDIOBOOK_FORMAT_PRIORITY,
        LEGACY_AUDIOBOOK_INDEXER_PRIORITY,
    ];
}

/// Key-value store the scoring tunables are read from.
pub trait SettingsSource {
    /// Current value of a setting, if set.
    fn setting(&self, key: &str) -> Option<Value>;
}

impl SettingsSource for Map<String, Value> {
    fn setting(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl SettingsSource for BTreeMap<String, Value> {
    fn setting(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl SettingsSource for HashMap<String, Value> {
    fn setting(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl<S: SettingsSource + ?Sized> SettingsSource for &S {
    fn setting(&self, key: &str) -> Option<Value> {
        (**self).setting(key)
    }
}

/// Ordered preference list flattened into `id -> rank` (0 is best).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PriorityMap {
    ranks: BTreeMap<String, usize>,
}

impl PriorityMap {
    /// Build from ids already in priority order. Empty and repeated ids are skipped.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ranks = BTreeMap::new();
        for id in ids {
            let id = id.as_ref();
            if id.is_empty() || ranks.contains_key(id) {
                continue;
            }
            let rank = ranks.len();
            ranks.insert(id.to_string(), rank);
        }
        Self { ranks }
    }

    pub fn rank(&self, id: &str) -> Option<usize> {
        self.ranks.get(id).copied()
    }

    /// Number of enabled entries.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// Snapshot of every scoring tunable, built once per ranking batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseScoringConfig {
    /// Normalized terms that disqualify a release, in configured order.
    pub forbidden_words: Vec<String>,
    pub min_title_score: i32,
    pub min_author_score: i32,
    pub prefer_freeleech_or_direct: bool,
    pub ebook_release_priority: PriorityMap,
    pub audiobook_release_priority: PriorityMap,
    pub ebook_format_priority: PriorityMap,
    pub audiobook_format_priority: PriorityMap,
}

impl Default for ReleaseScoringConfig {
    fn default() -> Self {
        Self {
            forbidden_words: default_forbidden_words(),
            min_title_score: DEFAULT_MIN_TITLE_SCORE,
            min_author_score: DEFAULT_MIN_AUTHOR_SCORE,
            prefer_freeleech_or_direct: DEFAULT_PREFER_FREELEECH_OR_DIRECT,
            ebook_release_priority: PriorityMap::default(),
            audiobook_release_priority: PriorityMap::default(),
            ebook_format_priority: PriorityMap::default(),
            audiobook_format_priority: PriorityMap::default(),
        }
    }
}

impl ReleaseScoringConfig {
    /// Read every tunable from a settings source.
    ///
    /// Malformed values fall back to their defaults; loading never fails.
    pub fn from_settings<S: SettingsSource + ?Sized>(source: &S) -> Self {
        let forbidden_words = source
            .setting(keys::FORBIDDEN_WORDS)
            .map(|v| parse_forbidden_words(&v))
            .filter(|words| !words.is_empty())
            .unwrap_or_else(default_forbidden_words);

        let mut audiobook_release_priority =
            parse_priority(source.setting(keys::AUDIOBOOK_RELEASE_PRIORITY), normalize_source_id);
        if audiobook_release_priority.is_empty() {
            audiobook_release_priority = parse_priority(
                source.setting(keys::LEGACY_AUDIOBOOK_INDEXER_PRIORITY),
                normalize_source_id,
            );
        }

        Self {
            forbidden_words,
            min_title_score: parse_int(
                source.setting(keys::MIN_TITLE_SCORE),
                keys::MIN_TITLE_SCORE,
                DEFAULT_MIN_TITLE_SCORE,
                0,
                60,
            ),
            min_author_score: parse_int(
                source.setting(keys::MIN_AUTHOR_SCORE),
                keys::MIN_AUTHOR_SCORE,
                DEFAULT_MIN_AUTHOR_SCORE,
                0,
                30,
            ),
            prefer_freeleech_or_direct: source
                .setting(keys::PREFER_FREELEECH_OR_DIRECT)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(DEFAULT_PREFER_FREELEECH_OR_DIRECT),
            ebook_release_priority: parse_priority(
                source.setting(keys::EBOOK_RELEASE_PRIORITY),
                normalize_source_id,
            ),
            audiobook_release_priority,
            ebook_format_priority: parse_priority(
                source.setting(keys::EBOOK_FORMAT_PRIORITY),
                normalize_format_id,
            ),
            audiobook_format_priority: parse_priority(
                source.setting(keys::AUDIOBOOK_FORMAT_PRIORITY),
                normalize_format_id,
            ),
        }
    }

    /// Source/indexer ranks for a content type.
    pub fn release_priority(&self, content_type: ContentType) -> &PriorityMap {
        match content_type {
            ContentType::Ebook => &self.ebook_release_priority,
            ContentType::Audiobook => &self.audiobook_release_priority,
        }
    }

    /// Format ranks for a content type.
    pub fn format_priority(&self, content_type: ContentType) -> &PriorityMap {
        match content_type {
            ContentType::Ebook => &self.ebook_format_priority,
            ContentType::Audiobook => &self.audiobook_format_priority,
        }
    }
}

/// Build a config from a settings source.
pub fn load_release_scoring_config<S: SettingsSource + ?Sized>(source: &S) -> ReleaseScoringConfig {
    ReleaseScoringConfig::from_settings(source)
}

fn default_forbidden_words() -> Vec<String> {
    DEFAULT_FORBIDDEN_WORDS.iter().map(|w| w.to_string()).collect()
}

/// Canonical form of a source or indexer identifier (`indexer:My Tracker`).
pub fn normalize_source_id(id: &str) -> String {
    id.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical form of a file format identifier (`.EPUB` -> `epub`).
pub fn normalize_format_id(id: &str) -> String {
    id.trim().trim_start_matches('.').trim().to_lowercase()
}

fn parse_forbidden_words(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => {
            warn!("Ignoring malformed {} setting: {}", keys::FORBIDDEN_WORDS, value);
            Vec::new()
        }
    };

    let mut words: Vec<String> = Vec::new();
    for word in raw.iter().map(|w| normalize(w)) {
        if !word.is_empty() && !words.contains(&word) {
            words.push(word);
        }
    }
    words
}

fn parse_int(value: Option<Value>, key: &str, default: i32, min: i32, max: i32) -> i32 {
    let parsed = match &value {
        None => return default,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed.filter(|n| n.is_finite()) {
        Some(n) => (n.round() as i64).clamp(min as i64, max as i64) as i32,
        None => {
            warn!("Ignoring malformed {} setting, using {}", key, default);
            default
        }
    }
}

/// Loose truthiness used by settings and release side-channel flags.
pub(crate) fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Some(true),
            "0" | "false" | "no" | "n" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Parse an ordered `[{id, enabled}]` list into ranks.
///
/// Plain string entries and comma-separated strings count as enabled ids.
fn parse_priority(value: Option<Value>, normalize_id: fn(&str) -> String) -> PriorityMap {
    let entries: Vec<Value> = match value {
        None | Some(Value::Null) => return PriorityMap::default(),
        Some(Value::Array(items)) => items,
        Some(Value::String(s)) => s.split(',').map(|id| Value::String(id.to_string())).collect(),
        Some(other) => {
            warn!("Ignoring malformed priority list: {}", other);
            return PriorityMap::default();
        }
    };

    let ids = entries.iter().filter_map(|entry| match entry {
        Value::String(id) => Some(normalize_id(id)),
        Value::Object(fields) => {
            let enabled = fields.get("enabled").and_then(parse_bool).unwrap_or(true);
            let id = fields.get("id").and_then(Value::as_str)?;
            enabled.then(|| normalize_id(id))
        }
        _ => None,
    });

    PriorityMap::from_ids(ids.collect::<Vec<_>>())
}
