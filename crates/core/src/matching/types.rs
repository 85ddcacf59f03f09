//! Value types exchanged with the release matching engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Canonical book record supplied by a metadata provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookMetadata {
    /// Primary title.
    #[serde(default)]
    pub title: String,
    /// Subtitle, appended to the title as an extra matching candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Alternate (usually shorter) title used for matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_title: Option<String>,
    /// Localized titles keyed by language code.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub titles_by_language: BTreeMap<String, String>,
    /// Authors in credit order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    /// Author string preferred for matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    /// Position within the series. Fractional for novellas (`4.5`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_year: Option<i32>,
}

impl BookMetadata {
    /// Create a book with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Content kind of a release, selecting which priority lists apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Ebook,
    Audiobook,
}

impl ContentType {
    /// Parse a free-form content type. Anything unrecognized is an ebook.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "audiobook" => ContentType::Audiobook,
            _ => ContentType::Ebook,
        }
    }
}

/// One discovered download candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Raw title as listed by the source.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Source kind (e.g. `direct_download`, `prowlarr`, `audiobookbay`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Indexer that listed the release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexer: Option<String>,
    /// `ebook` or `audiobook`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Source-specific side-channel fields. Match annotations are written here.
    #[serde(default, deserialize_with = "object_or_empty")]
    pub extra: Map<String, Value>,
}

impl Release {
    /// Create a release with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn content_type(&self) -> ContentType {
        ContentType::parse(self.content_type.as_deref())
    }

    /// A top-level `extra` field.
    pub fn extra_value(&self, key: &str) -> Option<&Value> {
        self.extra.get(key).filter(|v| !v.is_null())
    }

    /// A field of the nested `extra.torznab_attrs` object.
    pub fn torznab_attr(&self, key: &str) -> Option<&Value> {
        self.extra
            .get("torznab_attrs")
            .and_then(Value::as_object)
            .and_then(|attrs| attrs.get(key))
            .filter(|v| !v.is_null())
    }
}

/// Accept any JSON value for `extra`; anything but an object becomes empty.
fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

/// Coarse confidence bucket derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    None,
    Low,
    Medium,
    High,
}

impl MatchConfidence {
    /// Bucket a total score: 75+ high, 60+ medium, 45+ low.
    pub fn from_score(score: u32) -> Self {
        match score {
            75.. => MatchConfidence::High,
            60..=74 => MatchConfidence::Medium,
            45..=59 => MatchConfidence::Low,
            _ => MatchConfidence::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchConfidence::None => "none",
            MatchConfidence::Low => "low",
            MatchConfidence::Medium => "medium",
            MatchConfidence::High => "high",
        }
    }
}

impl fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a release was disqualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Title contains a configured forbidden term.
    Forbidden(String),
    /// Only generic words/numbers matched.
    LowInformationTitleMatch,
    /// Title score below the configured floor.
    LowTitleMatch,
    /// Release names an author that does not match the book.
    LowAuthorMatch,
}

impl RejectReason {
    /// Parse the machine-readable form produced by `Display`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low_information_title_match" => Some(RejectReason::LowInformationTitleMatch),
            "low_title_match" => Some(RejectReason::LowTitleMatch),
            "low_author_match" => Some(RejectReason::LowAuthorMatch),
            other => other
                .strip_prefix("forbidden:")
                .map(|term| RejectReason::Forbidden(term.to_string())),
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Forbidden(term) => write!(f, "forbidden:{}", term),
            RejectReason::LowInformationTitleMatch => f.write_str("low_information_title_match"),
            RejectReason::LowTitleMatch => f.write_str("low_title_match"),
            RejectReason::LowAuthorMatch => f.write_str("low_author_match"),
        }
    }
}

impl Serialize for RejectReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RejectReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RejectReason::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown reject reason: {}", raw)))
    }
}

/// Outcome of scoring one release against one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseMatchScore {
    /// Total score, never below zero.
    pub score: u32,
    /// Named contribution of every stage that ran.
    pub breakdown: BTreeMap<String, i32>,
    pub confidence: MatchConfidence,
    pub hard_reject: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<RejectReason>,
}

impl ReleaseMatchScore {
    /// An accepted result; confidence follows the score.
    pub fn accepted(score: u32, breakdown: BTreeMap<String, i32>) -> Self {
        Self {
            score,
            breakdown,
            confidence: MatchConfidence::from_score(score),
            hard_reject: false,
            reject_reason: None,
        }
    }

    /// A disqualified result. The score is kept for debugging only.
    pub fn rejected(score: u32, breakdown: BTreeMap<String, i32>, reason: RejectReason) -> Self {
        Self {
            score,
            breakdown,
            confidence: MatchConfidence::None,
            hard_reject: true,
            reject_reason: Some(reason),
        }
    }

    /// Contribution of a named stage, if it ran.
    pub fn component(&self, name: &str) -> Option<i32> {
        self.breakdown.get(name).copied()
    }
}
