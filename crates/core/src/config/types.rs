use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::matching::{AutoDownloadConfig, FileMatcherConfig, SettingsSource};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub release_scoring: ReleaseScoringSettings,
    #[serde(default)]
    pub auto_download: AutoDownloadConfig,
    #[serde(default)]
    pub file_matching: FileMatcherConfig,
}

/// Raw `[release_scoring]` table.
///
/// Values stay untyped here; the scoring loader interprets them and falls
/// back to defaults for anything it cannot use.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ReleaseScoringSettings(pub BTreeMap<String, Value>);

impl ReleaseScoringSettings {
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl SettingsSource for ReleaseScoringSettings {
    fn setting(&self, key: &str) -> Option<Value> {
        self.0.get(key).cloned()
    }
}
