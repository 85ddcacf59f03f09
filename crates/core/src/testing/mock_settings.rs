//! Mock settings store for testing.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::matching::SettingsSource;

/// In-memory [`SettingsSource`] that can change between batches.
///
/// Clones share the same store, so a test can keep a handle while a
/// `ReleaseMatcher` owns another, and count how often each key was read.
///
/// # Example
///
/// ```rust,ignore
/// use shelfwatch_core::testing::MockSettings;
///
/// let settings = MockSettings::new();
/// let matcher = ReleaseMatcher::new(settings.clone());
///
/// settings.set("min_title_score", json!(50));
/// let ranked = matcher.rank(&book, releases);
/// assert_eq!(settings.read_count("min_title_score"), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockSettings {
    values: Arc<RwLock<HashMap<String, Value>>>,
    reads: Arc<RwLock<HashMap<String, usize>>>,
}

impl MockSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value for subsequent reads.
    pub fn set(&self, key: &str, value: Value) {
        self.values.write().unwrap().insert(key.to_string(), value);
    }

    /// Remove a value so the loader falls back to its default.
    pub fn clear(&self, key: &str) {
        self.values.write().unwrap().remove(key);
    }

    /// How many times a key has been read.
    pub fn read_count(&self, key: &str) -> usize {
        self.reads.read().unwrap().get(key).copied().unwrap_or(0)
    }
}

impl SettingsSource for MockSettings {
    fn setting(&self, key: &str) -> Option<Value> {
        *self.reads.write().unwrap().entry(key.to_string()).or_insert(0) += 1;
        self.values.read().unwrap().get(key).cloned()
    }
}
