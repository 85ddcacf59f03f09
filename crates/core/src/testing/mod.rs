//! Testing utilities for matching tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use shelfwatch_core::testing::fixtures;
//!
//! let book = fixtures::series_book("Dungeon Life", "Khenal", "Dungeon Life", 4.0);
//! let release = fixtures::release_by("Dungeon Life 4: An Isekai LitRPG", "Khenal");
//! ```

mod mock_settings;

pub use mock_settings::MockSettings;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::matching::{BookMetadata, Release};

    /// Create a standalone book with one author.
    pub fn book(title: &str, author: &str) -> BookMetadata {
        BookMetadata {
            authors: vec![author.to_string()],
            ..BookMetadata::new(title)
        }
    }

    /// Create a book that is part of a series.
    pub fn series_book(title: &str, author: &str, series: &str, position: f64) -> BookMetadata {
        BookMetadata {
            series_name: Some(series.to_string()),
            series_position: Some(position),
            ..book(title, author)
        }
    }

    /// Create an ebook release from an indexer with no metadata.
    pub fn release(title: &str) -> Release {
        let mut release = Release::new(title);
        release.source = Some("prowlarr".to_string());
        release.indexer = Some("mock-indexer".to_string());
        release
    }

    /// Create a release that carries an author field.
    pub fn release_by(title: &str, author: &str) -> Release {
        with_extra(release(title), "author", json!(author))
    }

    /// Create an audiobook release.
    pub fn audiobook_release(title: &str, author: &str, format: &str) -> Release {
        let mut release = release_by(title, author);
        release.content_type = Some("audiobook".to_string());
        release.format = Some(format.to_string());
        release
    }

    /// Create a release offered by the direct download source.
    pub fn direct_release(title: &str, author: &str, format: &str) -> Release {
        let mut release = release_by(title, author);
        release.source = Some("direct_download".to_string());
        release.indexer = None;
        release.format = Some(format.to_string());
        release
    }

    /// Set a top-level `extra` field.
    pub fn with_extra(mut release: Release, key: &str, value: Value) -> Release {
        release.extra.insert(key.to_string(), value);
        release
    }

    /// Set a field inside `extra.torznab_attrs`.
    pub fn with_torznab_attr(mut release: Release, key: &str, value: Value) -> Release {
        let attrs = release
            .extra
            .entry("torznab_attrs".to_string())
            .or_insert_with(|| json!({}));
        if !attrs.is_object() {
            *attrs = json!({});
        }
        if let Some(map) = attrs.as_object_mut() {
            map.insert(key.to_string(), value);
        }
        release
    }
}
