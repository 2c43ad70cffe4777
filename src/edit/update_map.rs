//! Title to replacement-content mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Pages to update, keyed by exact page title.
///
/// A `None` (JSON `null`) or empty content means "leave the page alone".
/// Titles iterate in sorted order so the batched token query is stable.
///
/// # Example
///
/// ```
/// use wiki_updater_core::edit::UpdateMap;
///
/// let updates: UpdateMap =
///     serde_json::from_str(r#"{"Latest Chapter": "Chapter 12", "Old Page": null}"#).unwrap();
/// assert_eq!(updates.content_for("Latest Chapter"), Some("Chapter 12"));
/// assert_eq!(updates.content_for("Old Page"), None);
/// assert!(updates.contains("Old Page"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateMap {
    pages: BTreeMap<String, Option<String>>,
}

impl UpdateMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the content for `title`.
    pub fn insert(&mut self, title: impl Into<String>, content: Option<String>) {
        self.pages.insert(title.into(), content);
    }

    /// Whether `title` is a key of the map (even with absent content).
    #[must_use]
    pub fn contains(&self, title: &str) -> bool {
        self.pages.contains_key(title)
    }

    /// Content to publish for `title`; `None` when absent or empty.
    #[must_use]
    pub fn content_for(&self, title: &str) -> Option<&str> {
        self.pages
            .get(title)
            .and_then(Option::as_deref)
            .filter(|content| !content.is_empty())
    }

    /// All titles, sorted.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// Number of titles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the map has no titles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for UpdateMap {
    fn from_iter<T: IntoIterator<Item = (K, Option<String>)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (title, content) in iter {
            map.insert(title, content);
        }
        map
    }
}
