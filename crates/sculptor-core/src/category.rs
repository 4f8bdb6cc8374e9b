//! Application name to category classification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Category assigned to applications missing from the table.
pub const OTHER_CATEGORY: &str = "Other";

const DEFAULT_TABLE_VERSION: u32 = 1;

/// A versioned application → category lookup table.
///
/// Matching is exact and case-sensitive. The table is configuration data:
/// it is loaded once at startup and handed to whatever needs to classify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    /// Bumped whenever the mapping changes meaningfully.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Application name → category label.
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
}

const fn default_version() -> u32 {
    DEFAULT_TABLE_VERSION
}

impl CategoryTable {
    /// Creates a table from explicit `(application, category)` pairs.
    pub fn new<I, A, C>(version: u32, entries: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: Into<String>,
        C: Into<String>,
    {
        Self {
            version,
            categories: entries
                .into_iter()
                .map(|(app, category)| (app.into(), category.into()))
                .collect(),
        }
    }

    /// Returns the category for an application, or [`OTHER_CATEGORY`].
    pub fn classify(&self, application: &str) -> &str {
        self.categories
            .get(application)
            .map_or(OTHER_CATEGORY, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_TABLE_VERSION,
            [
                ("Visual Studio Code", "Code"),
                ("Code", "Code"),
                ("Terminal", "Code"),
                ("iTerm2", "Code"),
                ("Electron", "Code"),
                ("MongoDBCompass", "Database"),
                ("Google Chrome", "Browsing"),
                ("Firefox", "Browsing"),
                ("Safari", "Browsing"),
                ("Microsoft Edge", "Browsing"),
                ("Slack", "Communication"),
                ("Discord", "Communication"),
                ("Microsoft Teams", "Communication"),
                ("Mail", "Communication"),
                ("Spotify", "Entertainment"),
            ],
        )
    }
}
