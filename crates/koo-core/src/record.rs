//! Business records

use serde::{Deserialize, Serialize};

/// URL value marking a "coming soon" record
pub const PLACEHOLDER_URL: &str = "#";

/// One business directory entry
///
/// Missing fields deserialize as empty strings so that older data files
/// (some omit `description`) load and then fail validation instead of
/// failing the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessRecord {
    /// Business name
    pub title: String,
    /// Short description shown on the card
    pub description: String,
    /// Link target (http/https)
    pub url: String,
    /// Card image URL
    pub image: String,
    /// Category label, also used by the filter
    pub category: String,
}

impl BusinessRecord {
    /// Create new record
    #[inline]
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        image: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: url.into(),
            image: image.into(),
            category: category.into(),
        }
    }

    /// Create a "coming soon" record
    #[inline]
    #[must_use]
    pub fn placeholder(
        title: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::new(title, description, PLACEHOLDER_URL, image, category)
    }

    /// Check if this record is a placeholder
    ///
    /// Placeholders are identified by the sentinel URL only, never by title.
    #[inline]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.url.trim() == PLACEHOLDER_URL
    }

    /// Copy with surrounding whitespace removed from every field
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self::new(
            self.title.trim(),
            self.description.trim(),
            self.url.trim(),
            self.image.trim(),
            self.category.trim(),
        )
    }
}

/// Recommendation persisted for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecommendation {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Record picked for that day
    pub record: BusinessRecord,
}
