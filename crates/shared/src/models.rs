use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category label for sources that declare none
pub const UNCATEGORIZED: &str = "uncategorized";

/// A single entry collected from a feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub url: String,
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
    pub category: String,
}

impl Item {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            url: url.into(),
            source: source.into(),
            published_at: None,
            category: category.into(),
        }
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Text the duplicate detector looks at: title followed by summary
    pub fn dedup_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}
