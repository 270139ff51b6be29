use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engagement weights: a bookmark counts more than a like, a like more than a view
pub const LIKE_WEIGHT: u64 = 3;
pub const VIEW_WEIGHT: u64 = 1;
pub const BOOKMARK_WEIGHT: u64 = 5;

pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A published article from the Artelipi platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Stable document id
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Display name of the author
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub bookmark_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_author() -> String {
    UNKNOWN_AUTHOR.to_string()
}

impl Article {
    /// Creates an article with no engagement and no timestamp
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            author: default_author(),
            slug: String::new(),
            tags: Vec::new(),
            like_count: 0,
            view_count: 0,
            bookmark_count: 0,
            created_at: None,
        }
    }

    /// Title and body joined, the text the vectorizer sees
    pub fn full_content(&self) -> String {
        format!("{} {}", self.title, self.content)
    }

    /// Weighted sum of likes, views and bookmarks
    pub fn engagement_score(&self) -> u64 {
        self.like_count
            .saturating_mul(LIKE_WEIGHT)
            .saturating_add(self.view_count.saturating_mul(VIEW_WEIGHT))
            .saturating_add(self.bookmark_count.saturating_mul(BOOKMARK_WEIGHT))
    }
}
