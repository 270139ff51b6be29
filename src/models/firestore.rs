// ============================================================================
// Firestore REST API Types
// ============================================================================

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use super::article::{Article, UNKNOWN_AUTHOR};

/// One element of a `documents:runQuery` response stream
///
/// Elements without a document only carry progress metadata (`readTime`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponseItem {
    #[serde(default)]
    pub document: Option<FirestoreDocument>,
}

/// A Firestore document as returned by the REST API
#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreDocument {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{collection}/{id}`
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, FirestoreValue>,
}

/// Typed Firestore value, one variant per REST union member
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    NullValue(serde_json::Value),
    BooleanValue(bool),
    /// int64 values are encoded as JSON strings
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(serde_json::Value),
    ArrayValue(ArrayValue),
    MapValue(serde_json::Value),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FirestoreValue>,
}

impl FirestoreValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FirestoreValue::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// Non-negative counter; anything else reads as zero
    pub fn as_count(&self) -> u64 {
        match self {
            FirestoreValue::IntegerValue(raw) => raw
                .parse::<i64>()
                .ok()
                .and_then(|n| u64::try_from(n).ok())
                .unwrap_or(0),
            FirestoreValue::DoubleValue(n) if n.is_finite() && *n > 0.0 => *n as u64,
            _ => 0,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FirestoreValue::TimestampValue(raw) | FirestoreValue::StringValue(raw) => {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|ts| ts.with_timezone(&Utc))
            }
            _ => None,
        }
    }

    pub fn as_text_list(&self) -> Vec<String> {
        match self {
            FirestoreValue::ArrayValue(array) => array
                .values
                .iter()
                .filter_map(|v| v.as_text().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl FirestoreDocument {
    /// Document id, the last segment of the resource name
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    fn text(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .and_then(FirestoreValue::as_text)
            .map(str::to_string)
    }

    fn count(&self, field: &str) -> u64 {
        self.fields.get(field).map(FirestoreValue::as_count).unwrap_or(0)
    }
}

impl From<FirestoreDocument> for Article {
    fn from(doc: FirestoreDocument) -> Self {
        Article {
            id: doc.id().to_string(),
            title: doc.text("title").unwrap_or_default(),
            content: doc.text("content").unwrap_or_default(),
            author: doc
                .text("authorName")
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            slug: doc.text("slug").unwrap_or_default(),
            tags: doc
                .fields
                .get("tags")
                .map(FirestoreValue::as_text_list)
                .unwrap_or_default(),
            like_count: doc.count("likeCount"),
            view_count: doc.count("viewCount"),
            bookmark_count: doc.count("bookmarkCount"),
            created_at: doc.fields.get("createdAt").and_then(FirestoreValue::as_timestamp),
        }
    }
}
