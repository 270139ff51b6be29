use serde::Serialize;

use super::Article;

/// Ranking strategy that produced a result
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Rule-based: weighted likes, views and bookmarks
    Engagement,
    /// Rule-based: newest first
    Recency,
    /// TF-IDF cosine similarity
    ContentSimilarity,
}

/// A single ranked article returned by the engine
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(flatten)]
    pub article: Article,
    #[serde(rename = "engagement_score")]
    pub engagement_score: u64,
    /// Cosine similarity to the query, only set on the content-similarity path
    #[serde(rename = "similarity_score", skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    pub strategy: Strategy,
}

impl Recommendation {
    pub fn id(&self) -> &str {
        &self.article.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_flattens_article() {
        let rec = Recommendation {
            article: Article::new("a1", "Title", "Body"),
            engagement_score: 12,
            similarity_score: Some(0.5),
            strategy: Strategy::ContentSimilarity,
        };

        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["id"], "a1");
        assert_eq!(json["engagement_score"], 12);
        assert_eq!(json["similarity_score"], 0.5);
        assert_eq!(json["strategy"], "content_similarity");
        assert_eq!(json["likeCount"], 0);
        assert!(json.get("similarityScore").is_none());
    }

    #[test]
    fn test_similarity_omitted_for_rule_based() {
        let rec = Recommendation {
            article: Article::new("a1", "Title", "Body"),
            engagement_score: 0,
            similarity_score: None,
            strategy: Strategy::Recency,
        };

        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("similarity_score").is_none());
        assert_eq!(json["strategy"], "recency");
    }
}
