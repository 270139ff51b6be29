/// Firestore article source
///
/// Reads the platform's `posts` collection through the Firestore REST API.
///
/// API Flow:
/// 1. `POST {api}/projects/{project}/databases/{db}/documents:runQuery` with a
///    structured query filtering `status == "published"`
/// 2. The response is a JSON array; elements carrying a `document` are decoded
///    into `Article` records, the rest are progress markers
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Article, RunQueryResponseItem},
    services::providers::ArticleSource,
};
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use std::time::Duration;

pub const PUBLISHED_STATUS: &str = "published";

#[derive(Clone)]
pub struct FirestoreSource {
    http_client: HttpClient,
    api_url: String,
    project_id: String,
    database: String,
    collection: String,
    access_token: Option<String>,
}

impl FirestoreSource {
    /// Creates a Firestore source from application config
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.firestore_timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            api_url: config.firestore_api_url.trim_end_matches('/').to_string(),
            project_id: config.firestore_project_id.clone(),
            database: config.firestore_database.clone(),
            collection: config.firestore_collection.clone(),
            access_token: config.firestore_access_token.clone(),
        })
    }

    fn run_query_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents:runQuery",
            self.api_url, self.project_id, self.database
        )
    }

    fn published_query(&self) -> Value {
        json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "status" },
                        "op": "EQUAL",
                        "value": { "stringValue": PUBLISHED_STATUS }
                    }
                }
            }
        })
    }
}

/// Keeps the documents of a runQuery response, in response order
fn decode_run_query(items: Vec<RunQueryResponseItem>) -> Vec<Article> {
    items
        .into_iter()
        .filter_map(|item| item.document)
        .map(Article::from)
        .collect()
}

#[async_trait::async_trait]
impl ArticleSource for FirestoreSource {
    async fn fetch_published(&self) -> AppResult<Vec<Article>> {
        let mut request = self
            .http_client
            .post(self.run_query_url())
            .json(&self.published_query());
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Firestore returned status {}: {}",
                status, body
            )));
        }

        let items: Vec<RunQueryResponseItem> = response.json().await?;
        let articles = decode_run_query(items);

        tracing::info!(
            collection = %self.collection,
            article_count = articles.len(),
            source = self.name(),
            "Fetched published articles"
        );

        Ok(articles)
    }

    fn name(&self) -> &'static str {
        "firestore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_source() -> FirestoreSource {
        let config: Config = envy::from_iter(vec![
            ("FIRESTORE_PROJECT_ID".to_string(), "artelipi".to_string()),
            (
                "FIRESTORE_API_URL".to_string(),
                "http://test.local/v1/".to_string(),
            ),
        ])
        .unwrap();
        FirestoreSource::new(&config).unwrap()
    }

    #[test]
    fn test_run_query_url() {
        let source = create_test_source();
        assert_eq!(
            source.run_query_url(),
            "http://test.local/v1/projects/artelipi/databases/(default)/documents:runQuery"
        );
    }

    #[test]
    fn test_published_query_filters_status() {
        let source = create_test_source();
        let query = source.published_query();
        let filter = &query["structuredQuery"]["where"]["fieldFilter"];

        assert_eq!(query["structuredQuery"]["from"][0]["collectionId"], "posts");
        assert_eq!(filter["field"]["fieldPath"], "status");
        assert_eq!(filter["op"], "EQUAL");
        assert_eq!(filter["value"]["stringValue"], "published");
    }

    #[test]
    fn test_decode_run_query_skips_progress_items() {
        let json = r#"[
            { "document": {
                "name": "projects/p/databases/(default)/documents/posts/first",
                "fields": { "title": { "stringValue": "One" } }
            } },
            { "readTime": "2024-05-02T00:00:00Z" },
            { "document": {
                "name": "projects/p/databases/(default)/documents/posts/second",
                "fields": { "likeCount": { "integerValue": "3" } }
            } }
        ]"#;

        let items: Vec<RunQueryResponseItem> = serde_json::from_str(json).unwrap();
        let articles = decode_run_query(items);

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].id, "first");
        assert_eq!(articles[0].title, "One");
        assert_eq!(articles[1].id, "second");
        assert_eq!(articles[1].like_count, 3);
    }

    #[test]
    fn test_empty_response_decodes_to_no_articles() {
        let items: Vec<RunQueryResponseItem> =
            serde_json::from_str(r#"[{ "readTime": "2024-05-02T00:00:00Z" }]"#).unwrap();
        assert!(decode_run_query(items).is_empty());
    }
}
