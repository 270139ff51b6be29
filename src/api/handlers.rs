use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::Recommendation;
use crate::services::catalog;

use super::AppState;

pub const SERVICE_NAME: &str = "Artelipi Recommendation API";
pub const DATA_SOURCE: &str = "Artelipi Firestore Only";
pub const SOURCE_TAG: &str = "artelipi_platform";
pub const MAX_LIMIT: usize = 100;

const DEFAULT_LIST_LIMIT: usize = 10;
const DEFAULT_RECOMMENDATION_LIMIT: usize = 5;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub article_count: usize,
    pub ml_enabled: bool,
    pub data_source: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    pub articles: Vec<Recommendation>,
    pub count: usize,
    pub source: &'static str,
}

impl From<Vec<Recommendation>> for ArticlesResponse {
    fn from(articles: Vec<Recommendation>) -> Self {
        Self {
            count: articles.len(),
            articles,
            source: SOURCE_TAG,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    pub count: usize,
    pub ml_enabled: bool,
    pub source: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_articles: usize,
    pub ml_enabled: bool,
    pub min_articles_for_ml: usize,
    pub data_source: &'static str,
    pub recommendation_strategy: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub article_count: usize,
    pub ml_enabled: bool,
}

fn validate_limit(limit: Option<usize>, default: usize) -> AppResult<usize> {
    match limit.unwrap_or(default) {
        0 => Err(AppError::InvalidInput("limit must be at least 1".to_string())),
        n => Ok(n.min(MAX_LIMIT)),
    }
}

// Handlers

/// Service status
pub async fn root(State(state): State<AppState>) -> Json<StatusResponse> {
    let engine = state.engine.read().await;
    Json(StatusResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        article_count: engine.corpus().len(),
        ml_enabled: engine.ml_enabled(),
        data_source: DATA_SOURCE,
    })
}

/// Liveness check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Articles ranked by engagement
pub async fn trending(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<ArticlesResponse>> {
    let limit = validate_limit(params.limit, DEFAULT_LIST_LIMIT)?;
    let engine =
        catalog::prepare(&state.engine, state.source.as_ref(), state.refresh_on_request).await?;

    let articles = engine.trending(limit);
    tracing::info!(request_id = %request_id, limit, count = articles.len(), "Served trending");
    Ok(Json(articles.into()))
}

/// Newest articles
pub async fn recent(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<ArticlesResponse>> {
    let limit = validate_limit(params.limit, DEFAULT_LIST_LIMIT)?;
    let engine =
        catalog::prepare(&state.engine, state.source.as_ref(), state.refresh_on_request).await?;

    let articles = engine.recent(limit);
    tracing::info!(request_id = %request_id, limit, count = articles.len(), "Served recent");
    Ok(Json(articles.into()))
}

/// Articles related to an existing article
pub async fn recommendations_for_article(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(article_id): Path<String>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<RecommendationsResponse>> {
    let limit = validate_limit(params.limit, DEFAULT_RECOMMENDATION_LIMIT)?;
    let engine =
        catalog::prepare(&state.engine, state.source.as_ref(), state.refresh_on_request).await?;

    let recommendations = engine.similar_to_article(&article_id, limit);
    tracing::info!(
        request_id = %request_id,
        article_id = %article_id,
        count = recommendations.len(),
        ml_enabled = engine.ml_enabled(),
        "Served article recommendations"
    );

    Ok(Json(RecommendationsResponse {
        count: recommendations.len(),
        recommendations,
        ml_enabled: engine.ml_enabled(),
        source: SOURCE_TAG,
    }))
}

/// Articles related to free text
pub async fn recommendations_by_content(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ContentRequest>,
) -> AppResult<Json<RecommendationsResponse>> {
    let limit = validate_limit(request.limit, DEFAULT_RECOMMENDATION_LIMIT)?;
    let engine =
        catalog::prepare(&state.engine, state.source.as_ref(), state.refresh_on_request).await?;

    let recommendations = engine.similar_to_content(&request.content, limit);
    tracing::info!(
        request_id = %request_id,
        content_len = request.content.len(),
        count = recommendations.len(),
        "Served content recommendations"
    );

    Ok(Json(RecommendationsResponse {
        count: recommendations.len(),
        recommendations,
        ml_enabled: engine.ml_enabled(),
        source: SOURCE_TAG,
    }))
}

/// Engine statistics
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.engine.read().await.stats();
    Json(StatsResponse {
        total_articles: stats.total_articles,
        ml_enabled: stats.ml_enabled,
        min_articles_for_ml: stats.min_articles_for_ml,
        data_source: DATA_SOURCE,
        recommendation_strategy: stats.recommendation_strategy,
    })
}

/// Reload from the source, rebuild and persist
pub async fn refresh(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<RefreshResponse>> {
    tracing::info!(request_id = %request_id, "Processing refresh request");

    let summary =
        catalog::refresh_and_persist(&state.engine, state.source.as_ref(), state.store.as_ref())
            .await?;

    Ok(Json(RefreshResponse {
        status: "refreshed",
        article_count: summary.article_count,
        ml_enabled: summary.ml_enabled,
    }))
}
