//! Refresh lifecycle: pulling articles from the source into the engine,
//! rebuilding the model, and persisting or restoring snapshots.

use tokio::sync::{RwLock, RwLockReadGuard};

use crate::{
    db::ModelStore,
    error::AppResult,
    services::{
        corpus::LoadOutcome,
        providers::ArticleSource,
        recommender::{BuildOutcome, Recommender},
    },
};

/// Outcome of a refresh from the article source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub article_count: usize,
    pub rebuilt: bool,
    pub ml_enabled: bool,
}

/// How the engine was brought up at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmStart {
    Restored { article_count: usize },
    Rebuilt(RefreshSummary),
}

/// Reloads the corpus and rebuilds when it is large enough
///
/// The fetch runs before the write lock is taken, so readers are only blocked
/// for the load and build themselves.
async fn reload<'a>(
    engine: &'a RwLock<Recommender>,
    source: &dyn ArticleSource,
) -> AppResult<(RwLockReadGuard<'a, Recommender>, RefreshSummary)> {
    let articles = source.fetch_published().await?;

    let mut guard = engine.write().await;
    if let LoadOutcome::Empty = guard.load(articles) {
        tracing::warn!(source = source.name(), "No published articles found");
    }
    let rebuilt = if guard.needs_rebuild() {
        matches!(guard.build(), BuildOutcome::Built { .. })
    } else {
        false
    };

    let summary = RefreshSummary {
        article_count: guard.corpus().len(),
        rebuilt,
        ml_enabled: guard.ml_enabled(),
    };
    Ok((guard.downgrade(), summary))
}

/// Read access to the engine, refreshed from the source first when asked
///
/// Load, rebuild and the caller's queries all see the same corpus/model pair.
pub async fn prepare<'a>(
    engine: &'a RwLock<Recommender>,
    source: &dyn ArticleSource,
    refresh: bool,
) -> AppResult<RwLockReadGuard<'a, Recommender>> {
    if !refresh {
        return Ok(engine.read().await);
    }
    let (guard, _) = reload(engine, source).await?;
    Ok(guard)
}

/// Full refresh: reload, rebuild whenever there is enough data, save the result
pub async fn refresh_and_persist(
    engine: &RwLock<Recommender>,
    source: &dyn ArticleSource,
    store: &dyn ModelStore,
) -> AppResult<RefreshSummary> {
    let (guard, summary) = reload(engine, source).await?;
    let snapshot = if summary.rebuilt { guard.snapshot() } else { None };
    drop(guard);

    if let Some(snapshot) = snapshot {
        store.save(&snapshot).await?;
    }

    tracing::info!(
        article_count = summary.article_count,
        rebuilt = summary.rebuilt,
        ml_enabled = summary.ml_enabled,
        "Catalog refreshed"
    );
    Ok(summary)
}

/// Restores the saved snapshot, falling back to a full refresh on a miss
pub async fn warm_start(
    engine: &RwLock<Recommender>,
    source: &dyn ArticleSource,
    store: &dyn ModelStore,
) -> AppResult<WarmStart> {
    match store.load().await {
        Ok(Some(snapshot)) => {
            let article_count = snapshot.articles.len();
            match engine.write().await.restore(snapshot) {
                Ok(()) => return Ok(WarmStart::Restored { article_count }),
                Err(e) => tracing::warn!(error = %e, "Saved model rejected, rebuilding"),
            }
        }
        Ok(None) => {
            tracing::info!(source = source.name(), "No saved model found, loading from source")
        }
        Err(e) => tracing::warn!(error = %e, "Could not read saved model, rebuilding"),
    }

    let summary = refresh_and_persist(engine, source, store).await?;
    if !summary.ml_enabled {
        tracing::warn!(
            article_count = summary.article_count,
            "ML disabled until enough articles exist"
        );
    }
    Ok(WarmStart::Rebuilt(summary))
}
