use std::sync::Arc;

use artelipi_recommender::{
    api::{cors_layer, create_router, AppState},
    config::Config,
    db::FileModelStore,
    services::{catalog, providers::FirestoreSource},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("artelipi_recommender=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let source = Arc::new(FirestoreSource::new(&config)?);
    let store = Arc::new(FileModelStore::new(&config.model_dir));
    let state = AppState::new(source, store, config.refresh_on_request);

    // A failed warm start leaves an empty engine; the service still comes up
    match catalog::warm_start(&state.engine, state.source.as_ref(), state.store.as_ref()).await {
        Ok(outcome) => tracing::info!(?outcome, "Artelipi recommender ready"),
        Err(e) => tracing::error!(error = %e, "Error loading recommender"),
    }

    let app = create_router(state).layer(cors_layer(&config.cors_allowed_origins));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
