pub mod blob_store;
pub mod config;
pub mod controllers;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use blob_store::{BlobStore, LocalBlobStore};
use store::{MemoryStore, PgStore, Store};

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub images: Arc<dyn BlobStore>,
    pub config: config::Config,
}

impl AppState {
    /// Connects the configured backends; Postgres migrations run before serving.
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn Store> = if config.database.is_memory() {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        } else {
            let pg = PgStore::connect(&config.database.url, config.database.pool_size).await?;
            tracing::info!("Database connected");
            pg.run_migrations().await?;
            tracing::info!("Migrations applied");
            Arc::new(pg)
        };

        let images = Arc::new(LocalBlobStore::new(
            &config.storage.dir,
            &config.storage.public_url,
        ));

        Ok(Self::with_parts(store, images, config))
    }

    pub fn with_parts(
        store: Arc<dyn Store>,
        images: Arc<dyn BlobStore>,
        config: config::Config,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            images,
            config,
        })
    }
}

/// The full HTTP surface, including uploaded images under `/images`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "EventEase API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .merge(controllers::routes(&state))
        .nest_service(
            "/images",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .service(ServeDir::new(&state.config.storage.dir)),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
