use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::{redact_uri, FallbackSettings, Settings};
use crate::db::corpus::MemoryCorpus;
use crate::db::index::{DocumentIndex, MongoDocumentIndex};
use crate::error::AppError;
use crate::search::backend::StorageBackend;
use crate::search::coordinator::SearchCoordinator;
use crate::search::fallback::FallbackBackend;
use crate::search::indexed::IndexedBackend;

/// Shared application state available to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SearchCoordinator>,
}

impl AppState {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            coordinator: Arc::new(SearchCoordinator::new(backend)),
        }
    }
}

/// Build the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::search::root_handler))
        .route("/api/search", get(api::search::search_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Pick the backend for the lifetime of the process.
///
/// Connects to MongoDB when a URI is configured; any failure along the way
/// falls back to the in-memory corpus.
pub async fn select_backend(settings: &Settings) -> Result<Arc<dyn StorageBackend>, AppError> {
    let index: Option<Arc<dyn DocumentIndex>> = match settings.mongodb.uri() {
        Some(uri) => {
            tracing::info!("Connecting to MongoDB at {}", redact_uri(uri));
            match MongoDocumentIndex::connect(
                uri,
                &settings.mongodb.database,
                &settings.mongodb.collection,
                settings.mongodb.connect_timeout(),
            )
            .await
            {
                Ok(index) => Some(Arc::new(index)),
                Err(e) => {
                    tracing::warn!("Could not configure MongoDB client: {e}");
                    None
                }
            }
        }
        None => {
            tracing::warn!("No MongoDB URI provided, running in in-memory mode");
            None
        }
    };

    choose_backend(index, settings.mongodb.ensure_indexes, || {
        load_corpus(&settings.fallback)
    })
    .await
}

/// Use `index` if it answers a ping (and, when asked, accepts the index
/// bootstrap); otherwise build the fallback backend from `corpus`.
pub async fn choose_backend<F>(
    index: Option<Arc<dyn DocumentIndex>>,
    ensure_indexes: bool,
    corpus: F,
) -> Result<Arc<dyn StorageBackend>, AppError>
where
    F: FnOnce() -> Result<MemoryCorpus, AppError>,
{
    if let Some(index) = index {
        match prepare_index(index.as_ref(), ensure_indexes).await {
            Ok(()) => {
                tracing::info!("Connected to MongoDB, using indexed search backend");
                return Ok(Arc::new(IndexedBackend::new(index)));
            }
            Err(e) => {
                tracing::warn!("MongoDB unreachable, falling back to in-memory corpus: {e}");
            }
        }
    }

    let corpus = corpus()?;
    tracing::info!(
        documents = corpus.len(),
        "Using fallback search backend"
    );
    Ok(Arc::new(FallbackBackend::new(Arc::new(corpus))))
}

async fn prepare_index(index: &dyn DocumentIndex, ensure_indexes: bool) -> Result<(), AppError> {
    index.ping().await?;
    if ensure_indexes {
        index.ensure_indexes().await?;
    }
    Ok(())
}

fn load_corpus(settings: &FallbackSettings) -> Result<MemoryCorpus, AppError> {
    match &settings.corpus_path {
        Some(path) => {
            tracing::info!("Loading fallback corpus from {}", path.display());
            MemoryCorpus::from_path(path)
        }
        None => Ok(MemoryCorpus::sample()),
    }
}
