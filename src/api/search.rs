use axum::extract::{RawQuery, State};
use axum::Json;

use crate::app::AppState;
use crate::error::AppError;
use crate::models::search::{RawSearchParams, SearchResponse};

/// Axum handler for `GET /api/search`.
///
/// The query string is parsed by hand rather than through `Query<T>` so that
/// no input can produce a rejection.
pub async fn search_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<SearchResponse>, AppError> {
    let params = RawSearchParams::from_query_string(query.as_deref().unwrap_or_default());
    let response = state.coordinator.search(&params).await?;
    Ok(Json(response))
}

/// Axum handler for `GET /`.
pub async fn root_handler() -> &'static str {
    "Server is running"
}
