use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Every failure reaching the HTTP layer is a server error with an opaque
/// body. Malformed input never gets here; it is normalised instead.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "search request failed");

        let message = match &self {
            AppError::Database(_) | AppError::Unavailable(_) => "Search backend unavailable",
            AppError::Config(_) | AppError::Internal(_) => "Internal server error",
        };

        let body = serde_json::json!({
            "error": message
        });

        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}
