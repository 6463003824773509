use axum::{http::StatusCode, http::Uri, response::Response};

use super::{ErrorCode, error_response};

/// Router fallback for unknown paths.
pub async fn not_found(uri: Uri) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("No route for {}", uri.path()),
        ErrorCode::NotFound,
    )
}
