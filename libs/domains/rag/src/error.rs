use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::DatabaseError;
use thiserror::Error;

use crate::codec::DType;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Unsupported dtype: {0}")]
    UnsupportedDtype(String),

    #[error("Payload of {len} bytes is not a whole number of {dtype} elements")]
    InvalidPayload { len: usize, dtype: DType },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Index '{0}' already exists. Set delete_the_index_if_it_exists=true to overwrite.")]
    IndexAlreadyExists(String),

    #[error("Index '{0}' not found")]
    IndexNotFound(String),

    #[error("Error saving chunk: {0}")]
    StoreWrite(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Backing store error: {0}")]
    Store(String),
}

pub type RagResult<T> = Result<T, RagError>;

impl From<redis::RedisError> for RagError {
    fn from(err: redis::RedisError) -> Self {
        RagError::Store(err.to_string())
    }
}

impl From<DatabaseError> for RagError {
    fn from(err: DatabaseError) -> Self {
        RagError::Store(err.to_string())
    }
}

/// Convert RagError to AppError for standardized HTTP error responses
impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        match err {
            e @ (RagError::UnsupportedDtype(_)
            | RagError::Validation(_)
            | RagError::IndexAlreadyExists(_)) => AppError::BadRequest(e.to_string()),
            e @ RagError::IndexNotFound(_) => AppError::NotFound(e.to_string()),
            e @ (RagError::InvalidPayload { .. }
            | RagError::StoreWrite(_)
            | RagError::Search(_)
            | RagError::Store(_)) => AppError::InternalServerError(e.to_string()),
        }
    }
}

impl IntoResponse for RagError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
