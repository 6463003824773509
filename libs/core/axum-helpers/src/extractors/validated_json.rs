//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Deserialization failures (syntax errors, missing fields, unknown enum
/// tags) surface as [`AppError::JsonExtractorRejection`]; constraint
/// violations as [`AppError::ValidationError`] with per-field details.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::post;
/// use axum_helpers::extractors::ValidatedJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct DropIndex {
///     #[validate(length(min = 1))]
///     index_name: String,
/// }
///
/// async fn drop_index(ValidatedJson(payload): ValidatedJson<DropIndex>) -> String {
///     format!("Dropping {}", payload.index_name)
/// }
///
/// let app = Router::new().route("/rag/drop_index", post(drop_index));
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
