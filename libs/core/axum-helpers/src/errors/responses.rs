//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
use serde::Serialize;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::{ToResponse, ToSchema};

/// Body of an Access Gate rejection
#[derive(Debug, Serialize, ToSchema)]
pub struct DetailBody {
    pub detail: String,
}

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error - backing store failure",
    content_type = "application/json",
    example = json!({
        "code": 1005,
        "error": "INTERNAL_ERROR",
        "message": "Error saving chunk: Connection refused",
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "code": 1001,
        "error": "VALIDATION_ERROR",
        "message": "Request validation failed",
        "details": {
            "top_k": [{
                "code": "range",
                "message": null,
                "params": {"min": 1, "value": 0}
            }]
        }
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request",
    content_type = "application/json",
    example = json!({
        "code": 1012,
        "error": "BAD_REQUEST",
        "message": "Index 'docs' already exists. Set delete_the_index_if_it_exists=true to overwrite.",
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "code": 1004,
        "error": "NOT_FOUND",
        "message": "Index 'docs' not found",
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

/// Access Gate rejection. Not an [`ErrorResponse`].
#[derive(ToResponse)]
#[response(
    description = "Forbidden - API key missing or not in the allow-list",
    content_type = "application/json",
    example = json!({ "detail": "Invalid API key" })
)]
pub struct ForbiddenResponse(pub DetailBody);
