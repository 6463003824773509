//! # Axum Helpers
//!
//! Cross-cutting HTTP plumbing for the Aquiles service.
//!
//! - **[`auth`]**: static API-key gate (`x-api-key`)
//! - **[`server`]**: router assembly with OpenAPI docs, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: structured error responses with error codes
//! - **[`extractors`]**: validated JSON bodies
//!
//! ```ignore
//! use axum_helpers::{ApiKeyGate, create_router, create_production_app};
//!
//! let gate = ApiKeyGate::new(["secret"]);
//! let router = create_router::<ApiDoc>(domain_routes(gate)).await?;
//! create_production_app(router, &server_config, Duration::from_secs(30), async {}).await?;
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{API_KEY_HEADER, ApiKeyGate, GateError, api_key_middleware};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks,
};

pub use http::{create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::ValidatedJson;
