//! Composition root: opens the Redis handle once, wires it into the RAG
//! components and serves until a shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::{
    ApiKeyGate, HealthCheckFuture, create_production_app, create_router, health_router,
    run_health_checks,
};
use core_config::{FromEnv, app_info, server::ServerConfig};
use database::redis::connect_with_retry;
use domain_rag::{ApiDoc, RagState, RedisVectorStore, VectorStore, handlers};
use eyre::{Result, WrapErr};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::config::{AquilesConfig, config_path};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn run(host: Option<String>, port: Option<u16>) -> Result<()> {
    let server_config = ServerConfig::from_env()?.with_overrides(host, port);

    let path = config_path()?;
    let settings = AquilesConfig::init(&path)?;
    info!(path = %path.display(), "Loaded configuration");

    let redis_config = settings.to_redis_config();
    let handle = connect_with_retry(&redis_config, None)
        .await
        .wrap_err_with(|| format!("Redis connection failed ({})", redis_config.redacted_url()))?;

    let store: Arc<dyn VectorStore> = Arc::new(RedisVectorStore::new(handle));
    let gate = ApiKeyGate::new(settings.api_keys());

    let app = build_app(store, gate).await?;

    info!("Starting Aquiles-RAG ({}s graceful shutdown)", SHUTDOWN_TIMEOUT.as_secs());

    // The router owns every clone of the store; the Redis handle is released
    // when the server drops it after shutdown.
    create_production_app(app, &server_config, SHUTDOWN_TIMEOUT, async {
        info!("Shutdown signal received, draining requests");
    })
    .await
    .wrap_err("Server error")?;

    info!("Aquiles-RAG shutdown complete");
    Ok(())
}

/// Full router: docs, the gated RAG routes, `/`, `/health` and `/ready`.
pub async fn build_app(store: Arc<dyn VectorStore>, gate: ApiKeyGate) -> Result<Router> {
    if gate.is_open() {
        warn!("No API keys configured, RAG routes are open");
    } else {
        info!(keys = gate.len(), "API key gate enabled");
    }

    let api_routes = Router::new()
        .route("/", get(root))
        .merge(handlers::router(RagState::new(store.clone()), gate));

    let router = create_router::<ApiDoc>(api_routes).await?;

    Ok(router
        .merge(health_router(app_info!()))
        .merge(ready_router(store)))
}

async fn root() -> Json<Value> {
    Json(json!({ "hello": "Hey this is Aquiles-RAG" }))
}

fn ready_router(store: Arc<dyn VectorStore>) -> Router {
    Router::new().route("/ready", get(ready)).with_state(store)
}

async fn ready(State(store): State<Arc<dyn VectorStore>>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "redis",
        Box::pin(async move { store.ping().await.map_err(|e| e.to_string()) }),
    )];

    match run_health_checks(checks).await {
        Ok(ok) => ok.into_response(),
        Err(not_ready) => not_ready.into_response(),
    }
}
