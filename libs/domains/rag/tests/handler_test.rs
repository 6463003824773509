//! Handler tests for the RAG domain
//!
//! The router runs against the in-process store, so these cover request
//! decoding, the API-key gate, status codes and response bodies without a
//! Redis Stack instance.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::ApiKeyGate;
use domain_rag::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::TestDataBuilder;
use tower::ServiceExt; // For oneshot()

const KEY: &str = "test-key";

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app() -> Router {
    let store = Arc::new(InMemoryVectorStore::new());
    handlers::router(RagState::new(store), ApiKeyGate::new([KEY]))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-api-key", KEY)
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, json_body(response.into_body()).await)
}

fn create_body(index: &str, dim: usize, overwrite: bool) -> Value {
    json!({
        "indexname": index,
        "embeddings_dim": dim,
        "dtype": "FLOAT32",
        "delete_the_index_if_it_exists": overwrite
    })
}

fn chunk_body(index: &str, name: &str, embeddings: &[f64]) -> Value {
    json!({
        "index": index,
        "name_chunk": name,
        "dtype": "FLOAT32",
        "chunk_size": 1024,
        "raw_text": format!("text of {}", name),
        "embeddings": embeddings
    })
}

#[tokio::test]
async fn test_missing_key_is_forbidden() {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/create/index")
        .header("content-type", "application/json")
        .body(Body::from(create_body("docs", 3, false).to_string()))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"detail": "API key missing"}));
}

#[tokio::test]
async fn test_wrong_key_is_forbidden_before_body_is_read() {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/rag/query-rag")
        .header("content-type", "application/json")
        .header("x-api-key", "nope")
        .body(Body::from("not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Invalid API key");
}

#[tokio::test]
async fn test_open_gate_needs_no_key() {
    let store = Arc::new(InMemoryVectorStore::new());
    let app = handlers::router(RagState::new(store), ApiKeyGate::open());

    let request = Request::builder()
        .method("POST")
        .uri("/create/index")
        .header("content-type", "application/json")
        .body(Body::from(create_body("docs", 3, false).to_string()))
        .unwrap();

    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_ingest_query_drop() {
    let app = app();
    let index = TestDataBuilder::from_test_name("create_ingest_query_drop").index_name("docs");

    let (status, body) = send(&app, post("/create/index", create_body(&index, 3, false))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["index"], index.as_str());
    assert_eq!(
        body["fields"],
        json!(["name_chunk", "chunk_id", "chunk_size", "raw_text", "embedding"])
    );

    let (status, body) = send(&app, post("/rag/create", chunk_body(&index, "a", &[1.0, 0.0, 0.0]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "key": format!("{}:1", index)}));

    let (_, body) = send(&app, post("/rag/create", chunk_body(&index, "b", &[0.0, 1.0, 0.0]))).await;
    assert_eq!(body["key"], format!("{}:2", index));

    let (status, body) = send(
        &app,
        post(
            "/rag/query-rag",
            json!({
                "index": index,
                "embeddings": [0.9, 0.1, 0.0],
                "dtype": "FLOAT32",
                "top_k": 5
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["total"], 2);

    let results: Vec<ChunkMatch> = serde_json::from_value(body["results"].clone()).unwrap();
    assert_eq!(results[0].name_chunk, "a");
    assert_eq!(results[0].chunk_id, 1);
    assert_eq!(results[0].chunk_size, 1024);
    assert_eq!(results[0].raw_text, "text of a");
    assert!(results[0].score <= results[1].score);

    let (status, body) = send(
        &app,
        post("/rag/drop_index", json!({"index_name": index, "delete_docs": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "dropped", "drop_index": index}));
}

#[tokio::test]
async fn test_threshold_filters_distant_chunks() {
    let app = app();

    send(&app, post("/create/index", create_body("docs", 2, false))).await;
    send(&app, post("/rag/create", chunk_body("docs", "near", &[1.0, 0.0]))).await;
    send(&app, post("/rag/create", chunk_body("docs", "far", &[0.0, 1.0]))).await;

    let (status, body) = send(
        &app,
        post(
            "/rag/query-rag",
            json!({
                "index": "docs",
                "embeddings": [1.0, 0.0],
                "dtype": "FLOAT32",
                "top_k": 2,
                "cosine_distance_threshold": 0.5
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["name_chunk"], "near");
}

#[tokio::test]
async fn test_create_existing_index_without_overwrite_is_400() {
    let app = app();

    send(&app, post("/create/index", create_body("docs", 3, false))).await;
    let (status, body) = send(&app, post("/create/index", create_body("docs", 3, false))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Index 'docs' already exists. Set delete_the_index_if_it_exists=true to overwrite."
    );
}

#[tokio::test]
async fn test_overwrite_recreates_index() {
    let app = app();

    send(&app, post("/create/index", create_body("docs", 3, false))).await;
    let (status, body) = send(&app, post("/create/index", create_body("docs", 4, true))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn test_drop_missing_index_is_404() {
    let app = app();

    let (status, body) = send(
        &app,
        post("/rag/drop_index", json!({"index_name": "ghost", "delete_docs": false})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Index 'ghost' not found");
}

#[tokio::test]
async fn test_unknown_dtype_is_rejected() {
    let app = app();

    let mut body = create_body("docs", 3, false);
    body["dtype"] = json!("INT8");
    let (status, _) = send(&app, post("/create/index", body)).await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_zero_top_k_is_400() {
    let app = app();

    send(&app, post("/create/index", create_body("docs", 2, false))).await;
    let (status, body) = send(
        &app,
        post(
            "/rag/query-rag",
            json!({"index": "docs", "embeddings": [1.0, 0.0], "dtype": "FLOAT32", "top_k": 0}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["top_k"].is_array());
}

#[tokio::test]
async fn test_query_missing_index_is_500() {
    let app = app();

    let (status, body) = send(
        &app,
        post(
            "/rag/query-rag",
            json!({"index": "ghost", "embeddings": [1.0], "dtype": "FLOAT32", "top_k": 1}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().starts_with("Search error:"));
}
