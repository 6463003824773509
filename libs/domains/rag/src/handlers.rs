use axum::{Json, Router, extract::State, middleware, routing::post};
use axum_helpers::{
    ApiKeyGate, ValidatedJson, api_key_middleware,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::chunks::ChunkStore;
use crate::codec::DType;
use crate::error::RagResult;
use crate::index::IndexManager;
use crate::models::{
    ChunkMatch, CreateIndexRequest, CreateIndexResponse, DropIndexRequest, DropIndexResponse,
    IngestChunkRequest, IngestChunkResponse, QueryRequest, QueryResponse,
};
use crate::search::SearchEngine;
use crate::store::VectorStore;

const TAG: &str = "rag";

/// OpenAPI documentation for the RAG API
#[derive(OpenApi)]
#[openapi(
    paths(create_index, ingest_chunk, query_rag, drop_index),
    components(
        schemas(
            DType,
            ChunkMatch,
            CreateIndexRequest,
            CreateIndexResponse,
            IngestChunkRequest,
            IngestChunkResponse,
            QueryRequest,
            QueryResponse,
            DropIndexRequest,
            DropIndexResponse
        ),
        responses(
            BadRequestResponse,
            BadRequestValidationResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Vector index lifecycle, chunk ingestion and similarity search")
    )
)]
pub struct ApiDoc;

/// The three components, sharing one store.
#[derive(Clone)]
pub struct RagState {
    pub indexes: IndexManager,
    pub chunks: ChunkStore,
    pub search: SearchEngine,
}

impl RagState {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            indexes: IndexManager::new(store.clone()),
            chunks: ChunkStore::new(store.clone()),
            search: SearchEngine::new(store),
        }
    }
}

/// RAG routes, every one of them behind the API-key gate.
pub fn router(state: RagState, gate: ApiKeyGate) -> Router {
    Router::new()
        .route("/create/index", post(create_index))
        .route("/rag/create", post(ingest_chunk))
        .route("/rag/query-rag", post(query_rag))
        .route("/rag/drop_index", post(drop_index))
        .route_layer(middleware::from_fn_with_state(gate, api_key_middleware))
        .with_state(state)
}

/// Create (or overwrite) a vector index
#[utoipa::path(
    post,
    path = "/create/index",
    tag = TAG,
    request_body = CreateIndexRequest,
    params(("x-api-key" = Option<String>, Header, description = "Required when an allow-list is configured")),
    responses(
        (status = 200, description = "Index created", body = CreateIndexResponse),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_index(
    State(state): State<RagState>,
    ValidatedJson(input): ValidatedJson<CreateIndexRequest>,
) -> RagResult<Json<CreateIndexResponse>> {
    let fields = state
        .indexes
        .create_index(
            &input.indexname,
            input.embeddings_dim,
            input.dtype,
            input.delete_the_index_if_it_exists,
        )
        .await?;

    Ok(Json(CreateIndexResponse {
        status: "success".to_string(),
        index: input.indexname,
        fields,
    }))
}

/// Store one text chunk with its embedding
#[utoipa::path(
    post,
    path = "/rag/create",
    tag = TAG,
    request_body = IngestChunkRequest,
    params(("x-api-key" = Option<String>, Header, description = "Required when an allow-list is configured")),
    responses(
        (status = 200, description = "Chunk stored", body = IngestChunkResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn ingest_chunk(
    State(state): State<RagState>,
    ValidatedJson(input): ValidatedJson<IngestChunkRequest>,
) -> RagResult<Json<IngestChunkResponse>> {
    let key = state.chunks.ingest(input).await?;

    Ok(Json(IngestChunkResponse {
        status: "ok".to_string(),
        key,
    }))
}

/// Nearest chunks to a query embedding
#[utoipa::path(
    post,
    path = "/rag/query-rag",
    tag = TAG,
    request_body = QueryRequest,
    params(("x-api-key" = Option<String>, Header, description = "Required when an allow-list is configured")),
    responses(
        (status = 200, description = "Matches ordered by ascending cosine distance", body = QueryResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn query_rag(
    State(state): State<RagState>,
    ValidatedJson(input): ValidatedJson<QueryRequest>,
) -> RagResult<Json<QueryResponse>> {
    let outcome = state
        .search
        .search(
            &input.index,
            input.dtype,
            &input.embeddings,
            input.top_k,
            input.cosine_distance_threshold,
        )
        .await?;

    Ok(Json(QueryResponse {
        status: "ok".to_string(),
        total: outcome.total,
        results: outcome.results,
    }))
}

/// Drop an index, optionally with its documents
#[utoipa::path(
    post,
    path = "/rag/drop_index",
    tag = TAG,
    request_body = DropIndexRequest,
    params(("x-api-key" = Option<String>, Header, description = "Required when an allow-list is configured")),
    responses(
        (status = 200, description = "Index dropped", body = DropIndexResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn drop_index(
    State(state): State<RagState>,
    ValidatedJson(input): ValidatedJson<DropIndexRequest>,
) -> RagResult<Json<DropIndexResponse>> {
    state
        .indexes
        .drop_index(&input.index_name, input.delete_docs)
        .await?;

    Ok(Json(DropIndexResponse {
        status: "dropped".to_string(),
        drop_index: input.index_name,
    }))
}
