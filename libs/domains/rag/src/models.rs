use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::codec::DType;

pub const NAME_CHUNK: &str = "name_chunk";
pub const CHUNK_ID: &str = "chunk_id";
pub const CHUNK_SIZE: &str = "chunk_size";
pub const RAW_TEXT: &str = "raw_text";
pub const EMBEDDING: &str = "embedding";
/// Alias the KNN distance is returned under
pub const SCORE: &str = "score";

// ===== Index schema =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DistanceMetric {
    #[default]
    Cosine,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "COSINE",
        }
    }
}

/// HNSW tuning handed to the backing store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HnswParams {
    pub initial_capacity: u32,
    pub m: u32,
    pub ef_construction: u32,
    pub ef_runtime: u32,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            initial_capacity: 400,
            m: 16,
            ef_construction: 200,
            ef_runtime: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorParams {
    pub dtype: DType,
    pub dim: usize,
    pub metric: DistanceMetric,
    pub hnsw: HnswParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text { sortable: bool },
    Numeric { sortable: bool },
    Vector(VectorParams),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn text(name: &str, sortable: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Text { sortable },
        }
    }

    pub fn numeric(name: &str, sortable: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Numeric { sortable },
        }
    }

    pub fn vector(name: &str, params: VectorParams) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Vector(params),
        }
    }
}

/// Everything needed to register an index over hashes under `prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    pub name: String,
    pub prefix: String,
    pub fields: Vec<FieldSpec>,
}

impl IndexSchema {
    /// Layout used for every chunk index: `name_chunk` (sortable text),
    /// `chunk_id` and `chunk_size` (sortable numeric), `raw_text` (text),
    /// `embedding` (cosine HNSW vector). Keys live under `{name}:`.
    pub fn chunks(name: &str, dim: usize, dtype: DType, hnsw: HnswParams) -> Self {
        Self {
            name: name.to_string(),
            prefix: key_prefix(name),
            fields: vec![
                FieldSpec::text(NAME_CHUNK, true),
                FieldSpec::numeric(CHUNK_ID, true),
                FieldSpec::numeric(CHUNK_SIZE, true),
                FieldSpec::text(RAW_TEXT, false),
                FieldSpec::vector(
                    EMBEDDING,
                    VectorParams {
                        dtype,
                        dim,
                        metric: DistanceMetric::Cosine,
                        hnsw,
                    },
                ),
            ],
        }
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn vector_field(&self) -> Option<(&str, &VectorParams)> {
        self.fields.iter().find_map(|f| match &f.kind {
            FieldKind::Vector(params) => Some((f.name.as_str(), params)),
            _ => None,
        })
    }
}

pub fn key_prefix(index: &str) -> String {
    format!("{}:", index)
}

pub fn chunk_key(index: &str, chunk_id: u64) -> String {
    format!("{}:{}", index, chunk_id)
}

/// Key of the per-index id counter. It shares the index prefix but is a
/// plain string, so the index never picks it up.
pub fn counter_key(index: &str) -> String {
    format!("{}:next_id", index)
}

/// What the backing store reports about a registered index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub num_docs: u64,
}

// ===== Chunks =====

/// One stored chunk, embedding already encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    pub key: String,
    pub chunk_id: u64,
    pub name_chunk: String,
    pub chunk_size: u64,
    pub raw_text: String,
    pub embedding: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KnnQuery {
    pub index: String,
    pub vector: Vec<u8>,
    pub k: usize,
}

/// A search hit. `score` is the cosine distance (0 = same direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChunkMatch {
    pub name_chunk: String,
    pub chunk_id: u64,
    pub chunk_size: u64,
    pub raw_text: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub total: usize,
    pub results: Vec<ChunkMatch>,
}

// ===== HTTP DTOs =====

/// Body of `POST /create/index`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateIndexRequest {
    #[validate(length(min = 1, message = "Index name cannot be empty"))]
    #[schema(example = "docs")]
    pub indexname: String,
    #[validate(range(min = 1, message = "Dimension must be at least 1"))]
    #[schema(example = 768)]
    pub embeddings_dim: usize,
    pub dtype: DType,
    pub delete_the_index_if_it_exists: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateIndexResponse {
    #[schema(example = "success")]
    pub status: String,
    pub index: String,
    pub fields: Vec<String>,
}

/// Body of `POST /rag/create`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct IngestChunkRequest {
    #[validate(length(min = 1, message = "Index name cannot be empty"))]
    pub index: String,
    pub name_chunk: String,
    pub dtype: DType,
    pub chunk_size: u64,
    pub raw_text: String,
    pub embeddings: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestChunkResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "docs:1")]
    pub key: String,
}

/// Body of `POST /rag/query-rag`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1, message = "Index name cannot be empty"))]
    pub index: String,
    #[validate(length(min = 1, message = "Query embedding cannot be empty"))]
    pub embeddings: Vec<f64>,
    pub dtype: DType,
    #[validate(range(min = 1, message = "top_k must be at least 1"))]
    #[schema(example = 5)]
    pub top_k: usize,
    /// Maximum cosine distance kept; `null` keeps everything
    #[serde(default)]
    pub cosine_distance_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub total: usize,
    pub results: Vec<ChunkMatch>,
}

/// Body of `POST /rag/drop_index`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct DropIndexRequest {
    #[validate(length(min = 1, message = "Index name cannot be empty"))]
    pub index_name: String,
    pub delete_docs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DropIndexResponse {
    #[schema(example = "dropped")]
    pub status: String,
    pub drop_index: String,
}
