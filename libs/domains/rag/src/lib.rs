//! RAG domain: vector-indexed chunk storage and similarity search.
//!
//! ```text
//!            ┌──────────────┐
//!  request ─▶│ ApiKeyGate   │ (axum-helpers middleware)
//!            └──────┬───────┘
//!     ┌─────────────┼──────────────┐
//! ┌───▼────────┐ ┌──▼─────────┐ ┌──▼───────────┐
//! │IndexManager│ │ ChunkStore │ │ SearchEngine │
//! └───┬────────┘ └──┬─────────┘ └──┬───────────┘
//!     └─────────────┼──────────────┘
//!            ┌──────▼───────┐
//!            │ VectorStore  │ (trait)
//!            └──────┬───────┘
//!        ┌──────────┴───────────┐
//! ┌──────▼──────────┐ ┌─────────▼─────────┐
//! │RedisVectorStore │ │InMemoryVectorStore│
//! └─────────────────┘ └───────────────────┘
//! ```
//!
//! ```rust,ignore
//! use domain_rag::{RagState, RedisVectorStore, handlers};
//! use std::sync::Arc;
//!
//! let store = Arc::new(RedisVectorStore::new(redis_handle));
//! let app = handlers::router(RagState::new(store), gate);
//! ```

pub mod chunks;
pub mod codec;
pub mod error;
pub mod handlers;
pub mod index;
pub mod models;
pub mod search;
pub mod store;

pub use chunks::ChunkStore;
pub use codec::{DType, decode, encode, encode_tagged};
pub use error::{RagError, RagResult};
pub use handlers::{ApiDoc, RagState};
pub use index::IndexManager;
pub use models::{
    ChunkMatch, CreateIndexRequest, CreateIndexResponse, DropIndexRequest, DropIndexResponse,
    HnswParams, IndexSchema, IngestChunkRequest, IngestChunkResponse, QueryRequest, QueryResponse,
    SearchOutcome,
};
pub use search::SearchEngine;
pub use store::{InMemoryVectorStore, RedisVectorStore, VectorStore};
