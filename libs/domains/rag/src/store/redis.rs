use async_trait::async_trait;
use database::redis::{RedisError, RedisHandle};
use redis::Value;
use tracing::{debug, instrument};

use crate::error::{RagError, RagResult};
use crate::models::{
    CHUNK_ID, CHUNK_SIZE, ChunkMatch, ChunkRecord, EMBEDDING, FieldKind, IndexInfo, IndexSchema,
    KnnQuery, NAME_CHUNK, RAW_TEXT, SCORE, counter_key,
};
use crate::store::VectorStore;

/// RediSearch-backed store.
///
/// Every call clones the shared [`RedisHandle`]; clones multiplex over the
/// same connection.
#[derive(Clone, Debug)]
pub struct RedisVectorStore {
    handle: RedisHandle,
}

impl RedisVectorStore {
    pub fn new(handle: RedisHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl VectorStore for RedisVectorStore {
    #[instrument(skip(self))]
    async fn index_info(&self, name: &str) -> RagResult<Option<IndexInfo>> {
        let mut conn = self.handle.clone();

        match redis::cmd("FT.INFO")
            .arg(name)
            .query_async::<Value>(&mut conn)
            .await
        {
            Ok(reply) => Ok(Some(parse_index_info(name, reply))),
            Err(e) if is_missing_index(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, schema), fields(index = %schema.name))]
    async fn create_index(&self, schema: &IndexSchema) -> RagResult<()> {
        let mut conn = self.handle.clone();
        create_index_command(schema)
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn drop_index(&self, name: &str, delete_docs: bool) -> RagResult<()> {
        let mut conn = self.handle.clone();

        let mut cmd = redis::cmd("FT.DROPINDEX");
        cmd.arg(name);
        if delete_docs {
            cmd.arg("DD");
        }

        match cmd.query_async::<()>(&mut conn).await {
            Ok(()) => Ok(()),
            Err(e) if is_missing_index(&e) => Err(RagError::IndexNotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn next_chunk_id(&self, index: &str) -> RagResult<u64> {
        let mut conn = self.handle.clone();
        let id = redis::cmd("INCR")
            .arg(counter_key(index))
            .query_async::<u64>(&mut conn)
            .await?;
        Ok(id)
    }

    #[instrument(skip(self, record), fields(key = %record.key))]
    async fn write_chunk(&self, record: &ChunkRecord) -> RagResult<()> {
        let mut conn = self.handle.clone();
        redis::cmd("HSET")
            .arg(&record.key)
            .arg(NAME_CHUNK)
            .arg(&record.name_chunk)
            .arg(CHUNK_ID)
            .arg(record.chunk_id)
            .arg(CHUNK_SIZE)
            .arg(record.chunk_size)
            .arg(RAW_TEXT)
            .arg(&record.raw_text)
            .arg(EMBEDDING)
            .arg(&record.embedding)
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, query), fields(index = %query.index, k = query.k))]
    async fn knn_search(&self, query: &KnnQuery) -> RagResult<Vec<ChunkMatch>> {
        let mut conn = self.handle.clone();
        let reply = knn_command(query).query_async::<Value>(&mut conn).await?;
        let matches = parse_search_reply(reply)?;
        debug!(hits = matches.len(), "KNN search finished");
        Ok(matches)
    }

    async fn ping(&self) -> RagResult<()> {
        let mut conn = self.handle.clone();
        database::redis::check_health(&mut conn).await?;
        Ok(())
    }
}

/// RediSearch has phrased this differently across versions
/// ("Unknown Index name", "no such index").
fn is_missing_index(err: &RedisError) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("unknown index") || message.contains("no such index")
}

/// `FT.CREATE {name} ON HASH PREFIX 1 {name}: SCHEMA ...`
fn create_index_command(schema: &IndexSchema) -> redis::Cmd {
    let mut cmd = redis::cmd("FT.CREATE");
    cmd.arg(&schema.name)
        .arg("ON")
        .arg("HASH")
        .arg("PREFIX")
        .arg(1)
        .arg(&schema.prefix)
        .arg("SCHEMA");

    for field in &schema.fields {
        cmd.arg(&field.name);
        match &field.kind {
            FieldKind::Text { sortable } => {
                cmd.arg("TEXT");
                if *sortable {
                    cmd.arg("SORTABLE");
                }
            }
            FieldKind::Numeric { sortable } => {
                cmd.arg("NUMERIC");
                if *sortable {
                    cmd.arg("SORTABLE");
                }
            }
            FieldKind::Vector(params) => {
                // 7 attribute pairs follow
                cmd.arg("VECTOR")
                    .arg("HNSW")
                    .arg(14)
                    .arg("TYPE")
                    .arg(params.dtype.as_str())
                    .arg("DIM")
                    .arg(params.dim)
                    .arg("DISTANCE_METRIC")
                    .arg(params.metric.as_str())
                    .arg("INITIAL_CAP")
                    .arg(params.hnsw.initial_capacity)
                    .arg("M")
                    .arg(params.hnsw.m)
                    .arg("EF_CONSTRUCTION")
                    .arg(params.hnsw.ef_construction)
                    .arg("EF_RUNTIME")
                    .arg(params.hnsw.ef_runtime);
            }
        }
    }

    cmd
}

fn knn_command(query: &KnnQuery) -> redis::Cmd {
    let mut cmd = redis::cmd("FT.SEARCH");
    cmd.arg(&query.index)
        .arg(format!(
            "*=>[KNN {} @{} $vec AS {}]",
            query.k, EMBEDDING, SCORE
        ))
        .arg("PARAMS")
        .arg(2)
        .arg("vec")
        .arg(&query.vector)
        .arg("SORTBY")
        .arg(SCORE)
        .arg("RETURN")
        .arg(5)
        .arg(NAME_CHUNK)
        .arg(CHUNK_ID)
        .arg(CHUNK_SIZE)
        .arg(RAW_TEXT)
        .arg(SCORE)
        .arg("LIMIT")
        .arg(0)
        .arg(query.k)
        .arg("DIALECT")
        .arg(2);
    cmd
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::BulkString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::SimpleString(s) => Some(s.clone()),
        Value::VerbatimString { text, .. } => Some(text.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Double(d) => Some(d.to_string()),
        Value::Okay => Some("OK".to_string()),
        _ => None,
    }
}

fn parse_index_info(name: &str, reply: Value) -> IndexInfo {
    let mut num_docs = 0;

    let pairs: Vec<(Value, Value)> = match reply {
        Value::Array(items) => {
            let mut iter = items.into_iter();
            let mut pairs = Vec::new();
            while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
                pairs.push((k, v));
            }
            pairs
        }
        Value::Map(pairs) => pairs,
        _ => Vec::new(),
    };

    for (key, value) in pairs {
        if value_to_string(&key).as_deref() == Some("num_docs") {
            num_docs = value_to_string(&value)
                .and_then(|s| s.parse::<f64>().ok())
                .map(|n| n as u64)
                .unwrap_or(0);
        }
    }

    IndexInfo {
        name: name.to_string(),
        num_docs,
    }
}

/// RESP2 `FT.SEARCH` reply: `[total, key, [field, value, ...], key, [...], ...]`
fn parse_search_reply(reply: Value) -> RagResult<Vec<ChunkMatch>> {
    let Value::Array(items) = reply else {
        return Err(RagError::Search(format!(
            "unexpected FT.SEARCH reply: {:?}",
            reply
        )));
    };

    let mut matches = Vec::new();
    let mut iter = items.into_iter().skip(1);

    while let Some(key) = iter.next() {
        let key = value_to_string(&key).unwrap_or_default();
        let Some(Value::Array(fields)) = iter.next() else {
            return Err(RagError::Search(format!("missing fields for {}", key)));
        };
        matches.push(parse_match(&key, fields)?);
    }

    Ok(matches)
}

fn parse_match(key: &str, fields: Vec<Value>) -> RagResult<ChunkMatch> {
    let mut hit = ChunkMatch {
        name_chunk: String::new(),
        chunk_id: 0,
        chunk_size: 0,
        raw_text: String::new(),
        score: 0.0,
    };

    let mut iter = fields.into_iter();
    while let (Some(name), Some(value)) = (iter.next(), iter.next()) {
        let (Some(name), Some(value)) = (value_to_string(&name), value_to_string(&value)) else {
            continue;
        };
        match name.as_str() {
            NAME_CHUNK => hit.name_chunk = value,
            RAW_TEXT => hit.raw_text = value,
            CHUNK_ID => hit.chunk_id = parse_number(key, CHUNK_ID, &value)?,
            CHUNK_SIZE => hit.chunk_size = parse_number(key, CHUNK_SIZE, &value)?,
            SCORE => {
                hit.score = value.parse().map_err(|_| {
                    RagError::Search(format!("{}: score '{}' is not a number", key, value))
                })?
            }
            _ => {}
        }
    }

    Ok(hit)
}

fn parse_number(key: &str, field: &str, value: &str) -> RagResult<u64> {
    value
        .parse::<u64>()
        .or_else(|_| value.parse::<f64>().map(|f| f as u64))
        .map_err(|_| RagError::Search(format!("{}: {} '{}' is not a number", key, field, value)))
}
