//! Vector store abstraction for repoprep.
//!
//! One store holds the embedded chunks of exactly one repository.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::chunking::Chunk;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An embedded chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Unique record ID.
    pub id: Uuid,
    /// Position of the chunk in the corpus.
    pub chunk_order: i64,
    /// Char offset of the chunk in the corpus.
    pub char_offset: i64,
    /// Text content of this chunk.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
}

impl ChunkRecord {
    /// Pair a chunk with its embedding.
    pub fn new(chunk: &Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chunk_order: chunk.order as i64,
            char_offset: chunk.offset as i64,
            content: chunk.content.clone(),
            embedding,
        }
    }
}

/// A search hit.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk.
    pub record: ChunkRecord,
    /// Cosine distance to the query (lower is closer).
    pub distance: f32,
}

/// What an index was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub source_url: String,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}

impl IndexInfo {
    pub fn new(source_url: &str, chunk_count: usize) -> Self {
        Self {
            source_url: source_url.to_string(),
            chunk_count,
            created_at: Utc::now(),
        }
    }
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bulk insert records.
    async fn insert_batch(&self, records: &[ChunkRecord]) -> Result<usize>;

    /// The `k` records nearest to the query, by increasing distance.
    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    /// All records in corpus order.
    async fn records(&self) -> Result<Vec<ChunkRecord>>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize>;

    /// Record what this index was built from.
    async fn set_info(&self, info: &IndexInfo) -> Result<()>;

    /// Index metadata, if recorded.
    async fn info(&self) -> Result<Option<IndexInfo>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine distance, `1 - cosine_similarity`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Score every record and keep the `k` nearest. Ties keep corpus order.
pub(crate) fn rank(
    records: impl IntoIterator<Item = ChunkRecord>,
    query_embedding: &[f32],
    k: usize,
) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = records
        .into_iter()
        .map(|record| {
            let distance = cosine_distance(query_embedding, &record.embedding);
            SearchResult { record, distance }
        })
        .collect();

    results.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.record.chunk_order.cmp(&b.record.chunk_order))
    });
    results.truncate(k);
    results
}
