//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{rank, ChunkRecord, IndexInfo, SearchResult, VectorStore};
use crate::error::{PrepError, Result};
use async_trait::async_trait;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    records: RwLock<Vec<ChunkRecord>>,
    info: RwLock<Option<IndexInfo>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            info: RwLock::new(None),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> PrepError {
    PrepError::VectorStore(format!("Lock poisoned: {}", e))
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn insert_batch(&self, records: &[ChunkRecord]) -> Result<usize> {
        let mut store = self.records.write().map_err(poisoned)?;
        store.extend(records.iter().cloned());
        store.sort_by_key(|r| r.chunk_order);
        Ok(records.len())
    }

    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(rank(records.iter().cloned(), query_embedding, k))
    }

    async fn records(&self) -> Result<Vec<ChunkRecord>> {
        Ok(self.records.read().map_err(poisoned)?.clone())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().map_err(poisoned)?.len())
    }

    async fn set_info(&self, info: &IndexInfo) -> Result<()> {
        *self.info.write().map_err(poisoned)? = Some(info.clone());
        Ok(())
    }

    async fn info(&self) -> Result<Option<IndexInfo>> {
        Ok(self.info.read().map_err(poisoned)?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;

    fn record(order: usize, embedding: Vec<f32>) -> ChunkRecord {
        let chunk = Chunk {
            order,
            offset: order * 5,
            content: format!("chunk {}", order),
        };
        ChunkRecord::new(&chunk, embedding)
    }

    #[tokio::test]
    async fn test_memory_store_search() {
        let store = MemoryVectorStore::new();
        store
            .insert_batch(&[
                record(1, vec![0.0, 1.0]),
                record(0, vec![1.0, 0.0]),
                record(2, vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 3);

        let results = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.content, "chunk 0");
        assert_eq!(results[1].record.content, "chunk 2");

        let all = store.records().await.unwrap();
        let orders: Vec<i64> = all.iter().map(|r| r.chunk_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_memory_store_info() {
        let store = MemoryVectorStore::new();
        assert!(store.info().await.unwrap().is_none());

        let info = IndexInfo::new("https://example.com/repo", 3);
        store.set_info(&info).await.unwrap();
        assert_eq!(store.info().await.unwrap(), Some(info));
    }

    #[tokio::test]
    async fn test_search_k_larger_than_store() {
        let store = MemoryVectorStore::new();
        store.insert_batch(&[record(0, vec![1.0])]).await.unwrap();
        assert_eq!(store.search(&[1.0], 10).await.unwrap().len(), 1);
    }
}
