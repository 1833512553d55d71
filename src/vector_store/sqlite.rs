//! SQLite-based vector store implementation.
//!
//! Embeddings are stored as little-endian f32 blobs and scored in Rust.

use super::{rank, ChunkRecord, IndexInfo, SearchResult, VectorStore};
use crate::error::{PrepError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        chunk_order INTEGER NOT NULL,
        char_offset INTEGER NOT NULL,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_order ON chunks(chunk_order);

    CREATE TABLE IF NOT EXISTS index_info (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        source_url TEXT NOT NULL,
        chunk_count INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PrepError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn load_records(conn: &Connection) -> Result<Vec<ChunkRecord>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, chunk_order, char_offset, content, embedding
            FROM chunks
            ORDER BY chunk_order
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let id_str: String = row.get(0)?;
            let embedding_bytes: Vec<u8> = row.get(4)?;

            Ok(ChunkRecord {
                id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
                chunk_order: row.get(1)?,
                char_offset: row.get(2)?,
                content: row.get(3)?,
                embedding: Self::bytes_to_embedding(&embedding_bytes),
            })
        })?;

        let records = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn insert_batch(&self, records: &[ChunkRecord]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for record in records {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO chunks (id, chunk_order, char_offset, content, embedding)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    record.id.to_string(),
                    record.chunk_order,
                    record.char_offset,
                    record.content,
                    Self::embedding_to_bytes(&record.embedding),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Inserted {} chunks", records.len());
        Ok(records.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;
        let records = Self::load_records(&conn)?;
        let results = rank(records, query_embedding, k);

        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    async fn records(&self) -> Result<Vec<ChunkRecord>> {
        let conn = self.lock()?;
        Self::load_records(&conn)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn set_info(&self, info: &IndexInfo) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO index_info (id, source_url, chunk_count, created_at)
            VALUES (1, ?1, ?2, ?3)
            "#,
            params![
                info.source_url,
                info.chunk_count as i64,
                info.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn info(&self) -> Result<Option<IndexInfo>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT source_url, chunk_count, created_at FROM index_info WHERE id = 1",
                [],
                |row| {
                    let source_url: String = row.get(0)?;
                    let chunk_count: i64 = row.get(1)?;
                    let created_at: String = row.get(2)?;
                    Ok((source_url, chunk_count, created_at))
                },
            )
            .optional()?;

        Ok(row.map(|(source_url, chunk_count, created_at)| IndexInfo {
            source_url,
            chunk_count: chunk_count as usize,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;

    fn record(order: usize, embedding: Vec<f32>) -> ChunkRecord {
        let chunk = Chunk {
            order,
            offset: order * 100,
            content: format!("content {}", order),
        };
        ChunkRecord::new(&chunk, embedding)
    }

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .insert_batch(&[record(0, vec![1.0, 0.0, 0.0]), record(1, vec![0.0, 1.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.content, "content 0");
        assert!(results[0].distance.abs() < 0.001);
        assert!((results[1].distance - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_embedding_survives_storage() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let original = record(3, vec![0.25, -1.5, 3.0]);
        store.insert_batch(std::slice::from_ref(&original)).await.unwrap();

        let records = store.records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, original.id);
        assert_eq!(records[0].embedding, vec![0.25, -1.5, 3.0]);
        assert_eq!(records[0].char_offset, 300);
    }

    #[tokio::test]
    async fn test_info_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("index.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            assert!(store.info().await.unwrap().is_none());
            store
                .set_info(&IndexInfo::new("https://github.com/a/b", 7))
                .await
                .unwrap();
        }

        let store = SqliteVectorStore::new(&path).unwrap();
        let info = store.info().await.unwrap().unwrap();
        assert_eq!(info.source_url, "https://github.com/a/b");
        assert_eq!(info.chunk_count, 7);
    }
}
