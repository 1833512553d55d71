//! Persisted per-repository indexes (retrieval strategy).
//!
//! Each analysed URL owns one directory under the index root, named by a
//! hash of the URL. An index is built in a staging directory next to it and
//! published by rename, so a failed build never replaces a good index.

use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::{PrepError, Result};
use crate::vector_store::{ChunkRecord, IndexInfo, SearchResult, SqliteVectorStore, VectorStore};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Database file inside an index directory.
const INDEX_FILE: &str = "index.db";

/// Hex characters of the URL hash used as directory name.
const KEY_LEN: usize = 12;

/// Location of one repository's index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHandle {
    dir: PathBuf,
}

impl IndexHandle {
    /// Handle for `url` under `base`. Depends only on the URL string.
    pub fn for_url(base: &Path, url: &str) -> Self {
        Self {
            dir: base.join(Self::key_for(url)),
        }
    }

    /// Directory name for `url`.
    pub fn key_for(url: &str) -> String {
        let digest = Sha256::digest(url.as_bytes());
        let mut key = hex::encode(digest);
        key.truncate(KEY_LEN);
        key
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Whether a published index exists.
    pub fn exists(&self) -> bool {
        self.db_path().is_file()
    }
}

/// Builds and queries indexes.
pub struct Indexer {
    embedder: Arc<dyn Embedder>,
}

impl Indexer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Embed `chunks` and publish them under `handle`, replacing any
    /// previous index. Returns the number of chunks stored.
    #[instrument(skip(self, chunks), fields(dir = %handle.dir().display(), chunks = chunks.len()))]
    pub async fn build(&self, handle: &IndexHandle, source_url: &str, chunks: &[Chunk]) -> Result<usize> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(PrepError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let records: Vec<ChunkRecord> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| ChunkRecord::new(chunk, embedding))
            .collect();

        let base = handle
            .dir()
            .parent()
            .ok_or_else(|| PrepError::VectorStore("Index directory has no parent".to_string()))?;
        std::fs::create_dir_all(base)?;

        let staging = tempfile::Builder::new()
            .prefix(".staging_")
            .tempdir_in(base)?;

        {
            let store = SqliteVectorStore::new(&staging.path().join(INDEX_FILE))?;
            store.insert_batch(&records).await?;
            store.set_info(&IndexInfo::new(source_url, records.len())).await?;
        }

        publish(staging.path(), handle.dir(), base)?;
        // The staging path no longer exists, so dropping the guard removes nothing.
        drop(staging);

        info!("Indexed {} chunks from {}", records.len(), source_url);
        Ok(records.len())
    }

    /// The `k` chunks nearest to `query`, by increasing distance.
    #[instrument(skip(self, query), fields(dir = %handle.dir().display()))]
    pub async fn search(&self, handle: &IndexHandle, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let store = open(handle)?;
        let query_embedding = self.embedder.embed(query).await?;
        store.search(&query_embedding, k).await
    }
}

/// Move `staging` into place at `target`.
///
/// An existing index is first renamed aside and restored if the swap fails;
/// it is deleted only once the new index is in place.
fn publish(staging: &Path, target: &Path, base: &Path) -> Result<()> {
    if !target.exists() {
        std::fs::rename(staging, target)?;
        return Ok(());
    }

    debug!("Replacing existing index at {:?}", target);
    let retired = tempfile::Builder::new()
        .prefix(".retired_")
        .tempdir_in(base)?;
    let previous = retired.path().join("index");
    std::fs::rename(target, &previous)?;

    if let Err(e) = std::fs::rename(staging, target) {
        if let Err(restore) = std::fs::rename(&previous, target) {
            warn!("Failed to restore previous index at {:?}: {}", target, restore);
        }
        return Err(e.into());
    }

    // Dropping the guard removes the previous index
    drop(retired);
    Ok(())
}

/// Reopen a published index.
pub fn open(handle: &IndexHandle) -> Result<SqliteVectorStore> {
    if !handle.exists() {
        return Err(PrepError::State(format!(
            "No index found at {}. Analyze the repository again.",
            handle.dir().display()
        )));
    }
    SqliteVectorStore::new(&handle.db_path())
}

/// All published indexes under `base`, with their metadata.
pub async fn list_indexes(base: &Path) -> Result<Vec<(IndexHandle, IndexInfo)>> {
    let mut found = Vec::new();
    if !base.is_dir() {
        return Ok(found);
    }

    let mut dirs: Vec<PathBuf> = std::fs::read_dir(base)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .collect();
    dirs.sort();

    for dir in dirs {
        let handle = IndexHandle { dir };
        if !handle.exists() {
            continue;
        }
        let store = SqliteVectorStore::new(&handle.db_path())?;
        if let Some(info) = store.info().await? {
            found.push((handle, info));
        }
    }

    Ok(found)
}
