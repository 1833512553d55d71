//! Embedding generation for the retrieval strategy.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::config::{LlmProvider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Build the embedder for the configured provider.
pub fn create_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let dimensions = settings.embedding.dimensions as usize;
    let deployment = &settings.embedding.deployment;

    let embedder: Arc<dyn Embedder> = match settings.llm.provider {
        LlmProvider::Azure => Arc::new(OpenAIEmbedder::new(
            crate::openai::azure_client(&settings.llm, deployment)?,
            deployment,
            dimensions,
        )),
        LlmProvider::OpenAI => Arc::new(OpenAIEmbedder::new(
            crate::openai::openai_client(&settings.llm)?,
            deployment,
            dimensions,
        )),
    };
    Ok(embedder)
}
