//! repoprep - interview Q&A grounded in a code repository
//!
//! Give it a repository URL; it clones the repository, extracts the text of
//! its source and documentation files and asks a language model for
//! interview-style questions with model answers about that code.
//!
//! # Overview
//!
//! Two context strategies share the same extraction:
//! - **direct**: the whole corpus goes into the prompt, truncated to a budget
//! - **retrieval**: the corpus is chunked, embedded and indexed on disk, and
//!   each request retrieves the most relevant chunks
//!
//! # Architecture
//!
//! - `config` - Configuration management and prompt templates
//! - `source` - URL validation and shallow repository clones
//! - `corpus` - Text extraction from a source tree
//! - `chunking` - Overlapping fixed-size windows over the corpus
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `indexer` - Per-repository persisted indexes
//! - `llm` - Chat-completion gateway
//! - `qa` - Prompt composition
//! - `orchestrator` - Pipeline coordination
//! - `session` - Stateful analyze / generate / ask workflow
//!
//! # Example
//!
//! ```rust,no_run
//! use repoprep::config::Settings;
//! use repoprep::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut settings = Settings::load()?;
//!     settings.apply_env_overrides();
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let repo = orchestrator.analyze("https://github.com/owner/repo").await?;
//!     println!("{}", orchestrator.generate_qa(&repo, 10).await?);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod qa;
pub mod session;
pub mod source;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{PrepError, Result};
