//! Pipeline orchestrator for repoprep.
//!
//! Coordinates fetching, extraction, indexing and Q&A generation. This is the
//! only place the components are wired together.

use crate::chunking::{ChunkingConfig, TextChunker};
use crate::config::{ContextStrategy, Prompts, Settings};
use crate::corpus::{extract, DiskTree, ExtractionRules};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{PrepError, Result};
use crate::indexer::{IndexHandle, Indexer};
use crate::llm::{create_chat_model, ChatModel};
use crate::qa::{effective_topic, PromptComposer, PromptPair};
use crate::source::{scratch_dir, validate_url, GitFetcher, RepoFetcher};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Where a repository's context lives after analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoContext {
    /// The rendered corpus, fed to prompts directly.
    Corpus(String),
    /// A persisted index of embedded chunks.
    Index {
        handle: IndexHandle,
        chunk_count: usize,
    },
}

/// Result of a successful analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoHandle {
    /// The validated source URL.
    pub url: String,
    /// Number of files that made it into the corpus.
    pub file_count: usize,
    pub context: RepoContext,
}

impl RepoHandle {
    /// Status line shown after analysis.
    pub fn status(&self) -> String {
        match &self.context {
            RepoContext::Corpus(_) => "Ready. Repo text loaded.".to_string(),
            RepoContext::Index { chunk_count, .. } => {
                format!("Ready. Indexed {} chunks.", chunk_count)
            }
        }
    }
}

/// The main orchestrator for the repoprep pipeline.
pub struct Orchestrator {
    settings: Settings,
    rules: ExtractionRules,
    chunker: TextChunker,
    composer: PromptComposer,
    fetcher: Arc<dyn RepoFetcher>,
    chat: Arc<dyn ChatModel>,
    indexer: Indexer,
}

impl Orchestrator {
    /// Create an orchestrator with the production collaborators.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let chat = create_chat_model(&settings.llm)?;
        let embedder = create_embedder(&settings)?;

        Self::with_components(settings, prompts, Arc::new(GitFetcher::new()), chat, embedder)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        fetcher: Arc<dyn RepoFetcher>,
        chat: Arc<dyn ChatModel>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let rules = ExtractionRules::from_settings(&settings.extraction);
        let chunker = TextChunker::new(ChunkingConfig::from(&settings.chunking))?;
        let composer = PromptComposer::new(prompts, &settings.qa);

        Ok(Self {
            settings,
            rules,
            chunker,
            composer,
            fetcher,
            chat,
            indexer: Indexer::new(embedder),
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn strategy(&self) -> ContextStrategy {
        self.settings.retrieval.strategy
    }

    /// Fetch a repository, extract its corpus and, for the retrieval
    /// strategy, publish an index of it.
    ///
    /// The temporary clone is removed on every path out of this function.
    #[instrument(skip(self), fields(url = %raw_url))]
    pub async fn analyze(&self, raw_url: &str) -> Result<RepoHandle> {
        let url = validate_url(raw_url)?;

        let scratch = scratch_dir(&self.settings.temp_dir())?;
        debug!("Fetching into {:?}", scratch.path());
        self.fetcher.fetch(&url, scratch.path()).await?;

        let document = extract(&DiskTree::new(scratch.path()), &self.rules);
        drop(scratch);

        if document.is_empty() {
            return Err(PrepError::EmptyCorpus);
        }
        let corpus = document.render();

        let context = match self.strategy() {
            ContextStrategy::Direct => RepoContext::Corpus(corpus),
            ContextStrategy::Retrieval => {
                let chunks = self.chunker.chunk(&corpus);
                info!("Split corpus into {} chunks", chunks.len());

                let handle = IndexHandle::for_url(&self.settings.index_dir(), &url);
                let chunk_count = self.indexer.build(&handle, &url, &chunks).await?;
                RepoContext::Index { handle, chunk_count }
            }
        };

        info!("Analyzed {} ({} files)", url, document.len());
        Ok(RepoHandle {
            url,
            file_count: document.len(),
            context,
        })
    }

    /// Generate `count` interview Q&A pairs (clamped to 5..=20).
    #[instrument(skip(self, repo), fields(url = %repo.url))]
    pub async fn generate_qa(&self, repo: &RepoHandle, count: u32) -> Result<String> {
        let query = self.composer.retrieval_query().to_string();
        let context = self.context_for(repo, &query).await?;
        let prompt = self.composer.batch(&context, count);
        self.complete(&prompt).await
    }

    /// Generate one Q&A pair focused on `topic`.
    #[instrument(skip(self, repo), fields(url = %repo.url))]
    pub async fn ask_one(&self, repo: &RepoHandle, topic: Option<&str>) -> Result<String> {
        let query = effective_topic(topic).to_string();
        let context = self.context_for(repo, &query).await?;
        let prompt = self.composer.single(&context, topic);
        self.complete(&prompt).await
    }

    /// Prompt context for `repo`. For an index, the top-k chunks for `query`
    /// joined in rank order.
    async fn context_for(&self, repo: &RepoHandle, query: &str) -> Result<String> {
        match &repo.context {
            RepoContext::Corpus(text) => Ok(text.clone()),
            RepoContext::Index { handle, .. } => {
                let results = self
                    .indexer
                    .search(handle, query, self.settings.retrieval.top_k)
                    .await?;
                debug!("Retrieved {} chunks for {:?}", results.len(), query);

                Ok(results
                    .into_iter()
                    .map(|r| r.record.content)
                    .collect::<Vec<_>>()
                    .join("\n\n"))
            }
        }
    }

    async fn complete(&self, prompt: &PromptPair) -> Result<String> {
        self.chat
            .complete(&prompt.to_messages(), self.settings.llm.temperature)
            .await
    }
}
