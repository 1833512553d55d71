//! Interactive session state.
//!
//! A session remembers the last analysed repository and turns every outcome,
//! success or failure, into text for display.

use crate::error::{PrepError, Result};
use crate::orchestrator::{Orchestrator, RepoHandle};
use tracing::warn;

/// One user's analyze / generate / ask workflow.
pub struct Session {
    orchestrator: Orchestrator,
    repo: Option<RepoHandle>,
}

impl Session {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            repo: None,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// The currently loaded repository, if any.
    pub fn repo(&self) -> Option<&RepoHandle> {
        self.repo.as_ref()
    }

    /// Analyze `url` and return a status line. Failure unloads the previous repository.
    pub async fn analyze(&mut self, url: &str) -> String {
        match self.orchestrator.analyze(url).await {
            Ok(repo) => {
                let status = repo.status();
                self.repo = Some(repo);
                status
            }
            Err(e) => {
                warn!("Analyze failed: {}", e);
                self.repo = None;
                e.status_text()
            }
        }
    }

    /// Generate `count` Q&A pairs for the loaded repository.
    pub async fn generate(&self, count: u32) -> String {
        render(self.try_generate(count).await)
    }

    /// Generate one Q&A pair for the loaded repository.
    pub async fn ask(&self, topic: Option<&str>) -> String {
        render(self.try_ask(topic).await)
    }

    pub async fn try_generate(&self, count: u32) -> Result<String> {
        let repo = self.loaded()?;
        self.orchestrator.generate_qa(repo, count).await
    }

    pub async fn try_ask(&self, topic: Option<&str>) -> Result<String> {
        let repo = self.loaded()?;
        self.orchestrator.ask_one(repo, topic).await
    }

    fn loaded(&self) -> Result<&RepoHandle> {
        self.repo.as_ref().ok_or_else(PrepError::not_analyzed)
    }
}

fn render(result: Result<String>) -> String {
    result.unwrap_or_else(|e| {
        warn!("Request failed: {}", e);
        e.status_text()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContextStrategy, Prompts};
    use crate::orchestrator::tests::test_settings;
    use crate::testing::{FakeChatModel, FakeEmbedder, FakeFetcher};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn session(root: &TempDir, fetcher: Arc<FakeFetcher>, chat: Arc<FakeChatModel>) -> Session {
        let orchestrator = Orchestrator::with_components(
            test_settings(root, ContextStrategy::Direct),
            Prompts::default(),
            fetcher,
            chat,
            Arc::new(FakeEmbedder::new()),
        )
        .unwrap();
        Session::new(orchestrator)
    }

    fn repo_files() -> Arc<FakeFetcher> {
        Arc::new(FakeFetcher::with_files(&[("app.py", "import os\n")]))
    }

    #[tokio::test]
    async fn test_generate_before_analyze() {
        let root = TempDir::new().unwrap();
        let chat = Arc::new(FakeChatModel::replying("unused"));
        let session = session(&root, repo_files(), chat.clone());

        assert_eq!(session.generate(10).await, "Please analyze a repo first.");
        assert_eq!(session.ask(None).await, "Please analyze a repo first.");
        assert_eq!(chat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_status() {
        let root = TempDir::new().unwrap();
        let fetcher = repo_files();
        let mut session = session(&root, fetcher.clone(), Arc::new(FakeChatModel::replying("x")));

        assert_eq!(session.analyze("ftp://example.com/repo").await, "Invalid URL");
        assert_eq!(fetcher.fetch_count(), 0);
        assert!(session.repo().is_none());
    }

    #[tokio::test]
    async fn test_empty_corpus_status() {
        let root = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher::with_files(&[("a.png", "png")]));
        let mut session = session(&root, fetcher.clone(), Arc::new(FakeChatModel::replying("x")));

        assert_eq!(
            session.analyze("https://example.com/repo").await,
            "No readable text files found"
        );
        assert!(!fetcher.destinations()[0].exists());
    }

    #[tokio::test]
    async fn test_analyze_then_generate_and_ask() {
        let root = TempDir::new().unwrap();
        let chat = Arc::new(FakeChatModel::replying("Q1: a\nA1: b"));
        let mut session = session(&root, repo_files(), chat.clone());

        assert_eq!(
            session.analyze("https://example.com/repo").await,
            "Ready. Repo text loaded."
        );
        assert_eq!(session.generate(10).await, "Q1: a\nA1: b");
        assert_eq!(session.ask(Some("imports")).await, "Q1: a\nA1: b");
        assert_eq!(chat.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_analyze_unloads_previous_repo() {
        let root = TempDir::new().unwrap();
        let mut session = session(&root, repo_files(), Arc::new(FakeChatModel::replying("x")));

        session.analyze("https://example.com/repo").await;
        assert!(session.repo().is_some());

        assert_eq!(session.analyze("not a url").await, "Invalid URL");
        assert!(session.repo().is_none());
        assert_eq!(session.generate(5).await, "Please analyze a repo first.");
    }

    #[tokio::test]
    async fn test_gateway_failure_status() {
        let root = TempDir::new().unwrap();
        let mut session = session(
            &root,
            repo_files(),
            Arc::new(FakeChatModel::failing("429 Too Many Requests")),
        );

        session.analyze("https://example.com/repo").await;
        assert_eq!(
            session.ask(None).await,
            "Error: Chat gateway error: 429 Too Many Requests"
        );
    }
}
