//! Ask command implementation.

use super::analyze::{analyze_with_progress, prepare};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::qa::effective_topic;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(url: &str, topic: Option<String>, settings: Settings) -> Result<()> {
    match prepare(Operation::Generate, settings) {
        Some(orchestrator) => ask_and_report(&orchestrator, url, topic.as_deref()).await,
        None => Ok(()),
    }
}

async fn ask_and_report(orchestrator: &Orchestrator, url: &str, topic: Option<&str>) -> Result<()> {
    let Some(repo) = analyze_with_progress(orchestrator, url).await else {
        return Ok(());
    };
    Output::info(&repo.status());

    let spinner = Output::spinner(&format!("Asking about {}...", effective_topic(topic)));
    let result = orchestrator.ask_one(&repo, topic).await;
    spinner.finish_and_clear();

    match result {
        Ok(text) => Output::transcript(&text),
        Err(e) => Output::error(&e.status_text()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContextStrategy, Prompts};
    use crate::orchestrator::tests::test_settings;
    use crate::testing::{FakeChatModel, FakeEmbedder, FakeFetcher};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_failed_analyze_skips_gateway() {
        let root = tempfile::tempdir().unwrap();
        let chat = Arc::new(FakeChatModel::replying("unused"));
        let orchestrator = Orchestrator::with_components(
            test_settings(&root, ContextStrategy::Direct),
            Prompts::default(),
            Arc::new(FakeFetcher::failing("clone failed")),
            chat.clone(),
            Arc::new(FakeEmbedder::new()),
        )
        .unwrap();

        let result = ask_and_report(&orchestrator, "https://github.com/a/b", Some("auth")).await;
        assert!(result.is_ok());
        assert_eq!(chat.call_count(), 0);
    }
}
