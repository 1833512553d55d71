//! Generate command implementation.

use super::analyze::{analyze_with_progress, prepare};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::qa::clamp_count;
use anyhow::Result;

/// Run the generate command.
pub async fn run_generate(
    url: &str,
    count: Option<u32>,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    let requested = count.unwrap_or(settings.qa.default_count);
    let count = clamp_count(requested);
    if count != requested {
        Output::warning(&format!("Question count {} clamped to {}.", requested, count));
    }

    match prepare(Operation::Generate, settings) {
        Some(orchestrator) => generate_and_report(&orchestrator, url, count, output.as_deref()).await,
        None => Ok(()),
    }
}

async fn generate_and_report(
    orchestrator: &Orchestrator,
    url: &str,
    count: u32,
    output: Option<&str>,
) -> Result<()> {
    let Some(repo) = analyze_with_progress(orchestrator, url).await else {
        return Ok(());
    };
    Output::info(&repo.status());

    let spinner = Output::spinner(&format!("Generating {} Q&A pairs...", count));
    let result = orchestrator.generate_qa(&repo, count).await;
    spinner.finish_and_clear();

    let text = match result {
        Ok(text) => text,
        Err(e) => {
            Output::error(&e.status_text());
            return Ok(());
        }
    };

    match output {
        Some(path) => match std::fs::write(path, &text) {
            Ok(()) => Output::success(&format!("Wrote Q&A to {}", path)),
            Err(e) => Output::error(&format!("Failed to write {}: {}", path, e)),
        },
        None => Output::transcript(&text),
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

    fn orchestrator(root: &tempfile::TempDir, chat: Arc<FakeChatModel>) -> Orchestrator {
        Orchestrator::with_components(
            test_settings(root, ContextStrategy::Direct),
            Prompts::default(),
            Arc::new(FakeFetcher::with_files(&[("main.py", "print('hi')\n")])),
            chat,
            Arc::new(FakeEmbedder::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_gateway_failure_is_reported_not_returned() {
        let root = tempfile::tempdir().unwrap();
        let chat = Arc::new(FakeChatModel::failing("401 Unauthorized"));
        let orchestrator = orchestrator(&root, chat.clone());

        let result = generate_and_report(&orchestrator, "https://github.com/a/b", 5, None).await;
        assert!(result.is_ok());
        assert_eq!(chat.call_count(), 1);
    }

    #[tokio::test]
    async fn test_writes_output_file() {
        let root = tempfile::tempdir().unwrap();
        let chat = Arc::new(FakeChatModel::replying("Q1: What?\nA1: That."));
        let orchestrator = orchestrator(&root, chat);
        let path = root.path().join("qa.md");

        let result = generate_and_report(
            &orchestrator,
            "https://github.com/a/b",
            5,
            Some(path.to_str().unwrap()),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Q1: What?\nA1: That.");
    }

    #[tokio::test]
    async fn test_unwritable_output_is_reported_not_returned() {
        let root = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(&root, Arc::new(FakeChatModel::replying("Q1: x")));
        let path = root.path().join("missing/dir/qa.md");

        let result = generate_and_report(
            &orchestrator,
            "https://github.com/a/b",
            5,
            Some(path.to_str().unwrap()),
        )
        .await;

        assert!(result.is_ok());
        assert!(!path.exists());
    }
}
