//! Analyze command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, RepoContext, RepoHandle};
use anyhow::Result;

/// Run pre-flight checks and build the orchestrator.
///
/// Failures are printed as status text and yield `None`.
pub(super) fn prepare(operation: Operation, settings: Settings) -> Option<Orchestrator> {
    match preflight::check(operation, &settings) {
        Ok(warnings) => {
            for warning in &warnings {
                Output::warning(warning);
            }
        }
        Err(e) => {
            Output::error(&e.status_text());
            Output::info("Run 'repoprep doctor' for detailed diagnostics.");
            return None;
        }
    }

    match Orchestrator::new(settings) {
        Ok(orchestrator) => Some(orchestrator),
        Err(e) => {
            Output::error(&e.status_text());
            None
        }
    }
}

/// Analyze with a spinner; failures are printed as status text.
pub(super) async fn analyze_with_progress(orchestrator: &Orchestrator, url: &str) -> Option<RepoHandle> {
    let spinner = Output::spinner("Fetching repository...");
    let result = orchestrator.analyze(url).await;
    spinner.finish_and_clear();

    match result {
        Ok(repo) => Some(repo),
        Err(e) => {
            Output::error(&e.status_text());
            None
        }
    }
}

/// Run the analyze command.
pub async fn run_analyze(url: &str, settings: Settings) -> Result<()> {
    match prepare(Operation::Analyze, settings) {
        Some(orchestrator) => analyze_and_report(&orchestrator, url).await,
        None => Ok(()),
    }
}

async fn analyze_and_report(orchestrator: &Orchestrator, url: &str) -> Result<()> {
    let Some(repo) = analyze_with_progress(orchestrator, url).await else {
        return Ok(());
    };

    Output::success(&repo.status());
    Output::kv("Repository", &repo.url);
    Output::kv("Files", &repo.file_count.to_string());
    Output::kv("Strategy", &orchestrator.strategy().to_string());

    match &repo.context {
        RepoContext::Corpus(text) => {
            Output::kv("Corpus", &format!("{} chars", text.chars().count()));
            let budget = orchestrator.settings().qa.max_context_chars;
            if text.chars().count() > budget {
                Output::warning(&format!(
                    "Corpus exceeds the {} char prompt budget and will be truncated.",
                    budget
                ));
            }
        }
        RepoContext::Index { handle, chunk_count } => {
            Output::kv("Chunks", &chunk_count.to_string());
            Output::kv("Index", &handle.dir().display().to_string());
        }
    }

    Ok(())
}
