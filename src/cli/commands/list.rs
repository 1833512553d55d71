//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::indexer::list_indexes;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let index_dir = settings.index_dir();

    match list_indexes(&index_dir).await {
        Ok(indexes) => {
            if indexes.is_empty() {
                Output::info(
                    "No indexes yet. Use 'repoprep --strategy retrieval analyze <url>' to build one.",
                );
            } else {
                Output::header(&format!("Indexed Repositories ({})", indexes.len()));
                println!();

                for (handle, info) in &indexes {
                    let key = handle
                        .dir()
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    Output::index_info(&info.source_url, &key, info.chunk_count, info.created_at);
                }

                let total_chunks: usize = indexes.iter().map(|(_, info)| info.chunk_count).sum();
                println!();
                Output::kv("Total repositories", &indexes.len().to_string());
                Output::kv("Total chunks", &total_chunks.to_string());
                Output::kv("Location", &index_dir.display().to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list indexes: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
