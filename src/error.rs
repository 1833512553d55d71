//! Error types for repoprep.

use thiserror::Error;

/// Library-level error type for repoprep operations.
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Invalid URL: {0}")]
    Validation(String),

    #[error("Failed to fetch repository: {0}")]
    Fetch(String),

    #[error("No readable text files found")]
    EmptyCorpus,

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Chat gateway error: {0}")]
    Gateway(String),

    #[error("{0}")]
    State(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl PrepError {
    /// The message shown for "act before analyze".
    pub fn not_analyzed() -> Self {
        PrepError::State("Please analyze a repo first.".to_string())
    }

    /// Short status text for the UI layer.
    pub fn status_text(&self) -> String {
        match self {
            PrepError::Validation(_) => "Invalid URL".to_string(),
            PrepError::EmptyCorpus => "No readable text files found".to_string(),
            PrepError::State(msg) => msg.clone(),
            other => format!("Error: {}", other),
        }
    }
}

/// Result type alias for repoprep operations.
pub type Result<T> = std::result::Result<T, PrepError>;
