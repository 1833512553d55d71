//! Configuration settings for repoprep.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub extraction: ExtractionSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub qa: QaSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory that holds temporary repository clones.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.repoprep".to_string(),
            temp_dir: std::env::temp_dir()
                .join("repoprep")
                .to_string_lossy()
                .into_owned(),
            log_level: "info".to_string(),
        }
    }
}

/// Chat/embedding service provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Azure OpenAI (endpoint + deployment + api version).
    #[default]
    Azure,
    /// api.openai.com.
    OpenAI,
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure" => Ok(LlmProvider::Azure),
            "openai" => Ok(LlmProvider::OpenAI),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::Azure => write!(f, "azure"),
            LlmProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Chat-completion gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    /// API key. Usually supplied through the environment rather than the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Service endpoint (Azure resource URL, or an OpenAI-compatible base URL).
    pub endpoint: String,
    /// Chat model deployment (Azure) or model name (OpenAI).
    pub deployment: String,
    /// Azure API version.
    pub api_version: String,
    /// Sampling temperature for Q&A generation.
    pub temperature: f32,
    /// HTTP timeout for a single request.
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Azure,
            api_key: None,
            endpoint: String::new(),
            deployment: "gpt-4o-mini".to_string(),
            api_version: "2024-08-01-preview".to_string(),
            temperature: 0.2,
            timeout_secs: 300,
        }
    }
}

impl LlmSettings {
    /// Whether an API key is present.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding deployment (Azure) or model name (OpenAI).
    pub deployment: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            deployment: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Repository text extraction rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// File extensions (without the dot) that count as text.
    pub allowed_extensions: Vec<String>,
    /// Directory names that are never descended into.
    pub skip_dirs: Vec<String>,
    /// Files larger than this are ignored.
    pub max_file_bytes: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            allowed_extensions: crate::corpus::DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            skip_dirs: crate::corpus::DEFAULT_SKIP_DIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_bytes: crate::corpus::DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// Text chunking settings (retrieval strategy).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Target chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// How repository text reaches the prompt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContextStrategy {
    /// Feed the raw corpus, truncated to the prompt budget.
    #[default]
    Direct,
    /// Chunk, embed and retrieve the most relevant passages.
    Retrieval,
}

impl std::str::FromStr for ContextStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(ContextStrategy::Direct),
            "retrieval" | "rag" => Ok(ContextStrategy::Retrieval),
            _ => Err(format!("Unknown context strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for ContextStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextStrategy::Direct => write!(f, "direct"),
            ContextStrategy::Retrieval => write!(f, "retrieval"),
        }
    }
}

/// Retrieval-augmented variant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub strategy: ContextStrategy,
    /// Root directory for persisted indexes (one subdirectory per URL).
    pub index_dir: String,
    /// Chunks retrieved per query.
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            strategy: ContextStrategy::Direct,
            index_dir: "~/.repoprep/indexes".to_string(),
            top_k: 8,
        }
    }
}

/// Q&A generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaSettings {
    /// Default number of Q&A pairs for batch generation.
    pub default_count: u32,
    /// Context budget for batch generation, in characters.
    pub max_context_chars: usize,
    /// Context budget for single-question mode, in characters.
    pub single_context_chars: usize,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            default_count: 10,
            max_context_chars: 100_000,
            single_context_chars: 6_000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Apply overrides from the process environment.
    ///
    /// Called once at startup; library code never reads the environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("REPOPREP_LLM_PROVIDER") {
            match v.parse() {
                Ok(provider) => self.llm.provider = provider,
                Err(e) => tracing::warn!("ignoring REPOPREP_LLM_PROVIDER: {}", e),
            }
        }

        let key_var = match self.llm.provider {
            LlmProvider::Azure => "AZURE_OPENAI_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
        };
        if let Some(v) = lookup(key_var) {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = lookup("AZURE_OPENAI_ENDPOINT") {
            self.llm.endpoint = v;
        }
        if let Some(v) = lookup("AZURE_OPENAI_DEPLOYMENT") {
            self.llm.deployment = v;
        }
        if let Some(v) = lookup("AZURE_OPENAI_VERSION") {
            self.llm.api_version = v;
        }
        if let Some(v) = lookup("AZURE_OPENAI_EMBEDDING_DEPLOYMENT") {
            self.embedding.deployment = v;
        }
        if let Some(v) = lookup("REPOPREP_STRATEGY") {
            match v.parse() {
                Ok(strategy) => self.retrieval.strategy = strategy,
                Err(e) => tracing::warn!("ignoring REPOPREP_STRATEGY: {}", e),
            }
        }
    }

    /// Copy of the settings that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.llm.has_api_key() {
            copy.llm.api_key = Some("********".to_string());
        }
        copy
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::PrepError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("repoprep")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded index root directory.
    pub fn index_dir(&self) -> PathBuf {
        Self::expand_path(&self.retrieval.index_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.retrieval.strategy, ContextStrategy::Direct);
        assert_eq!(settings.extraction.max_file_bytes, 800_000);
        assert_eq!(settings.qa.max_context_chars, 100_000);
        assert!(settings.extraction.skip_dirs.iter().any(|d| d == "node_modules"));
        assert!(!settings.llm.has_api_key());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [chunking]
            chunk_size = 500

            [retrieval]
            strategy = "retrieval"
            "#,
        )
        .unwrap();

        assert_eq!(settings.chunking.chunk_size, 500);
        assert_eq!(settings.chunking.chunk_overlap, 200);
        assert_eq!(settings.retrieval.strategy, ContextStrategy::Retrieval);
        assert_eq!(settings.retrieval.top_k, 8);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("AZURE_OPENAI_API_KEY", "secret"),
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
            ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o"),
            ("AZURE_OPENAI_VERSION", "2024-06-01"),
            ("AZURE_OPENAI_EMBEDDING_DEPLOYMENT", "embed-small"),
            ("REPOPREP_STRATEGY", "retrieval"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.llm.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.llm.endpoint, "https://example.openai.azure.com");
        assert_eq!(settings.llm.deployment, "gpt-4o");
        assert_eq!(settings.llm.api_version, "2024-06-01");
        assert_eq!(settings.embedding.deployment, "embed-small");
        assert_eq!(settings.retrieval.strategy, ContextStrategy::Retrieval);
        assert_eq!(settings.redacted().llm.api_key.as_deref(), Some("********"));
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("RAG".parse::<ContextStrategy>(), Ok(ContextStrategy::Retrieval));
        assert!("vector".parse::<ContextStrategy>().is_err());
    }
}
