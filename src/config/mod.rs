//! Configuration module for repoprep.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QaPrompts};
pub use settings::{
    ChunkingSettings, ContextStrategy, EmbeddingSettings, ExtractionSettings, GeneralSettings,
    LlmProvider, LlmSettings, PromptSettings, QaSettings, RetrievalSettings, Settings,
};
