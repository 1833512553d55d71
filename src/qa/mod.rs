//! Interview Q&A prompt construction.

mod composer;

pub use composer::{clamp_count, effective_topic, truncate_chars, PromptComposer, PromptPair};

/// Fewest Q&A pairs a batch may request.
pub const MIN_QUESTIONS: u32 = 5;

/// Most Q&A pairs a batch may request.
pub const MAX_QUESTIONS: u32 = 20;

/// Focus used when single-question mode gets no topic.
pub const DEFAULT_TOPIC: &str = "most critical part of this repository";
