//! Prompt composition. Pure functions of their inputs.

use super::{DEFAULT_TOPIC, MAX_QUESTIONS, MIN_QUESTIONS};
use crate::config::{Prompts, QaSettings};
use crate::llm::ChatMessage;
use std::collections::HashMap;

/// A system instruction and the user message that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.user.clone()),
        ]
    }
}

/// Builds Q&A prompts from repository context.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    prompts: Prompts,
    max_context_chars: usize,
    single_context_chars: usize,
}

impl PromptComposer {
    pub fn new(prompts: Prompts, settings: &QaSettings) -> Self {
        Self {
            prompts,
            max_context_chars: settings.max_context_chars,
            single_context_chars: settings.single_context_chars,
        }
    }

    /// Prompts for `count` Q&A pairs (clamped to the allowed range).
    pub fn batch(&self, context: &str, count: u32) -> PromptPair {
        let count = clamp_count(count);

        let mut vars = HashMap::new();
        vars.insert("count".to_string(), count.to_string());
        vars.insert(
            "context".to_string(),
            truncate_chars(context, self.max_context_chars).to_string(),
        );

        PromptPair {
            system: self.prompts.render_with_custom(&self.prompts.qa.system, &vars),
            user: self.prompts.render_with_custom(&self.prompts.qa.user, &vars),
        }
    }

    /// Prompts for one focused Q&A pair.
    pub fn single(&self, context: &str, topic: Option<&str>) -> PromptPair {
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), effective_topic(topic).to_string());
        vars.insert(
            "context".to_string(),
            truncate_chars(context, self.single_context_chars).to_string(),
        );

        PromptPair {
            system: self
                .prompts
                .render_with_custom(&self.prompts.qa.single_system, &vars),
            user: self.prompts.render_with_custom(&self.prompts.qa.single_user, &vars),
        }
    }

    /// Similarity query used to pick passages for a batch.
    pub fn retrieval_query(&self) -> &str {
        &self.prompts.qa.retrieval_query
    }
}

/// Clamp a requested pair count to `MIN_QUESTIONS..=MAX_QUESTIONS`.
pub fn clamp_count(count: u32) -> u32 {
    count.clamp(MIN_QUESTIONS, MAX_QUESTIONS)
}

/// The topic to steer on; blank means the default.
pub fn effective_topic(topic: Option<&str>) -> &str {
    match topic.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => DEFAULT_TOPIC,
    }
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> PromptComposer {
        PromptComposer::new(Prompts::default(), &QaSettings::default())
    }

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(0), 5);
        assert_eq!(clamp_count(4), 5);
        assert_eq!(clamp_count(12), 12);
        assert_eq!(clamp_count(21), 20);
        assert_eq!(clamp_count(u32::MAX), 20);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("日本語", 0), "");
    }

    #[test]
    fn test_batch_prompt_format() {
        let pair = composer().batch("fn main() {}", 7);

        assert!(pair.system.contains("principal engineer"));
        assert!(pair.user.starts_with("Using only the repo context below, produce 7 Q&A pairs."));
        assert!(pair.user.contains("\"\"\"\nfn main() {}\n\"\"\""));
        assert!(pair.user.contains("Q1: ...\nA1: ..."));
        assert!(pair.user.contains("up to Q7/A7."));
        assert!(pair.user.ends_with("Do not add extra commentary."));
    }

    #[test]
    fn test_batch_clamps_count() {
        assert!(composer().batch("ctx", 50).user.contains("produce 20 Q&A pairs"));
        assert!(composer().batch("ctx", 1).user.contains("up to Q5/A5."));
    }

    #[test]
    fn test_batch_truncates_context() {
        let context = "§".repeat(100_050);
        let pair = composer().batch(&context, 10);
        let embedded = pair.user.matches('§').count();
        assert_eq!(embedded, 100_000);
    }

    #[test]
    fn test_single_prompt_default_topic() {
        let pair = composer().single("ctx", None);
        assert!(pair.system.contains("Ask ONE tough, repo-specific question"));
        assert!(pair.user.contains("Focus: most critical part of this repository"));
        assert!(pair.user.contains("Q: <question>\nA: <answer>"));

        let blank = composer().single("ctx", Some("   "));
        assert_eq!(blank, pair);
    }

    #[test]
    fn test_single_prompt_topic_and_budget() {
        let context = "¤".repeat(7_000);
        let pair = composer().single(&context, Some("error handling"));
        assert!(pair.user.contains("Focus: error handling"));
        assert_eq!(pair.user.matches('¤').count(), 6_000);
    }

    #[test]
    fn test_custom_budgets() {
        let settings = QaSettings {
            max_context_chars: 10,
            single_context_chars: 4,
            ..QaSettings::default()
        };
        let c = PromptComposer::new(Prompts::default(), &settings);
        assert!(c.batch("0123456789abcdef", 5).user.contains("\"\"\"\n0123456789\n\"\"\""));
        assert!(c.single("0123456789", None).user.contains("\"\"\"\n0123\n\"\"\""));
    }

    #[test]
    fn test_messages_order() {
        let messages = composer().single("ctx", Some("tests")).to_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, crate::llm::Role::System);
        assert_eq!(messages[1].role, crate::llm::Role::User);
    }
}
