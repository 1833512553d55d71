//! Prompt templates for repoprep.
//!
//! Prompts can be customized by placing a `qa.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub qa: QaPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for interview Q&A generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPrompts {
    /// System prompt for batch generation.
    pub system: String,
    /// User prompt for batch generation. Variables: `count`, `context`.
    pub user: String,
    /// System prompt for single-question mode.
    pub single_system: String,
    /// User prompt for single-question mode. Variables: `context`, `topic`.
    pub single_user: String,
    /// Similarity query used to pick passages for batch generation.
    pub retrieval_query: String,
}

impl Default for QaPrompts {
    fn default() -> Self {
        Self {
            system: "You are a principal engineer conducting a rigorous technical interview about a specific GitHub repository. \
Ask only realistic, challenging interview questions directly grounded in the repo's actual code, configuration, and design choices. \
Focus on probing the candidate’s reasoning behind trade-offs. \
Why they chose one tool, library, or framework over alternatives. \
Why this approach is better or worse compared to others. \
How decisions impact performance, scalability, testing, security, and maintainability. \
Do not ask generic or surface-level question Keep questions precise, technical, and focused on why this, not that reasoning."
                .to_string(),

            user: r#"Using only the repo context below, produce {{count}} Q&A pairs.
Context:
"""
{{context}}
"""
Format strictly:
Q1: ...
A1: ...
Q2: ...
A2: ...
... up to Q{{count}}/A{{count}}.
Do not add extra commentary."#
                .to_string(),

            single_system: "You are a senior interviewer. Ask ONE tough, repo-specific question, then give the detailed answer."
                .to_string(),

            single_user: r#"Repo context:
"""
{{context}}
"""
Focus: {{topic}}
Output format:
Q: <question>
A: <answer>
No preamble."#
                .to_string(),

            retrieval_query: "architecture, core modules, configuration, dependencies, design trade-offs, testing and deployment"
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let qa_path = custom_path.join("qa.toml");
            if qa_path.exists() {
                let content = std::fs::read_to_string(&qa_path)?;
                prompts.qa = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Single pass: substituted values are never scanned for placeholders,
    /// and unknown placeholders are left as written.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };

            let key = &after[..end];
            match vars.get(key) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[start..start + end + 4]),
            }
            rest = &after[end + 2..];
        }

        out.push_str(rest);
        out
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
