//! Pre-flight checks before expensive operations.
//!
//! Hard requirements fail fast; soft ones come back as warnings because the
//! model service reports them itself on first use.

use crate::config::{ContextStrategy, LlmProvider, Settings};
use crate::error::{PrepError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Cloning and extracting only; the model is used only by the retrieval strategy.
    Analyze,
    /// Anything that calls the chat model.
    Generate,
}

/// Run pre-flight checks for the given operation.
///
/// Returns warnings to show, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<Vec<String>> {
    check_tool("git")?;

    let needs_model = match operation {
        Operation::Analyze => settings.retrieval.strategy == ContextStrategy::Retrieval,
        Operation::Generate => true,
    };

    let mut warnings = Vec::new();
    if needs_model {
        warnings.extend(credential_warnings(settings));
    }
    Ok(warnings)
}

/// Missing credentials or endpoint for the configured provider.
pub fn credential_warnings(settings: &Settings) -> Vec<String> {
    let mut warnings = Vec::new();
    let key_var = match settings.llm.provider {
        LlmProvider::Azure => "AZURE_OPENAI_API_KEY",
        LlmProvider::OpenAI => "OPENAI_API_KEY",
    };

    if !settings.llm.has_api_key() {
        warnings.push(format!(
            "{} not set. Requests will fail authentication. Set it with: export {}='...'",
            key_var, key_var
        ));
    }
    if settings.llm.provider == LlmProvider::Azure && settings.llm.endpoint.is_empty() {
        warnings.push(
            "AZURE_OPENAI_ENDPOINT not set. Set it with: export AZURE_OPENAI_ENDPOINT='https://<resource>.openai.azure.com'"
                .to_string(),
        );
    }
    warnings
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(PrepError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PrepError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(PrepError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
