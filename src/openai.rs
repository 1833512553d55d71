//! OpenAI / Azure OpenAI client configuration.

use crate::config::LlmSettings;
use crate::error::{PrepError, Result};
use async_openai::config::{AzureConfig, OpenAIConfig};
use async_openai::Client;
use std::time::Duration;

/// Build the HTTP client shared by API clients.
fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PrepError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Create an Azure OpenAI client bound to one deployment.
///
/// Missing credentials are not checked here; the service rejects them on first use.
pub fn azure_client(settings: &LlmSettings, deployment: &str) -> Result<Client<AzureConfig>> {
    let config = AzureConfig::new()
        .with_api_base(settings.endpoint.clone())
        .with_api_key(settings.api_key.clone().unwrap_or_default())
        .with_deployment_id(deployment.to_string())
        .with_api_version(settings.api_version.clone());

    let http = http_client(Duration::from_secs(settings.timeout_secs))?;
    Ok(Client::with_config(config).with_http_client(http))
}

/// Create an OpenAI client. A non-empty endpoint overrides the API base.
pub fn openai_client(settings: &LlmSettings) -> Result<Client<OpenAIConfig>> {
    let mut config = OpenAIConfig::new().with_api_key(settings.api_key.clone().unwrap_or_default());
    if !settings.endpoint.is_empty() {
        config = config.with_api_base(settings.endpoint.clone());
    }

    let http = http_client(Duration::from_secs(settings.timeout_secs))?;
    Ok(Client::with_config(config).with_http_client(http))
}
