//! HTTP API server.
//!
//! One session is shared by every request; actions run one at a time.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::session::Session;
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    session: Mutex<Session>,
    default_count: u32,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let default_count = settings.qa.default_count;
    let orchestrator = Orchestrator::new(settings)?;

    let state = Arc::new(AppState {
        session: Mutex::new(Session::new(orchestrator)),
        default_count,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/generate", post(generate))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("repoprep API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Analyze", "POST /analyze   {\"url\": \"https://...\"}");
    Output::kv("Generate", "POST /generate  {\"count\": 10}");
    Output::kv("Ask", "POST /ask       {\"topic\": \"...\"}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct AskRequest {
    #[serde(default)]
    topic: Option<String>,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    loaded: bool,
}

#[derive(Serialize)]
struct OutputResponse {
    output: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    let mut session = state.session.lock().await;
    let status = session.analyze(&req.url).await;

    Json(StatusResponse {
        status,
        loaded: session.repo().is_some(),
    })
}

async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> impl IntoResponse {
    let session = state.session.lock().await;
    let output = session.generate(req.count.unwrap_or(state.default_count)).await;
    Json(OutputResponse { output })
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> impl IntoResponse {
    let session = state.session.lock().await;
    let output = session.ask(req.topic.as_deref()).await;
    Json(OutputResponse { output })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let generate: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert!(generate.count.is_none());

        let ask: AskRequest = serde_json::from_str(r#"{"topic": "caching"}"#).unwrap();
        assert_eq!(ask.topic.as_deref(), Some("caching"));

        assert!(serde_json::from_str::<AnalyzeRequest>("{}").is_err());
    }

    #[test]
    fn test_status_response_shape() {
        let body = serde_json::to_value(StatusResponse {
            status: "Invalid URL".to_string(),
            loaded: false,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "status": "Invalid URL", "loaded": false }));
    }
}
