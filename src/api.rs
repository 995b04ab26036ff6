//! HTTP API mode: the generation, reflection and speech-token operations
//! behind a small axum router, so a web client can drive them without ever
//! holding the API keys itself.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::generator::PassageGenerator;
use crate::reflector::Reflector;
use crate::speech::{SpeechSynthesizer, SpeechToken};

#[derive(Clone)]
pub struct ApiState {
    pub generator: Arc<PassageGenerator>,
    pub reflector: Arc<Reflector>,
    pub speech: Arc<SpeechSynthesizer>,
}

// --- Request/Response types ---

#[derive(Debug, Default, Deserialize)]
struct GenerateRequest {
    theme: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ReflectRequest {
    content: String,
}

#[derive(Serialize)]
struct ReflectResponse {
    reflection: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Build the axum router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/generate", post(handle_generate))
        .route("/reflect", post(handle_reflect))
        .route("/speech-token", get(handle_speech_token))
        .with_state(state)
}

/// Serve the API in the foreground until the process is stopped.
pub async fn serve(state: ApiState, port: u16) -> Result<(), String> {
    let app = router(state);
    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("falha ao abrir {addr}: {e}"))?;

    info!("API listening on {addr}");
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("erro no servidor HTTP: {e}"))
}

// --- Handlers ---

async fn handle_generate(
    State(state): State<ApiState>,
    body: String,
) -> Result<Json<GenerateResponse>, ApiError> {
    // The request body is optional; anything unparseable means "no theme".
    let req: GenerateRequest = serde_json::from_str(&body).unwrap_or_default();

    let content = state
        .generator
        .generate(req.theme.as_deref())
        .await
        .map_err(|e| {
            warn!("generation failed: {e}");
            api_error(StatusCode::BAD_GATEWAY, e)
        })?;

    Ok(Json(GenerateResponse { content }))
}

async fn handle_reflect(
    State(state): State<ApiState>,
    Json(req): Json<ReflectRequest>,
) -> Result<Json<ReflectResponse>, ApiError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "content é obrigatório"));
    }

    let reflection = state.reflector.reflect(content).await.map_err(|e| {
        warn!("reflection failed: {e}");
        api_error(StatusCode::BAD_GATEWAY, e)
    })?;

    Ok(Json(ReflectResponse { reflection }))
}

async fn handle_speech_token(
    State(state): State<ApiState>,
) -> Result<Json<SpeechToken>, ApiError> {
    if !state.speech.is_configured() {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Azure Speech não configurado (AZURE_SPEECH_KEY / AZURE_SPEECH_REGION).",
        ));
    }

    let token = state.speech.issue_token().await.map_err(|e| {
        warn!("token request failed: {e}");
        api_error(StatusCode::BAD_GATEWAY, e)
    })?;

    Ok(Json(token))
}
