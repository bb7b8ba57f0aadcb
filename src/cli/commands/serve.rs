//! HTTP API server exposing the upload, indexing, and chat endpoints.
//!
//! Each request is handled to completion before responding; no background
//! jobs and no state shared between requests beyond the vector store itself.

use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::KildeError;
use crate::ingest::Ingestor;
use crate::rag::RagEngine;
use crate::source::{SourceDescriptor, SourceKind};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
struct AppState {
    ingestor: Ingestor,
    rag: RagEngine,
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<&str>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or(&settings.server.host).to_string();
    let port = port.unwrap_or(settings.server.port);

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let ingestor = Ingestor::new(settings.clone())?;
    let rag = RagEngine::new(
        ingestor.vector_store(),
        ingestor.embedder(),
        &settings.completion,
        settings.retrieval.top_k,
    )
    .with_prompts(prompts);

    let state = Arc::new(AppState { ingestor, rag });
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Kilde API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Upload", "POST /upload");
    Output::kv("Indexing", "POST /indexing");
    Output::kv("Chat", "POST /chat");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Assemble the API router over shared state.
fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/indexing", post(indexing))
        .route("/chat", post(chat))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Serialize)]
struct UploadResponse {
    filename: String,
    #[serde(rename = "relativePath")]
    relative_path: String,
}

#[derive(Serialize)]
struct UploadErrorResponse {
    error: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct IndexingRequest {
    filename: Option<String>,
    website_url: Option<String>,
    text_content: Option<String>,
    youtube_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    #[serde(default)]
    input_message: String,
    mode: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    #[serde(rename = "aiResponse")]
    ai_response: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

/// Map a pipeline error to a response: caller mistakes are 400, upstream
/// failures are 500 with a generic message.
fn error_response(err: KildeError) -> (StatusCode, Json<MessageResponse>) {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        error!("Request failed: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(MessageResponse {
            message: err.to_string(),
        }),
    )
}

/// Derive a collision-free stored name for an upload from the current time
/// and the original name. Path components are stripped from the original.
fn derive_upload_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim();
    let base = if base.is_empty() { "upload" } else { base };
    format!("{}-{}", Utc::now().timestamp_millis(), base)
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut file: Option<(String, axum::body::Bytes)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let original = field
                .file_name()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "upload".to_string());
            match field.bytes().await {
                Ok(bytes) => file = Some((original, bytes)),
                Err(e) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(UploadErrorResponse {
                            error: format!("Failed to read file field: {}", e),
                        }),
                    )
                        .into_response()
                }
            }
            break;
        }
    }

    let Some((original, bytes)) = file else {
        return (
            StatusCode::BAD_REQUEST,
            Json(UploadErrorResponse {
                error: "No file uploaded".to_string(),
            }),
        )
            .into_response();
    };

    let filename = derive_upload_filename(&original);
    let path = state.ingestor.uploads_dir().join(&filename);

    if let Err(e) = tokio::fs::write(&path, &bytes).await {
        error!("Failed to write upload to {}: {}", path.display(), e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(UploadErrorResponse {
                error: "Internal Server Error".to_string(),
            }),
        )
            .into_response();
    }

    Json(UploadResponse {
        relative_path: format!("/uploads/{}", filename),
        filename,
    })
    .into_response()
}

async fn indexing(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IndexingRequest>,
) -> impl IntoResponse {
    let descriptor = match SourceDescriptor::from_fields(
        req.filename,
        req.website_url,
        req.text_content,
        req.youtube_url,
    ) {
        Ok(d) => d,
        Err(e) => return error_response(e).into_response(),
    };

    match state.ingestor.ingest(&descriptor).await {
        Ok(_) => "Indexing done successfully...".into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let Some(mode) = req.mode else {
        return (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse {
                message: "Mode is required".to_string(),
            }),
        )
            .into_response();
    };

    let kind = match SourceKind::from_str(&mode) {
        Ok(k) => k,
        Err(e) => return error_response(e).into_response(),
    };

    match state.rag.answer(&req.input_message, kind).await {
        Ok(response) => Json(ChatResponse {
            ai_response: response.answer,
        })
        .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
