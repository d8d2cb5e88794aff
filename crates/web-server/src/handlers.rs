use crate::{error::AppError, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode, Uri},
    Json,
};
use chrono::Utc;
use core_types::{CatalogItem, CreateMessageRequest, Message};
use serde_json::{json, Value};
use std::sync::Arc;

/// Upper bound on rows returned by `GET /api/messages`.
pub const MESSAGE_LIST_LIMIT: i64 = 100;

/// # GET /
pub async fn root() -> &'static str {
    "Backend is running!"
}

/// # GET /api/messages
/// The newest messages first, at most [`MESSAGE_LIST_LIMIT`].
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Message>>, AppError> {
    tracing::info!("Fetching messages from database.");
    let messages = state
        .store
        .list_messages(MESSAGE_LIST_LIMIT)
        .await
        .map_err(|e| AppError::store("Failed to fetch messages", e))?;
    tracing::info!(count = messages.len(), "Retrieved messages.");
    Ok(Json(messages))
}

/// # POST /api/messages
/// Validates all three fields before anything is written, then returns the
/// stored row with its assigned id and timestamp.
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Rejected message body.");
        match rejection {
            JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
                AppError::BadRequest("Invalid JSON body".to_string())
            }
            // Oversized bodies (413) and a missing content type (415) keep their status.
            other => AppError::Rejected { status: other.status(), message: other.body_text() },
        }
    })?;

    tracing::info!(
        name = ?request.name,
        email = ?request.email,
        message = %request.message_preview(),
        "Received message."
    );

    let new_message = request.validate()?;
    let created = state
        .store
        .create_message(&new_message)
        .await
        .map_err(|e| AppError::store("Failed to save message", e))?;

    tracing::info!(id = created.id, "Message saved.");
    Ok((StatusCode::CREATED, Json(created)))
}

/// # GET /api/products
/// Read-only catalog listing consumed by the client view.
pub async fn list_catalog_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CatalogItem>>, AppError> {
    let items = state
        .store
        .list_catalog_items()
        .await
        .map_err(|e| AppError::store("Failed to fetch products", e))?;
    Ok(Json(items))
}

/// # GET /api/health
/// Reports liveness and whether the database answers a probe.
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let timestamp = Utc::now().to_rfc3339();

    match state.store.ping().await {
        Ok(database_time) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": timestamp,
                "database": "connected",
                "database_time": database_time.to_rfc3339(),
            })),
        ),
        Err(e) => {
            tracing::error!(error = ?e, "Health check database probe failed.");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "timestamp": timestamp,
                    "database": "disconnected",
                    "error": "Database unreachable",
                })),
            )
        }
    }
}

/// Anything that is neither an API route nor a static file.
pub async fn not_found(method: Method, uri: Uri) -> AppError {
    tracing::warn!(%method, %uri, "Route not found.");
    AppError::NotFound("Route not found".to_string())
}
