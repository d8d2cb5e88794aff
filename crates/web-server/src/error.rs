use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::CoreError;
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] CoreError),
    /// `context` is the only text the caller sees; `source` stays in the logs.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: DbError,
    },
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// An extractor rejection passed through with its own status.
    #[error("Rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
}

impl AppError {
    pub fn store(context: &'static str, source: DbError) -> Self {
        AppError::Store { context, source }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(err) => {
                let CoreError::MissingFields(fields) = &err;
                tracing::warn!(?fields, "Missing required fields.");
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Store { context, source } => {
                tracing::error!(error = ?source, "{context}.");
                (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Rejected { status, message } => (status, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
