//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Generator-side failures (create/remove commands).
#[derive(Error, Debug)]
pub enum GenError {
    #[error("route '{0}' already exists")]
    AlreadyExists(String),
    #[error("route '{0}' does not exist")]
    NotFound(String),
    #[error("table '{0}' has no columns")]
    EmptyTable(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialize: {0}")]
    Json(#[from] serde_json::Error),
    /// Malformed or unwritable API document. Callers log and continue;
    /// artifact state is never rolled back for a doc-sync failure.
    #[error("api document: {0}")]
    DocSync(String),
}

/// Request-side failures surfaced by the dispatch handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("crypto: {0}")]
    Crypto(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Db(_) | AppError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Flat body: the error text passes through to the caller, including
        // database messages on 500s.
        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
