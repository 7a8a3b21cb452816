//! Request-boundary errors.
//!
//! Every failure is turned into a JSON body `{ "ok": false, "error": code }`
//! with a stable code. The underlying detail goes to the log only.

use std::net::SocketAddr;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::db::DbError;

#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Storage binding is not configured")]
    #[diagnostic(
        code(leadgress::api::storage_not_configured),
        help("Pass --db <PATH> or set LEADGRESS_DB")
    )]
    StorageNotConfigured,

    #[error("Invalid request body: {0}")]
    #[diagnostic(code(leadgress::api::invalid_request_body))]
    InvalidBody(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Storage(#[from] DbError),

    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(code(leadgress::api::bind))]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    #[diagnostic(code(leadgress::api::serve))]
    Serve(#[source] std::io::Error),
}

impl ApiError {
    /// Machine-readable code returned to callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::StorageNotConfigured => "storage_not_configured",
            ApiError::InvalidBody(_) => "invalid_request_body",
            ApiError::Storage(_) => "storage_error",
            ApiError::Bind { .. } | ApiError::Serve(_) => "internal_error",
        }
    }
}

/// Error response DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    #[schema(example = false)]
    pub ok: bool,
    /// Error code
    #[schema(example = "storage_error")]
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        error!(code, error = %self, "lead request failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                ok: false,
                error: code.to_string(),
            }),
        )
            .into_response()
    }
}
