// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Errors surfaced by the auth gateway.
///
/// Token problems never appear here: an invalid or expired token is simply
/// `Unauthenticated`.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No valid session accompanies the request
    #[error("Authentication is required")]
    Unauthenticated,

    /// The identity backend rejected the credentials
    #[error("{0}")]
    InvalidCredentials(String),

    /// Field-level rejection from the identity backend, relayed verbatim
    #[error("identity backend rejected the request with status {status}")]
    Validation {
        status: StatusCode,
        body: serde_json::Value,
    },

    /// The identity backend could not be reached or answered unusably
    #[error("Identity backend unavailable: {0}")]
    BackendUnreachable(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::InvalidCredentials(_) => "invalid_credentials",
            AuthError::Validation { .. } => "validation_error",
            AuthError::BackendUnreachable(_) => "backend_unreachable",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated | AuthError::InvalidCredentials(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Validation { status, .. } => *status,
            AuthError::BackendUnreachable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AuthError::Validation { body, .. } = self {
            return (status, Json(body)).into_response();
        }
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
