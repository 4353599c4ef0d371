// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the auth gateway, plus the payloads
//! exchanged with the identity backend. Gateway-facing types derive
//! `ToSchema` for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Credentials**: sign-in and sign-up requests
//! - **Backend**: the identity backend's success payload
//! - **Session**: sign-in, sign-up, who-am-I and logout responses

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Principal;

// =============================================================================
// Credentials
// =============================================================================

/// Credentials for `POST /api/auth/sign-in`.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Profile for `POST /api/auth/sign-up`.
///
/// `password_confirmation` and `phone` are optional and forwarded only when
/// present; the identity backend is the only validator.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_confirmation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .finish()
    }
}

// =============================================================================
// Identity Backend
// =============================================================================

/// Success payload of the identity backend.
///
/// Only `token` is interpreted; `user` is relayed untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendAuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Session Responses
// =============================================================================

/// Response for a successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignInResponse {
    pub authenticated: bool,
    /// Identity derived from the issued token
    pub user: Principal,
    /// The backend's `user` object, unmodified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub profile: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Where the client should navigate next
    pub redirect_to: String,
}

/// Response for a successful sign-up.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignUpResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Present when the backend issued a token and a session was started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Principal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub profile: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

/// Response for `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Principal>,
}

impl SessionResponse {
    pub fn authenticated(user: Principal) -> Self {
        Self {
            authenticated: true,
            user: Some(user),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            user: None,
        }
    }
}

/// Response for `POST /api/auth/logout`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
}
