// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the identity backend.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::warn;
use url::Url;

use super::IdentityBackend;
use crate::auth::AuthError;
use crate::models::{BackendAuthResponse, SignInRequest, SignUpRequest};

/// Default sign-in endpoint, relative to the backend base URL.
pub const DEFAULT_SIGN_IN_PATH: &str = "/auth/login";

/// Default sign-up endpoint, relative to the backend base URL.
pub const DEFAULT_SIGN_UP_PATH: &str = "/auth/register";

/// Default outbound request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpIdentityBackend {
    sign_in_url: Url,
    sign_up_url: Url,
    http: Client,
}

impl HttpIdentityBackend {
    /// Create a backend client.
    ///
    /// # Arguments
    /// - `base_url`: backend root, e.g. `https://identity.example.com/api`
    /// - `sign_in_path` / `sign_up_path`: endpoint paths appended to the root
    pub fn new(
        base_url: &Url,
        sign_in_path: &str,
        sign_up_path: &str,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::BackendUnreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            sign_in_url: endpoint(base_url, sign_in_path)?,
            sign_up_url: endpoint(base_url, sign_up_path)?,
            http,
        })
    }

    pub fn sign_in_url(&self) -> &Url {
        &self.sign_in_url
    }

    pub fn sign_up_url(&self) -> &Url {
        &self.sign_up_url
    }

    async fn post<T: Serialize + ?Sized>(&self, url: &Url, body: &T) -> Result<Response, AuthError> {
        self.http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Identity backend request failed");
                AuthError::BackendUnreachable(if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    "request failed".to_string()
                })
            })
    }
}

/// Append `path` to `base`, keeping any path prefix `base` already has.
fn endpoint(base: &Url, path: &str) -> Result<Url, AuthError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined)
        .map_err(|e| AuthError::BackendUnreachable(format!("invalid backend endpoint {joined}: {e}")))
}

#[async_trait]
impl IdentityBackend for HttpIdentityBackend {
    async fn sign_in(&self, request: &SignInRequest) -> Result<BackendAuthResponse, AuthError> {
        let response = self.post(&self.sign_in_url, request).await?;
        let status = response.status();

        if status.is_success() {
            return read_success(response).await;
        }
        if status.is_client_error() {
            let body = read_body(response).await;
            return Err(AuthError::InvalidCredentials(
                backend_message(&body).unwrap_or_else(|| "Invalid email or password".to_string()),
            ));
        }

        warn!(status = %status, "Identity backend rejected sign-in with a server error");
        Err(AuthError::BackendUnreachable(format!("HTTP {status} from identity backend")))
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<BackendAuthResponse, AuthError> {
        let response = self.post(&self.sign_up_url, request).await?;
        let status = response.status();

        if status.is_success() {
            return read_success(response).await;
        }
        if status.is_client_error() {
            let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_REQUEST);
            let body = read_body(response).await;
            return Err(AuthError::Validation { status, body });
        }

        warn!(status = %status, "Identity backend rejected sign-up with a server error");
        Err(AuthError::BackendUnreachable(format!("HTTP {status} from identity backend")))
    }
}

async fn read_success(response: Response) -> Result<BackendAuthResponse, AuthError> {
    response.json::<BackendAuthResponse>().await.map_err(|e| {
        warn!(error = %e, "Identity backend returned an unreadable body");
        AuthError::BackendUnreachable("invalid response body".to_string())
    })
}

/// Body of a rejection; non-JSON bodies are wrapped as `{ "message": text }`.
async fn read_body(response: Response) -> serde_json::Value {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "message": text }))
}

fn backend_message(body: &serde_json::Value) -> Option<String> {
    body.get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
