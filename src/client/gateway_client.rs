// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the auth gateway, plus the session wrapper that keeps a
//! [`SessionCache`] in step with it.
//!
//! The client keeps its own cookie store, so it behaves like a browser: the
//! session cookie is sent back automatically and never inspected here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::info;
use url::Url;

use super::{ClientError, SessionCache, SessionSource, SessionState};
use crate::auth::Principal;
use crate::models::{
    LogoutResponse, SessionResponse, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse,
};

const SIGN_IN_PATH: &str = "/api/auth/sign-in";
const SIGN_UP_PATH: &str = "/api/auth/sign-up";
const ME_PATH: &str = "/api/auth/me";
const LOGOUT_PATH: &str = "/api/auth/logout";

/// Per-request timeout used by [`GatewayClient::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct GatewayClient {
    base: Url,
    http: Client,
}

impl GatewayClient {
    pub fn new(base: Url) -> Result<Self, ClientError> {
        Self::with_timeout(base, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(base: Url, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().cookie_store(true).timeout(timeout).build()?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, ClientError> {
        let response = self.http.post(self.url(SIGN_IN_PATH)?).json(request).send().await?;
        read(response).await
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, ClientError> {
        let response = self.http.post(self.url(SIGN_UP_PATH)?).json(request).send().await?;
        read(response).await
    }

    pub async fn logout(&self) -> Result<LogoutResponse, ClientError> {
        let response = self.http.post(self.url(LOGOUT_PATH)?).send().await?;
        read(response).await
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }
}

#[async_trait]
impl SessionSource for GatewayClient {
    async fn who_am_i(&self) -> Result<Option<Principal>, ClientError> {
        let response = self.http.get(self.url(ME_PATH)?).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        let session: SessionResponse = read(response).await?;
        Ok(session.user.filter(|_| session.authenticated))
    }
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response
        .json::<serde_json::Value>()
        .await
        .unwrap_or(serde_json::Value::Null);
    Err(ClientError::rejected(status.as_u16(), body))
}

/// Gateway client coupled with its session cache.
///
/// Every sign-in, sign-up and logout invalidates the cache first and
/// re-populates it afterwards, whatever the outcome.
pub struct ClientSession {
    client: Arc<GatewayClient>,
    cache: Arc<SessionCache>,
}

impl ClientSession {
    pub fn new(client: GatewayClient) -> Self {
        let client = Arc::new(client);
        let cache = Arc::new(SessionCache::new(client.clone()));
        Self { client, cache }
    }

    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    /// Initial page load.
    pub async fn load(&self) -> SessionState {
        self.cache.refresh().await
    }

    pub async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, ClientError> {
        self.cache.invalidate();
        let result = self.client.sign_in(request).await;
        self.cache.refresh().await;
        if let Ok(response) = &result {
            info!(user_id = %response.user.id, "Signed in");
        }
        result
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, ClientError> {
        self.cache.invalidate();
        let result = self.client.sign_up(request).await;
        self.cache.refresh().await;
        result
    }

    pub async fn logout(&self) -> Result<LogoutResponse, ClientError> {
        self.cache.invalidate();
        let result = self.client.logout().await;
        self.cache.refresh().await;
        result
    }
}
