// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `APP_ENV` | `development` drops the `Secure` cookie flag and enables permissive CORS | `production` |
//! | `IDENTITY_BACKEND_URL` | Identity backend base URL | Required |
//! | `IDENTITY_SIGN_IN_PATH` | Backend sign-in endpoint | `/auth/login` |
//! | `IDENTITY_SIGN_UP_PATH` | Backend sign-up endpoint | `/auth/register` |
//! | `IDENTITY_TIMEOUT_SECS` | Outbound request timeout | `10` |
//! | `TOKEN_SECRET` | HS256 verification secret | One of the two key variables is required |
//! | `TOKEN_PUBLIC_KEY_PATH` | RS256 PEM public key, used when no secret is set | |
//! | `TOKEN_ISSUER` | Expected `iss` claim | Not checked |
//! | `SESSION_MAX_AGE_SECS` | Session cookie lifetime | `604800` (7 days) |
//! | `ROUTE_POLICY_PATH` | JSON route policy file | Built-in storefront table |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Serve HTTPS with these PEM files | Plain HTTP |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::auth::session::DEFAULT_SESSION_MAX_AGE_SECS;
use crate::auth::TokenKey;
use crate::error::ConfigError;
use crate::identity::http::{DEFAULT_SIGN_IN_PATH, DEFAULT_SIGN_UP_PATH, DEFAULT_TIMEOUT};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const APP_ENV: &str = "APP_ENV";
pub const IDENTITY_BACKEND_URL_ENV: &str = "IDENTITY_BACKEND_URL";
pub const IDENTITY_SIGN_IN_PATH_ENV: &str = "IDENTITY_SIGN_IN_PATH";
pub const IDENTITY_SIGN_UP_PATH_ENV: &str = "IDENTITY_SIGN_UP_PATH";
pub const IDENTITY_TIMEOUT_SECS_ENV: &str = "IDENTITY_TIMEOUT_SECS";
pub const TOKEN_SECRET_ENV: &str = "TOKEN_SECRET";
pub const TOKEN_PUBLIC_KEY_PATH_ENV: &str = "TOKEN_PUBLIC_KEY_PATH";
pub const TOKEN_ISSUER_ENV: &str = "TOKEN_ISSUER";
pub const SESSION_MAX_AGE_SECS_ENV: &str = "SESSION_MAX_AGE_SECS";
pub const ROUTE_POLICY_PATH_ENV: &str = "ROUTE_POLICY_PATH";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Local development: cookies without `Secure`, permissive CORS
    pub development: bool,
    pub identity_url: Url,
    pub identity_sign_in_path: String,
    pub identity_sign_up_path: String,
    pub identity_timeout: Duration,
    pub token_key: TokenKey,
    pub token_issuer: Option<String>,
    pub session_max_age_secs: i64,
    pub route_policy_path: Option<PathBuf>,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::invalid(PORT_ENV, "not a port number"))?,
            None => 8080,
        };

        let development = var(APP_ENV)
            .map(|env| matches!(env.to_lowercase().as_str(), "development" | "dev" | "local"))
            .unwrap_or(false);

        let identity_url = var(IDENTITY_BACKEND_URL_ENV)
            .ok_or(ConfigError::Missing(IDENTITY_BACKEND_URL_ENV))
            .and_then(|raw| {
                Url::parse(&raw).map_err(|e| ConfigError::invalid(IDENTITY_BACKEND_URL_ENV, e))
            })?;

        let identity_timeout = match var(IDENTITY_TIMEOUT_SECS_ENV) {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| ConfigError::invalid(IDENTITY_TIMEOUT_SECS_ENV, "expected a positive number of seconds"))?,
            None => DEFAULT_TIMEOUT,
        };

        let token_key = match (var(TOKEN_SECRET_ENV), var(TOKEN_PUBLIC_KEY_PATH_ENV)) {
            (Some(secret), _) => TokenKey::Secret(secret.into_bytes()),
            (None, Some(path)) => TokenKey::RsaPem(
                std::fs::read(&path).map_err(|e| ConfigError::invalid(TOKEN_PUBLIC_KEY_PATH_ENV, e))?,
            ),
            (None, None) => return Err(ConfigError::Missing(TOKEN_SECRET_ENV)),
        };

        let session_max_age_secs = match var(SESSION_MAX_AGE_SECS_ENV) {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::invalid(SESSION_MAX_AGE_SECS_ENV, "expected a positive number of seconds"))?,
            None => DEFAULT_SESSION_MAX_AGE_SECS,
        };

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let log_format = match var(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host: var(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            development,
            identity_url,
            identity_sign_in_path: var(IDENTITY_SIGN_IN_PATH_ENV)
                .unwrap_or_else(|| DEFAULT_SIGN_IN_PATH.to_string()),
            identity_sign_up_path: var(IDENTITY_SIGN_UP_PATH_ENV)
                .unwrap_or_else(|| DEFAULT_SIGN_UP_PATH.to_string()),
            identity_timeout,
            token_key,
            token_issuer: var(TOKEN_ISSUER_ENV),
            session_max_age_secs,
            route_policy_path: var(ROUTE_POLICY_PATH_ENV).map(PathBuf::from),
            tls,
            log_format,
        })
    }

    /// Whether cookies carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        !self.development
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
