// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Startup errors. Request-time errors live in [`crate::auth::AuthError`].

use crate::policy::PolicyError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("route policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("token key: {0}")]
    TokenKey(#[from] jsonwebtoken::errors::Error),

    #[error("identity backend: {0}")]
    Backend(String),
}

impl ConfigError {
    pub fn invalid(var: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Invalid {
            var,
            reason: reason.to_string(),
        }
    }
}
