// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

/// Failures talking to the auth gateway.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid gateway URL: {0}")]
    Url(#[from] url::ParseError),

    /// Non-success answer; `body` is the gateway's JSON body as sent
    #[error("gateway answered {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
        body: serde_json::Value,
    },
}

impl ClientError {
    /// Build a rejection from a gateway error body, which carries either
    /// `error` (gateway errors) or `message` (relayed backend validation).
    pub fn rejected(status: u16, body: serde_json::Value) -> Self {
        let message = ["error", "message"]
            .iter()
            .find_map(|key| body.get(key).and_then(|v| v.as_str()))
            .unwrap_or("request rejected")
            .to_string();
        Self::Rejected {
            status,
            message,
            body,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            ClientError::Url(_) => None,
        }
    }
}
