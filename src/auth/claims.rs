// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and the principal derived from them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims carried by a session token issued by the identity backend.
///
/// The backend has shipped tokens keyed by `sub`, `id` and `userId` over time,
/// with numeric or string identifiers, so all of them are accepted. When more
/// than one is present, `sub` wins over `id`, and `id` over `userId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawClaims")]
pub struct TokenClaims {
    /// Subject (account ID)
    pub sub: String,

    /// Display name
    pub name: String,

    pub email: String,

    /// Raw role claim; unknown values fall back to [`Role::User`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer (checked only when an expected issuer is configured)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Wire shape of the claims before the subject is resolved.
#[derive(Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<serde_json::Value>,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default, rename = "userId")]
    user_id: Option<serde_json::Value>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    iat: i64,
    exp: i64,
    #[serde(default)]
    iss: Option<String>,
}

impl TryFrom<RawClaims> for TokenClaims {
    type Error = String;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let subject = raw
            .sub
            .or(raw.id)
            .or(raw.user_id)
            .ok_or_else(|| "token carries no subject".to_string())?;
        let sub = match subject {
            serde_json::Value::String(s) if !s.is_empty() => s,
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(format!(
                    "subject must be a non-empty string or a number, got {other}"
                ))
            }
        };

        Ok(Self {
            sub,
            name: raw.name,
            email: raw.email,
            role: raw.role,
            iat: raw.iat,
            exp: raw.exp,
            iss: raw.iss,
        })
    }
}

/// The authenticated identity behind a request.
///
/// Always re-derived from a valid token; never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    /// Account ID (token subject)
    pub id: String,
    /// Display name
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn from_claims(claims: TokenClaims) -> Self {
        let role = claims
            .role
            .as_deref()
            .and_then(Role::from_str)
            .unwrap_or_default();

        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role,
        }
    }
}
