// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token decoding and validation.
//!
//! ## Rules
//!
//! - The signature must verify against the configured key (HS256 secret or
//!   RS256 public key); `alg: none` and mismatched algorithms are rejected
//! - `exp <= now` is expired; there is no clock-skew leeway
//! - When an expected issuer is configured, `iss` must equal it
//!
//! Every failure is an [`TokenInvalid`] value. Callers treat all of them the
//! same way as a missing token; the variant only feeds debug logs.

use std::collections::HashSet;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::claims::{Principal, TokenClaims};

/// Why a token was rejected. Internal only, never surfaced to end users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenInvalid {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token issuer is not accepted")]
    WrongIssuer,
}

/// Key material for verifying session tokens.
#[derive(Clone)]
pub enum TokenKey {
    /// Shared secret (HS256)
    Secret(Vec<u8>),
    /// PEM-encoded RSA public key (RS256)
    RsaPem(Vec<u8>),
}

impl std::fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKey::Secret(_) => f.write_str("TokenKey::Secret(..)"),
            TokenKey::RsaPem(_) => f.write_str("TokenKey::RsaPem(..)"),
        }
    }
}

/// Pure token decoder. Holds key material only; performs no I/O.
#[derive(Clone)]
pub struct TokenCodec {
    key: DecodingKey,
    algorithm: Algorithm,
    issuer: Option<String>,
}

impl TokenCodec {
    /// Build a codec from key material.
    ///
    /// Fails only when an RSA PEM cannot be parsed.
    pub fn new(key: &TokenKey) -> Result<Self, jsonwebtoken::errors::Error> {
        let (key, algorithm) = match key {
            TokenKey::Secret(secret) => (DecodingKey::from_secret(secret), Algorithm::HS256),
            TokenKey::RsaPem(pem) => (DecodingKey::from_rsa_pem(pem)?, Algorithm::RS256),
        };
        Ok(Self {
            key,
            algorithm,
            issuer: None,
        })
    }

    /// Require the `iss` claim to equal `issuer`.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Decode `token` as of the Unix timestamp `now`.
    pub fn decode(&self, token: &str, now: i64) -> Result<Principal, TokenInvalid> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenInvalid::Malformed);
        }

        let data = decode::<TokenClaims>(token, &self.key, &self.validation()).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenInvalid::BadSignature,
                _ => TokenInvalid::Malformed,
            }
        })?;
        let claims = data.claims;

        if claims.exp <= now {
            return Err(TokenInvalid::Expired);
        }
        if let Some(expected) = &self.issuer {
            if claims.iss.as_deref() != Some(expected.as_str()) {
                return Err(TokenInvalid::WrongIssuer);
            }
        }

        Ok(Principal::from_claims(claims))
    }

    /// Decode against the current wall clock.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenInvalid> {
        self.decode(token, chrono::Utc::now().timestamp())
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        // Expiry and issuer are checked against the caller's clock above.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);
        validation
    }
}
