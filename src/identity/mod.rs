// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Backend
//!
//! The external REST service that checks credentials and issues signed
//! tokens. The gateway only talks to it through [`IdentityBackend`], so tests
//! can swap in an in-process fake.
//!
//! ## Contract
//!
//! - Success (2xx): `{ token, user, message? }`
//! - Failure (4xx): `{ message }`, relayed as invalid credentials (sign-in)
//!   or verbatim validation errors (sign-up)
//! - Anything else (5xx, transport errors, unparsable bodies): backend
//!   unreachable, which callers treat as an authentication failure

pub mod http;

use async_trait::async_trait;

use crate::auth::AuthError;
use crate::models::{BackendAuthResponse, SignInRequest, SignUpRequest};

pub use http::HttpIdentityBackend;

#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Exchange credentials for a token.
    async fn sign_in(&self, request: &SignInRequest) -> Result<BackendAuthResponse, AuthError>;

    /// Register a new account.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<BackendAuthResponse, AuthError>;
}
