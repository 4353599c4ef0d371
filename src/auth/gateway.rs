// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth gateway operations, independent of HTTP.
//!
//! The handlers in `api::auth` wrap these with cookie handling. Identity is
//! always derived from the token the backend issued, never from the `user`
//! object that travels next to it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{AuthError, Principal, TokenCodec};
use crate::identity::IdentityBackend;
use crate::models::{SignInRequest, SignUpRequest};

/// Outcome of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: String,
    pub principal: Principal,
    pub profile: Option<serde_json::Value>,
    pub message: Option<String>,
}

/// Outcome of a successful sign-up.
#[derive(Debug, Clone)]
pub struct SignedUp {
    /// Set when the backend issued a usable token with the new account
    pub session: Option<(String, Principal)>,
    pub profile: Option<serde_json::Value>,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct AuthGateway {
    backend: Arc<dyn IdentityBackend>,
    codec: Arc<TokenCodec>,
}

impl AuthGateway {
    pub fn new(backend: Arc<dyn IdentityBackend>, codec: Arc<TokenCodec>) -> Self {
        Self { backend, codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Exchange credentials for a session token.
    ///
    /// No session may be written unless this returns `Ok`.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<SignedIn, AuthError> {
        let response = self.backend.sign_in(request).await?;

        let Some(token) = response.token.filter(|t| !t.trim().is_empty()) else {
            return Err(AuthError::InvalidCredentials(
                response
                    .message
                    .unwrap_or_else(|| "Invalid email or password".to_string()),
            ));
        };

        let principal = self.codec.verify(&token).map_err(|reason| {
            warn!(%reason, "Identity backend issued a token that does not verify");
            AuthError::BackendUnreachable("identity backend issued an unusable token".to_string())
        })?;

        info!(user_id = %principal.id, role = %principal.role, "Sign-in succeeded");

        Ok(SignedIn {
            token,
            principal,
            profile: response.user,
            message: response.message,
        })
    }

    /// Register an account. Backend validation errors pass through untouched.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignedUp, AuthError> {
        let response = self.backend.sign_up(request).await?;

        let session = match response.token.filter(|t| !t.trim().is_empty()) {
            Some(token) => match self.codec.verify(&token) {
                Ok(principal) => {
                    info!(user_id = %principal.id, "Sign-up succeeded with session");
                    Some((token, principal))
                }
                Err(reason) => {
                    warn!(%reason, "Sign-up token does not verify, no session started");
                    None
                }
            },
            None => {
                info!("Sign-up succeeded without session");
                None
            }
        };

        Ok(SignedUp {
            session,
            profile: response.user,
            message: response.message,
        })
    }

    /// Identity behind a session token. Any invalid token is anonymous.
    pub fn who_am_i(&self, token: Option<&str>) -> Option<Principal> {
        let token = token?;
        match self.codec.verify(token) {
            Ok(principal) => Some(principal),
            Err(reason) => {
                debug!(%reason, "Session token rejected");
                None
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{codec, token_for, FakeBackend};
    use super::*;
    use crate::auth::Role;

    fn gateway(backend: FakeBackend) -> AuthGateway {
        AuthGateway::new(Arc::new(backend), Arc::new(codec()))
    }

    fn credentials(email: &str, password: &str) -> SignInRequest {
        SignInRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn sign_in_derives_principal_from_token() {
        let signed_in = gateway(FakeBackend::default())
            .sign_in(&credentials("user@example.com", "user123"))
            .await
            .unwrap();
        assert_eq!(signed_in.principal.id, "1");
        assert_eq!(signed_in.principal.role, Role::User);
        assert_eq!(signed_in.profile.unwrap()["avatar"], "a.png");
    }

    #[tokio::test]
    async fn sign_in_then_who_am_i_round_trips_identity() {
        let gateway = gateway(FakeBackend::default());
        let signed_in = gateway
            .sign_in(&credentials("admin@example.com", "admin123"))
            .await
            .unwrap();
        let principal = gateway.who_am_i(Some(&signed_in.token)).unwrap();
        assert_eq!(principal.id, "2");
        assert_eq!(principal.role, Role::Admin);
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let result = gateway(FakeBackend::default())
            .sign_in(&credentials("user@example.com", "nope"))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn unverifiable_backend_token_fails_closed() {
        let result = gateway(FakeBackend::default())
            .sign_in(&credentials("broken@example.com", "x"))
            .await;
        assert!(matches!(result, Err(AuthError::BackendUnreachable(_))));
    }

    #[tokio::test]
    async fn unreachable_backend_is_surfaced() {
        let backend = FakeBackend {
            unreachable: true,
            ..Default::default()
        };
        let result = gateway(backend)
            .sign_in(&credentials("user@example.com", "user123"))
            .await;
        assert!(matches!(result, Err(AuthError::BackendUnreachable(_))));
    }

    #[tokio::test]
    async fn sign_up_mirrors_validation_errors() {
        let result = gateway(FakeBackend::default())
            .sign_up(&SignUpRequest {
                name: "New".into(),
                email: "new@example.com".into(),
                password: "secret1".into(),
                password_confirmation: Some("secret2".into()),
                phone: None,
            })
            .await;
        match result {
            Err(AuthError::Validation { body, .. }) => {
                assert_eq!(body["message"], "Password confirmation does not match")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn sign_up_with_token_starts_session() {
        let signed_up = gateway(FakeBackend::default())
            .sign_up(&SignUpRequest {
                name: "New".into(),
                email: "new@example.com".into(),
                password: "secret1".into(),
                password_confirmation: Some("secret1".into()),
                phone: Some("555-0100".into()),
            })
            .await
            .unwrap();
        let (_, principal) = signed_up.session.unwrap();
        assert_eq!(principal.id, "3");
    }

    #[test]
    fn who_am_i_rejects_missing_expired_and_garbage_tokens() {
        let gateway = gateway(FakeBackend::default());
        assert!(gateway.who_am_i(None).is_none());
        assert!(gateway.who_am_i(Some("garbage")).is_none());
        assert!(gateway.who_am_i(Some(&token_for("1", "user", -10))).is_none());
        assert!(gateway.who_am_i(Some(&token_for("1", "user", 60))).is_some());
    }
}
