// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `/api/auth` handlers: the only code that writes the session cookie.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use crate::{
    auth::{AuthError, CurrentPrincipal},
    models::{
        LogoutResponse, SessionResponse, SignInRequest, SignInResponse, SignUpRequest,
        SignUpResponse,
    },
    policy::destination_after_sign_in,
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    request_body = SignInRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Signed in; session cookie set", body = SignInResponse),
        (status = 401, description = "Credentials rejected"),
        (status = 502, description = "Identity backend unavailable")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<SignInRequest>,
) -> Result<(CookieJar, Json<SignInResponse>), AuthError> {
    let signed_in = state.gateway.sign_in(&request).await?;

    let (jar, intent) = state.intents.consume(jar);
    let redirect_to = destination_after_sign_in(&state.policy, intent.as_deref()).to_string();
    let jar = state.sessions.set(jar, &signed_in.token);

    Ok((
        jar,
        Json(SignInResponse {
            authenticated: true,
            user: signed_in.principal,
            profile: signed_in.profile,
            message: signed_in.message,
            redirect_to,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/sign-up",
    request_body = SignUpRequest,
    tag = "Auth",
    responses(
        (status = 201, description = "Account created", body = SignUpResponse),
        (status = 422, description = "Validation errors from the identity backend, verbatim"),
        (status = 502, description = "Identity backend unavailable")
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, CookieJar, Json<SignUpResponse>), AuthError> {
    let signed_up = state.gateway.sign_up(&request).await?;

    let (jar, user, redirect_to) = match signed_up.session {
        Some((token, principal)) => {
            let (jar, intent) = state.intents.consume(jar);
            let redirect_to = destination_after_sign_in(&state.policy, intent.as_deref());
            let redirect_to = redirect_to.to_string();
            (state.sessions.set(jar, &token), Some(principal), Some(redirect_to))
        }
        None => (jar, None, Some(state.policy.sign_in().to_string())),
    };

    Ok((
        StatusCode::CREATED,
        jar,
        Json(SignUpResponse {
            success: true,
            message: signed_up.message,
            user,
            profile: signed_up.profile,
            redirect_to,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "No valid session", body = SessionResponse)
    )
)]
pub async fn me(
    CurrentPrincipal(principal): CurrentPrincipal,
) -> (StatusCode, Json<SessionResponse>) {
    match principal {
        Some(principal) => (StatusCode::OK, Json(SessionResponse::authenticated(principal))),
        None => (StatusCode::UNAUTHORIZED, Json(SessionResponse::anonymous())),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Session cleared", body = LogoutResponse))
)]
pub async fn logout(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    if let Some(principal) = principal {
        info!(user_id = %principal.id, "Signed out");
    }
    (state.sessions.clear(jar), Json(LogoutResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::gateway::testing::{token_for, FakeBackend};
    use crate::auth::Role;
    use crate::state::testing::{state, state_with};
    use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

    fn jar(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        CookieJar::from_headers(&headers)
    }

    fn credentials(email: &str, password: &str) -> Json<SignInRequest> {
        Json(SignInRequest {
            email: email.into(),
            password: password.into(),
        })
    }

    #[tokio::test]
    async fn sign_in_sets_session_and_returns_principal() {
        let state = state();
        let (jar, Json(body)) = sign_in(
            State(state.clone()),
            CookieJar::new(),
            credentials("admin@example.com", "admin123"),
        )
        .await
        .expect("sign-in succeeds");

        assert!(body.authenticated);
        assert_eq!(body.user.id, "2");
        assert_eq!(body.user.role, Role::Admin);
        assert_eq!(body.redirect_to, "/");
        assert_eq!(body.profile.unwrap()["avatar"], "a.png");

        let token = state.sessions.get(&jar).expect("session cookie set");
        assert_eq!(state.gateway.who_am_i(Some(&token)).unwrap().id, "2");
    }

    #[tokio::test]
    async fn sign_in_follows_and_consumes_intent() {
        let (jar, Json(body)) = sign_in(
            State(state()),
            jar("redirect_after_login=/checkout?step=2"),
            credentials("user@example.com", "user123"),
        )
        .await
        .unwrap();

        assert_eq!(body.redirect_to, "/checkout?step=2");
        assert!(jar.get("redirect_after_login").is_none());
    }

    #[tokio::test]
    async fn sign_in_ignores_guest_only_intent() {
        let (_, Json(body)) = sign_in(
            State(state()),
            jar("redirect_after_login=/register"),
            credentials("user@example.com", "user123"),
        )
        .await
        .unwrap();
        assert_eq!(body.redirect_to, "/");
    }

    #[tokio::test]
    async fn wrong_password_leaves_existing_session_untouched() {
        let state = state();
        let existing = token_for("1", "user", 600);
        let result = sign_in(
            State(state),
            jar(&format!("auth_token={existing}")),
            credentials("user@example.com", "wrong"),
        )
        .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn unusable_backend_token_is_bad_gateway() {
        let result = sign_in(
            State(state()),
            CookieJar::new(),
            credentials("broken@example.com", "anything"),
        )
        .await;
        let err = result.err().unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn unreachable_backend_is_bad_gateway() {
        let state = state_with(FakeBackend {
            unreachable: true,
            ..Default::default()
        });
        let result = sign_in(
            State(state),
            CookieJar::new(),
            credentials("user@example.com", "user123"),
        )
        .await;
        assert!(matches!(result, Err(AuthError::BackendUnreachable(_))));
    }

    #[tokio::test]
    async fn sign_up_returns_created_with_session() {
        let state = state();
        let request = SignUpRequest {
            name: "New".into(),
            email: "new@example.com".into(),
            password: "secret".into(),
            password_confirmation: Some("secret".into()),
            phone: None,
        };
        let (status, jar, Json(body)) =
            sign_up(State(state.clone()), CookieJar::new(), Json(request))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(body.success);
        assert_eq!(body.user.unwrap().id, "3");
        assert!(state.sessions.get(&jar).is_some());
    }

    #[tokio::test]
    async fn sign_up_validation_error_is_relayed() {
        let request = SignUpRequest {
            name: "New".into(),
            email: "new@example.com".into(),
            password: "secret".into(),
            password_confirmation: Some("different".into()),
            phone: Some("+44 20 7946 0000".into()),
        };
        let err = sign_up(State(state()), CookieJar::new(), Json(request))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn me_reports_session_state() {
        let (status, Json(body)) = me(CurrentPrincipal(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, SessionResponse::anonymous());
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let state = state();
        let token = token_for("1", "user", 600);
        let (jar, Json(body)) = logout(
            State(state.clone()),
            CurrentPrincipal(None),
            jar(&format!("auth_token={token}")),
        )
        .await;
        assert!(body.success);
        assert!(state.sessions.get(&jar).is_none());

        let (jar, Json(body)) = logout(State(state.clone()), CurrentPrincipal(None), jar).await;
        assert!(body.success);
        assert!(state.sessions.get(&jar).is_none());
    }
}
