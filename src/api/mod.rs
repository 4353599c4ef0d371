// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{Principal, Role},
    models::{
        LogoutResponse, SessionResponse, SignInRequest, SignInResponse, SignUpRequest,
        SignUpResponse,
    },
    policy::edge_guard,
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod pages;

/// Build the gateway router.
///
/// `/api`, `/health` and `/docs` are answered directly; every other path is
/// a page and passes through the edge guard first.
pub fn router(state: AppState, development: bool) -> Router {
    let auth_routes = Router::new()
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-up", post(auth::sign_up))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .fallback(api_not_found);

    let pages = Router::new()
        .fallback(pages::page)
        .layer(from_fn_with_state(state.clone(), edge_guard));

    let app = Router::new()
        .nest("/api", api_routes)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(pages)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));

    let app = if development {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id()),
    )
}

async fn api_not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found", "error_code": "not_found" })),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::sign_in,
        auth::sign_up,
        auth::me,
        auth::logout,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            SignInRequest,
            SignUpRequest,
            SignInResponse,
            SignUpResponse,
            SessionResponse,
            LogoutResponse,
            Principal,
            Role,
            health::HealthResponse,
            health::ReadyResponse,
            health::ReadyChecks
        )
    ),
    tags(
        (name = "Auth", description = "Sign-in, sign-up, session and logout"),
        (name = "Health", description = "Liveness and readiness checks")
    )
)]
struct ApiDoc;
