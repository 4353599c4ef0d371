// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Edge guard middleware for page routes.
//!
//! Runs before any page handler: decodes the session cookie, asks [`decide`]
//! what to do, and either forwards the request with a [`RequestContext`] or
//! answers with a `303 See Other`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect as SeeOther, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::decision::{decide, Decision, IntentEffect};
use crate::auth::RequestContext;
use crate::state::AppState;

pub async fn edge_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = state.sessions.get(&jar);
    let principal = state.gateway.who_am_i(token.as_deref());

    // A cookie that no longer decodes is dropped so the browser stops sending it.
    let jar = if token.is_some() && principal.is_none() {
        state.sessions.clear(jar)
    } else {
        jar
    };

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let pending = state.intents.peek(&jar);

    match decide(&state.policy, &target, principal.as_ref(), pending.as_deref()) {
        Decision::Allow => {
            request.extensions_mut().insert(RequestContext { principal });
            (jar, next.run(request).await).into_response()
        }
        Decision::Redirect(redirect) => {
            debug!(
                path = %target,
                location = %redirect.location,
                reason = ?redirect.reason,
                "Edge redirect"
            );
            let jar = match redirect.intent {
                IntentEffect::Keep => jar,
                IntentEffect::Remember(requested) => state.intents.remember(jar, &requested),
                IntentEffect::Consume => state.intents.consume(jar).0,
            };
            (jar, SeeOther::to(&redirect.location)).into_response()
        }
    }
}
