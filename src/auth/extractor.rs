// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the current principal.
//!
//! The identity always comes from the `auth_token` cookie of the incoming
//! request. Headers or bodies claiming an identity are ignored.
//!
//! ```rust,ignore
//! async fn page(CurrentPrincipal(principal): CurrentPrincipal) -> impl IntoResponse {
//!     // principal is Option<Principal>
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use super::Principal;
use crate::state::AppState;

/// Per-request identity context, inserted by the edge guard.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub principal: Option<Principal>,
}

/// Optional principal: `None` when there is no valid session.
pub struct CurrentPrincipal(pub Option<Principal>);

impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // The edge guard already decoded the cookie for this request.
        if let Some(context) = parts.extensions.get::<RequestContext>() {
            return Ok(CurrentPrincipal(context.principal.clone()));
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let token = state.sessions.get(&jar);
        Ok(CurrentPrincipal(state.gateway.who_am_i(token.as_deref())))
    }
}
