// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Page fallback. Only reached once the edge guard has allowed the request.

use axum::{extract::State, http::Uri, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{CurrentPrincipal, Principal},
    policy::normalize_path,
    state::AppState,
};

/// What the page shell renders with.
#[derive(Debug, Serialize, ToSchema)]
pub struct PageContext {
    pub path: String,
    /// Access tier the path was classified into
    pub tier: String,
    pub principal: Option<Principal>,
}

pub async fn page(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    uri: Uri,
) -> Json<PageContext> {
    let path = normalize_path(uri.path());
    Json(PageContext {
        tier: state.policy.classify(&path).to_string(),
        path,
        principal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::state;

    #[tokio::test]
    async fn renders_classification_for_anonymous_visitor() {
        let Json(context) = page(
            State(state()),
            CurrentPrincipal(None),
            Uri::from_static("/products//42/?ref=home"),
        )
        .await;
        assert_eq!(context.path, "/products/42");
        assert_eq!(context.tier, "public");
        assert!(context.principal.is_none());
    }
}
