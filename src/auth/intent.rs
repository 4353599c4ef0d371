// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Redirect-after-login intent, kept in the `redirect_after_login` cookie.
//!
//! Last write wins, reads clear the value, and expiry is left to the cookie's
//! own max-age.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Name of the redirect-intent cookie.
pub const INTENT_COOKIE: &str = "redirect_after_login";

/// Intent lifetime (5 minutes).
pub const INTENT_MAX_AGE_SECS: i64 = 300;

/// Returns `target` if it is a local absolute path safe to redirect to.
///
/// Protocol-relative (`//host`) and backslash forms are refused so a stored
/// intent can never send a visitor off-site.
pub fn local_target(target: &str) -> Option<&str> {
    let target = target.trim();
    let mut chars = target.chars();
    match (chars.next(), chars.next()) {
        (Some('/'), None) => Some(target),
        (Some('/'), Some(second)) if second != '/' && second != '\\' => {
            if target.chars().any(|c| c.is_control()) {
                None
            } else {
                Some(target)
            }
        }
        _ => None,
    }
}

/// Cookie-backed redirect intent.
#[derive(Debug, Clone)]
pub struct IntentStore {
    secure: bool,
}

impl IntentStore {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Remember `target`, replacing any earlier intent.
    ///
    /// Non-local targets are ignored.
    pub fn remember(&self, jar: CookieJar, target: &str) -> CookieJar {
        let Some(target) = local_target(target) else {
            return jar;
        };
        let cookie = Cookie::build((INTENT_COOKIE, target.to_string()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .max_age(time::Duration::seconds(INTENT_MAX_AGE_SECS));
        jar.add(cookie)
    }

    /// Pending intent without consuming it.
    pub fn peek(&self, jar: &CookieJar) -> Option<String> {
        jar.get(INTENT_COOKIE)
            .and_then(|cookie| local_target(cookie.value()).map(str::to_string))
    }

    /// Read and clear the intent.
    pub fn consume(&self, jar: CookieJar) -> (CookieJar, Option<String>) {
        let target = self.peek(&jar);
        let jar = jar.remove(Cookie::build(INTENT_COOKIE).path("/"));
        (jar, target)
    }
}

impl Default for IntentStore {
    fn default() -> Self {
        Self::new(true)
    }
}
