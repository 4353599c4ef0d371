// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session cookie storage.
//!
//! The session token lives only in the `auth_token` cookie:
//!
//! - `HttpOnly` so page scripts can never read it
//! - `SameSite=Strict`
//! - `Secure` everywhere except local development
//! - `Path=/`
//!
//! Operations take the request's [`CookieJar`] and hand back the jar that
//! must be returned with the response, so the write travels with the reply.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "auth_token";

/// Default session lifetime (7 days).
pub const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Sole reader and writer of the session cookie.
#[derive(Debug, Clone)]
pub struct SessionStore {
    secure: bool,
    max_age: time::Duration,
}

impl SessionStore {
    pub fn new(secure: bool, max_age_secs: i64) -> Self {
        Self {
            secure,
            max_age: time::Duration::seconds(max_age_secs),
        }
    }

    pub fn max_age_secs(&self) -> i64 {
        self.max_age.whole_seconds()
    }

    /// Current session token, if any. An empty value counts as absent.
    pub fn get(&self, jar: &CookieJar) -> Option<String> {
        jar.get(SESSION_COOKIE)
            .map(|cookie| cookie.value().trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Replace the session wholesale with `token`.
    pub fn set(&self, jar: CookieJar, token: &str) -> CookieJar {
        let cookie = Cookie::build((SESSION_COOKIE, token.to_string()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure)
            .path("/")
            .max_age(self.max_age);
        jar.add(cookie)
    }

    /// Drop the session. Clearing an absent session is a no-op.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(true, DEFAULT_SESSION_MAX_AGE_SECS)
    }
}
