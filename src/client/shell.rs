// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shell guard: the client-side half of route protection.
//!
//! Same [`decide`] as the edge, fed from the [`SessionCache`] instead of the
//! cookie. A `Loading` cache is refreshed under a timeout, and a timeout
//! counts as signed out, so a navigation always settles.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use tracing::debug;

use super::{MemoryIntentStore, SessionCache, SessionState};
use crate::policy::{decide, Decision, IntentEffect, RoutePolicy};

/// How long a navigation waits for a session refresh.
pub const DEFAULT_SHELL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellOutcome {
    Allow,
    Redirect(String),
    /// A newer navigation started while this one was waiting
    Superseded,
}

pub struct ShellGuard {
    cache: Arc<SessionCache>,
    policy: Arc<RoutePolicy>,
    intents: Arc<MemoryIntentStore>,
    timeout: Duration,
    navigation: AtomicU64,
}

impl ShellGuard {
    pub fn new(
        cache: Arc<SessionCache>,
        policy: Arc<RoutePolicy>,
        intents: Arc<MemoryIntentStore>,
    ) -> Self {
        Self {
            cache,
            policy,
            intents,
            timeout: DEFAULT_SHELL_TIMEOUT,
            navigation: AtomicU64::new(0),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn intents(&self) -> &MemoryIntentStore {
        &self.intents
    }

    /// Evaluate an in-app navigation to `target`.
    pub async fn navigate(&self, target: &str) -> ShellOutcome {
        let ticket = self.navigation.fetch_add(1, Ordering::SeqCst) + 1;

        let state = match self.cache.current() {
            SessionState::Loading => self.cache.refresh_within(self.timeout).await,
            settled => settled,
        };

        if self.navigation.load(Ordering::SeqCst) != ticket {
            debug!(path = target, "Navigation superseded");
            return ShellOutcome::Superseded;
        }

        let pending = self.intents.peek();
        match decide(&self.policy, target, state.principal(), pending.as_deref()) {
            Decision::Allow => ShellOutcome::Allow,
            Decision::Redirect(redirect) => {
                debug!(
                    path = target,
                    location = %redirect.location,
                    reason = ?redirect.reason,
                    "Shell redirect"
                );
                match redirect.intent {
                    IntentEffect::Keep => {}
                    IntentEffect::Remember(requested) => self.intents.remember(&requested),
                    IntentEffect::Consume => {
                        self.intents.consume();
                    }
                }
                ShellOutcome::Redirect(redirect.location)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::client::cache::testing::{principal, ScriptedSource};

    fn guard(source: Arc<ScriptedSource>) -> (ShellGuard, Arc<SessionCache>) {
        let cache = Arc::new(SessionCache::new(source));
        let guard = ShellGuard::new(
            cache.clone(),
            Arc::new(RoutePolicy::storefront()),
            Arc::new(MemoryIntentStore::new()),
        );
        (guard, cache)
    }

    #[tokio::test]
    async fn loading_cache_is_refreshed_before_deciding() {
        let source = Arc::new(ScriptedSource::default());
        source.answer(Ok(Some(principal("1", Role::User))));
        let (guard, cache) = guard(source.clone());

        assert_eq!(guard.navigate("/cart").await, ShellOutcome::Allow);
        assert_eq!(source.calls(), 1);
        assert!(cache.current().principal().is_some());

        // Settled cache: no further queries.
        assert_eq!(guard.navigate("/account").await, ShellOutcome::Allow);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn anonymous_navigation_remembers_intent() {
        let source = Arc::new(ScriptedSource::default());
        source.answer(Ok(None));
        let (guard, _) = guard(source);

        assert_eq!(
            guard.navigate("/orders/12?tab=items").await,
            ShellOutcome::Redirect("/login".into())
        );
        assert_eq!(guard.intents().peek().as_deref(), Some("/orders/12?tab=items"));
    }

    #[tokio::test]
    async fn user_on_admin_page_goes_to_unauthorized() {
        let source = Arc::new(ScriptedSource::default());
        source.answer(Ok(Some(principal("1", Role::User))));
        let (guard, _) = guard(source);

        assert_eq!(
            guard.navigate("/admin").await,
            ShellOutcome::Redirect("/unauthorized".into())
        );
    }

    #[tokio::test]
    async fn signed_in_visitor_on_login_follows_and_clears_intent() {
        let source = Arc::new(ScriptedSource::default());
        source.answer(Ok(Some(principal("1", Role::User))));
        let (guard, _) = guard(source);
        guard.intents().remember("/checkout");

        assert_eq!(
            guard.navigate("/login").await,
            ShellOutcome::Redirect("/checkout".into())
        );
        assert_eq!(guard.intents().peek(), None);
        assert_eq!(guard.navigate("/checkout").await, ShellOutcome::Allow);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_timeout_counts_as_signed_out() {
        let source = Arc::new(ScriptedSource::default());
        let _never = source.gated(Ok(Some(principal("1", Role::User))));
        let (guard, cache) = guard(source);
        let guard = guard.with_timeout(Duration::from_secs(5));

        assert_eq!(
            guard.navigate("/cart").await,
            ShellOutcome::Redirect("/login".into())
        );
        assert!(!cache.current().is_loading());
        assert_eq!(cache.current(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn older_navigation_is_superseded() {
        let source = Arc::new(ScriptedSource::default());
        let release = source.gated(Ok(Some(principal("1", Role::User))));
        source.answer(Ok(Some(principal("1", Role::User))));
        let (guard, _) = guard(source.clone());
        let guard = Arc::new(guard);

        let first = tokio::spawn({
            let guard = guard.clone();
            async move { guard.navigate("/cart").await }
        });
        source.started(1).await;

        assert_eq!(guard.navigate("/account").await, ShellOutcome::Allow);
        release.send(()).unwrap();
        assert_eq!(first.await.unwrap(), ShellOutcome::Superseded);
    }
}
