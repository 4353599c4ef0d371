// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory "current user" cache for the client shell.
//!
//! Refreshes are numbered. A refresh only lands in the cache if no newer
//! refresh or invalidation was issued while it was in flight, so a slow
//! who-am-I answer from before a sign-in can never overwrite the state after
//! it.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::ClientError;
use crate::auth::Principal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No answer yet (initial load, or just invalidated)
    Loading,
    Authenticated(Principal),
    Unauthenticated,
}

impl SessionState {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            SessionState::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}

/// Where the cache gets its answers from.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// `Ok(None)` when the gateway reports no session.
    async fn who_am_i(&self) -> Result<Option<Principal>, ClientError>;
}

pub struct SessionCache {
    source: Arc<dyn SessionSource>,
    generation: AtomicU64,
    state: watch::Sender<SessionState>,
}

impl SessionCache {
    pub fn new(source: Arc<dyn SessionSource>) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            source,
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Cached state, without querying the gateway.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Change notifications for UI gating.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Drop the cached answer. In-flight refreshes will be discarded.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(SessionState::Loading);
    }

    /// Ask the gateway who is signed in.
    ///
    /// Returns this refresh's own answer. A failed query counts as
    /// `Unauthenticated`.
    pub async fn refresh(&self) -> SessionState {
        let generation = self.next_generation();
        let fetched = self.fetch().await;
        self.store(generation, fetched)
    }

    /// Like [`refresh`](Self::refresh), but an answer that takes longer than
    /// `limit` counts as `Unauthenticated` and is stored as such.
    pub async fn refresh_within(&self, limit: Duration) -> SessionState {
        let generation = self.next_generation();
        let fetched = match tokio::time::timeout(limit, self.fetch()).await {
            Ok(fetched) => fetched,
            Err(_) => {
                warn!(?limit, "Session refresh timed out, treating visitor as signed out");
                SessionState::Unauthenticated
            }
        };
        self.store(generation, fetched)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn fetch(&self) -> SessionState {
        match self.source.who_am_i().await {
            Ok(Some(principal)) => SessionState::Authenticated(principal),
            Ok(None) => SessionState::Unauthenticated,
            Err(err) => {
                warn!(error = %err, "Session refresh failed, treating visitor as signed out");
                SessionState::Unauthenticated
            }
        }
    }

    /// Publish `fetched` unless a newer refresh or invalidation was issued.
    fn store(&self, generation: u64, fetched: SessionState) -> SessionState {
        let mut stale = false;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                stale = true;
                return false;
            }
            if *state == fetched {
                return false;
            }
            *state = fetched.clone();
            true
        });
        if stale {
            debug!(generation, "Discarding stale session refresh");
        }

        fetched
    }
}
