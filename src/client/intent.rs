// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Redirect-after-login intent for the client shell.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::auth::intent::{local_target, INTENT_MAX_AGE_SECS};

/// Single-slot intent store. Last write wins; reading through
/// [`consume`](Self::consume) clears it; entries older than the max-age read
/// as absent.
#[derive(Debug)]
pub struct MemoryIntentStore {
    slot: Mutex<Option<(String, Instant)>>,
    max_age: Duration,
}

impl MemoryIntentStore {
    pub fn new() -> Self {
        Self::with_max_age(Duration::from_secs(INTENT_MAX_AGE_SECS as u64))
    }

    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            max_age,
        }
    }

    /// Remember `target`. Non-local targets are ignored.
    pub fn remember(&self, target: &str) {
        if let Some(target) = local_target(target) {
            *self.lock() = Some((target.to_string(), Instant::now()));
        }
    }

    pub fn peek(&self) -> Option<String> {
        let slot = self.lock();
        slot.as_ref()
            .filter(|(_, at)| at.elapsed() < self.max_age)
            .map(|(target, _)| target.clone())
    }

    /// Read and clear in one step.
    pub fn consume(&self) -> Option<String> {
        self.lock()
            .take()
            .filter(|(_, at)| at.elapsed() < self.max_age)
            .map(|(target, _)| target)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<(String, Instant)>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryIntentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn consume_returns_value_once() {
        let store = MemoryIntentStore::new();
        store.remember("/checkout");
        assert_eq!(store.consume().as_deref(), Some("/checkout"));
        assert_eq!(store.consume(), None);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = MemoryIntentStore::new();
        store.remember("/cart");
        store.remember("/orders/5");
        assert_eq!(store.peek().as_deref(), Some("/orders/5"));
        assert_eq!(store.consume().as_deref(), Some("/orders/5"));
    }

    #[tokio::test]
    async fn foreign_targets_are_ignored() {
        let store = MemoryIntentStore::new();
        store.remember("/cart");
        store.remember("https://evil.example/phish");
        store.remember("//evil.example");
        assert_eq!(store.consume().as_deref(), Some("/cart"));
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_max_age() {
        let store = MemoryIntentStore::new();
        store.remember("/cart");

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(store.peek().as_deref(), Some("/cart"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.peek(), None);
        assert_eq!(store.consume(), None);
    }
}
