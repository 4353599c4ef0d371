// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The access decision shared by the edge middleware and the shell guard.
//!
//! ## Flow
//!
//! 1. Classify the path
//! 2. Guest-only + signed in → landing page (or the pending intent, if that
//!    target is not guest-only), consuming the intent
//! 3. Authenticated / role-restricted + anonymous → sign-in page, remembering
//!    the requested path
//! 4. Role-restricted + wrong role → unauthorized page
//! 5. Otherwise allow
//!
//! A redirect never points at the path being requested.

use super::pattern::normalize_path;
use super::table::{RoutePolicy, Tier};
use crate::auth::{intent::local_target, Principal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// Anonymous visitor on a protected path
    SignInRequired,
    /// Signed-in visitor on a guest-only path
    AlreadyAuthenticated,
    /// Signed in, but without the required role
    Unauthorized,
}

/// What to do with the redirect intent alongside a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentEffect {
    Keep,
    Remember(String),
    Consume,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub reason: RedirectReason,
    pub intent: IntentEffect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(Redirect),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::Redirect(redirect) => Some(&redirect.location),
        }
    }
}

/// Decide what happens to a navigation to `target` (path plus optional query).
pub fn decide(
    policy: &RoutePolicy,
    target: &str,
    principal: Option<&Principal>,
    pending_intent: Option<&str>,
) -> Decision {
    let path = normalize_path(target);
    let redirect = |location: &str, reason: RedirectReason, intent: IntentEffect| {
        Decision::Redirect(Redirect {
            location: location.to_string(),
            reason,
            intent,
        })
    };

    match (policy.classify(&path), principal) {
        (Tier::Public, _) | (Tier::GuestOnly, None) => Decision::Allow,

        (Tier::GuestOnly, Some(_)) => {
            let location = destination_after_sign_in(policy, pending_intent);
            let intent = if pending_intent.is_some() {
                IntentEffect::Consume
            } else {
                IntentEffect::Keep
            };
            redirect(location, RedirectReason::AlreadyAuthenticated, intent)
        }

        (Tier::Authenticated | Tier::RoleRestricted(_), None) => {
            let intent = match remembered(target) {
                Some(requested) => IntentEffect::Remember(requested),
                None => IntentEffect::Keep,
            };
            redirect(policy.sign_in(), RedirectReason::SignInRequired, intent)
        }

        (Tier::RoleRestricted(required), Some(principal)) if principal.role != required => redirect(
            policy.unauthorized(),
            RedirectReason::Unauthorized,
            IntentEffect::Keep,
        ),

        (Tier::Authenticated | Tier::RoleRestricted(_), Some(_)) => Decision::Allow,
    }
}

/// Where a freshly signed-in visitor goes: the pending intent when it is a
/// local, non-guest-only target, otherwise the landing page.
pub fn destination_after_sign_in<'a>(
    policy: &'a RoutePolicy,
    pending_intent: Option<&'a str>,
) -> &'a str {
    pending_intent
        .and_then(local_target)
        .filter(|intent| policy.classify(intent) != Tier::GuestOnly)
        .unwrap_or(policy.landing())
}

/// The requested path with its query, minus any fragment.
fn remembered(target: &str) -> Option<String> {
    let without_fragment = target.split('#').next().unwrap_or_default();
    local_target(without_fragment).map(str::to_string)
}
