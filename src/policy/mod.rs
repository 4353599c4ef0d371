// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Route Access Policy
//!
//! Every page path falls into one access tier:
//!
//! | Tier | Who may view |
//! |------|--------------|
//! | `public` | Anyone |
//! | `guest-only` | Visitors without a session |
//! | `authenticated` | Any signed-in visitor |
//! | `role-restricted` | Signed-in visitors with the named role |
//!
//! The same [`decide`] function runs at the edge (before a page is served)
//! and in the client shell (on in-app navigation), so both agree on every
//! redirect.

pub mod decision;
pub mod edge;
pub mod pattern;
pub mod table;

pub use decision::{
    decide, destination_after_sign_in, Decision, IntentEffect, Redirect, RedirectReason,
};
pub use edge::edge_guard;
pub use pattern::{normalize_path, RoutePattern};
pub use table::{PolicyConfig, PolicyError, RoutePolicy, RouteRule, RuleConfig, Tier, TierKind};
