// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Client Side
//!
//! What a Rust front-end (or any programmatic caller) needs to stay in step
//! with the gateway:
//!
//! - [`SessionCache`]: "who is signed in", refreshed from `GET /api/auth/me`
//!   and never read from the cookie itself
//! - [`ClientSession`]: gateway calls that re-populate the cache afterwards
//! - [`MemoryIntentStore`]: redirect-after-login intent for the shell
//! - [`ShellGuard`]: in-app navigation checks using the same decision as the
//!   edge guard

pub mod cache;
pub mod error;
pub mod gateway_client;
pub mod intent;
pub mod shell;

pub use cache::{SessionCache, SessionSource, SessionState};
pub use error::ClientError;
pub use gateway_client::{ClientSession, GatewayClient, DEFAULT_REQUEST_TIMEOUT};
pub use intent::MemoryIntentStore;
pub use shell::{ShellGuard, ShellOutcome, DEFAULT_SHELL_TIMEOUT};
