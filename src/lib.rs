// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Storefront Gate - cookie session gateway and route guard
//!
//! This crate keeps one answer to "who is this visitor, and may they see this
//! page" consistent between the server (edge guard, auth API) and the client
//! shell (session cache, shell guard).
//!
//! ## Modules
//!
//! - `api` - HTTP handlers and router (Axum)
//! - `auth` - Token codec, session and intent cookies, auth gateway
//! - `client` - Session cache, gateway client and shell guard
//! - `identity` - Identity backend adapter
//! - `policy` - Route classification and access decisions

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod policy;
pub mod state;
