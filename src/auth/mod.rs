// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session handling for the storefront gateway.
//!
//! ## Auth Flow
//!
//! 1. Browser posts credentials to `/api/auth/sign-in`
//! 2. Gateway forwards them to the identity backend
//! 3. Backend answers with a signed token, which the gateway:
//!    - Verifies with the configured key (HS256 secret or RS256 public key)
//!    - Stores in the `auth_token` cookie (HttpOnly, SameSite=Strict)
//! 4. Every later request is identified from that cookie alone
//!
//! ## Security
//!
//! - The token is never exposed to client-side code
//! - Expired, tampered or foreign-issuer tokens are treated as no session
//! - Post-login redirects only ever target local paths

pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod gateway;
pub mod intent;
pub mod roles;
pub mod session;

pub use claims::{Principal, TokenClaims};
pub use codec::{TokenCodec, TokenInvalid, TokenKey};
pub use error::AuthError;
pub use extractor::{CurrentPrincipal, RequestContext};
pub use gateway::{AuthGateway, SignedIn, SignedUp};
pub use intent::IntentStore;
pub use roles::Role;
pub use session::SessionStore;
