// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{AuthGateway, IntentStore, SessionStore, TokenCodec};
use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::identity::{HttpIdentityBackend, IdentityBackend};
use crate::policy::{RoutePolicy, Tier};

/// Shared, read-only request state.
///
/// Nothing in here changes after startup; per-request identity travels in
/// request extensions, never in this struct.
#[derive(Clone)]
pub struct AppState {
    pub gateway: AuthGateway,
    pub policy: Arc<RoutePolicy>,
    pub sessions: SessionStore,
    pub intents: IntentStore,
}

impl AppState {
    pub fn new(
        gateway: AuthGateway,
        policy: RoutePolicy,
        sessions: SessionStore,
        intents: IntentStore,
    ) -> Self {
        Self {
            gateway,
            policy: Arc::new(policy),
            sessions,
            intents,
        }
    }

    /// Wire the production collaborators described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let mut codec = TokenCodec::new(&config.token_key)?;
        if let Some(issuer) = &config.token_issuer {
            codec = codec.with_issuer(issuer.clone());
        }

        let backend: Arc<dyn IdentityBackend> = Arc::new(
            HttpIdentityBackend::new(
                &config.identity_url,
                &config.identity_sign_in_path,
                &config.identity_sign_up_path,
                config.identity_timeout,
            )
            .map_err(|e| ConfigError::Backend(e.to_string()))?,
        );

        let policy = match &config.route_policy_path {
            Some(path) => {
                info!(path = %path.display(), "Loading route policy");
                RoutePolicy::load(path)?
            }
            None => RoutePolicy::storefront(),
        };
        if policy.fallback() == Tier::Public {
            warn!("Route policy allows unmatched paths publicly; set \"fallback\" to close it");
        }
        info!(
            rules = policy.rules().len(),
            fallback = %policy.fallback(),
            "Route policy ready"
        );

        Ok(Self::new(
            AuthGateway::new(backend, Arc::new(codec)),
            policy,
            SessionStore::new(config.secure_cookies(), config.session_max_age_secs),
            IntentStore::new(config.secure_cookies()),
        ))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(move |name| {
            vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn from_config_uses_storefront_table_by_default() {
        let state = AppState::from_config(&config(&[
            ("IDENTITY_BACKEND_URL", "https://identity.example.com"),
            ("TOKEN_SECRET", "s3cret"),
        ]))
        .unwrap();
        assert_eq!(state.policy.sign_in(), "/login");
        assert_eq!(state.sessions.max_age_secs(), 604_800);
    }

    #[test]
    fn from_config_surfaces_policy_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(&path, r#"{ "rules": [ { "pattern": "nope", "tier": "public" } ] }"#).unwrap();

        let result = AppState::from_config(&config(&[
            ("IDENTITY_BACKEND_URL", "https://identity.example.com"),
            ("TOKEN_SECRET", "s3cret"),
            ("ROUTE_POLICY_PATH", path.to_str().unwrap()),
        ]));
        assert!(matches!(result, Err(ConfigError::Policy(_))));
    }
}
