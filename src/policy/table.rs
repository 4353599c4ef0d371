// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route classification table.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::pattern::{normalize_path, RoutePattern, Specificity};
use crate::auth::{intent::local_target, Role};

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid route pattern {0:?} (patterns start with '/' and may only end in '/*')")]
    InvalidPattern(String),

    #[error("route {0:?} is role-restricted but names no role")]
    MissingRole(String),

    #[error("route {0:?} names a role but is not role-restricted")]
    UnexpectedRole(String),

    #[error("{0}")]
    Misconfigured(String),

    #[error("failed to read route policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse route policy file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Access tier of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Anyone
    Public,
    /// Only visitors without a session (sign-in, registration)
    GuestOnly,
    /// Any signed-in visitor
    Authenticated,
    /// Signed-in visitors holding exactly this role
    RoleRestricted(Role),
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Public => f.write_str("public"),
            Tier::GuestOnly => f.write_str("guest-only"),
            Tier::Authenticated => f.write_str("authenticated"),
            Tier::RoleRestricted(role) => write!(f, "role-restricted({role})"),
        }
    }
}

/// Tier names as written in the policy file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TierKind {
    Public,
    GuestOnly,
    Authenticated,
    RoleRestricted,
}

impl TierKind {
    fn with_role(self, role: Option<Role>, context: &str) -> Result<Tier, PolicyError> {
        match (self, role) {
            (TierKind::RoleRestricted, Some(role)) => Ok(Tier::RoleRestricted(role)),
            (TierKind::RoleRestricted, None) => Err(PolicyError::MissingRole(context.to_string())),
            (_, Some(_)) => Err(PolicyError::UnexpectedRole(context.to_string())),
            (TierKind::Public, None) => Ok(Tier::Public),
            (TierKind::GuestOnly, None) => Ok(Tier::GuestOnly),
            (TierKind::Authenticated, None) => Ok(Tier::Authenticated),
        }
    }
}

/// One `{pattern, tier, role?}` entry of the policy file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub pattern: String,
    pub tier: TierKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// On-disk form of the route policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_sign_in")]
    pub sign_in: String,
    #[serde(default = "default_landing")]
    pub landing: String,
    #[serde(default = "default_unauthorized")]
    pub unauthorized: String,
    /// Tier of paths no rule matches
    #[serde(default = "default_fallback")]
    pub fallback: TierKind,
    #[serde(default)]
    pub fallback_role: Option<Role>,
    pub rules: Vec<RuleConfig>,
}

fn default_sign_in() -> String {
    "/login".to_string()
}

fn default_landing() -> String {
    "/".to_string()
}

fn default_unauthorized() -> String {
    "/unauthorized".to_string()
}

fn default_fallback() -> TierKind {
    TierKind::Public
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub pattern: RoutePattern,
    pub tier: Tier,
}

/// Ordered route rules plus the pages the guard redirects to.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
    fallback: Tier,
    sign_in: String,
    landing: String,
    unauthorized: String,
}

impl RoutePolicy {
    /// Build and validate a policy.
    pub fn from_config(config: PolicyConfig) -> Result<Self, PolicyError> {
        let rules = config
            .rules
            .iter()
            .map(|rule| {
                Ok(RouteRule {
                    pattern: RoutePattern::parse(&rule.pattern)?,
                    tier: rule.tier.with_role(rule.role, &rule.pattern)?,
                })
            })
            .collect::<Result<Vec<_>, PolicyError>>()?;

        let policy = Self {
            rules,
            fallback: config.fallback.with_role(config.fallback_role, "fallback")?,
            sign_in: page(&config.sign_in, "sign_in")?,
            landing: page(&config.landing, "landing")?,
            unauthorized: page(&config.unauthorized, "unauthorized")?,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        Self::from_config(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Built-in storefront table.
    pub fn storefront() -> Self {
        let rule = |pattern: &str, tier: TierKind, role: Option<Role>| RuleConfig {
            pattern: pattern.to_string(),
            tier,
            role,
        };
        let config = PolicyConfig {
            sign_in: default_sign_in(),
            landing: default_landing(),
            unauthorized: default_unauthorized(),
            fallback: TierKind::Public,
            fallback_role: None,
            rules: vec![
                rule("/", TierKind::Public, None),
                rule("/products/*", TierKind::Public, None),
                rule("/unauthorized", TierKind::Public, None),
                rule("/login", TierKind::GuestOnly, None),
                rule("/register", TierKind::GuestOnly, None),
                rule("/account/*", TierKind::Authenticated, None),
                rule("/cart", TierKind::Authenticated, None),
                rule("/checkout", TierKind::Authenticated, None),
                rule("/orders/*", TierKind::Authenticated, None),
                rule("/admin", TierKind::RoleRestricted, Some(Role::Admin)),
            ],
        };
        Self::from_config(config).expect("built-in route policy is valid")
    }

    /// Tier of `path` (normalized here).
    pub fn classify(&self, path: &str) -> Tier {
        self.matching_rule(&normalize_path(path))
            .map(|rule| rule.tier)
            .unwrap_or(self.fallback)
    }

    /// Most specific rule for a normalized path; declaration order breaks ties.
    pub fn matching_rule(&self, path: &str) -> Option<&RouteRule> {
        let mut best: Option<(Specificity, &RouteRule)> = None;
        for rule in &self.rules {
            if let Some(specificity) = rule.pattern.matches(path) {
                if best.is_none_or(|(current, _)| specificity > current) {
                    best = Some((specificity, rule));
                }
            }
        }
        best.map(|(_, rule)| rule)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn fallback(&self) -> Tier {
        self.fallback
    }

    pub fn sign_in(&self) -> &str {
        &self.sign_in
    }

    pub fn landing(&self) -> &str {
        &self.landing
    }

    pub fn unauthorized(&self) -> &str {
        &self.unauthorized
    }

    /// Reject tables whose own redirect targets would loop.
    fn validate(&self) -> Result<(), PolicyError> {
        match self.classify(&self.sign_in) {
            Tier::GuestOnly | Tier::Public => {}
            tier => {
                return Err(PolicyError::Misconfigured(format!(
                    "sign-in page {} must be guest-only or public, found {tier}",
                    self.sign_in
                )))
            }
        }
        match self.classify(&self.landing) {
            Tier::Public | Tier::Authenticated => {}
            tier => {
                return Err(PolicyError::Misconfigured(format!(
                    "landing page {} must be public or authenticated, found {tier}",
                    self.landing
                )))
            }
        }
        match self.classify(&self.unauthorized) {
            Tier::Public => Ok(()),
            tier => Err(PolicyError::Misconfigured(format!(
                "unauthorized page {} must be public, found {tier}",
                self.unauthorized
            ))),
        }
    }
}

fn page(path: &str, name: &str) -> Result<String, PolicyError> {
    local_target(path)
        .map(normalize_path)
        .ok_or_else(|| PolicyError::Misconfigured(format!("{name} page {path:?} is not a local path")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(rules: &[(&str, TierKind, Option<Role>)]) -> RoutePolicy {
        let mut all = vec![
            RuleConfig { pattern: "/login".into(), tier: TierKind::GuestOnly, role: None },
            RuleConfig { pattern: "/unauthorized".into(), tier: TierKind::Public, role: None },
            RuleConfig { pattern: "/".into(), tier: TierKind::Public, role: None },
        ];
        all.extend(rules.iter().map(|(pattern, tier, role)| RuleConfig {
            pattern: pattern.to_string(),
            tier: *tier,
            role: *role,
        }));
        RoutePolicy::from_config(PolicyConfig {
            sign_in: "/login".into(),
            landing: "/".into(),
            unauthorized: "/unauthorized".into(),
            fallback: TierKind::Public,
            fallback_role: None,
            rules: all,
        })
        .unwrap()
    }

    #[test]
    fn role_restricted_literal_beats_catch_all_wildcard() {
        let policy = policy(&[
            ("/*", TierKind::Authenticated, None),
            ("/admin", TierKind::RoleRestricted, Some(Role::Admin)),
        ]);
        assert_eq!(policy.classify("/admin/reports"), Tier::RoleRestricted(Role::Admin));
        assert_eq!(policy.classify("/admin"), Tier::RoleRestricted(Role::Admin));
        assert_eq!(policy.classify("/orders"), Tier::Authenticated);
    }

    #[test]
    fn exact_beats_prefix_beats_wildcard() {
        let policy = policy(&[
            ("/shop/*", TierKind::Authenticated, None),
            ("/shop", TierKind::RoleRestricted, Some(Role::Admin)),
            ("/shop/sale", TierKind::Public, None),
        ]);
        // exact literal
        assert_eq!(policy.classify("/shop/sale"), Tier::Public);
        // prefix of `/shop` beats wildcard `/shop/*`
        assert_eq!(policy.classify("/shop/items"), Tier::RoleRestricted(Role::Admin));
        // exact `/shop` beats wildcard covering its base
        assert_eq!(policy.classify("/shop"), Tier::RoleRestricted(Role::Admin));
        // prefix of `/shop/sale` (two segments) beats prefix of `/shop`
        assert_eq!(policy.classify("/shop/sale/today"), Tier::Public);
    }

    #[test]
    fn deeper_wildcard_beats_shallower_wildcard() {
        let policy = policy(&[
            ("/*", TierKind::Authenticated, None),
            ("/docs/*", TierKind::Public, None),
        ]);
        assert_eq!(policy.classify("/docs/intro"), Tier::Public);
        assert_eq!(policy.classify("/elsewhere"), Tier::Authenticated);
    }

    #[test]
    fn equal_specificity_resolves_by_declaration_order() {
        let first_public = policy(&[
            ("/deals", TierKind::Public, None),
            ("/deals", TierKind::Authenticated, None),
        ]);
        assert_eq!(first_public.classify("/deals"), Tier::Public);

        let first_auth = policy(&[
            ("/deals/*", TierKind::Authenticated, None),
            ("/deals/*", TierKind::Public, None),
        ]);
        assert_eq!(first_auth.classify("/deals/today"), Tier::Authenticated);
    }

    #[test]
    fn unmatched_paths_take_fallback() {
        let open = policy(&[]);
        assert_eq!(open.classify("/nowhere"), Tier::Public);

        let closed = RoutePolicy::from_json(
            r#"{
                "fallback": "authenticated",
                "rules": [
                    { "pattern": "/login", "tier": "guest-only" },
                    { "pattern": "/", "tier": "public" },
                    { "pattern": "/unauthorized", "tier": "public" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(closed.classify("/nowhere"), Tier::Authenticated);
        assert_eq!(closed.fallback(), Tier::Authenticated);
    }

    #[test]
    fn classification_normalizes_path() {
        let policy = policy(&[("/admin", TierKind::RoleRestricted, Some(Role::Admin))]);
        assert_eq!(policy.classify("/admin/?tab=1"), Tier::RoleRestricted(Role::Admin));
        assert_eq!(policy.classify("//products/../admin"), Tier::RoleRestricted(Role::Admin));
    }

    #[test]
    fn role_must_match_tier() {
        let missing = RoutePolicy::from_json(
            r#"{ "rules": [ { "pattern": "/admin", "tier": "role-restricted" } ] }"#,
        );
        assert!(matches!(missing, Err(PolicyError::MissingRole(_))));

        let unexpected = RoutePolicy::from_json(
            r#"{ "rules": [ { "pattern": "/cart", "tier": "authenticated", "role": "admin" } ] }"#,
        );
        assert!(matches!(unexpected, Err(PolicyError::UnexpectedRole(_))));
    }

    #[test]
    fn looping_tables_are_rejected() {
        let sign_in_protected = RoutePolicy::from_json(
            r#"{ "rules": [ { "pattern": "/login", "tier": "authenticated" } ] }"#,
        );
        assert!(matches!(sign_in_protected, Err(PolicyError::Misconfigured(_))));

        let landing_guest_only = RoutePolicy::from_json(
            r#"{ "landing": "/login", "rules": [ { "pattern": "/login", "tier": "guest-only" } ] }"#,
        );
        assert!(matches!(landing_guest_only, Err(PolicyError::Misconfigured(_))));

        let unauthorized_protected = RoutePolicy::from_json(
            r#"{ "rules": [ { "pattern": "/unauthorized", "tier": "authenticated" } ] }"#,
        );
        assert!(matches!(unauthorized_protected, Err(PolicyError::Misconfigured(_))));

        let remote_landing = RoutePolicy::from_json(
            r#"{ "landing": "https://example.com", "rules": [] }"#,
        );
        assert!(matches!(remote_landing, Err(PolicyError::Misconfigured(_))));
    }

    #[test]
    fn storefront_table_is_valid() {
        let policy = RoutePolicy::storefront();
        assert_eq!(policy.classify("/login"), Tier::GuestOnly);
        assert_eq!(policy.classify("/products/42"), Tier::Public);
        assert_eq!(policy.classify("/account/orders"), Tier::Authenticated);
        assert_eq!(policy.classify("/admin/reports"), Tier::RoleRestricted(Role::Admin));
        assert_eq!(policy.classify("/about"), Tier::Public);
    }

    #[test]
    fn load_reads_policy_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(
            &path,
            r#"{
                "sign_in": "/signin",
                "rules": [
                    { "pattern": "/signin", "tier": "guest-only" },
                    { "pattern": "/vault", "tier": "role-restricted", "role": "admin" }
                ]
            }"#,
        )
        .unwrap();

        let policy = RoutePolicy::load(&path).unwrap();
        assert_eq!(policy.sign_in(), "/signin");
        assert_eq!(policy.classify("/vault"), Tier::RoleRestricted(Role::Admin));
        assert!(matches!(
            RoutePolicy::load(dir.path().join("missing.json")),
            Err(PolicyError::Io(_))
        ));
    }
}
