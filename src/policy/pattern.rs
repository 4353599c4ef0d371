// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route patterns and path normalization.
//!
//! | Pattern      | Matches                         | Kind                |
//! |--------------|---------------------------------|---------------------|
//! | `/admin`     | `/admin`                        | exact               |
//! | `/admin`     | `/admin/reports`, `/admin/x/y`  | prefix              |
//! | `/account/*` | `/account`, `/account/orders`   | wildcard            |
//! | `/*`         | every path                      | wildcard            |
//!
//! The literal `/` matches only the root.

use std::cmp::Ordering;

use super::table::PolicyError;

/// How a pattern matched a path. Later variants are more specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    Wildcard,
    Prefix,
    Exact,
}

/// Strength of a match: kind first, then number of literal segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specificity {
    pub kind: MatchKind,
    pub segments: usize,
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then(self.segments.cmp(&other.segments))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    /// Exact path, also covering its descendants as a prefix
    Literal(String),
    /// `base/*`; `/` as base matches everything
    Wildcard(String),
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self, PolicyError> {
        let raw = raw.trim();
        if !raw.starts_with('/') {
            return Err(PolicyError::InvalidPattern(raw.to_string()));
        }

        let (base, wildcard) = match raw.strip_suffix("/*") {
            Some(base) => (base, true),
            None => (raw, false),
        };
        if base.contains('*') || base.contains('?') || base.contains('#') {
            return Err(PolicyError::InvalidPattern(raw.to_string()));
        }

        let base = normalize_path(base);
        Ok(if wildcard {
            RoutePattern::Wildcard(base)
        } else {
            RoutePattern::Literal(base)
        })
    }

    /// Match an already-normalized path.
    pub fn matches(&self, path: &str) -> Option<Specificity> {
        match self {
            RoutePattern::Literal(base) => {
                let segments = segment_count(base);
                if path == base {
                    Some(Specificity {
                        kind: MatchKind::Exact,
                        segments,
                    })
                } else if is_descendant(base, path) {
                    Some(Specificity {
                        kind: MatchKind::Prefix,
                        segments,
                    })
                } else {
                    None
                }
            }
            RoutePattern::Wildcard(base) => {
                let covered = base == "/" || path == base || is_descendant(base, path);
                covered.then(|| Specificity {
                    kind: MatchKind::Wildcard,
                    segments: segment_count(base),
                })
            }
        }
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutePattern::Literal(base) => f.write_str(base),
            RoutePattern::Wildcard(base) if base == "/" => f.write_str("/*"),
            RoutePattern::Wildcard(base) => write!(f, "{base}/*"),
        }
    }
}

fn is_descendant(base: &str, path: &str) -> bool {
    base != "/"
        && path
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn segment_count(path: &str) -> usize {
    path.split('/').filter(|s| !s.is_empty()).count()
}

/// Canonical form used for classification.
///
/// Drops query and fragment, collapses repeated slashes, resolves `.` and
/// `..` segments and removes the trailing slash (except for the root).
pub fn normalize_path(path: &str) -> String {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}
