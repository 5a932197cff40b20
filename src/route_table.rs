use std::{collections::HashSet, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    access::{AccessPolicy, FALLBACK_PATH, LOGIN_PATH, RouteRule},
    models::RouteView,
    roles::RoleKind,
};

/// RouteTableError
///
/// Integrity faults in the route declarations. All of them are raised while the
/// table is built, so a bad table stops the service at startup instead of
/// producing surprising decisions at request time.
#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("route {path} declares both restricted_roles and allowed_roles")]
    ConflictingPolicies { path: String },

    #[error("route {path} references unknown role {role:?}")]
    UnknownRole { path: String, role: String },

    #[error("route path {path:?} must start with '/'")]
    InvalidPath { path: String },

    #[error("route {path} is declared more than once")]
    DuplicatePath { path: String },

    #[error("/login is public and cannot carry an access policy")]
    LoginDeclared,

    #[error("fallback route /pos is not declared")]
    MissingFallback,

    #[error("fallback route /pos must be unrestricted")]
    FallbackRestricted,

    #[error("failed to read route table: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse route table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// RouteDecl
///
/// A route as written in a JSON route-table file. Role names may be the Arabic
/// display labels or the canonical slugs. Unknown keys are rejected: a
/// misspelled policy field would otherwise leave the screen unrestricted.
///
/// ```json
/// { "path": "/dashboard", "restricted_roles": ["محاسب", "مدير فرع"] }
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RouteDecl {
    pub path: String,
    #[serde(default)]
    pub restricted_roles: Option<Vec<String>>,
    #[serde(default)]
    pub allowed_roles: Option<Vec<String>>,
}

impl TryFrom<RouteDecl> for RouteRule {
    type Error = RouteTableError;

    fn try_from(decl: RouteDecl) -> Result<Self, Self::Error> {
        let RouteDecl {
            path,
            restricted_roles,
            allowed_roles,
        } = decl;

        let parse_roles = |names: Vec<String>| {
            names
                .into_iter()
                .map(|name| {
                    RoleKind::named(&name).ok_or_else(|| RouteTableError::UnknownRole {
                        path: path.clone(),
                        role: name,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let policy = match (restricted_roles, allowed_roles) {
            (Some(_), Some(_)) => {
                return Err(RouteTableError::ConflictingPolicies { path: path.clone() });
            }
            (Some(denied), None) => AccessPolicy::restricted_to(parse_roles(denied)?),
            (None, Some(allowed)) => AccessPolicy::allowed_only(parse_roles(allowed)?),
            (None, None) => AccessPolicy::Unrestricted,
        };

        Ok(RouteRule::new(path, policy))
    }
}

/// RouteTable
///
/// The ordered, validated set of every navigable screen. Built once at startup
/// and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// new
    ///
    /// Validates `rules` and wraps them. Paths must be absolute and unique, the
    /// login screen must not be gated, and the fallback screen must exist and be
    /// open to every role (otherwise a denied user would bounce forever).
    pub fn new(rules: Vec<RouteRule>) -> Result<Self, RouteTableError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !rule.path.starts_with('/') {
                return Err(RouteTableError::InvalidPath {
                    path: rule.path.clone(),
                });
            }
            let path = normalize(&rule.path);
            if path == LOGIN_PATH {
                return Err(RouteTableError::LoginDeclared);
            }
            if !seen.insert(path.to_string()) {
                return Err(RouteTableError::DuplicatePath {
                    path: rule.path.clone(),
                });
            }
        }

        let fallback = rules
            .iter()
            .find(|rule| normalize(&rule.path) == FALLBACK_PATH)
            .ok_or(RouteTableError::MissingFallback)?;
        if !fallback.policy.is_open() {
            return Err(RouteTableError::FallbackRestricted);
        }

        Ok(Self { rules })
    }

    pub fn from_decls(decls: Vec<RouteDecl>) -> Result<Self, RouteTableError> {
        let rules = decls
            .into_iter()
            .map(RouteRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules)
    }

    /// load
    ///
    /// Reads a JSON array of `RouteDecl`s from disk.
    pub fn load(path: &Path) -> Result<Self, RouteTableError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(json: &str) -> Result<Self, RouteTableError> {
        let decls: Vec<RouteDecl> = serde_json::from_str(json)?;
        Self::from_decls(decls)
    }

    /// builtin
    ///
    /// The screens of the point-of-sale application and who may open them.
    pub fn builtin() -> Result<Self, RouteTableError> {
        use RoleKind::*;

        let rules = vec![
            RouteRule::new(
                "/dashboard",
                AccessPolicy::restricted_to([Accountant, BranchManager]),
            ),
            RouteRule::unrestricted("/pos"),
            RouteRule::unrestricted("/products"),
            RouteRule::new(
                "/customers",
                AccessPolicy::allowed_only([SalesStaff, Accountant, BranchManager]),
            ),
            RouteRule::new("/sales", AccessPolicy::restricted_to([Storekeeper])),
            RouteRule::unrestricted("/inventory"),
            RouteRule::new("/purchases", AccessPolicy::restricted_to([SalesStaff])),
            RouteRule::new("/suppliers", AccessPolicy::restricted_to([SalesStaff])),
            RouteRule::unrestricted("/returns"),
            RouteRule::new("/transfers", AccessPolicy::restricted_to([SalesStaff])),
            RouteRule::new("/damaged-goods", AccessPolicy::restricted_to([SalesStaff])),
            RouteRule::new(
                "/reports",
                AccessPolicy::restricted_to([Storekeeper, SalesStaff]),
            ),
            RouteRule::new(
                "/partner-withdrawals",
                AccessPolicy::restricted_to(RoleKind::NAMED),
            ),
            RouteRule::new(
                "/customer-statement",
                AccessPolicy::restricted_to([Storekeeper]),
            ),
            RouteRule::new(
                "/stock-count",
                AccessPolicy::restricted_to([SalesStaff, Accountant]),
            ),
            RouteRule::new(
                "/expenses",
                AccessPolicy::restricted_to([Storekeeper, SalesStaff]),
            ),
            RouteRule::new(
                "/expense-categories",
                AccessPolicy::restricted_to([Storekeeper, SalesStaff]),
            ),
            RouteRule::new(
                "/bank-accounts",
                AccessPolicy::restricted_to([Storekeeper, SalesStaff]),
            ),
            RouteRule::new("/settings", AccessPolicy::restricted_to(RoleKind::NAMED)),
        ];

        Self::new(rules)
    }

    /// get
    ///
    /// Looks up the rule for a client-side location. A trailing slash, query
    /// string or fragment does not change which screen is meant.
    pub fn get(&self, path: &str) -> Option<&RouteRule> {
        let wanted = normalize(path);
        self.rules.iter().find(|rule| normalize(&rule.path) == wanted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn views(&self) -> Vec<RouteView> {
        self.rules
            .iter()
            .map(|rule| RouteView {
                path: rule.path.clone(),
                policy: rule.policy.label().to_string(),
                roles: rule.policy.roles(),
            })
            .collect()
    }
}

fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
