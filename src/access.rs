use std::collections::BTreeSet;

use crate::{models::CurrentUser, roles::RoleKind};

// --- Well-known Screens ---

/// Public sign-in screen; every unauthenticated navigation ends up here.
pub const LOGIN_PATH: &str = "/login";
/// Where an authenticated user lands when a screen is denied to their role.
pub const FALLBACK_PATH: &str = "/pos";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const INVENTORY_PATH: &str = "/inventory";
pub const PRODUCTS_PATH: &str = "/products";

/// AccessPolicy
///
/// How a screen is gated. Restricted and allow-listed policies are separate
/// variants, so a rule can never carry both lists at once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccessPolicy {
    #[default]
    Unrestricted,
    /// Denied to the listed roles, open to everyone else.
    RestrictedTo(BTreeSet<RoleKind>),
    /// Open only to the listed roles. Users without a role key pass.
    AllowedOnly(BTreeSet<RoleKind>),
}

impl AccessPolicy {
    pub fn restricted_to(roles: impl IntoIterator<Item = RoleKind>) -> Self {
        AccessPolicy::RestrictedTo(roles.into_iter().collect())
    }

    pub fn allowed_only(roles: impl IntoIterator<Item = RoleKind>) -> Self {
        AccessPolicy::AllowedOnly(roles.into_iter().collect())
    }

    /// Wire label used by the route listing.
    pub fn label(&self) -> &'static str {
        match self {
            AccessPolicy::Unrestricted => "unrestricted",
            AccessPolicy::RestrictedTo(_) => "restricted_to",
            AccessPolicy::AllowedOnly(_) => "allowed_only",
        }
    }

    pub fn roles(&self) -> Vec<RoleKind> {
        match self {
            AccessPolicy::Unrestricted => Vec::new(),
            AccessPolicy::RestrictedTo(set) | AccessPolicy::AllowedOnly(set) => {
                set.iter().copied().collect()
            }
        }
    }

    /// True when no role can ever be turned away by this policy.
    pub fn is_open(&self) -> bool {
        matches!(self, AccessPolicy::Unrestricted)
    }
}

/// RouteRule
///
/// One navigable screen and its policy. Rules are built once at startup and
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub path: String,
    pub policy: AccessPolicy,
}

impl RouteRule {
    pub fn new(path: impl Into<String>, policy: AccessPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn unrestricted(path: impl Into<String>) -> Self {
        Self::new(path, AccessPolicy::Unrestricted)
    }
}

/// Decision
///
/// Outcome of one access check: render the screen, or navigate elsewhere
/// (replacing the history entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectTo(&'static str),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            Decision::Allow => None,
            Decision::RedirectTo(path) => Some(path),
        }
    }
}

/// decide
///
/// Decides whether `user` may see the screen described by `rule`.
///
/// - No user: redirect to the login screen.
/// - `RestrictedTo(S)` and the user's role is in `S`: redirect to the fallback.
/// - `AllowedOnly(S)` and the user has a role that is not in `S`: redirect to the fallback.
/// - Anything else renders the screen.
///
/// Pure and total; the same inputs always produce the same decision.
pub fn decide(user: Option<&CurrentUser>, rule: &RouteRule) -> Decision {
    let Some(user) = user else {
        return Decision::RedirectTo(LOGIN_PATH);
    };

    let role = user.role_kind();

    match (&rule.policy, role) {
        (AccessPolicy::RestrictedTo(denied), Some(role)) if denied.contains(&role) => {
            Decision::RedirectTo(FALLBACK_PATH)
        }
        (AccessPolicy::AllowedOnly(allowed), Some(role)) if !allowed.contains(&role) => {
            Decision::RedirectTo(FALLBACK_PATH)
        }
        _ => Decision::Allow,
    }
}

/// default_landing_route
///
/// The screen a user is sent to on first navigation after login.
pub fn default_landing_route(user: &CurrentUser) -> &'static str {
    landing_route_for(user.role_kind())
}

/// Landing route lookup on the resolved role kind; first match wins.
pub fn landing_route_for(role: Option<RoleKind>) -> &'static str {
    match role {
        Some(RoleKind::Storekeeper) => INVENTORY_PATH,
        Some(RoleKind::SalesStaff) => PRODUCTS_PATH,
        Some(RoleKind::Accountant | RoleKind::BranchManager) => FALLBACK_PATH,
        Some(RoleKind::Other) | None => DASHBOARD_PATH,
    }
}
