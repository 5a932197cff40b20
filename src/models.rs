use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::roles::{Role, RoleKind};

// --- Session Principal ---

/// CurrentUser
///
/// The authenticated principal, resolved from the `users` table joined with its
/// `roles` row. It is an immutable snapshot: the access checks only read it, and
/// a fresh one is resolved on every request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct CurrentUser {
    // Primary Key, also the Foreign Key to the external auth.users table.
    pub id: Uuid,
    pub full_name: String,
    // Branch the user is assigned to, if any.
    pub branch_id: Option<Uuid>,
    // One user has at most one role at a time.
    pub role: Option<Role>,
}

impl CurrentUser {
    /// The role's localized name, else its canonical name, else none.
    pub fn role_key(&self) -> Option<&str> {
        self.role.as_ref().and_then(Role::role_key)
    }

    pub fn role_kind(&self) -> Option<RoleKind> {
        self.role.as_ref().and_then(Role::kind)
    }
}

// --- Request Payloads (Input Schemas) ---

/// DecideQuery
///
/// Query string for `GET /navigation/decide?path=/customers`.
#[derive(Debug, Clone, Deserialize, Serialize, IntoParams, TS)]
#[into_params(parameter_in = Query)]
#[ts(export)]
pub struct DecideQuery {
    /// The client-side route the user is about to render.
    pub path: String,
}

/// LoginRequest
///
/// Input payload for `POST /login`. The password is forwarded to the hosted auth
/// provider and never logged or stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// --- Response Schemas (Output) ---

/// NavigationDecision
///
/// Wire form of an access decision. `redirect_to` is set exactly when
/// `allowed` is false; redirects always replace the history entry so the user
/// cannot navigate back to the denied screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct NavigationDecision {
    pub path: String,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    pub replace: bool,
}

/// LandingRoute
///
/// The first screen a role sees after login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct LandingRoute {
    pub path: String,
}

/// RouteView
///
/// One entry of the route table as exposed to the client.
/// `policy` is one of `unrestricted`, `restricted_to` or `allowed_only`; `roles`
/// is empty for unrestricted routes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct RouteView {
    pub path: String,
    pub policy: String,
    pub roles: Vec<RoleKind>,
}

/// UserProfile
///
/// Output schema for `GET /me` and the `POST /login` response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub branch_id: Option<Uuid>,
    // Arabic label of a named role; for any other role, its key as stored.
    pub role_name: Option<String>,
    pub role_kind: Option<RoleKind>,
    pub landing_route: String,
}

/// LoginResponse
///
/// Returned by `POST /login`: the hosted provider's tokens plus everything the
/// client needs for its first navigation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

/// LogoutResponse
///
/// Tells the client where to go once the session is cleared.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct LogoutResponse {
    pub redirect_to: String,
}
