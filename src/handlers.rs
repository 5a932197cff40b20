use crate::{
    AppState,
    access::{self, Decision, LOGIN_PATH},
    auth::{Session, bearer_token},
    identity::IdentityError,
    models::{
        CurrentUser, DecideQuery, LandingRoute, LoginRequest, LoginResponse, LogoutResponse,
        NavigationDecision, RouteView, UserProfile,
    },
};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};

// --- Helpers ---

/// Builds the profile payload, including the role's landing route.
fn profile_of(user: &CurrentUser) -> UserProfile {
    let role_kind = user.role_kind();
    // Named roles show their staff-facing label even when stored under the slug.
    let role_name = role_kind
        .and_then(|kind| kind.display_name())
        .or_else(|| user.role_key())
        .map(str::to_string);

    UserProfile {
        id: user.id,
        full_name: user.full_name.clone(),
        branch_id: user.branch_id,
        role_name,
        role_kind,
        landing_route: access::default_landing_route(user).to_string(),
    }
}

fn to_wire(path: &str, decision: Decision) -> NavigationDecision {
    NavigationDecision {
        path: path.to_string(),
        allowed: decision.is_allowed(),
        redirect_to: decision.redirect_path().map(str::to_string),
        replace: !decision.is_allowed(),
    }
}

// --- Handlers ---

/// health
///
/// [Public Route] Liveness probe.
#[utoipa::path(get, path = "/health", responses((status = 200, description = "Alive")))]
pub async fn health() -> &'static str {
    "ok"
}

/// list_routes
///
/// [Public Route] The route table, so the client can hide navigation entries
/// a role cannot open.
#[utoipa::path(
    get,
    path = "/routes",
    responses((status = 200, description = "Route table", body = [RouteView]))
)]
pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteView>> {
    Json(state.routes.views())
}

/// decide_navigation
///
/// [Public Route] Answers "may the current session render `path`?".
/// Anonymous callers are not rejected: they get a redirect to `/login`.
#[utoipa::path(
    get,
    path = "/navigation/decide",
    params(DecideQuery),
    responses(
        (status = 200, description = "Decision", body = NavigationDecision),
        (status = 404, description = "Unknown route")
    )
)]
pub async fn decide_navigation(
    Session(user): Session,
    State(state): State<AppState>,
    Query(query): Query<DecideQuery>,
) -> Result<Json<NavigationDecision>, StatusCode> {
    let rule = state.routes.get(&query.path).ok_or(StatusCode::NOT_FOUND)?;
    let decision = access::decide(user.as_ref(), rule);

    if let Decision::RedirectTo(target) = decision {
        tracing::debug!(
            path = %rule.path,
            redirect_to = target,
            user_id = ?user.as_ref().map(|u| u.id),
            role = ?user.as_ref().and_then(CurrentUser::role_kind),
            "navigation denied"
        );
    }

    Ok(Json(to_wire(&query.path, decision)))
}

/// get_landing_route
///
/// [Authenticated Route] The role-specific first screen.
#[utoipa::path(
    get,
    path = "/navigation/landing",
    responses((status = 200, description = "Landing route", body = LandingRoute))
)]
pub async fn get_landing_route(user: CurrentUser) -> Json<LandingRoute> {
    Json(LandingRoute {
        path: access::default_landing_route(&user).to_string(),
    })
}

/// get_me
///
/// [Authenticated Route] The resolved session profile.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(user: CurrentUser) -> Json<UserProfile> {
    Json(profile_of(&user))
}

/// login
///
/// [Public Route] Signs in with the hosted auth provider, then resolves the
/// profile so the client can navigate straight to the landing route.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Bad credentials"),
        (status = 403, description = "No staff profile for this account"),
        (status = 502, description = "Auth provider failure")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, StatusCode> {
    let session = state
        .identity
        .sign_in(&payload.email, &payload.password)
        .await
        .map_err(|e| match e {
            IdentityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            other => {
                tracing::error!("sign-in failed: {}", other);
                StatusCode::BAD_GATEWAY
            }
        })?;

    let user = state
        .repo
        .get_current_user(session.user.id)
        .await
        .ok_or_else(|| {
            tracing::warn!(user_id = %session.user.id, "signed in without a staff profile");
            StatusCode::FORBIDDEN
        })?;

    tracing::info!(user_id = %user.id, role = ?user.role_kind(), "user signed in");

    Ok(Json(LoginResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        expires_in: session.expires_in,
        user: profile_of(&user),
    }))
}

/// logout
///
/// [Authenticated Route] Revokes the session upstream and points the client at
/// the login screen. Sessions created through the local `x-user-id` bypass
/// carry no token and have nothing to revoke.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Signed out", body = LogoutResponse),
        (status = 502, description = "Auth provider failure")
    )
)]
pub async fn logout(
    user: CurrentUser,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, StatusCode> {
    if let Some(token) = bearer_token(&headers) {
        state.identity.sign_out(token).await.map_err(|e| {
            tracing::error!("sign-out failed: {}", e);
            StatusCode::BAD_GATEWAY
        })?;
    }

    tracing::info!(user_id = %user.id, "user signed out");

    Ok(Json(LogoutResponse {
        redirect_to: LOGIN_PATH.to_string(),
    }))
}
