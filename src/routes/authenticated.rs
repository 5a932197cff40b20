use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every handler here receives a resolved `CurrentUser`; the auth middleware
/// layered on top in `create_router` rejects the request with 401 before it
/// gets this far otherwise.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The session profile, role kind and landing route.
        .route("/me", get(handlers::get_me))
        // GET /navigation/landing
        // The role-specific first screen after login.
        .route("/navigation/landing", get(handlers::get_landing_route))
        // POST /logout
        // Revokes the session and points the client at `/login`.
        .route("/logout", post(handlers::logout))
}
