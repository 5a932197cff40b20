use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that answer with or without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(handlers::health))
        // GET /routes
        // The declared route table with each screen's policy.
        .route("/routes", get(handlers::list_routes))
        // GET /navigation/decide?path=/customers
        // Allow or redirect. Unauthenticated sessions are answered with `/login`.
        .route("/navigation/decide", get(handlers::decide_navigation))
        // POST /login
        // Password sign-in through the hosted auth provider; returns the landing route.
        .route("/login", post(handlers::login))
}
