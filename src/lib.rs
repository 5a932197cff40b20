use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access decisions and the route configuration they run against.
pub mod access;
pub mod roles;
pub mod route_table;

// Session resolution and its collaborators.
pub mod auth;
pub mod config;
pub mod identity;
pub mod models;
pub mod repository;

// HTTP surface.
pub mod handlers;
pub mod routes;
use models::CurrentUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use access::{Decision, RouteRule, decide, default_landing_route};
pub use config::AppConfig;
pub use identity::{IdentityState, MockIdentityProvider, SupabaseIdentityClient};
pub use repository::{PostgresRepository, RepositoryState};
pub use route_table::{RouteTable, RouteTableError};

/// ApiDoc
///
/// OpenAPI document for the service, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::list_routes, handlers::decide_navigation,
        handlers::get_landing_route, handlers::get_me, handlers::login, handlers::logout
    ),
    components(
        schemas(
            models::NavigationDecision, models::LandingRoute, models::RouteView,
            models::UserProfile, models::LoginRequest, models::LoginResponse,
            models::LogoutResponse, roles::RoleKind,
        )
    ),
    tags(
        (name = "pos-access-gate", description = "Role-based navigation gate for the POS front end")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cloneable container of shared services. Everything inside is
/// either an `Arc` or immutable configuration, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Profile and role lookups.
    pub repo: RepositoryState,
    /// Hosted auth sign-in/sign-out.
    pub identity: IdentityState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
    /// The validated route table.
    pub routes: Arc<RouteTable>,
}

// --- Axum FromRef Extractor Implementations ---

// Let extractors and handlers pull single components out of the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards `authenticated_routes`.
///
/// *Mechanism*: `CurrentUser` implements `FromRequestParts`, so when the session
/// cannot be resolved (bad token, no profile) the extractor rejects with 401
/// before the handler runs. Otherwise the request proceeds unchanged.
async fn auth_middleware(_user: CurrentUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies middleware and registers state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: the generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: no middleware. The navigation check resolves its own
        // optional session, so anonymous callers get a redirect instead of a 401.
        .merge(public::public_routes())
        // Authenticated Routes: protected by `auth_middleware`.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Apply the shared state to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with that ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echoes x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` so every log
/// line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
