use pos_access_gate::{
    AppState, RouteTable,
    config::{AppConfig, Env},
    create_router,
    identity::{IdentityState, SupabaseIdentityClient},
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::{process::ExitCode, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Initializes configuration, logging, the route table, the database pool and
/// the auth client, then serves HTTP. Any startup fault is logged and the
/// process exits non-zero.
#[tokio::main]
async fn main() -> ExitCode {
    // 1. Configuration & Environment Loading
    dotenv::dotenv().ok();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // 2. Logging: pretty locally, JSON for log aggregation in production.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pos_access_gate=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Route Table: refuse to start on an inconsistent declaration.
    let routes = match &config.route_table_path {
        Some(path) => RouteTable::load(path),
        None => RouteTable::builtin(),
    };
    let routes = match routes {
        Ok(routes) => Arc::new(routes),
        Err(e) => {
            tracing::error!("FATAL: invalid route table: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(routes = routes.len(), "route table loaded");

    // 4. Database Initialization (hosted Postgres)
    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("FATAL: failed to connect to Postgres: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Hosted Auth Client
    let identity = Arc::new(SupabaseIdentityClient::new(
        &config.supabase_url,
        &config.supabase_anon_key,
    )) as IdentityState;

    // 6. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        repo,
        identity,
        config,
        routes,
    };

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("FATAL: cannot bind {}: {}", bind_addr, e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
