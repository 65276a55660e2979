//! Youth Leadership Tracker Backend
//!
//! REST backend for committee members, their leadership experiences, dashboard
//! statistics, and a lockout-guarded login, persisted in a SQLite key-value store.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod stats;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{Authenticator, LockoutGuard};
use config::Config;
use db::{Repository, SqliteStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository<SqliteStore>>,
    pub auth: Authenticator<SqliteStore>,
}

impl AppState {
    /// Wire the repository and login flow onto one store.
    pub fn new(store: SqliteStore, config: &Config) -> Self {
        let store = Arc::new(store);
        let guard = LockoutGuard::new(Arc::clone(&store), config.lockout);

        Self {
            repo: Arc::new(Repository::new(store)),
            auth: Authenticator::new(config.credentials.clone(), guard),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Youth Leadership Tracker Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        "Login lockout after {} failures for {}s",
        config.lockout.max_attempts,
        config.lockout.duration.as_secs()
    );

    if config.credentials.password.is_none() {
        tracing::warn!("No admin password configured (YLT_ADMIN_PASSWORD). Every login will fail!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let state = AppState::new(SqliteStore::new(pool), &config);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Login
        .route("/auth/login", post(api::login))
        .route("/auth/lockout", get(api::get_lockout))
        // Members
        .route("/members", get(api::list_members).post(api::create_member))
        .route(
            "/members/{id}",
            get(api::get_member)
                .put(api::update_member)
                .delete(api::delete_member),
        )
        .route("/members/{id}/score", get(api::get_member_score))
        // Experiences
        .route(
            "/experiences",
            get(api::list_experiences).post(api::create_experience),
        )
        .route("/experiences/active", get(api::list_active_experiences))
        .route(
            "/experiences/completed",
            get(api::list_completed_experiences),
        )
        .route(
            "/experiences/{id}",
            get(api::get_experience)
                .put(api::update_experience)
                .delete(api::delete_experience),
        )
        // Dashboard
        .route("/dashboard", get(api::get_dashboard));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
