use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod seed;
mod uploads;

use crate::config::Config;

/// Shared application state — cheap to clone (all heap behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sweetshop_service=debug".parse().unwrap()),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Sweet Shop Service  — Rust + Axum   ║");
    info!("╚══════════════════════════════════════╝");

    info!("Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    info!("Database connection pool established.");

    // Run pending migrations
    info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations complete.");

    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        db: pool,
        config: Arc::new(config),
    };

    let app = build_router(state);

    info!("Listening on http://{}", addr);
    info!("Quick-start: POST http://{}/api/seed?count=12  →  then open http://{}/", addr, addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    let upload_dir = state.config.upload_dir.clone();
    let static_dir = state.config.static_dir.clone();

    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Catalog ─────────────────────────────────────────────────────────
        .route(
            "/api/sweets",
            get(handlers::sweets::list_sweets).post(handlers::sweets::create_sweet),
        )
        .route("/api/sweets/search", get(handlers::sweets::search_sweets))
        .route("/api/sweets/sort", get(handlers::sweets::sort_sweets))

        // ── Stock mutations ─────────────────────────────────────────────────
        .route("/api/sweets/purchase", put(handlers::sweets::purchase_sweet))
        .route("/api/sweets/restock", put(handlers::sweets::restock_sweet))

        // Keyed by the business id, not the storage id
        .route(
            "/api/sweets/:sweet_id",
            get(handlers::sweets::get_sweet)
                .put(handlers::sweets::update_sweet)
                .delete(handlers::sweets::delete_sweet),
        )

        // ── Seed ────────────────────────────────────────────────────────────
        .route("/api/seed", post(handlers::seed::seed_catalog))

        // ── Uploaded images + admin client ──────────────────────────────────
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .fallback_service(ServeDir::new(static_dir))

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(DefaultBodyLimit::max(8 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
