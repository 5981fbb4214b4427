use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::query::HeatmapMode;
use crate::storage::Database;

pub mod routes;

/// Server state
pub struct AppState {
    pub db: Database,
    /// Aggregation used when a heatmap request does not name one
    pub heatmap_mode: HeatmapMode,
}

impl AppState {
    pub fn new(db: Database, heatmap_mode: HeatmapMode) -> Self {
        Self { db, heatmap_mode }
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/test", get(routes::health))
        .route("/api/language-distribution", get(routes::language_distribution))
        .route("/api/company-distribution", get(routes::company_distribution))
        .route("/api/stars-contributors", get(routes::stars_contributors))
        .route("/api/stars-issues", get(routes::stars_issues))
        .route("/api/contributor-locations", get(routes::contributor_locations))
        .route("/api/repositories-with-activity", get(routes::repositories_with_activity))
        .route("/api/activity-heatmap", get(routes::activity_heatmap))
        .route("/api/language-trends", get(routes::language_trends))
        .route("/api/language-top-repos", get(routes::language_top_repos))
        .route("/api/top-repositories", get(routes::top_repositories))
        .route("/api/snapshots", get(routes::snapshots))
        .route("/api/language-colors", get(routes::language_colors))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let state = Arc::new(state);

    let db = state.db.clone();
    match tokio::task::spawn_blocking(move || db.ping()).await? {
        Ok(()) => tracing::info!("Database reachable at {}", state.db.path().display()),
        Err(e) => tracing::warn!("Database not reachable yet ({}), serving anyway", e),
    }

    let app = router(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
