use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::Snapshot;
use crate::palette;
use crate::query::*;
use crate::server::AppState;

#[derive(Deserialize)]
pub struct HeatmapParams {
    #[serde(rename = "repoName")]
    pub repo_name: Option<String>,
    pub mode: Option<String>,
}

#[derive(Deserialize)]
pub struct LanguageParams {
    pub language: Option<String>,
    /// Parsed by the handler so a bad value gets the JSON error body
    pub limit: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error surfaced to HTTP clients as `{"error": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Run a query on the blocking pool. Only a panicked query reaches the
/// client as a 500; ordinary query failures already came back as empty.
async fn run_query<T, F>(state: Arc<AppState>, failure: &'static str, query: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&QueryEngine<'_>) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || query(&QueryEngine::new(&state.db)))
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("{}: {}", failure, e);
            ApiError::internal(failure)
        })
}

pub async fn health(State(state): State<Arc<AppState>>) -> ApiResult<HealthStatus> {
    run_query(state, "Failed to check database connection", |engine| engine.health()).await
}

pub async fn language_distribution(State(state): State<Arc<AppState>>) -> ApiResult<Vec<LanguageCount>> {
    run_query(state, "Failed to load language distribution", |engine| {
        engine.language_distribution()
    })
    .await
}

pub async fn company_distribution(State(state): State<Arc<AppState>>) -> ApiResult<Vec<CompanyCount>> {
    run_query(state, "Failed to load company distribution", |engine| {
        engine.company_distribution()
    })
    .await
}

pub async fn stars_contributors(State(state): State<Arc<AppState>>) -> ApiResult<Vec<StarsContributorsPoint>> {
    run_query(state, "Failed to load stars/contributors relation", |engine| {
        engine.stars_contributors_relation()
    })
    .await
}

pub async fn stars_issues(State(state): State<Arc<AppState>>) -> ApiResult<Vec<StarsIssuesPoint>> {
    run_query(state, "Failed to load stars/issues relation", |engine| {
        engine.stars_issues_relation()
    })
    .await
}

pub async fn contributor_locations(State(state): State<Arc<AppState>>) -> ApiResult<Vec<LocationCount>> {
    run_query(state, "Failed to load contributor locations", |engine| {
        engine.contributor_locations()
    })
    .await
}

pub async fn repositories_with_activity(State(state): State<Arc<AppState>>) -> ApiResult<Vec<ActiveRepository>> {
    run_query(state, "Failed to load repositories with activity", |engine| {
        engine.repositories_with_activity()
    })
    .await
}

pub async fn activity_heatmap(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HeatmapParams>,
) -> ApiResult<Vec<HeatmapDay>> {
    let mode = match params.mode.as_deref().filter(|m| !m.is_empty()) {
        Some(raw) => raw
            .parse::<HeatmapMode>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => state.heatmap_mode,
    };
    let repo_name = params.repo_name.filter(|name| !name.is_empty());
    tracing::info!(
        "Heatmap request for {} ({} mode)",
        repo_name.as_deref().unwrap_or("all repositories"),
        mode
    );

    let today = chrono::Local::now().date_naive();
    run_query(state, "Failed to load activity heatmap", move |engine| {
        engine.activity_heatmap(repo_name.as_deref(), mode, today)
    })
    .await
}

pub async fn language_trends(State(state): State<Arc<AppState>>) -> ApiResult<Vec<LanguageSeries>> {
    run_query(state, "Failed to load language trends", |engine| engine.language_trends()).await
}

pub async fn language_top_repos(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LanguageParams>,
) -> ApiResult<Vec<LanguageRepo>> {
    let Some(language) = params.language.filter(|l| !l.is_empty()) else {
        return Err(ApiError::bad_request("The language parameter is required"));
    };
    let limit = match params.limit.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
            ApiError::bad_request(format!("The limit parameter must be a non-negative integer, got {:?}", raw))
        })?),
        None => None,
    };

    run_query(state, "Failed to load top repositories for language", move |engine| {
        engine.language_top_repos(&language, limit)
    })
    .await
}

pub async fn top_repositories(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TopRepository>> {
    run_query(state, "Failed to load top repositories", |engine| engine.top_repositories()).await
}

pub async fn snapshots(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Snapshot>> {
    run_query(state, "Failed to load snapshot catalog", |engine| engine.snapshots()).await
}

pub async fn language_colors() -> Json<BTreeMap<&'static str, &'static str>> {
    Json(palette::language_colors())
}
