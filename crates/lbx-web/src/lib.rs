//! Axum JSON boundary for the Letterboxd integration.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lbx_client::ScraperError;
use lbx_core::{FailureClass, ScrapeOptions};
use lbx_sync::{SyncError, SyncService};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub const CRATE_NAME: &str = "lbx-web";

const SERVICE_NAME: &str = "letterboxd-integration";

#[derive(Clone)]
pub struct AppState {
    pub service: SyncService,
}

impl AppState {
    pub fn new(service: SyncService) -> Self {
        Self { service }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeQuery {
    pub include_ratings: Option<bool>,
    pub include_watchlist: Option<bool>,
    pub rating_limit: Option<i64>,
}

impl ScrapeQuery {
    pub fn options(&self) -> ScrapeOptions {
        let defaults = ScrapeOptions::default();
        let options = ScrapeOptions {
            include_ratings: self.include_ratings.unwrap_or(defaults.include_ratings),
            include_watchlist: self.include_watchlist.unwrap_or(defaults.include_watchlist),
            ..defaults
        };
        match self.rating_limit {
            Some(limit) => options.with_rating_limit(limit),
            None => options,
        }
    }
}

pub enum ApiError {
    Sync(SyncError),
    InvalidQuery(QueryRejection),
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        Self::Sync(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection)
    }
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        let err = match self {
            Self::InvalidQuery(_) => return (StatusCode::BAD_REQUEST, "invalid_query"),
            Self::Sync(err) => err,
        };
        match err {
            SyncError::AlreadyRunning { .. } => (StatusCode::CONFLICT, "already_running"),
            SyncError::NoSyncFound { .. } => (StatusCode::NOT_FOUND, "no_sync_found"),
            SyncError::PollTimeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "poll_timeout"),
            SyncError::Scraper(err) => match err {
                ScraperError::Disabled => (StatusCode::SERVICE_UNAVAILABLE, "disabled"),
                ScraperError::InvalidUsername => (StatusCode::BAD_REQUEST, "invalid_username"),
                ScraperError::NotReachable { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "not_reachable")
                }
                ScraperError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
                ScraperError::Upstream { .. } => (StatusCode::BAD_GATEWAY, "upstream"),
                ScraperError::Normalization(_) => (StatusCode::BAD_GATEWAY, "normalization"),
            },
        }
    }

    fn class(&self) -> FailureClass {
        match self {
            Self::Sync(err) => err.class(),
            Self::InvalidQuery(_) => FailureClass::WontWork,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Sync(err) => err.to_string(),
            Self::InvalidQuery(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = self.message();
        if status.is_server_error() {
            warn!(kind, error = %message, "request failed");
        }
        let body = json!({
            "error": message,
            "kind": kind,
            "class": self.class().as_str(),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .route("/user/{username}/validate", get(validate_handler))
        .route("/user/{username}/profile", get(profile_handler))
        .route("/user/{username}/scrape", post(scrape_handler))
        .route("/user/{username}/scrape/quick", post(quick_scrape_handler))
        .route(
            "/user/{username}/sync",
            post(start_sync_handler).get(sync_status_handler),
        )
        .route("/sync", get(sync_jobs_handler));

    Router::new()
        .nest("/api/letterboxd", api)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "serving letterboxd integration api");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Response {
    Json(state.service.service_status().await).into_response()
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    let health = state.service.check_health().await;
    let (status, label) = if health.available {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };
    let body = json!({
        "status": label,
        "service": SERVICE_NAME,
        "scraper_available": health.available,
    });
    (status, Json(body)).into_response()
}

async fn validate_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Response> {
    let validation = state.service.validate_user(&username).await?;
    Ok(Json(validation).into_response())
}

async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Response> {
    let profile = state.service.get_profile(&username).await?;
    Ok(Json(profile).into_response())
}

async fn scrape_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    query: Result<Query<ScrapeQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    let result = state
        .service
        .scrape_now(&username, Some(query.options()))
        .await?;
    Ok(Json(result).into_response())
}

async fn quick_scrape_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Response> {
    let result = state.service.scrape_now(&username, None).await?;
    Ok(Json(result).into_response())
}

async fn start_sync_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Response> {
    let job = state.service.start_sync(&username).await?;
    Ok((StatusCode::ACCEPTED, Json(job)).into_response())
}

async fn sync_status_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Response> {
    let job = state.service.get_status(&username).await?;
    Ok(Json(job).into_response())
}

async fn sync_jobs_handler(State(state): State<Arc<AppState>>) -> Response {
    Json(state.service.jobs().await).into_response()
}
