//! HTTP client for the external Letterboxd scraper service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::Utc;
use lbx_core::{
    FailureClass, HealthStatus, Profile, ScrapeOptions, ScrapeResult, ServiceStatus,
    ValidationResult,
};
use lbx_normalize::{
    normalize_health, normalize_profile, normalize_scrape_result, normalize_service_status,
    normalize_validation, parse_body, upstream_error_message, validation_message,
    NormalizationError,
};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const CRATE_NAME: &str = "lbx-client";

const MAX_ERROR_SNIPPET: usize = 200;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("letterboxd integration is disabled")]
    Disabled,
    #[error("username must not be blank")]
    InvalidUsername,
    #[error("scraper service not reachable: {message}")]
    NotReachable { message: String },
    #[error("letterboxd user '{username}' not found")]
    NotFound { username: String },
    #[error("scraper service returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
}

impl ScraperError {
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Disabled | Self::NotReachable { .. } => FailureClass::TryAgain,
            Self::InvalidUsername | Self::NotFound { .. } => FailureClass::WontWork,
            Self::Upstream { status, .. } => StatusCode::from_u16(*status)
                .map(classify_status)
                .unwrap_or(FailureClass::Broken),
            Self::Normalization(err) => err.class(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.class() == FailureClass::TryAgain
    }
}

/// Overloaded or failing upstreams may recover; any other non-2xx is a defect.
pub fn classify_status(status: StatusCode) -> FailureClass {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        FailureClass::TryAgain
    } else {
        FailureClass::Broken
    }
}

fn transport_error(err: reqwest::Error) -> ScraperError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    ScraperError::NotReachable { message }
}

#[derive(Debug, Clone)]
pub struct ScraperClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: Option<String>,
    pub enabled: bool,
    pub max_in_flight: usize,
}

impl Default for ScraperClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout: Duration::from_millis(30_000),
            user_agent: Some("lbx-sync/0.1".to_string()),
            enabled: true,
            max_in_flight: 8,
        }
    }
}

/// Stateless apart from the connection pool and the in-flight limit; cheap to clone.
#[derive(Debug, Clone)]
pub struct ScraperClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    enabled: bool,
    in_flight: Arc<Semaphore>,
}

struct Reply {
    status: StatusCode,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Result<JsonValue, NormalizationError> {
        parse_body(&self.body)
    }

    fn upstream_error(&self) -> ScraperError {
        let message = parse_body(&self.body)
            .ok()
            .as_ref()
            .and_then(upstream_error_message)
            .or_else(|| {
                let text = String::from_utf8_lossy(&self.body);
                let text = text.trim();
                (!text.is_empty()).then(|| text.chars().take(MAX_ERROR_SNIPPET).collect())
            })
            .unwrap_or_else(|| {
                self.status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });
        ScraperError::Upstream {
            status: self.status.as_u16(),
            message,
        }
    }
}

impl ScraperClient {
    pub fn new(config: ScraperClientConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .with_context(|| format!("parsing scraper base url {:?}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("scraper base url {base_url} cannot carry path segments");
        }

        let mut builder = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(config.timeout);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let http = builder.build().context("building reqwest client")?;

        Ok(Self {
            http,
            base_url,
            timeout: config.timeout,
            enabled: config.enabled,
            in_flight: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
        })
    }

    pub async fn validate_user(&self, username: &str) -> Result<ValidationResult, ScraperError> {
        let username = self.checked_username(username)?;
        let url = self.user_endpoint(username, &["validate"]);
        let span = info_span!("scraper_request", request_id = %Uuid::new_v4(), op = "validate", username);

        async {
            let reply = self.execute(self.http.get(url)).await?;
            if reply.status == StatusCode::NOT_FOUND {
                return Ok(ValidationResult {
                    username: username.to_string(),
                    exists: false,
                    message: validation_message(username, false),
                });
            }
            if !reply.status.is_success() {
                return Err(reply.upstream_error());
            }
            let body = reply.json()?;
            let validation = normalize_validation(&body, username).inspect_err(|err| {
                warn!(username, error = %err, "validation response could not be normalized");
            })?;
            debug!(exists = validation.exists, "validated username");
            Ok(validation)
        }
        .instrument(span)
        .await
    }

    pub async fn get_profile(&self, username: &str) -> Result<Profile, ScraperError> {
        let username = self.checked_username(username)?;
        let url = self.user_endpoint(username, &["profile"]);
        let span = info_span!("scraper_request", request_id = %Uuid::new_v4(), op = "profile", username);

        async {
            let reply = self.execute(self.http.get(url)).await?;
            if reply.status == StatusCode::NOT_FOUND {
                return Err(ScraperError::NotFound {
                    username: username.to_string(),
                });
            }
            if !reply.status.is_success() {
                return Err(reply.upstream_error());
            }
            let body = reply.json()?;
            normalize_profile(&body)
                .inspect_err(|err| warn!(username, error = %err, "profile could not be normalized"))
                .map_err(ScraperError::from)
        }
        .instrument(span)
        .await
    }

    /// Full scrape. Options travel as query parameters and are enforced again
    /// on the normalized result.
    pub async fn scrape(
        &self,
        username: &str,
        options: ScrapeOptions,
    ) -> Result<ScrapeResult, ScraperError> {
        let username = self.checked_username(username)?;
        let options = options.clamped();
        let url = self.user_endpoint(username, &["scrape"]);
        let span = info_span!(
            "scraper_request",
            request_id = %Uuid::new_v4(),
            op = "scrape",
            username,
            rating_limit = options.rating_limit
        );

        async {
            let request = self.http.post(url).query(&options.query_pairs());
            self.scrape_request(username, request, &options).await
        }
        .instrument(span)
        .await
    }

    /// Quick scrape through the scraper's dedicated preset endpoint.
    pub async fn quick_scrape(&self, username: &str) -> Result<ScrapeResult, ScraperError> {
        let username = self.checked_username(username)?;
        let url = self.user_endpoint(username, &["scrape", "quick"]);
        let span = info_span!("scraper_request", request_id = %Uuid::new_v4(), op = "quick_scrape", username);

        async {
            self.scrape_request(username, self.http.post(url), &ScrapeOptions::quick())
                .await
        }
        .instrument(span)
        .await
    }

    /// Never fails: every problem reads as `available = false`.
    pub async fn health_check(&self) -> HealthStatus {
        if !self.enabled {
            return HealthStatus::unavailable();
        }
        let url = self.endpoint(&["health"]);
        let span = info_span!("scraper_request", request_id = %Uuid::new_v4(), op = "health");

        async {
            let reply = match self.execute(self.http.get(url)).await {
                Ok(reply) => reply,
                Err(err) => {
                    warn!(error = %err, "scraper health check failed");
                    return HealthStatus::unavailable();
                }
            };
            let health = reply
                .json()
                .map(|body| normalize_health(&body))
                .unwrap_or_else(|_| HealthStatus::unavailable());
            if reply.status.is_success() {
                health
            } else {
                warn!(status = reply.status.as_u16(), "scraper reported unhealthy");
                HealthStatus {
                    available: false,
                    ..health
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Upstream status when the service reports one, otherwise the local view
    /// with `healthy` taken from a health check.
    pub async fn service_status(&self) -> ServiceStatus {
        let local = ServiceStatus {
            enabled: self.enabled,
            base_url: self.base_url.to_string(),
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            healthy: false,
        };
        if !self.enabled {
            return local;
        }

        let url = self.endpoint(&["status"]);
        let upstream = self
            .execute(self.http.get(url))
            .instrument(info_span!("scraper_request", request_id = %Uuid::new_v4(), op = "status"))
            .await
            .ok()
            .filter(|reply| reply.status.is_success())
            .and_then(|reply| reply.json().ok())
            .and_then(|body| normalize_service_status(&body, &local).ok());

        match upstream {
            Some(status) => status,
            None => ServiceStatus {
                healthy: self.health_check().await.available,
                ..local
            },
        }
    }

    async fn scrape_request(
        &self,
        username: &str,
        request: RequestBuilder,
        options: &ScrapeOptions,
    ) -> Result<ScrapeResult, ScraperError> {
        let reply = self.execute(request).await?;
        if reply.status == StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                username: username.to_string(),
            });
        }
        if !reply.status.is_success() {
            return Err(reply.upstream_error());
        }
        let body = reply.json()?;
        let mut result = normalize_scrape_result(&body, username, Utc::now()).inspect_err(|err| {
            warn!(username, error = %err, "scrape result could not be normalized");
        })?;
        result.restrict_to(options);
        info!(
            success = result.success(),
            total_ratings = result.total_ratings(),
            total_watchlist_items = result.total_watchlist_items(),
            "scrape finished"
        );
        Ok(result)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Reply, ScraperError> {
        // The semaphore is never closed, so a failed acquire only means no limit.
        let _permit = self.in_flight.acquire().await.ok();
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;
        Ok(Reply {
            status,
            body: body.to_vec(),
        })
    }

    fn checked_username<'a>(&self, username: &'a str) -> Result<&'a str, ScraperError> {
        if !self.enabled {
            return Err(ScraperError::Disabled);
        }
        let username = username.trim();
        if username.is_empty() {
            return Err(ScraperError::InvalidUsername);
        }
        Ok(username)
    }

    fn user_endpoint(&self, username: &str, tail: &[&str]) -> Url {
        let mut url = self.endpoint(&["user", username]);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(tail);
        }
        url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
