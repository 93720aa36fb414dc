//! Sync job orchestration, bounded polling and health monitoring on top of
//! the scraper client.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use lbx_client::{ScraperClient, ScraperClientConfig, ScraperError};
use lbx_core::{
    FailureClass, HealthStatus, JobId, Profile, ScrapeOptions, ScrapeResult, ServiceStatus,
    ValidationResult,
};
use thiserror::Error;

mod health;
mod orchestrator;
mod poller;
mod service;

pub use health::{HealthMonitor, HealthSnapshot};
pub use orchestrator::SyncOrchestrator;
pub use poller::{PollConfig, PollHandle, PollOutcome, SyncPoller, MIN_POLL_INTERVAL};
pub use service::SyncService;

pub const CRATE_NAME: &str = "lbx-sync";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("a sync for '{username}' is already running (job {job_id})")]
    AlreadyRunning { username: String, job_id: JobId },
    #[error("no sync has been started for '{username}'")]
    NoSyncFound { username: String },
    #[error("stopped waiting for the sync of '{username}' after {waited:?}")]
    PollTimeout { username: String, waited: Duration },
    #[error(transparent)]
    Scraper(#[from] ScraperError),
}

impl SyncError {
    pub fn class(&self) -> FailureClass {
        match self {
            Self::AlreadyRunning { .. } | Self::PollTimeout { .. } => FailureClass::TryAgain,
            Self::NoSyncFound { .. } => FailureClass::WontWork,
            Self::Scraper(err) => err.class(),
        }
    }
}

/// Seam between orchestration and the scraper service.
#[async_trait]
pub trait ScrapeBackend: Send + Sync {
    async fn validate_user(&self, username: &str) -> Result<ValidationResult, ScraperError>;
    async fn get_profile(&self, username: &str) -> Result<Profile, ScraperError>;
    async fn scrape(
        &self,
        username: &str,
        options: ScrapeOptions,
    ) -> Result<ScrapeResult, ScraperError>;
    async fn quick_scrape(&self, username: &str) -> Result<ScrapeResult, ScraperError>;
    async fn health_check(&self) -> HealthStatus;
    async fn service_status(&self) -> ServiceStatus;
}

#[async_trait]
impl ScrapeBackend for ScraperClient {
    async fn validate_user(&self, username: &str) -> Result<ValidationResult, ScraperError> {
        ScraperClient::validate_user(self, username).await
    }

    async fn get_profile(&self, username: &str) -> Result<Profile, ScraperError> {
        ScraperClient::get_profile(self, username).await
    }

    async fn scrape(
        &self,
        username: &str,
        options: ScrapeOptions,
    ) -> Result<ScrapeResult, ScraperError> {
        ScraperClient::scrape(self, username, options).await
    }

    async fn quick_scrape(&self, username: &str) -> Result<ScrapeResult, ScraperError> {
        ScraperClient::quick_scrape(self, username).await
    }

    async fn health_check(&self) -> HealthStatus {
        ScraperClient::health_check(self).await
    }

    async fn service_status(&self) -> ServiceStatus {
        ScraperClient::service_status(self).await
    }
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub scraper_base_url: String,
    pub scraper_timeout_ms: u64,
    pub scraper_enabled: bool,
    pub user_agent: String,
    pub max_in_flight: usize,
    pub scrape_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub poll_deadline_secs: u64,
    pub health_scheduler_enabled: bool,
    pub health_cron: String,
    pub web_port: u16,
}

impl SyncConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
                .unwrap_or(default)
        };

        Self {
            scraper_base_url: lookup("LBX_SCRAPER_BASE_URL")
                .unwrap_or_else(|| "http://localhost:5000/api".to_string()),
            scraper_timeout_ms: number("LBX_SCRAPER_TIMEOUT_MS", 30_000),
            scraper_enabled: flag("LBX_SCRAPER_ENABLED", true),
            user_agent: lookup("LBX_USER_AGENT").unwrap_or_else(|| "lbx-sync/0.1".to_string()),
            max_in_flight: usize::try_from(number("LBX_MAX_IN_FLIGHT", 8)).unwrap_or(8),
            scrape_timeout_secs: number("LBX_SCRAPE_TIMEOUT_SECS", 600),
            poll_interval_secs: number("LBX_POLL_INTERVAL_SECS", 3),
            poll_deadline_secs: number("LBX_POLL_DEADLINE_SECS", 300),
            health_scheduler_enabled: flag("LBX_HEALTH_SCHEDULER_ENABLED", false),
            health_cron: lookup("LBX_HEALTH_CRON").unwrap_or_else(|| "0 */5 * * * *".to_string()),
            web_port: u16::try_from(number("LBX_WEB_PORT", 8000)).unwrap_or(8000),
        }
    }

    pub fn client_config(&self) -> ScraperClientConfig {
        ScraperClientConfig {
            base_url: self.scraper_base_url.clone(),
            timeout: Duration::from_millis(self.scraper_timeout_ms),
            user_agent: Some(self.user_agent.clone()),
            enabled: self.scraper_enabled,
            max_in_flight: self.max_in_flight,
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            deadline: Duration::from_secs(self.poll_deadline_secs),
        }
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs.max(1))
    }

    pub fn build_service(&self) -> Result<SyncService> {
        let client = ScraperClient::new(self.client_config())?;
        Ok(SyncService::new(
            Arc::new(client),
            ScrapeOptions::default(),
            self.scrape_timeout(),
            self.poll_config(),
        ))
    }
}
