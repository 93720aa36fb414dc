use std::sync::Arc;
use std::time::Duration;

use lbx_core::{HealthStatus, Profile, ScrapeOptions, ScrapeResult, ServiceStatus, SyncJob, ValidationResult};
use tracing::info;

use crate::{
    HealthMonitor, PollConfig, PollOutcome, ScrapeBackend, SyncError, SyncOrchestrator, SyncPoller,
};

/// Operations offered to the rest of the application.
#[derive(Clone)]
pub struct SyncService {
    backend: Arc<dyn ScrapeBackend>,
    orchestrator: SyncOrchestrator,
    poller: SyncPoller,
    health: HealthMonitor,
}

impl SyncService {
    pub fn new(
        backend: Arc<dyn ScrapeBackend>,
        options: ScrapeOptions,
        scrape_timeout: Duration,
        poll: PollConfig,
    ) -> Self {
        let orchestrator = SyncOrchestrator::new(Arc::clone(&backend), options, scrape_timeout);
        Self {
            poller: SyncPoller::new(orchestrator.clone(), poll),
            health: HealthMonitor::new(Arc::clone(&backend)),
            orchestrator,
            backend,
        }
    }

    pub async fn validate_user(&self, username: &str) -> Result<ValidationResult, SyncError> {
        Ok(self.backend.validate_user(username).await?)
    }

    pub async fn get_profile(&self, username: &str) -> Result<Profile, SyncError> {
        Ok(self.backend.get_profile(username).await?)
    }

    pub async fn start_sync(&self, username: &str) -> Result<SyncJob, SyncError> {
        self.orchestrator.start_sync(username).await
    }

    pub async fn get_status(&self, username: &str) -> Result<SyncJob, SyncError> {
        self.orchestrator.get_status(username).await
    }

    pub async fn jobs(&self) -> Vec<SyncJob> {
        self.orchestrator.jobs().await
    }

    /// Start a sync (or join the one already running) and wait for it.
    pub async fn sync_and_wait(&self, username: &str) -> Result<PollOutcome, SyncError> {
        match self.orchestrator.start_sync(username).await {
            Ok(_) => {}
            Err(SyncError::AlreadyRunning { job_id, .. }) => {
                info!(username, %job_id, "joining running sync");
            }
            Err(err) => return Err(err),
        }
        self.poller.poll_until_terminal(username).await
    }

    /// Synchronous scrape outside the job store. `None` takes the quick preset.
    pub async fn scrape_now(
        &self,
        username: &str,
        options: Option<ScrapeOptions>,
    ) -> Result<ScrapeResult, SyncError> {
        let result = match options {
            Some(options) => self.backend.scrape(username, options.clamped()).await?,
            None => self.backend.quick_scrape(username).await?,
        };
        Ok(result)
    }

    /// Fresh health check; also refreshes the cached flag.
    pub async fn check_health(&self) -> HealthStatus {
        self.health.refresh().await
    }

    pub async fn service_status(&self) -> ServiceStatus {
        self.backend.service_status().await
    }

    pub fn orchestrator(&self) -> &SyncOrchestrator {
        &self.orchestrator
    }

    pub fn poller(&self) -> &SyncPoller {
        &self.poller
    }

    pub fn health_monitor(&self) -> &HealthMonitor {
        &self.health
    }
}
