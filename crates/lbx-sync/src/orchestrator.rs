use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use lbx_client::ScraperError;
use lbx_core::{JobId, ScrapeOptions, ScrapeResult, SyncJob};
use tokio::sync::Mutex;
use tracing::{info, info_span, warn, Instrument};

use crate::{ScrapeBackend, SyncError};

const TASK_ABORTED: &str = "scrape task aborted";

/// Owns the per-username job store. One active job per username; completions
/// are applied only while their job is still the current one.
#[derive(Clone)]
pub struct SyncOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    backend: Arc<dyn ScrapeBackend>,
    jobs: Mutex<HashMap<String, SyncJob>>,
    last_job_id: AtomicU64,
    options: ScrapeOptions,
    scrape_timeout: Duration,
}

type Outcome = Result<ScrapeResult, String>;

impl SyncOrchestrator {
    pub fn new(
        backend: Arc<dyn ScrapeBackend>,
        options: ScrapeOptions,
        scrape_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                jobs: Mutex::new(HashMap::new()),
                last_job_id: AtomicU64::new(0),
                options: options.clamped(),
                scrape_timeout,
            }),
        }
    }

    pub fn options(&self) -> ScrapeOptions {
        self.inner.options
    }

    /// Register a job, dispatch its scrape and return the `InProgress`
    /// snapshot without waiting for the scrape.
    pub async fn start_sync(&self, username: &str) -> Result<SyncJob, SyncError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ScraperError::InvalidUsername.into());
        }

        let job = {
            let mut jobs = self.inner.jobs.lock().await;
            if let Some(existing) = jobs.get(username).filter(|job| !job.status().is_terminal()) {
                return Err(SyncError::AlreadyRunning {
                    username: username.to_string(),
                    job_id: existing.job_id(),
                });
            }
            let job_id = JobId(self.inner.last_job_id.fetch_add(1, Ordering::SeqCst) + 1);
            let mut job = SyncJob::pending(job_id, username, Utc::now());
            job.begin();
            jobs.insert(username.to_string(), job.clone());
            job
        };

        info!(username, job_id = %job.job_id(), run_id = %job.run_id(), "sync started");
        self.dispatch(&job);
        Ok(job)
    }

    pub async fn get_status(&self, username: &str) -> Result<SyncJob, SyncError> {
        let username = username.trim();
        self.inner
            .jobs
            .lock()
            .await
            .get(username)
            .cloned()
            .ok_or_else(|| SyncError::NoSyncFound {
                username: username.to_string(),
            })
    }

    /// Snapshots of every known job, ordered by username.
    pub async fn jobs(&self) -> Vec<SyncJob> {
        let mut jobs: Vec<SyncJob> = self.inner.jobs.lock().await.values().cloned().collect();
        jobs.sort_by(|a, b| a.username().cmp(b.username()));
        jobs
    }

    fn dispatch(&self, job: &SyncJob) {
        let orchestrator = self.clone();
        let username = job.username().to_string();
        let job_id = job.job_id();
        let span = info_span!("sync_job", run_id = %job.run_id(), %job_id, username = %username);

        tokio::spawn(
            async move {
                let outcome = orchestrator.run_scrape(&username).await;
                orchestrator.apply(&username, job_id, outcome).await;
            }
            .instrument(span),
        );
    }

    /// The scrape runs in its own task so a panic or an overrun still yields a
    /// terminal outcome for the job.
    async fn run_scrape(&self, username: &str) -> Outcome {
        let backend = Arc::clone(&self.inner.backend);
        let options = self.inner.options;
        let owned = username.to_string();
        let mut task =
            tokio::spawn(async move { backend.scrape(&owned, options).await }.in_current_span());

        match tokio::time::timeout(self.inner.scrape_timeout, &mut task).await {
            Ok(Ok(Ok(result))) if result.success() => Ok(result),
            Ok(Ok(Ok(result))) => Err(result
                .error_message()
                .unwrap_or("Unknown error")
                .to_string()),
            Ok(Ok(Err(err))) => Err(err.to_string()),
            Ok(Err(join_err)) => {
                warn!(error = %join_err, "scrape task did not finish");
                Err(TASK_ABORTED.to_string())
            }
            Err(_) => {
                task.abort();
                Err(format!(
                    "scrape timed out after {}s",
                    self.inner.scrape_timeout.as_secs()
                ))
            }
        }
    }

    async fn apply(&self, username: &str, job_id: JobId, outcome: Outcome) {
        let mut jobs = self.inner.jobs.lock().await;
        let Some(job) = jobs.get_mut(username).filter(|job| job.job_id() == job_id) else {
            warn!(username, %job_id, "discarding completion for a superseded job");
            return;
        };

        let now = Utc::now();
        match outcome {
            Ok(result) => {
                let total_ratings = result.total_ratings();
                let total_watchlist_items = result.total_watchlist_items();
                if job.complete(result, now) {
                    info!(total_ratings, total_watchlist_items, "sync completed");
                }
            }
            Err(message) => {
                warn!(error = %message, "sync failed");
                job.fail(message, now);
            }
        }
    }
}
