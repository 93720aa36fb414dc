use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lbx_core::HealthStatus;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

use crate::ScrapeBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub available: bool,
    pub checked_at: Option<DateTime<Utc>>,
}

/// Cached scraper availability. Advisory only: nothing in orchestration reads it.
#[derive(Clone)]
pub struct HealthMonitor {
    backend: Arc<dyn ScrapeBackend>,
    snapshot: Arc<RwLock<HealthSnapshot>>,
}

impl HealthMonitor {
    pub fn new(backend: Arc<dyn ScrapeBackend>) -> Self {
        Self {
            backend,
            snapshot: Arc::new(RwLock::new(HealthSnapshot {
                available: false,
                checked_at: None,
            })),
        }
    }

    pub async fn refresh(&self) -> HealthStatus {
        let status = self.backend.health_check().await;
        let mut snapshot = self.snapshot.write().await;
        if snapshot.available != status.available {
            info!(available = status.available, "scraper availability changed");
        }
        *snapshot = HealthSnapshot {
            available: status.available,
            checked_at: Some(Utc::now()),
        };
        status
    }

    pub async fn is_available(&self) -> bool {
        self.snapshot.read().await.available
    }

    pub async fn snapshot(&self) -> HealthSnapshot {
        *self.snapshot.read().await
    }

    /// Start a scheduler that refreshes the cached flag on `cron`.
    pub async fn schedule(&self, cron: &str) -> Result<JobScheduler> {
        let sched = JobScheduler::new().await.context("creating health scheduler")?;
        let monitor = self.clone();
        let job = Job::new_async(cron, move |_uuid, _l| {
            let monitor = monitor.clone();
            Box::pin(async move {
                if !monitor.refresh().await.available {
                    warn!("scheduled health check found the scraper unavailable");
                }
            })
        })
        .with_context(|| format!("creating health job for cron {cron}"))?;
        sched.add(job).await.context("adding health job")?;
        sched.start().await.context("starting health scheduler")?;
        Ok(sched)
    }
}
