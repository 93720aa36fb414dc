use std::time::Duration;

use chrono::Utc;
use lbx_core::SyncJob;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::{SyncError, SyncOrchestrator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub deadline: Duration,
}

/// Floor applied to [`PollConfig::interval`]; a zero period cannot tick.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            deadline: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollOutcome {
    /// Terminal snapshot, stamped with the time the poller observed it.
    pub job: SyncJob,
    pub polls: u32,
}

/// Observes a job until it is terminal or the deadline passes. Polling never
/// touches the job itself.
#[derive(Clone)]
pub struct SyncPoller {
    orchestrator: SyncOrchestrator,
    config: PollConfig,
}

impl SyncPoller {
    pub fn new(orchestrator: SyncOrchestrator, config: PollConfig) -> Self {
        Self {
            orchestrator,
            config: PollConfig {
                interval: config.interval.max(MIN_POLL_INTERVAL),
                ..config
            },
        }
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    pub async fn poll_until_terminal(&self, username: &str) -> Result<PollOutcome, SyncError> {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = tokio::time::sleep(self.config.deadline);
        tokio::pin!(deadline);
        let mut polls = 0u32;

        loop {
            tokio::select! {
                biased;
                _ = &mut deadline => {
                    warn!(username, polls, "poll deadline reached");
                    return Err(SyncError::PollTimeout {
                        username: username.trim().to_string(),
                        waited: self.config.deadline,
                    });
                }
                _ = ticker.tick() => {
                    polls += 1;
                    let job = self.orchestrator.get_status(username).await?;
                    if job.status().is_terminal() {
                        info!(username, polls, status = %job.status(), "sync reached terminal state");
                        return Ok(PollOutcome {
                            job: job.observed_at(Utc::now()),
                            polls,
                        });
                    }
                    debug!(username, polls, status = %job.status(), "sync still running");
                }
            }
        }
    }

    /// Run the loop as its own task. The returned handle stops it on
    /// `cancel()` or drop.
    pub fn spawn(&self, username: &str) -> PollHandle {
        let poller = self.clone();
        let username = username.to_string();
        PollHandle {
            task: Some(tokio::spawn(async move {
                poller.poll_until_terminal(&username).await
            })),
        }
    }
}

#[derive(Debug)]
pub struct PollHandle {
    task: Option<JoinHandle<Result<PollOutcome, SyncError>>>,
}

impl PollHandle {
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// `None` when the loop was cancelled before it produced an outcome.
    pub async fn join(mut self) -> Option<Result<PollOutcome, SyncError>> {
        let task = self.task.take()?;
        task.await.ok()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Behavior, FakeBackend};
    use lbx_core::{ScrapeOptions, SyncStatus};

    fn poller(behavior: Behavior) -> SyncPoller {
        let orchestrator = SyncOrchestrator::new(
            FakeBackend::new(behavior),
            ScrapeOptions::default(),
            Duration::from_secs(3600),
        );
        SyncPoller::new(
            orchestrator,
            PollConfig {
                interval: Duration::from_secs(1),
                deadline: Duration::from_secs(10),
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn never_terminating_job_times_out_and_stays_in_progress() {
        let poller = poller(Behavior::Hang);
        poller.orchestrator.start_sync("alice").await.unwrap();

        let started = tokio::time::Instant::now();
        let err = poller.poll_until_terminal("alice").await.unwrap_err();
        assert!(matches!(err, SyncError::PollTimeout { waited, .. } if waited == Duration::from_secs(10)));
        assert!(started.elapsed() >= Duration::from_secs(10));

        let job = poller.orchestrator.get_status("alice").await.unwrap();
        assert_eq!(job.status(), SyncStatus::InProgress);
        assert!(job.last_polled_at().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_raised_to_floor() {
        let orchestrator = SyncOrchestrator::new(
            FakeBackend::new(Behavior::Hang),
            ScrapeOptions::default(),
            Duration::from_secs(3600),
        );
        let poller = SyncPoller::new(
            orchestrator,
            PollConfig {
                interval: Duration::ZERO,
                deadline: Duration::from_secs(1),
            },
        );
        assert_eq!(poller.config().interval, MIN_POLL_INTERVAL);
        assert_eq!(poller.config().deadline, Duration::from_secs(1));

        poller.orchestrator.start_sync("alice").await.unwrap();
        let err = poller.poll_until_terminal("alice").await.unwrap_err();
        assert!(matches!(err, SyncError::PollTimeout { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_job_is_returned_with_observation_stamp() {
        let poller = poller(Behavior::Ratings(2));
        poller.orchestrator.start_sync("alice").await.unwrap();

        let outcome = poller.poll_until_terminal("alice").await.unwrap();
        assert_eq!(outcome.job.status(), SyncStatus::Completed);
        assert!(outcome.job.last_polled_at().is_some());
        assert!(outcome.polls >= 1 && outcome.polls <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_unknown_username_fails_fast() {
        let poller = poller(Behavior::Ratings(1));
        let err = poller.poll_until_terminal("nobody").await.unwrap_err();
        assert!(matches!(err, SyncError::NoSyncFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_poll_can_be_joined() {
        let poller = poller(Behavior::ApplicationFailure("rate limited"));
        poller.orchestrator.start_sync("alice").await.unwrap();

        let handle = poller.spawn("alice");
        let outcome = handle.join().await.unwrap().unwrap();
        assert_eq!(outcome.job.status(), SyncStatus::Failed);
        assert_eq!(outcome.job.last_error(), Some("rate limited"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_poll_yields_no_outcome() {
        let poller = poller(Behavior::Hang);
        poller.orchestrator.start_sync("alice").await.unwrap();

        let mut handle = poller.spawn("alice");
        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.cancel();
        assert!(handle.is_finished());
        assert!(handle.join().await.is_none());

        let job = poller.orchestrator.get_status("alice").await.unwrap();
        assert_eq!(job.status(), SyncStatus::InProgress);
    }
}
