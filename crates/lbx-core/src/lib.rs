//! Core domain model for the Letterboxd sync pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CRATE_NAME: &str = "lbx-core";

pub const MIN_RATING_LIMIT: u32 = 1;
pub const MAX_RATING_LIMIT: u32 = 1000;
pub const DEFAULT_RATING_LIMIT: u32 = 100;
pub const QUICK_RATING_LIMIT: u32 = 50;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Letterboxd member profile as shaped by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub joined_date: Option<String>,
    pub films_watched: Option<u32>,
    pub followers: Option<u32>,
    pub following: Option<u32>,
}

impl Profile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: None,
            bio: None,
            location: None,
            website: None,
            joined_date: None,
            films_watched: None,
            followers: None,
            following: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub film_title: String,
    pub film_year: Option<i32>,
    pub film_slug: Option<String>,
    /// Stars on the 0-5 scale; the range is not enforced here.
    pub rating: Option<f64>,
    pub watched_date: Option<String>,
    pub review: Option<String>,
    pub source_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistFilm {
    pub film_title: String,
    pub film_year: Option<i32>,
    pub film_slug: Option<String>,
    pub directors: Vec<String>,
    pub genres: Vec<String>,
    pub added_date: Option<String>,
    pub source_uri: Option<String>,
}

/// Options forwarded to the scraper service with a full scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOptions {
    pub include_ratings: bool,
    pub include_watchlist: bool,
    pub rating_limit: u32,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            include_ratings: true,
            include_watchlist: true,
            rating_limit: DEFAULT_RATING_LIMIT,
        }
    }
}

impl ScrapeOptions {
    /// Preset served by the scraper's quick endpoint.
    pub fn quick() -> Self {
        Self {
            rating_limit: QUICK_RATING_LIMIT,
            ..Self::default()
        }
    }

    pub fn with_rating_limit(mut self, limit: i64) -> Self {
        self.rating_limit = clamp_rating_limit(limit);
        self
    }

    pub fn clamped(self) -> Self {
        let limit = i64::from(self.rating_limit);
        self.with_rating_limit(limit)
    }

    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        let clamped = self.clamped();
        [
            ("includeRatings", clamped.include_ratings.to_string()),
            ("includeWatchlist", clamped.include_watchlist.to_string()),
            ("ratingLimit", clamped.rating_limit.to_string()),
        ]
    }
}

pub fn clamp_rating_limit(limit: i64) -> u32 {
    limit.clamp(i64::from(MIN_RATING_LIMIT), i64::from(MAX_RATING_LIMIT)) as u32
}

/// Aggregate scrape outcome. Totals are derived from the sequences and a failed
/// result never carries partial data, so construction goes through
/// [`ScrapeResult::succeeded`] and [`ScrapeResult::failed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    username: String,
    profile: Option<Profile>,
    ratings: Vec<Rating>,
    watchlist: Vec<WatchlistFilm>,
    scraped_at: DateTime<Utc>,
    processing_time_secs: Option<f64>,
    total_ratings: usize,
    total_watchlist_items: usize,
    success: bool,
    error_message: Option<String>,
}

impl ScrapeResult {
    pub fn succeeded(
        username: impl Into<String>,
        profile: Option<Profile>,
        ratings: Vec<Rating>,
        watchlist: Vec<WatchlistFilm>,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        let mut result = Self {
            username: username.into(),
            profile,
            ratings,
            watchlist,
            scraped_at,
            processing_time_secs: None,
            total_ratings: 0,
            total_watchlist_items: 0,
            success: true,
            error_message: None,
        };
        result.recount();
        result
    }

    pub fn failed(
        username: impl Into<String>,
        message: impl Into<String>,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        };
        Self {
            username: username.into(),
            profile: None,
            ratings: Vec::new(),
            watchlist: Vec::new(),
            scraped_at,
            processing_time_secs: None,
            total_ratings: 0,
            total_watchlist_items: 0,
            success: false,
            error_message: Some(message),
        }
    }

    pub fn with_processing_time(mut self, secs: Option<f64>) -> Self {
        self.processing_time_secs = secs;
        self
    }

    /// Drop whatever the caller did not ask for and cap ratings at the limit.
    pub fn restrict_to(&mut self, options: &ScrapeOptions) {
        let options = options.clamped();
        if !options.include_ratings {
            self.ratings.clear();
        }
        if !options.include_watchlist {
            self.watchlist.clear();
        }
        self.ratings.truncate(options.rating_limit as usize);
        self.recount();
    }

    fn recount(&mut self) {
        self.total_ratings = self.ratings.len();
        self.total_watchlist_items = self.watchlist.len();
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn watchlist(&self) -> &[WatchlistFilm] {
        &self.watchlist
    }

    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }

    pub fn processing_time_secs(&self) -> Option<f64> {
        self.processing_time_secs
    }

    pub fn total_ratings(&self) -> usize {
        self.total_ratings
    }

    pub fn total_watchlist_items(&self) -> usize {
        self.total_watchlist_items
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub username: String,
    pub exists: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub available: bool,
    pub status: Option<String>,
    pub service: Option<String>,
}

impl HealthStatus {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            status: None,
            service: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_ms: u64,
    pub healthy: bool,
}

/// How a caller should react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Transient; the same request may succeed later.
    TryAgain,
    /// The request can never succeed as issued.
    WontWork,
    /// Something upstream or in this pipeline is defective.
    Broken,
}

impl FailureClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TryAgain => "try_again",
            Self::WontWork => "wont_work",
            Self::Broken => "broken",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl SyncStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn can_advance_to(self, next: SyncStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress)
                | (Self::InProgress, Self::Completed)
                | (Self::InProgress, Self::Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonically increasing sync job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One sync attempt for a username. Status only moves forward.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncJob {
    job_id: JobId,
    run_id: Uuid,
    username: String,
    status: SyncStatus,
    started_at: DateTime<Utc>,
    last_polled_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    result: Option<ScrapeResult>,
}

impl SyncJob {
    pub fn pending(job_id: JobId, username: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            job_id,
            run_id: Uuid::new_v4(),
            username: username.into(),
            status: SyncStatus::Pending,
            started_at,
            last_polled_at: None,
            completed_at: None,
            last_error: None,
            result: None,
        }
    }

    pub fn begin(&mut self) -> bool {
        self.advance(SyncStatus::InProgress)
    }

    pub fn complete(&mut self, result: ScrapeResult, at: DateTime<Utc>) -> bool {
        if !self.advance(SyncStatus::Completed) {
            return false;
        }
        self.completed_at = Some(at);
        self.result = Some(result);
        true
    }

    pub fn fail(&mut self, message: impl Into<String>, at: DateTime<Utc>) -> bool {
        if !self.advance(SyncStatus::Failed) {
            return false;
        }
        self.completed_at = Some(at);
        self.last_error = Some(message.into());
        true
    }

    /// Stamp a snapshot with the time a poller observed it.
    pub fn observed_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_polled_at = Some(at);
        self
    }

    fn advance(&mut self, next: SyncStatus) -> bool {
        if !self.status.can_advance_to(next) {
            return false;
        }
        self.status = next;
        true
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn last_polled_at(&self) -> Option<DateTime<Utc>> {
        self.last_polled_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn result(&self) -> Option<&ScrapeResult> {
        self.result.as_ref()
    }
}
