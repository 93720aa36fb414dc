//! Field normalizer: shapes untyped scraper payloads into the core model.
//!
//! The scraper service answers in two naming dialects (camelCase and
//! snake_case) and older clients used a third, shorter one for film records.
//! Every field is resolved through an explicit key list, canonical name first;
//! a value is accepted only when it already has the expected JSON kind.

use chrono::{DateTime, NaiveDateTime, Utc};
use lbx_core::{
    FailureClass, HealthStatus, Profile, Rating, ScrapeResult, ServiceStatus, ValidationResult,
    WatchlistFilm,
};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

pub const CRATE_NAME: &str = "lbx-normalize";

type JsonObject = Map<String, JsonValue>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("expected a JSON object for {context}, found {found}")]
    NotAnObject {
        context: &'static str,
        found: &'static str,
    },
    #[error("{context} has no username")]
    MissingUsername { context: &'static str },
    #[error("response body is not valid JSON: {0}")]
    MalformedBody(String),
}

impl NormalizationError {
    pub fn class(&self) -> FailureClass {
        FailureClass::Broken
    }
}

pub mod keys {
    //! Resolution lists, canonical name first.

    pub const USERNAME: &[&str] = &["username", "userName", "user_name"];
    pub const DISPLAY_NAME: &[&str] = &["displayName", "display_name"];
    pub const BIO: &[&str] = &["bio"];
    pub const LOCATION: &[&str] = &["location"];
    pub const WEBSITE: &[&str] = &["website"];
    pub const JOINED_DATE: &[&str] = &["joinedDate", "joined_date"];
    pub const FILMS_WATCHED: &[&str] = &["filmsWatched", "films_watched", "totalFilms"];
    pub const FOLLOWERS: &[&str] = &["followers"];
    pub const FOLLOWING: &[&str] = &["following"];

    pub const FILM_TITLE: &[&str] = &["filmTitle", "film_title", "title"];
    pub const FILM_YEAR: &[&str] = &["filmYear", "film_year", "year"];
    pub const FILM_SLUG: &[&str] = &["filmSlug", "film_slug", "slug"];
    pub const RATING: &[&str] = &["rating"];
    pub const WATCHED_DATE: &[&str] = &["watchedDate", "watched_date"];
    pub const REVIEW: &[&str] = &["review"];
    pub const SOURCE_URI: &[&str] = &[
        "sourceUri",
        "source_uri",
        "letterboxdUri",
        "letterboxd_uri",
        "letterboxdUrl",
    ];
    pub const DIRECTORS: &[&str] = &["directors", "director"];
    pub const GENRES: &[&str] = &["genres", "genre"];
    pub const ADDED_DATE: &[&str] = &["addedDate", "added_date"];

    pub const PROFILE: &[&str] = &["profile"];
    pub const RATINGS: &[&str] = &["ratings"];
    pub const WATCHLIST: &[&str] = &["watchlist"];
    pub const SCRAPED_AT: &[&str] = &["scrapedAt", "scraped_at"];
    pub const PROCESSING_TIME: &[&str] = &["processingTimeSecs", "processingTime", "processing_time"];
    pub const SUCCESS: &[&str] = &["success"];
    pub const ERROR_MESSAGE: &[&str] = &["errorMessage", "error_message", "error", "detail"];

    pub const EXISTS: &[&str] = &["exists"];
    pub const MESSAGE: &[&str] = &["message"];

    pub const STATUS: &[&str] = &["status"];
    pub const SERVICE: &[&str] = &["service"];
    pub const SCRAPER_AVAILABLE: &[&str] = &["scraperAvailable", "scraper_available", "available"];

    pub const ENABLED: &[&str] = &["enabled"];
    pub const BASE_URL: &[&str] = &["baseUrl", "base_url"];
    pub const TIMEOUT_MS: &[&str] = &["timeoutMs", "timeout_ms", "timeout"];
    pub const HEALTHY: &[&str] = &["healthy"];
}

pub fn parse_body(bytes: &[u8]) -> Result<JsonValue, NormalizationError> {
    serde_json::from_slice(bytes).map_err(|e| NormalizationError::MalformedBody(e.to_string()))
}

pub fn normalize_profile(raw: &JsonValue) -> Result<Profile, NormalizationError> {
    let obj = as_object(raw, "profile")?;
    profile_from_object(obj)
}

/// Returns `None` when the entry has no usable film title.
pub fn normalize_rating(raw: &JsonValue) -> Option<Rating> {
    raw.as_object().and_then(rating_from_object)
}

pub fn normalize_ratings(raw: &JsonValue) -> Vec<Rating> {
    normalize_list(raw, rating_from_object)
}

/// Returns `None` when the entry has no usable film title.
pub fn normalize_watchlist_film(raw: &JsonValue) -> Option<WatchlistFilm> {
    raw.as_object().and_then(watchlist_film_from_object)
}

pub fn normalize_watchlist(raw: &JsonValue) -> Vec<WatchlistFilm> {
    normalize_list(raw, watchlist_film_from_object)
}

/// Shape a scrape response. Upstream totals are ignored; a missing half
/// (ratings or watchlist) becomes an empty sequence.
pub fn normalize_scrape_result(
    raw: &JsonValue,
    requested_username: &str,
    received_at: DateTime<Utc>,
) -> Result<ScrapeResult, NormalizationError> {
    let obj = as_object(raw, "scrape result")?;
    let username = text(obj, keys::USERNAME).unwrap_or_else(|| requested_username.trim().to_string());
    let scraped_at = resolve(obj, keys::SCRAPED_AT, |v| v.as_str().and_then(parse_timestamp))
        .unwrap_or(received_at);
    let processing_time = number(obj, keys::PROCESSING_TIME);

    if !flag(obj, keys::SUCCESS).unwrap_or(true) {
        let message = text(obj, keys::ERROR_MESSAGE).unwrap_or_default();
        return Ok(ScrapeResult::failed(username, message, scraped_at).with_processing_time(processing_time));
    }

    let profile = match resolve(obj, keys::PROFILE, |v| (!v.is_null()).then_some(v)) {
        Some(value) => Some(normalize_profile(value)?),
        None => None,
    };
    let ratings = list_field(obj, keys::RATINGS)
        .map(normalize_ratings)
        .unwrap_or_default();
    let watchlist = list_field(obj, keys::WATCHLIST)
        .map(normalize_watchlist)
        .unwrap_or_default();

    Ok(
        ScrapeResult::succeeded(username, profile, ratings, watchlist, scraped_at)
            .with_processing_time(processing_time),
    )
}

pub fn normalize_validation(
    raw: &JsonValue,
    requested_username: &str,
) -> Result<ValidationResult, NormalizationError> {
    let obj = as_object(raw, "validation response")?;
    let username = text(obj, keys::USERNAME).unwrap_or_else(|| requested_username.trim().to_string());
    let exists = flag(obj, keys::EXISTS).unwrap_or(false);
    let message = text(obj, keys::MESSAGE).unwrap_or_else(|| validation_message(&username, exists));
    Ok(ValidationResult {
        username,
        exists,
        message,
    })
}

pub fn validation_message(username: &str, exists: bool) -> String {
    if exists {
        format!("User '{username}' exists on Letterboxd")
    } else {
        format!("User '{username}' not found on Letterboxd")
    }
}

/// Best-effort message from a non-2xx body, e.g. FastAPI's `{"detail": ..}`.
pub fn upstream_error_message(raw: &JsonValue) -> Option<String> {
    let obj = raw.as_object()?;
    text(obj, keys::ERROR_MESSAGE).or_else(|| text(obj, keys::MESSAGE))
}

/// Anything that is not a recognizable healthy payload reads as unavailable.
pub fn normalize_health(raw: &JsonValue) -> HealthStatus {
    let Some(obj) = raw.as_object() else {
        return HealthStatus::unavailable();
    };
    let status = text(obj, keys::STATUS);
    let available = flag(obj, keys::SCRAPER_AVAILABLE).unwrap_or_else(|| {
        status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("healthy"))
    });
    HealthStatus {
        available,
        status,
        service: text(obj, keys::SERVICE),
    }
}

/// Fields the upstream leaves out are taken from `local`.
pub fn normalize_service_status(
    raw: &JsonValue,
    local: &ServiceStatus,
) -> Result<ServiceStatus, NormalizationError> {
    let obj = as_object(raw, "service status")?;
    Ok(ServiceStatus {
        enabled: flag(obj, keys::ENABLED).unwrap_or(local.enabled),
        base_url: text(obj, keys::BASE_URL).unwrap_or_else(|| local.base_url.clone()),
        timeout_ms: resolve(obj, keys::TIMEOUT_MS, JsonValue::as_u64).unwrap_or(local.timeout_ms),
        healthy: flag(obj, keys::HEALTHY).unwrap_or(local.healthy),
    })
}

fn profile_from_object(obj: &JsonObject) -> Result<Profile, NormalizationError> {
    let username = text(obj, keys::USERNAME)
        .ok_or(NormalizationError::MissingUsername { context: "profile" })?;
    Ok(Profile {
        username,
        display_name: text(obj, keys::DISPLAY_NAME),
        bio: text(obj, keys::BIO),
        location: text(obj, keys::LOCATION),
        website: text(obj, keys::WEBSITE),
        joined_date: text(obj, keys::JOINED_DATE),
        films_watched: count(obj, keys::FILMS_WATCHED),
        followers: count(obj, keys::FOLLOWERS),
        following: count(obj, keys::FOLLOWING),
    })
}

fn rating_from_object(obj: &JsonObject) -> Option<Rating> {
    let film_title = text(obj, keys::FILM_TITLE)?;
    Some(Rating {
        film_title,
        film_year: year(obj, keys::FILM_YEAR),
        film_slug: text(obj, keys::FILM_SLUG),
        rating: number(obj, keys::RATING),
        watched_date: text(obj, keys::WATCHED_DATE),
        review: text(obj, keys::REVIEW),
        source_uri: text(obj, keys::SOURCE_URI),
    })
}

fn watchlist_film_from_object(obj: &JsonObject) -> Option<WatchlistFilm> {
    let film_title = text(obj, keys::FILM_TITLE)?;
    Some(WatchlistFilm {
        film_title,
        film_year: year(obj, keys::FILM_YEAR),
        film_slug: text(obj, keys::FILM_SLUG),
        directors: string_list(obj, keys::DIRECTORS),
        genres: string_list(obj, keys::GENRES),
        added_date: text(obj, keys::ADDED_DATE),
        source_uri: text(obj, keys::SOURCE_URI),
    })
}

fn normalize_list<T>(raw: &JsonValue, shape: fn(&JsonObject) -> Option<T>) -> Vec<T> {
    raw.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(JsonValue::as_object)
                .filter_map(shape)
                .collect()
        })
        .unwrap_or_default()
}

fn as_object<'a>(raw: &'a JsonValue, context: &'static str) -> Result<&'a JsonObject, NormalizationError> {
    raw.as_object().ok_or(NormalizationError::NotAnObject {
        context,
        found: kind_name(raw),
    })
}

fn kind_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn resolve<'a, T>(
    obj: &'a JsonObject,
    keys: &[&str],
    accept: impl Fn(&'a JsonValue) -> Option<T>,
) -> Option<T> {
    keys.iter().filter_map(|key| obj.get(*key)).find_map(accept)
}

fn text_or_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn text(obj: &JsonObject, keys: &[&str]) -> Option<String> {
    resolve(obj, keys, |v| v.as_str().and_then(text_or_none))
}

fn count(obj: &JsonObject, keys: &[&str]) -> Option<u32> {
    resolve(obj, keys, |v| v.as_u64().and_then(|n| u32::try_from(n).ok()))
}

fn year(obj: &JsonObject, keys: &[&str]) -> Option<i32> {
    resolve(obj, keys, |v| v.as_i64().and_then(|n| i32::try_from(n).ok()))
}

fn number(obj: &JsonObject, keys: &[&str]) -> Option<f64> {
    resolve(obj, keys, JsonValue::as_f64)
}

fn flag(obj: &JsonObject, keys: &[&str]) -> Option<bool> {
    resolve(obj, keys, JsonValue::as_bool)
}

fn list_field<'a>(obj: &'a JsonObject, keys: &[&str]) -> Option<&'a JsonValue> {
    resolve(obj, keys, |v| v.is_array().then_some(v))
}

fn string_list(obj: &JsonObject, keys: &[&str]) -> Vec<String> {
    resolve(obj, keys, |v| {
        v.as_array().map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().and_then(text_or_none))
                .collect::<Vec<_>>()
        })
    })
    .unwrap_or_default()
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn received_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).single().unwrap()
    }

    fn with_field(base: JsonValue, key: &str, value: JsonValue) -> JsonValue {
        let mut obj = base.as_object().cloned().unwrap();
        obj.insert(key.to_string(), value);
        JsonValue::Object(obj)
    }

    #[test]
    fn rating_fields_are_dialect_independent() {
        let cases = [
            ("filmYear", "film_year", json!(1995)),
            ("filmSlug", "film_slug", json!("heat")),
            ("watchedDate", "watched_date", json!("2024-01-02")),
            ("sourceUri", "letterboxd_uri", json!("https://letterboxd.com/film/heat/")),
        ];
        for (camel, snake, value) in cases {
            let camel_rating = normalize_rating(&with_field(json!({"filmTitle": "Heat"}), camel, value.clone()));
            let snake_rating = normalize_rating(&with_field(json!({"film_title": "Heat"}), snake, value));
            assert_eq!(camel_rating, snake_rating, "field {camel}/{snake}");
            assert!(camel_rating.is_some());
        }
    }

    #[test]
    fn watchlist_fields_are_dialect_independent() {
        let cases = [
            ("filmYear", "film_year", json!(1981)),
            ("filmSlug", "film_slug", json!("thief")),
            ("addedDate", "added_date", json!("2025-03-04")),
            ("sourceUri", "source_uri", json!("https://letterboxd.com/film/thief/")),
        ];
        for (camel, snake, value) in cases {
            let a = normalize_watchlist_film(&with_field(json!({"filmTitle": "Thief"}), camel, value.clone()));
            let b = normalize_watchlist_film(&with_field(json!({"film_title": "Thief"}), snake, value));
            assert_eq!(a, b, "field {camel}/{snake}");
        }
    }

    #[test]
    fn profile_fields_are_dialect_independent() {
        let camel = json!({
            "username": "alice",
            "displayName": "Alice",
            "joinedDate": "2019",
            "filmsWatched": 812,
            "followers": 10,
            "following": 12
        });
        let snake = json!({
            "username": "alice",
            "display_name": "Alice",
            "joined_date": "2019",
            "films_watched": 812,
            "followers": 10,
            "following": 12
        });
        assert_eq!(normalize_profile(&camel).unwrap(), normalize_profile(&snake).unwrap());
    }

    #[test]
    fn canonical_name_wins_over_alternate() {
        let rating = normalize_rating(&json!({
            "filmTitle": "Canonical",
            "film_title": "Alternate"
        }))
        .unwrap();
        assert_eq!(rating.film_title, "Canonical");
    }

    #[test]
    fn empty_title_entries_are_discarded() {
        let ratings = normalize_ratings(&json!([
            {"film_title": "", "rating": 3.0},
            {"film_title": "Heat", "rating": 4.5},
            {"rating": 2.0},
            "not an object"
        ]));
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].film_title, "Heat");
    }

    #[test]
    fn wrong_typed_values_are_absent_not_coerced() {
        let rating = normalize_rating(&json!({
            "filmTitle": "Heat",
            "filmYear": "1995",
            "rating": "4.5",
            "review": 12
        }))
        .unwrap();
        assert_eq!(rating.film_year, None);
        assert_eq!(rating.rating, None);
        assert_eq!(rating.review, None);

        let profile = normalize_profile(&json!({"username": "alice", "followers": -3, "following": 2.5})).unwrap();
        assert_eq!(profile.followers, None);
        assert_eq!(profile.following, None);
    }

    #[test]
    fn wrong_typed_canonical_falls_through_to_alternate() {
        let rating = normalize_rating(&json!({
            "filmTitle": "Heat",
            "filmYear": "nineteen ninety-five",
            "film_year": 1995
        }))
        .unwrap();
        assert_eq!(rating.film_year, Some(1995));
    }

    #[test]
    fn list_fields_accept_plural_or_singular_array() {
        let plural = normalize_watchlist_film(&json!({
            "filmTitle": "Thief",
            "directors": ["Michael Mann"],
            "genres": ["Crime", 7, "Thriller"]
        }))
        .unwrap();
        assert_eq!(plural.directors, vec!["Michael Mann"]);
        assert_eq!(plural.genres, vec!["Crime", "Thriller"]);

        let singular = normalize_watchlist_film(&json!({
            "filmTitle": "Thief",
            "director": ["Michael Mann"],
            "genre": "Crime"
        }))
        .unwrap();
        assert_eq!(singular.directors, vec!["Michael Mann"]);
        assert!(singular.genres.is_empty());
    }

    #[test]
    fn profile_requires_object_and_username() {
        assert_eq!(
            normalize_profile(&json!(["alice"])),
            Err(NormalizationError::NotAnObject {
                context: "profile",
                found: "array"
            })
        );
        assert_eq!(
            normalize_profile(&json!({"display_name": "Alice"})),
            Err(NormalizationError::MissingUsername { context: "profile" })
        );
        let sparse = normalize_profile(&json!({"username": "alice", "bio": null})).unwrap();
        assert_eq!(sparse, Profile::new("alice"));
    }

    #[test]
    fn scrape_result_recomputes_totals() {
        let raw = json!({
            "username": "alice",
            "ratings": [{"film_title": "Heat"}, {"film_title": ""}],
            "watchlist": [{"filmTitle": "Thief"}],
            "total_ratings": 99,
            "total_watchlist_items": 42,
            "success": true
        });
        let result = normalize_scrape_result(&raw, "alice", received_at()).unwrap();
        assert_eq!(result.total_ratings(), 1);
        assert_eq!(result.total_watchlist_items(), 1);
        assert_eq!(result.scraped_at(), received_at());
    }

    #[test]
    fn missing_half_becomes_empty_sequence() {
        let raw = json!({
            "username": "alice",
            "ratings": [{"film_title": "Heat"}],
            "watchlist": null
        });
        let result = normalize_scrape_result(&raw, "alice", received_at()).unwrap();
        assert!(result.success());
        assert_eq!(result.ratings().len(), 1);
        assert!(result.watchlist().is_empty());
        assert!(result.profile().is_none());
    }

    #[test]
    fn failed_scrape_drops_partial_data() {
        let raw = json!({
            "username": "alice",
            "success": false,
            "error_message": "rate limited",
            "ratings": [{"film_title": "Heat"}]
        });
        let result = normalize_scrape_result(&raw, "alice", received_at()).unwrap();
        assert!(!result.success());
        assert_eq!(result.error_message(), Some("rate limited"));
        assert!(result.ratings().is_empty());

        let camel = json!({"success": false, "errorMessage": "rate limited"});
        let camel = normalize_scrape_result(&camel, "alice", received_at()).unwrap();
        assert_eq!(camel, result);
    }

    #[test]
    fn scrape_result_with_malformed_profile_is_an_error() {
        let raw = json!({"username": "alice", "profile": "alice"});
        assert!(matches!(
            normalize_scrape_result(&raw, "alice", received_at()),
            Err(NormalizationError::NotAnObject { context: "profile", .. })
        ));
    }

    #[test]
    fn timestamps_accept_rfc3339_and_naive_iso() {
        let naive = json!({"scraped_at": "2026-10-16T08:00:00.250"});
        let aware = json!({"scrapedAt": "2026-10-16T08:00:00.250Z"});
        let a = normalize_scrape_result(&naive, "alice", received_at()).unwrap();
        let b = normalize_scrape_result(&aware, "alice", received_at()).unwrap();
        assert_eq!(a.scraped_at(), b.scraped_at());
        assert_ne!(a.scraped_at(), received_at());
    }

    #[test]
    fn normalizing_serialized_result_is_idempotent() {
        let raw = json!({
            "username": "alice",
            "profile": {"username": "alice", "display_name": "Alice", "films_watched": 3},
            "ratings": [{"film_title": "Heat", "film_year": 1995, "rating": 4.5, "letterboxd_uri": "u"}],
            "watchlist": [{"film_title": "Thief", "directors": ["Michael Mann"], "genres": []}],
            "scraped_at": "2026-10-16T08:00:00Z",
            "processing_time": 1.25
        });
        let first = normalize_scrape_result(&raw, "alice", received_at()).unwrap();
        let round_tripped = serde_json::to_value(&first).unwrap();
        let second = normalize_scrape_result(&round_tripped, "nobody", received_at()).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.processing_time_secs(), Some(1.25));
    }

    #[test]
    fn validation_synthesizes_missing_message() {
        let result = normalize_validation(&json!({"exists": true}), "alice").unwrap();
        assert!(result.exists);
        assert_eq!(result.username, "alice");
        assert_eq!(result.message, "User 'alice' exists on Letterboxd");
    }

    #[test]
    fn health_reads_flag_or_status() {
        assert!(normalize_health(&json!({"status": "healthy"})).available);
        assert!(normalize_health(&json!({"scraper_available": true, "status": "degraded"})).available);
        assert!(!normalize_health(&json!({"status": "unhealthy", "scraper_available": false})).available);
        assert!(!normalize_health(&json!("healthy")).available);
    }

    #[test]
    fn upstream_message_prefers_error_keys() {
        assert_eq!(
            upstream_error_message(&json!({"detail": "User not found", "message": "ignored"})).as_deref(),
            Some("User not found")
        );
        assert_eq!(upstream_error_message(&json!({"message": "nope"})).as_deref(), Some("nope"));
        assert_eq!(upstream_error_message(&json!({"detail": [{"loc": []}]})), None);
    }

    #[test]
    fn service_status_fields_are_dialect_independent() {
        let local = ServiceStatus {
            enabled: true,
            base_url: "http://local/api".to_string(),
            timeout_ms: 7_000,
            healthy: false,
        };
        let cases = [
            json!({"baseUrl": "http://scraper/api", "timeoutMs": 1500, "healthy": true}),
            json!({"base_url": "http://scraper/api", "timeout_ms": 1500, "healthy": true}),
            json!({"base_url": "http://scraper/api", "timeout": 1500, "healthy": true}),
        ];
        for raw in cases {
            let status = normalize_service_status(&raw, &local).unwrap();
            assert_eq!(status.base_url, "http://scraper/api", "{raw}");
            assert_eq!(status.timeout_ms, 1500, "{raw}");
            assert!(status.enabled && status.healthy, "{raw}");
        }
    }

    #[test]
    fn service_status_missing_fields_come_from_local_view() {
        let local = ServiceStatus {
            enabled: true,
            base_url: "http://local/api".to_string(),
            timeout_ms: 7_000,
            healthy: false,
        };
        let status = normalize_service_status(&json!({"healthy": true, "timeoutMs": "soon"}), &local).unwrap();
        assert_eq!(status.timeout_ms, 7_000);
        assert_eq!(status.base_url, "http://local/api");
        assert!(status.healthy);
        assert!(normalize_service_status(&json!([]), &local).is_err());
    }

    #[test]
    fn malformed_body_is_a_normalization_error() {
        assert!(matches!(parse_body(b"<html>"), Err(NormalizationError::MalformedBody(_))));
        assert_eq!(parse_body(b"{}").unwrap(), json!({}));
    }
}
