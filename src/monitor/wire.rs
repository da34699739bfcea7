//! Backend payload normalization.
//!
//! Accepts the canonical camelCase schema plus the legacy variants
//! (`url/status/last_checked` and `URL/Status/StatusCode/LastChecked`) and
//! produces validated [`MonitoredService`] rows.

use super::{MonitoredService, SnapshotError};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;

/// One service as it may appear on the wire.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireService {
    #[serde(alias = "URL")]
    url: String,
    #[serde(
        alias = "is_up",
        alias = "status",
        alias = "Status",
        deserialize_with = "deserialize_liveness"
    )]
    is_up: bool,
    #[serde(default, alias = "status_code", alias = "StatusCode")]
    status_code: Option<u16>,
    #[serde(
        default,
        alias = "response_time_ms",
        alias = "ResponseTime",
        alias = "ResponseTimeMs"
    )]
    response_time_ms: Option<f64>,
    #[serde(alias = "last_checked", alias = "last_checked_at", alias = "LastChecked")]
    last_checked_at: String,
    #[serde(
        default,
        alias = "uptime_percentage",
        alias = "UptimePercentage",
        alias = "uptime"
    )]
    uptime_percentage: Option<f64>,
}

/// Liveness is a bool in most schemas, a word in some.
fn deserialize_liveness<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Liveness {
        Flag(bool),
        Word(String),
    }

    match Liveness::deserialize(deserializer)? {
        Liveness::Flag(flag) => Ok(flag),
        Liveness::Word(word) => match word.to_ascii_lowercase().as_str() {
            "up" | "operational" | "healthy" | "ok" => Ok(true),
            "down" | "degraded" | "unhealthy" | "offline" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "unrecognized status '{}'",
                other
            ))),
        },
    }
}

/// Parse an ISO 8601 timestamp; values without an offset are taken as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| format!("invalid timestamp '{}'", raw))
}

impl WireService {
    fn into_service(self) -> Result<MonitoredService, String> {
        if self.url.trim().is_empty() {
            return Err("url is empty".to_string());
        }
        if let Some(pct) = self.uptime_percentage {
            if !(0.0..=100.0).contains(&pct) {
                return Err(format!("uptime percentage {} outside 0..=100", pct));
            }
        }
        if let Some(ms) = self.response_time_ms {
            if !ms.is_finite() || ms < 0.0 {
                return Err(format!("response time {} is not a valid duration", ms));
            }
        }
        let last_checked_at = parse_timestamp(&self.last_checked_at)?;

        Ok(MonitoredService {
            url: self.url,
            is_up: self.is_up,
            status_code: self.status_code,
            response_time_ms: self.response_time_ms,
            last_checked_at,
            uptime_percentage: self.uptime_percentage,
        })
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Parse and validate a backend list response into a snapshot.
///
/// Order is preserved as received. Any malformed entry rejects the whole
/// snapshot.
pub fn parse_snapshot(body: &str) -> Result<Vec<MonitoredService>, SnapshotError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| SnapshotError::InvalidJson(e.to_string()))?;

    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        other => return Err(SnapshotError::NotAnArray(json_kind(&other))),
    };

    let mut services = Vec::with_capacity(entries.len());
    let mut seen = HashSet::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let wire: WireService = serde_json::from_value(entry)
            .map_err(|e| SnapshotError::InvalidEntry {
                index,
                reason: e.to_string(),
            })?;
        let service = wire
            .into_service()
            .map_err(|reason| SnapshotError::InvalidEntry { index, reason })?;

        if !seen.insert(service.url.clone()) {
            return Err(SnapshotError::DuplicateUrl(service.url));
        }
        services.push(service);
    }

    Ok(services)
}
