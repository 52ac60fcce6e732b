use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::settings::get_settings;
use crate::services::get_http_client;
use crate::timetable::model::{date_key, ScheduleRow, Weekday};
use crate::timetable::store::TimetableStore;

/// Response of the timetable-parsing backend. Two shapes share one
/// struct: a holiday verdict (holiday=true plus a message) or a parsed
/// timetable, either of which may carry schedules for additional
/// detected weekdays.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseUploadResponse {
    #[serde(default)]
    pub holiday: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timetable: Option<Vec<ScheduleRow>>,
    #[serde(default)]
    pub subjects: Option<Vec<String>>,
    #[serde(default)]
    pub detected_days: Option<Vec<String>>,
    #[serde(default)]
    pub all_days_timetables: Option<HashMap<String, Vec<ScheduleRow>>>,
    #[serde(default)]
    pub detected_days_timetables: Option<HashMap<String, Vec<ScheduleRow>>>,
}

/// What an applied upload changed, reported back to the UI
#[derive(Debug, Clone, Serialize)]
pub struct AppliedParse {
    pub holiday: bool,
    pub message: Option<String>,
    pub days_updated: Vec<Weekday>,
}

/// Probe backend reachability so "failed to fetch" surfaces before an
/// upload is attempted
pub async fn health() -> bool {
    let url = format!("{}/api/health", get_settings().parser_base_url);
    match get_http_client().get(&url).send().await {
        Ok(resp) => resp.status().is_success(),
        Err(e) => {
            tracing::warn!(error = %e, url = %url, "Parser backend health check failed");
            false
        }
    }
}

/// Upload a timetable image for parsing. Pure network call: the store
/// is only touched by apply_parse_response, so a failure here leaves
/// existing state exactly as it was.
pub async fn upload_timetable(
    file_name: &str,
    bytes: Vec<u8>,
    date: &str,
    day: Weekday,
) -> Result<ParseUploadResponse> {
    let url = format!("{}/api/timetable/upload", get_settings().parser_base_url);
    let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
    let form = reqwest::multipart::Form::new()
        .part("file", part)
        .text("date", date.to_string())
        .text("day", day.as_str().to_string());

    let response = get_http_client()
        .post(&url)
        .multipart(form)
        .send()
        .await
        .with_context(|| format!("Failed to reach parsing backend at {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Upload failed: {}", response.status());
    }

    response
        .json::<ParseUploadResponse>()
        .await
        .context("Unexpected response format from parsing backend")
}

fn merge_detected(
    store: &mut TimetableStore,
    detected: &HashMap<String, Vec<ScheduleRow>>,
    updated: &mut Vec<Weekday>,
) {
    for (name, rows) in detected {
        let Some(day) = Weekday::parse(name) else {
            tracing::warn!(day = %name, "Ignoring unknown weekday from parser");
            continue;
        };
        store.set_schedule(day, rows.clone());
        if !updated.contains(&day) {
            updated.push(day);
        }
    }
}

/// Populate the store from a parse response: the requested weekday
/// first, then every additional detected weekday, not just the one the
/// image was uploaded for.
pub fn apply_parse_response(
    store: &mut TimetableStore,
    date: &str,
    day: Weekday,
    response: &ParseUploadResponse,
) -> AppliedParse {
    let mut days_updated = Vec::new();

    if response.holiday {
        let message = response
            .message
            .clone()
            .unwrap_or_else(|| format!("No classes for {}", day.as_str()));
        store.set_schedule(day, Vec::new());
        store.holiday_by_day.insert(day, message.clone());
        days_updated.push(day);
        if let Some(detected) = &response.detected_days_timetables {
            merge_detected(store, detected, &mut days_updated);
        }
        return AppliedParse {
            holiday: true,
            message: Some(message),
            days_updated,
        };
    }

    if let Some(rows) = &response.timetable {
        store.set_schedule(day, rows.clone());
        // A successfully parsed schedule clears stale holiday markers
        store.holiday_by_day.remove(&day);
        store.holiday_by_date.remove(&date_key(date, day));
        days_updated.push(day);
    }
    if let Some(all_days) = &response.all_days_timetables {
        merge_detected(store, all_days, &mut days_updated);
    }

    AppliedParse {
        holiday: false,
        message: response.message.clone(),
        days_updated,
    }
}
