use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tauri::State;

use crate::attendance::stats::{self, HolidayList, MonthReport, SearchResult};
use crate::error::TrackError;
use crate::notify::scheduler;
use crate::services::{parser, push};
use crate::state::app::{AppModel, AppState};
use crate::timetable::model::{weekday_of, DayOverride, ScheduleRow, Status, Weekday};
use crate::timetable::resolve::{self, DayState};
use crate::timetable::store::UnmarkOutcome;

/// Everything the timetable screen needs for the selected date
#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub date: String,
    pub day: Option<Weekday>,
    pub state: Option<DayState>,
    pub schedule: Vec<ScheduleRow>,
    pub holiday_note: Option<String>,
    pub is_future: bool,
    pub subject_percentages: HashMap<String, u32>,
    pub has_template: bool,
    pub override_days: Vec<Weekday>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderStatus {
    pub reminder_time: String,
    pub enabled: bool,
    pub push_active: bool,
}

fn build_day_view(model: &AppModel) -> DayView {
    let Some(day) = model.selected_day else {
        return DayView {
            date: model.selected_date.clone(),
            day: None,
            state: None,
            schedule: Vec::new(),
            holiday_note: None,
            is_future: false,
            subject_percentages: HashMap::new(),
            has_template: model.timetables.first_template().is_some(),
            override_days: model.timetables.available_override_days(),
        };
    };

    let resolved = resolve::resolve_day(&model.timetables, &model.selected_date, day);
    let percentages = stats::subject_percentages_for_view(
        &model.timetables,
        &model.ledger,
        &model.selected_date,
        day,
    );

    DayView {
        date: model.selected_date.clone(),
        day: Some(day),
        state: Some(resolved.state),
        schedule: resolved.schedule,
        holiday_note: resolved.holiday_note,
        is_future: resolve::is_future_date(&model.selected_date),
        subject_percentages: percentages,
        has_template: model.timetables.first_template().is_some(),
        override_days: model.timetables.available_override_days(),
    }
}

fn selected_date_and_day(model: &AppModel) -> Result<(String, Weekday), String> {
    let day = model.selected_day.ok_or("Please select date and day first")?;
    if model.selected_date.is_empty() {
        return Err("Please select date and day first".to_string());
    }
    Ok((model.selected_date.clone(), day))
}

#[tauri::command]
pub async fn get_app_snapshot(state: State<'_, Arc<AppState>>) -> Result<AppModel, String> {
    Ok(state.snapshot())
}

#[tauri::command]
pub async fn get_day_view(state: State<'_, Arc<AppState>>) -> Result<DayView, String> {
    Ok(state.read(build_day_view))
}

#[tauri::command]
pub async fn select_date(
    state: State<'_, Arc<AppState>>,
    date: String,
    day: String,
) -> Result<DayView, String> {
    let requested = Weekday::parse(&day).ok_or("Enter a valid weekday")?;
    let actual = weekday_of(&date).ok_or("Enter a valid date (YYYY-MM-DD)")?;
    if requested != actual {
        return Err(format!("Day does not match date. {} is {}.", date, actual));
    }

    state
        .update(|m| {
            m.selected_date = date;
            m.selected_day = Some(actual);
            build_day_view(m)
        })
        .await
        .map_err(|e| e.to_string())
}

/// Manual subject entry: replaces the weekday's schedule with
/// subject-only rows
#[tauri::command]
pub async fn set_schedule(
    state: State<'_, Arc<AppState>>,
    day: String,
    subjects: Vec<String>,
) -> Result<DayView, String> {
    let day = Weekday::parse(&day).ok_or("Enter a valid weekday")?;
    let cleaned: Vec<String> = subjects
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if cleaned.is_empty() {
        return Err("Please add at least one subject".to_string());
    }

    let rows: Vec<ScheduleRow> = cleaned
        .into_iter()
        .enumerate()
        .map(|(i, subject)| ScheduleRow::from_subject(i as u32 + 1, subject))
        .collect();

    state
        .update(|m| {
            m.timetables.set_schedule(day, rows);
            build_day_view(m)
        })
        .await
        .map_err(|e| e.to_string())
}

/// Replace the recurring-holiday weekdays wholesale
#[tauri::command]
pub async fn set_recurring_holidays(
    state: State<'_, Arc<AppState>>,
    days: Vec<String>,
) -> Result<(), String> {
    let mut parsed = Vec::with_capacity(days.len());
    for name in &days {
        parsed.push(Weekday::parse(name).ok_or_else(|| format!("Unknown weekday: {}", name))?);
    }
    state
        .update(|m| m.timetables.set_recurring_holidays(&parsed))
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn copy_template_to_day(state: State<'_, Arc<AppState>>) -> Result<DayView, String> {
    let (date, day) = state.read(selected_date_and_day)?;
    state
        .update(|m| {
            if !m.timetables.copy_template_to_day(&date, day) {
                return Err("No existing timetable to copy".to_string());
            }
            Ok(build_day_view(m))
        })
        .await
        .map_err(|e| e.to_string())?
}

#[tauri::command]
pub async fn mark_attendance(
    state: State<'_, Arc<AppState>>,
    index: usize,
    status: String,
) -> Result<DayView, String> {
    let status = match Status::from(status) {
        s @ (Status::Present | Status::Absent) => s,
        Status::Unmarked => return Err("Status must be present or absent".to_string()),
    };

    let (date, day) = state.read(selected_date_and_day)?;
    if resolve::is_future_date(&date) {
        return Err("Future date selected - attendance actions are disabled".to_string());
    }
    let resolved = state.read(|m| resolve::resolve_day(&m.timetables, &date, day).state);
    if resolved == DayState::Holiday {
        return Err("This day is marked as a holiday".to_string());
    }

    state
        .update(|m| {
            resolve::mark_attendance(&mut m.timetables, &mut m.ledger, &date, day, index, status);
            build_day_view(m)
        })
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn mark_holiday(state: State<'_, Arc<AppState>>) -> Result<DayView, String> {
    let (date, day) = state.read(selected_date_and_day)?;
    if resolve::is_future_date(&date) {
        return Err("Future date selected - attendance actions are disabled".to_string());
    }
    state
        .update(|m| {
            m.timetables
                .mark_holiday_for_date(&date, day, "Holiday - No classes today");
            build_day_view(m)
        })
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn unmark_holiday(state: State<'_, Arc<AppState>>) -> Result<UnmarkOutcome, String> {
    let (date, day) = state.read(selected_date_and_day)?;
    state
        .update(|m| m.timetables.unmark_holiday_for_date(&date, day))
        .await
        .map_err(|e| e.to_string())
}

/// Apply a substitute-weekday (or empty) override for the selected
/// date; used to finish an unmark-holiday flow when no backup existed
#[tauri::command]
pub async fn apply_override(
    state: State<'_, Arc<AppState>>,
    source_day: Option<String>,
    unmark: bool,
) -> Result<DayView, String> {
    let choice = match source_day {
        Some(name) => DayOverride::UseDay(
            Weekday::parse(&name).ok_or_else(|| format!("Unknown weekday: {}", name))?,
        ),
        None => DayOverride::Empty,
    };
    let (date, day) = state.read(selected_date_and_day)?;
    state
        .update(|m| {
            m.timetables.apply_override(&date, day, choice, unmark);
            build_day_view(m)
        })
        .await
        .map_err(|e| e.to_string())
}

/// Upload a timetable image to the parsing backend and populate every
/// detected weekday. A failed call leaves the store and ledger exactly
/// as they were.
#[tauri::command]
pub async fn upload_timetable_image(
    state: State<'_, Arc<AppState>>,
    file_path: String,
) -> Result<parser::AppliedParse, String> {
    let (date, day) = state.read(selected_date_and_day)?;

    let bytes = tokio::fs::read(&file_path)
        .await
        .map_err(|e| TrackError::from(e).to_string())?;
    let file_name = std::path::Path::new(&file_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("timetable.png")
        .to_string();

    let response = parser::upload_timetable(&file_name, bytes, &date, day)
        .await
        .map_err(|e| format!("{:#}", e))?;

    state
        .update(|m| parser::apply_parse_response(&mut m.timetables, &date, day, &response))
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn parser_backend_reachable() -> Result<bool, String> {
    Ok(parser::health().await)
}

#[tauri::command]
pub async fn month_report(
    state: State<'_, Arc<AppState>>,
    year: String,
    month: String,
) -> Result<MonthReport, String> {
    let month_key = format!(
        "{}-{}",
        year.trim(),
        if month.trim().len() == 1 {
            format!("0{}", month.trim())
        } else {
            month.trim().to_string()
        }
    );
    Ok(state.read(|m| stats::month_stats(&m.timetables, &m.ledger, &month_key)))
}

#[tauri::command]
pub async fn search_report(
    state: State<'_, Arc<AppState>>,
    year: String,
    month: String,
    day: String,
    subject: String,
) -> Result<SearchResult, String> {
    Ok(state.read(|m| stats::search_report(&m.timetables, &m.ledger, &year, &month, &day, &subject)))
}

#[tauri::command]
pub async fn list_holidays(
    state: State<'_, Arc<AppState>>,
    year: String,
    month: String,
) -> Result<HolidayList, String> {
    let month_key = format!(
        "{}-{}",
        year.trim(),
        if month.trim().len() == 1 {
            format!("0{}", month.trim())
        } else {
            month.trim().to_string()
        }
    );
    Ok(state.read(|m| stats::holidays_in_month(&m.timetables, &month_key)))
}

#[tauri::command]
pub async fn get_subjects(state: State<'_, Arc<AppState>>) -> Result<Vec<String>, String> {
    Ok(state.read(|m| stats::subject_universe(&m.timetables, &m.ledger)))
}

/// Enable reminders at the given time. Push registration is attempted
/// first (capability-tested via the public key); when it succeeds the
/// external service is authoritative and the local loop stays silent.
/// Either way the per-minute fallback task is (re)started.
#[tauri::command]
pub async fn configure_reminder(
    app: tauri::AppHandle,
    state: State<'_, Arc<AppState>>,
    time: String,
    subscription: Option<serde_json::Value>,
) -> Result<ReminderStatus, String> {
    if !scheduler::is_valid_reminder_time(&time) {
        return Err("Reminder time must be HH:MM".to_string());
    }

    let (user_id, was_push_active) = state.read(|m| {
        (
            m.notifications
                .user_id
                .clone()
                .unwrap_or_else(push::generate_user_id),
            m.notifications.push_active,
        )
    });

    let mut push_active = false;
    match push::get_public_key().await {
        Ok(_) => {
            if let Some(sub) = &subscription {
                match push::subscribe(sub, &time, &user_id).await {
                    Ok(()) => push_active = true,
                    Err(e) => tracing::warn!(error = %e, "Push subscription failed, falling back to local reminders"),
                }
            } else if was_push_active {
                match push::update_reminder_time(&user_id, &time).await {
                    Ok(()) => push_active = true,
                    Err(e) => tracing::warn!(error = %e, "Reminder time update failed, falling back to local reminders"),
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Push backend unavailable, local reminders only");
        }
    }

    let status = state
        .update(|m| {
            m.notifications.reminder_time = time.clone();
            m.notifications.enabled = true;
            m.notifications.user_id = Some(user_id.clone());
            m.notifications.push_active = push_active;
            ReminderStatus {
                reminder_time: m.notifications.reminder_time.clone(),
                enabled: true,
                push_active,
            }
        })
        .await
        .map_err(|e| e.to_string())?;

    let task_state = state.inner().as_ref().clone();
    state.replace_scheduler(Some(scheduler::start(app, task_state)));

    Ok(status)
}

/// Tear down the local reminder loop. The external push subscription is
/// left registered; it is keyed by the stable anonymous user id and can
/// be silently re-registered later.
#[tauri::command]
pub async fn disable_reminders(state: State<'_, Arc<AppState>>) -> Result<(), String> {
    state.replace_scheduler(None);
    state
        .update(|m| {
            m.notifications.enabled = false;
            m.notifications.push_active = false;
        })
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn send_test_notification(state: State<'_, Arc<AppState>>) -> Result<(), String> {
    let user_id = state
        .read(|m| m.notifications.user_id.clone())
        .ok_or("Notifications are not configured yet")?;
    push::send_test(&user_id).await.map_err(|e| format!("{:#}", e))
}

#[tauri::command]
pub async fn complete_setup(state: State<'_, Arc<AppState>>) -> Result<(), String> {
    state
        .update(|m| m.setup_completed = true)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn reset_app(state: State<'_, Arc<AppState>>) -> Result<(), String> {
    state.reset().await.map_err(|e| e.to_string())
}
