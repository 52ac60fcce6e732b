use serde::Serialize;
use tauri::async_runtime::JoinHandle;
use tauri::Emitter;
use tokio::time::Duration;

use crate::state::app::AppState;

/// Event emitted to the UI when the local reminder fires
#[derive(Debug, Clone, Serialize)]
pub struct ReminderPayload {
    pub title: String,
    pub body: String,
    pub date: String,
}

/// Validate an "HH:MM" reminder time
pub fn is_valid_reminder_time(time: &str) -> bool {
    let Some((hh, mm)) = time.split_once(':') else {
        return false;
    };
    if hh.len() != 2 || mm.len() != 2 {
        return false;
    }
    match (hh.parse::<u32>(), mm.parse::<u32>()) {
        (Ok(h), Ok(m)) => h < 24 && m < 60,
        _ => false,
    }
}

/// The per-tick firing decision, kept pure.
///
/// Fires only when the wall clock matches the configured time and no
/// reminder has been recorded for today's calendar date, so restarts
/// and coarse clock granularity can never produce a second reminder on
/// the same day. While a push subscription is active the external
/// service is authoritative and the local fallback stays silent.
pub fn should_fire(
    now_hhmm: &str,
    reminder_time: &str,
    last_shown: Option<&str>,
    today: &str,
    push_active: bool,
) -> bool {
    if push_active {
        return false;
    }
    if now_hhmm != reminder_time {
        return false;
    }
    last_shown != Some(today)
}

/// Spawn the cooperative reminder loop: one tick per minute, firing at
/// most once per calendar day. The returned handle is kept on AppState
/// and aborted when notifications are disabled.
pub fn start(app: tauri::AppHandle, state: AppState) -> JoinHandle<()> {
    tauri::async_runtime::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;

            let now = chrono::Local::now();
            let now_hhmm = now.format("%H:%M").to_string();
            let today = now.format("%Y-%m-%d").to_string();

            let (enabled, reminder_time, last_shown, push_active) = state.read(|m| {
                (
                    m.notifications.enabled,
                    m.notifications.reminder_time.clone(),
                    m.notifications.last_shown_date.clone(),
                    m.notifications.push_active,
                )
            });

            if !enabled {
                continue;
            }
            if !should_fire(&now_hhmm, &reminder_time, last_shown.as_deref(), &today, push_active) {
                continue;
            }

            tracing::info!(time = %now_hhmm, "Firing local attendance reminder");
            let payload = ReminderPayload {
                title: "Attendance Tracker Reminder".to_string(),
                body: "Don't forget to mark your attendance for today's classes!".to_string(),
                date: today.clone(),
            };
            if let Err(e) = app.emit("attendance-reminder", payload) {
                tracing::warn!(error = %e, "Failed to emit reminder event");
            }

            // Record today before the next tick so the equality window
            // cannot fire twice
            let result = state
                .update(|m| m.notifications.last_shown_date = Some(today.clone()))
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to persist reminder bookkeeping");
            }
        }
    })
}
