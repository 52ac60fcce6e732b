use std::sync::Arc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tauri::async_runtime::JoinHandle;

use crate::attendance::ledger::AttendanceLedger;
use crate::error::TrackError;
use crate::storage;
use crate::timetable::model::Weekday;
use crate::timetable::store::TimetableStore;

/// Reminder configuration and delivery bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub reminder_time: String,
    pub enabled: bool,
    /// Calendar date ("YYYY-MM-DD") the local reminder last fired on;
    /// guarantees at most one local reminder per day
    pub last_shown_date: Option<String>,
    /// Stable anonymous id reused across push-service calls
    pub user_id: Option<String>,
    /// True while the external push service is authoritative; the local
    /// fallback keeps ticking but is suppressed from firing
    pub push_active: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            reminder_time: crate::config::settings::get_settings()
                .default_reminder_time
                .clone(),
            enabled: false,
            last_shown_date: None,
            user_id: None,
            push_active: false,
        }
    }
}

/// The persisted root: everything the app knows, serialized as one
/// JSON blob on every mutation and hydrated once at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppModel {
    pub selected_date: String,
    pub selected_day: Option<Weekday>,
    pub timetables: TimetableStore,
    pub ledger: AttendanceLedger,
    pub setup_completed: bool,
    pub notifications: NotificationSettings,
}

/// Application-wide state container.
/// All mutable state is centralized here and passed explicitly to
/// commands; mutations go through update() so every change is followed
/// by a full persistence snapshot (the single on-change hook).
#[derive(Clone)]
pub struct AppState {
    model: Arc<RwLock<AppModel>>,
    /// Handle of the spawned reminder loop, kept for cancellation
    pub scheduler: Arc<RwLock<Option<JoinHandle<()>>>>,
}

impl AppState {
    pub fn new(model: AppModel) -> Self {
        AppState {
            model: Arc::new(RwLock::new(model)),
            scheduler: Arc::new(RwLock::new(None)),
        }
    }

    /// Read a derived value under the lock
    pub fn read<R>(&self, f: impl FnOnce(&AppModel) -> R) -> R {
        f(&self.model.read())
    }

    pub fn snapshot(&self) -> AppModel {
        self.model.read().clone()
    }

    /// Apply a mutation, then persist the whole resulting snapshot.
    /// The lock is released before the write hits disk.
    pub async fn update<R>(
        &self,
        f: impl FnOnce(&mut AppModel) -> R,
    ) -> Result<R, TrackError> {
        let (out, snapshot) = {
            let mut guard = self.model.write();
            let out = f(&mut guard);
            (out, guard.clone())
        };
        storage::save(&snapshot).await?;
        Ok(out)
    }

    /// Clear all fields and remove the persisted blob
    pub async fn reset(&self) -> Result<(), TrackError> {
        if let Some(handle) = self.scheduler.write().take() {
            handle.abort();
        }
        *self.model.write() = AppModel::default();
        storage::reset().await
    }

    /// Replace the running reminder task, aborting any previous one
    pub fn replace_scheduler(&self, handle: Option<JoinHandle<()>>) {
        let mut slot = self.scheduler.write();
        if let Some(old) = slot.take() {
            old.abort();
        }
        *slot = handle;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppModel::default())
    }
}
