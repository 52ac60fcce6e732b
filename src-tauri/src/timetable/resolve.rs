use serde::Serialize;

use crate::attendance::ledger::{AttendanceEntry, AttendanceLedger};
use crate::timetable::model::{date_key, parse_date, DayOverride, ScheduleRow, Status, Weekday};
use crate::timetable::store::TimetableStore;
use crate::timetable::weight::{median_baseline, weight_for_row};

/// The four states a date can resolve to, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayState {
    /// A date-specific override points at another weekday's schedule
    OverrideActive { source: Weekday },
    /// The date is a working day with no schedule at all
    OverrideEmpty,
    Holiday,
    Normal,
}

/// What a single date looks like once every override and holiday
/// marker has been applied
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedDay {
    pub state: DayState,
    pub schedule: Vec<ScheduleRow>,
    pub holiday_note: Option<String>,
}

/// Resolve the schedule shown for one date. Pure: evaluated fresh from
/// the store every time, never cached.
///
/// Precedence: a non-empty override whose source weekday exists wins,
/// then an empty override, then a date-specific or recurring holiday,
/// then the natural weekday's schedule.
pub fn resolve_day(store: &TimetableStore, date: &str, day: Weekday) -> ResolvedDay {
    let key = date_key(date, day);

    match store.date_overrides.get(&key) {
        Some(DayOverride::UseDay(source)) if store.schedules_by_day.contains_key(source) => {
            return ResolvedDay {
                state: DayState::OverrideActive { source: *source },
                schedule: store.schedules_by_day[source].clone(),
                holiday_note: None,
            };
        }
        Some(DayOverride::Empty) => {
            return ResolvedDay {
                state: DayState::OverrideEmpty,
                schedule: Vec::new(),
                holiday_note: None,
            };
        }
        _ => {}
    }

    let note = store
        .holiday_by_date
        .get(&key)
        .or_else(|| store.holiday_by_day.get(&day))
        .cloned();
    if let Some(note) = note {
        return ResolvedDay {
            state: DayState::Holiday,
            schedule: Vec::new(),
            holiday_note: Some(note),
        };
    }

    ResolvedDay {
        state: DayState::Normal,
        schedule: store.schedules_by_day.get(&day).cloned().unwrap_or_default(),
        holiday_note: None,
    }
}

/// Date-only comparison against the local clock. Unparsable dates are
/// not treated as future.
pub fn is_future_date(date: &str) -> bool {
    match parse_date(date) {
        Some(d) => d > chrono::Local::now().date_naive(),
        None => false,
    }
}

/// Mark one row present or absent for a date.
///
/// The active weekday is the override source when one is active, else
/// the natural weekday. Two writes happen together: the live schedule
/// row's status (today's board) and the ledger entry capturing
/// subject, status and resolved weight (the durable record used by all
/// historical aggregation). Only Present and Absent are markable; the
/// ledger never holds an Unmarked entry. Returns false when there was
/// nothing to mark (empty override, missing schedule or row).
pub fn mark_attendance(
    store: &mut TimetableStore,
    ledger: &mut AttendanceLedger,
    date: &str,
    day: Weekday,
    index: usize,
    status: Status,
) -> bool {
    if status == Status::Unmarked {
        return false;
    }
    let key = date_key(date, day);
    let active_day = match store.date_overrides.get(&key) {
        Some(DayOverride::UseDay(source)) => *source,
        Some(DayOverride::Empty) => return false,
        None => day,
    };

    let baseline = match store.schedules_by_day.get(&active_day) {
        Some(rows) => median_baseline(rows),
        None => {
            tracing::debug!(day = active_day.as_str(), "No schedule for active day, ignoring mark");
            return false;
        }
    };

    let Some(rows) = store.schedules_by_day.get_mut(&active_day) else {
        return false;
    };
    let Some(row) = rows.get_mut(index) else {
        tracing::debug!(index, day = active_day.as_str(), "Row index out of range, ignoring mark");
        return false;
    };

    row.status = status;
    if !row.subject.is_empty() {
        let weight = weight_for_row(row, baseline);
        ledger.record(date, index, AttendanceEntry::new(row.subject.clone(), status, weight));
    }
    true
}
