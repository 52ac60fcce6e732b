use std::collections::HashMap;
use serde::{Deserialize, Serialize};

use crate::timetable::model::{date_key, DayOverride, ScheduleRow, Weekday};

/// Result of an unmark-holiday request. Restores are applied by the
/// store itself; NeedsChoice defers to the caller, who must pick a
/// substitute weekday (or an empty override) via apply_override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UnmarkOutcome {
    /// The pre-holiday override was restored
    Restored { restored: DayOverride },
    /// The backup equalled the natural weekday, so the override was
    /// removed entirely and resolution falls back to the normal schedule
    OverrideRemoved,
    /// No usable backup; nothing was mutated
    NeedsChoice { candidates: Vec<Weekday> },
}

/// Canonical weekday templates plus every per-date adjustment layered
/// on top of them: recurring holidays, date-specific holidays,
/// schedule overrides, and the pre-holiday override backups that make
/// unmarking a holiday a one-step undo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableStore {
    pub schedules_by_day: HashMap<Weekday, Vec<ScheduleRow>>,
    pub holiday_by_day: HashMap<Weekday, String>,
    pub holiday_by_date: HashMap<String, String>,
    pub date_overrides: HashMap<String, DayOverride>,
    pub override_backups: HashMap<String, DayOverride>,
}

impl TimetableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the schedule for a weekday wholesale
    pub fn set_schedule(&mut self, day: Weekday, rows: Vec<ScheduleRow>) {
        self.schedules_by_day.insert(day, rows);
    }

    pub fn schedule(&self, day: Weekday) -> Option<&Vec<ScheduleRow>> {
        self.schedules_by_day.get(&day)
    }

    fn has_schedule_data(&self, day: Weekday) -> bool {
        self.schedules_by_day
            .get(&day)
            .map(|rows| !rows.is_empty())
            .unwrap_or(false)
    }

    /// Replace the recurring-holiday set wholesale. The latest selection
    /// wins; previously marked weekdays not in `days` are cleared.
    pub fn set_recurring_holidays(&mut self, days: &[Weekday]) {
        self.holiday_by_day.clear();
        for day in days {
            self.holiday_by_day.insert(
                *day,
                format!("Holiday - no classes for {}", day.as_str()),
            );
        }
    }

    /// Mark one specific date as a holiday. Any active override is
    /// backed up for a later unmark, then cleared: a date cannot be
    /// simultaneously overridden and a holiday.
    pub fn mark_holiday_for_date(&mut self, date: &str, day: Weekday, reason: impl Into<String>) {
        let key = date_key(date, day);
        if let Some(active) = self.date_overrides.remove(&key) {
            self.override_backups.insert(key.clone(), active);
        }
        self.holiday_by_date.insert(key, reason.into());
    }

    /// Undo a date-specific holiday. If the backed-up override still
    /// resolves to schedule data it is restored automatically; a backup
    /// equal to the natural weekday (which must still have data) just
    /// removes the override. With no usable backup the caller must
    /// supply a choice, and nothing is mutated here.
    pub fn unmark_holiday_for_date(&mut self, date: &str, day: Weekday) -> UnmarkOutcome {
        let key = date_key(date, day);
        match self.override_backups.get(&key).copied() {
            Some(DayOverride::UseDay(source)) if source == day && self.has_schedule_data(day) => {
                self.date_overrides.remove(&key);
                self.holiday_by_date.remove(&key);
                self.override_backups.remove(&key);
                UnmarkOutcome::OverrideRemoved
            }
            Some(DayOverride::UseDay(source)) if self.has_schedule_data(source) => {
                self.date_overrides
                    .insert(key.clone(), DayOverride::UseDay(source));
                self.holiday_by_date.remove(&key);
                self.override_backups.remove(&key);
                UnmarkOutcome::Restored {
                    restored: DayOverride::UseDay(source),
                }
            }
            _ => UnmarkOutcome::NeedsChoice {
                candidates: self.available_override_days(),
            },
        }
    }

    /// Set the override for a date. When this resolves an unmark-holiday
    /// flow the date's holiday marker and its backup are cleared too.
    pub fn apply_override(
        &mut self,
        date: &str,
        day: Weekday,
        choice: DayOverride,
        unmark_holiday: bool,
    ) {
        let key = date_key(date, day);
        self.date_overrides.insert(key.clone(), choice);
        if unmark_holiday {
            self.holiday_by_date.remove(&key);
            self.override_backups.remove(&key);
        }
    }

    /// Weekdays usable as an override source: non-empty schedule and not
    /// a recurring holiday, in Monday-first order
    pub fn available_override_days(&self) -> Vec<Weekday> {
        Weekday::ALL
            .iter()
            .copied()
            .filter(|day| self.has_schedule_data(*day) && !self.holiday_by_day.contains_key(day))
            .collect()
    }

    /// Any existing non-empty schedule, reusable as a template when the
    /// selected weekday has none
    pub fn first_template(&self) -> Option<Vec<ScheduleRow>> {
        Weekday::ALL
            .iter()
            .find(|day| self.has_schedule_data(**day))
            .and_then(|day| self.schedules_by_day.get(day))
            .cloned()
    }

    /// Copy the first available template onto a weekday. Copying a
    /// schedule onto a holiday-marked date clears that date's holiday
    /// entry. Returns false when no template exists.
    pub fn copy_template_to_day(&mut self, date: &str, day: Weekday) -> bool {
        let Some(template) = self.first_template() else {
            return false;
        };
        self.schedules_by_day.insert(day, template);
        self.holiday_by_date.remove(&date_key(date, day));
        true
    }
}
