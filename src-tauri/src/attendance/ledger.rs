use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::timetable::model::Status;

/// What was actually marked for one schedule row on one calendar date.
/// Frozen at mark time: later edits to the weekday template do not
/// touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub subject: String,
    pub status: Status,
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl AttendanceEntry {
    pub fn new(subject: impl Into<String>, status: Status, weight: u32) -> Self {
        AttendanceEntry {
            subject: subject.into(),
            status,
            weight: weight.max(default_weight()),
        }
    }
}

/// Durable historical record of marked attendance, keyed by date and
/// schedule row index. Append-or-overwrite at (date, index) granularity;
/// entries are never deleted implicitly. All cross-date aggregation
/// reads exclusively from here, so past days stay stable even when the
/// live weekday templates are edited later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceLedger {
    pub by_date: BTreeMap<String, BTreeMap<usize, AttendanceEntry>>,
}

impl AttendanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the entry for one row on one date
    pub fn record(&mut self, date: &str, index: usize, entry: AttendanceEntry) {
        self.by_date
            .entry(date.to_string())
            .or_default()
            .insert(index, entry);
    }

    pub fn entries_for(&self, date: &str) -> Option<&BTreeMap<usize, AttendanceEntry>> {
        self.by_date.get(date)
    }

    /// Dates (and their rows) whose "YYYY-MM" prefix matches the month
    pub fn dates_in_month<'a>(
        &'a self,
        month: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a BTreeMap<usize, AttendanceEntry>)> {
        self.by_date
            .iter()
            .filter(move |(date, _)| date.starts_with(month))
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}
