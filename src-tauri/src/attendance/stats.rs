use std::collections::{BTreeMap, BTreeSet, HashMap};
use serde::Serialize;

use crate::attendance::ledger::AttendanceLedger;
use crate::timetable::model::{date_key, weekday_of, Status, Weekday};
use crate::timetable::resolve::resolve_day;
use crate::timetable::store::TimetableStore;
use crate::timetable::weight::{median_baseline, weight_for_row};

/// Weighted present/total/percentage for one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectTotals {
    pub subject: String,
    pub present: u32,
    pub total: u32,
    pub pct: u32,
}

/// Monthly roll-up: per-subject totals plus the weighted overall
/// percentage (total present weight over total weight, never a mean of
/// daily percentages)
#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    pub month: String,
    pub subjects: Vec<SubjectTotals>,
    pub present: u32,
    pub total: u32,
    pub pct: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub present: u32,
    pub total: u32,
    pub pct: u32,
}

/// Holidays relevant to one month: recurring weekdays plus the
/// date-specific markers that are still in effect
#[derive(Debug, Clone, Serialize)]
pub struct HolidayList {
    pub recurring: Vec<(Weekday, String)>,
    pub dates: Vec<(String, String)>,
}

fn pct_of(present: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((present as f64 / total as f64) * 100.0).round() as u32
}

/// A date contributes nothing to monthly totals when it is holiday-marked
/// (date-specific or recurring) and no override reinstates it
fn is_excluded_holiday(store: &TimetableStore, date: &str) -> bool {
    let Some(day) = weekday_of(date) else {
        return false;
    };
    let key = date_key(date, day);
    let marked = store.holiday_by_date.contains_key(&key) || store.holiday_by_day.contains_key(&day);
    marked && !store.date_overrides.contains_key(&key)
}

/// Per-subject stats for a single date. Each resolved row prefers its
/// ledger entry; rows never marked fall back to their own status and
/// derived weight, with unmarked rows contributing to the total only.
/// No future-date guard: reports may examine any day.
pub fn day_stats(
    store: &TimetableStore,
    ledger: &AttendanceLedger,
    date: &str,
    day: Weekday,
) -> Vec<SubjectTotals> {
    let resolved = resolve_day(store, date, day);
    let baseline = median_baseline(&resolved.schedule);
    let recorded = ledger.entries_for(date);

    let mut totals: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for (index, row) in resolved.schedule.iter().enumerate() {
        if row.subject.is_empty() {
            continue;
        }
        let (subject, status, weight) = match recorded.and_then(|m| m.get(&index)) {
            Some(entry) => (entry.subject.clone(), entry.status, entry.weight),
            None => (row.subject.clone(), row.status, weight_for_row(row, baseline)),
        };
        let slot = totals.entry(subject).or_insert((0, 0));
        slot.1 += weight;
        if status == Status::Present {
            slot.0 += weight;
        }
    }

    totals
        .into_iter()
        .map(|(subject, (present, total))| SubjectTotals {
            subject,
            present,
            total,
            pct: pct_of(present, total),
        })
        .collect()
}

/// Monthly roll-up for a "YYYY-MM" month, read exclusively from the
/// ledger so later template edits cannot rewrite history. Holiday
/// dates are skipped unless an override reinstates them.
pub fn month_stats(store: &TimetableStore, ledger: &AttendanceLedger, month: &str) -> MonthReport {
    let mut totals: BTreeMap<String, (u32, u32)> = BTreeMap::new();

    for (date, entries) in ledger.dates_in_month(month) {
        if is_excluded_holiday(store, date) {
            continue;
        }
        for entry in entries.values() {
            if entry.subject.is_empty() {
                continue;
            }
            let weight = entry.weight.max(1);
            let slot = totals.entry(entry.subject.clone()).or_insert((0, 0));
            slot.1 += weight;
            if entry.status == Status::Present {
                slot.0 += weight;
            }
        }
    }

    let present: u32 = totals.values().map(|(p, _)| p).sum();
    let total: u32 = totals.values().map(|(_, t)| t).sum();
    let subjects = totals
        .into_iter()
        .map(|(subject, (present, total))| SubjectTotals {
            subject,
            present,
            total,
            pct: pct_of(present, total),
        })
        .collect();

    MonthReport {
        month: month.to_string(),
        subjects,
        present,
        total,
        pct: pct_of(present, total),
    }
}

/// Month-to-date percentages per subject for the timetable view:
/// the selected date is counted from its resolved schedule (the live
/// board), every other ledger date in the month is added on top, with
/// holiday dates skipped unless overridden.
pub fn subject_percentages_for_view(
    store: &TimetableStore,
    ledger: &AttendanceLedger,
    date: &str,
    day: Weekday,
) -> HashMap<String, u32> {
    let month = if date.len() >= 7 { &date[..7] } else { date };
    let resolved = resolve_day(store, date, day);
    let baseline = median_baseline(&resolved.schedule);

    let mut totals: HashMap<String, (u32, u32)> = HashMap::new();
    for row in &resolved.schedule {
        if row.subject.is_empty() {
            continue;
        }
        let weight = weight_for_row(row, baseline);
        let slot = totals.entry(row.subject.clone()).or_insert((0, 0));
        slot.1 += weight;
        if row.status == Status::Present {
            slot.0 += weight;
        }
    }

    for (other_date, entries) in ledger.dates_in_month(month) {
        if other_date == date || is_excluded_holiday(store, other_date) {
            continue;
        }
        for entry in entries.values() {
            if entry.subject.is_empty() {
                continue;
            }
            let weight = entry.weight.max(1);
            let slot = totals.entry(entry.subject.clone()).or_insert((0, 0));
            slot.1 += weight;
            if entry.status == Status::Present {
                slot.0 += weight;
            }
        }
    }

    totals
        .into_iter()
        .map(|(subject, (present, total))| (subject, pct_of(present, total)))
        .collect()
}

/// Every subject appearing in any weekday schedule or any ledger entry.
/// Ledger subjects no longer on a live schedule are real historical
/// attendance and stay included.
pub fn subject_universe(store: &TimetableStore, ledger: &AttendanceLedger) -> Vec<String> {
    let mut subjects: BTreeSet<String> = BTreeSet::new();
    for rows in store.schedules_by_day.values() {
        for row in rows {
            if !row.subject.is_empty() {
                subjects.insert(row.subject.clone());
            }
        }
    }
    for entries in ledger.by_date.values() {
        for entry in entries.values() {
            if !entry.subject.is_empty() {
                subjects.insert(entry.subject.clone());
            }
        }
    }
    subjects.into_iter().collect()
}

/// Date-specific holiday markers in a "YYYY-MM" month, excluding dates
/// an override has turned back into working days, plus the recurring
/// weekday holidays
pub fn holidays_in_month(store: &TimetableStore, month: &str) -> HolidayList {
    let mut dates: Vec<(String, String)> = store
        .holiday_by_date
        .iter()
        .filter(|(key, _)| key.starts_with(month) && !store.date_overrides.contains_key(*key))
        .map(|(key, reason)| (key.clone(), reason.clone()))
        .collect();
    dates.sort();

    let mut recurring: Vec<(Weekday, String)> = Weekday::ALL
        .iter()
        .filter_map(|day| store.holiday_by_day.get(day).map(|r| (*day, r.clone())))
        .collect();
    recurring.sort_by_key(|(day, _)| *day);

    HolidayList { recurring, dates }
}

/// Normalize a single-digit month/day to zero-padded two-digit form
fn pad_two(part: &str) -> String {
    if part.len() == 1 {
        format!("0{}", part)
    } else {
        part.to_string()
    }
}

/// Report query over the ledger, filtered by any subset of
/// (year, month, day) and a subject name or the "all" sentinel
pub fn search_report(
    store: &TimetableStore,
    ledger: &AttendanceLedger,
    year: &str,
    month: &str,
    day: &str,
    subject: &str,
) -> SearchResult {
    let year = year.trim();
    let month = month.trim();
    let day = day.trim();
    let subject_query = subject.trim().to_lowercase();

    // Longest date prefix the provided parts allow
    let mut prefix = String::new();
    if !year.is_empty() {
        prefix.push_str(year);
        if !month.is_empty() {
            prefix.push('-');
            prefix.push_str(&pad_two(month));
            if !day.is_empty() {
                prefix.push('-');
                prefix.push_str(&pad_two(day));
            }
        }
    }

    let mut present = 0u32;
    let mut total = 0u32;
    for (date, entries) in ledger.by_date.iter() {
        if !date.starts_with(&prefix) {
            continue;
        }
        if is_excluded_holiday(store, date) {
            continue;
        }
        for entry in entries.values() {
            let matches = subject_query == "all"
                || entry.subject.to_lowercase() == subject_query;
            if !matches {
                continue;
            }
            let weight = entry.weight.max(1);
            total += weight;
            if entry.status == Status::Present {
                present += weight;
            }
        }
    }

    SearchResult {
        present,
        total,
        pct: pct_of(present, total),
    }
}
