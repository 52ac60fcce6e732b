use crate::timetable::model::{ScheduleRow, Weight};

/// Baseline period length used when no row carries a usable time range
pub const DEFAULT_BASELINE_MINUTES: u32 = 50;

/// Parse a single clock time ("HH:MM", optionally with AM/PM) to
/// minutes since midnight
fn to_minutes(s: &str) -> Option<u32> {
    let s = s.trim();
    let upper = s.to_uppercase();
    let (time_part, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end(), Some("AM"))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end(), Some("PM"))
    } else {
        (upper.as_str(), None)
    };

    let (hh_str, mm_str) = time_part.split_once(':')?;
    if hh_str.is_empty() || hh_str.len() > 2 || mm_str.len() != 2 {
        return None;
    }
    let mut hh: u32 = hh_str.parse().ok()?;
    let mm: u32 = mm_str.parse().ok()?;
    if mm >= 60 {
        return None;
    }

    match meridiem {
        Some(m) => {
            if hh == 0 || hh > 12 {
                return None;
            }
            // 12 AM -> 0, 12 PM -> 12, 1-11 PM -> +12
            if m == "PM" && hh != 12 {
                hh += 12;
            }
            if m == "AM" && hh == 12 {
                hh = 0;
            }
        }
        None => {
            if hh > 23 {
                return None;
            }
        }
    }

    Some(hh * 60 + mm)
}

/// Parse a time range like "09:00-09:50" or "10:00 AM - 11:30 AM" and
/// return its duration in minutes. Returns None when the range is
/// malformed or the end does not come after the start; callers treat
/// that as "unknown duration".
pub fn parse_time_range(range: &str) -> Option<u32> {
    let parts: Vec<&str> = range.split('-').collect();
    if parts.len() != 2 {
        return None;
    }
    let start = to_minutes(parts[0])?;
    let end = to_minutes(parts[1])?;
    if end <= start {
        return None;
    }
    Some(end - start)
}

/// Median duration across all rows with a known positive duration.
/// An even count averages the two middle values (rounded); no known
/// durations falls back to DEFAULT_BASELINE_MINUTES.
pub fn median_baseline(rows: &[ScheduleRow]) -> u32 {
    let mut durations: Vec<u32> = rows
        .iter()
        .filter_map(|row| row.time.as_deref().and_then(parse_time_range))
        .collect();
    if durations.is_empty() {
        return DEFAULT_BASELINE_MINUTES;
    }
    durations.sort_unstable();
    let mid = durations.len() / 2;
    if durations.len() % 2 == 0 {
        // Round-half-up average of the two middle values
        (durations[mid - 1] + durations[mid] + 1) / 2
    } else {
        durations[mid]
    }
}

/// Weight of a row in "standard periods". An explicit positive weight
/// wins verbatim; otherwise the duration is measured against the
/// baseline, and unknown durations count as a single period.
pub fn weight_for_row(row: &ScheduleRow, baseline: u32) -> u32 {
    if let Weight::Explicit(w) = row.weight {
        return w;
    }
    let duration = match row.time.as_deref().and_then(parse_time_range) {
        Some(d) => d,
        None => return 1,
    };
    if baseline == 0 {
        return 1;
    }
    let w = ((duration as f64) / (baseline as f64)).round() as u32;
    w.max(1)
}
