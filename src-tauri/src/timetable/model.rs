use serde::{Deserialize, Serialize};
use chrono::{Datelike, NaiveDate};

/// Marker stored in the override map when a date is active but carries
/// no timetable at all. Wire-compatible with previously persisted blobs.
pub const EMPTY_OVERRIDE: &str = "__EMPTY__";

/// Named weekday, Monday-first. Weekday names are the canonical map keys
/// for schedules and recurring holidays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Parse a weekday name, tolerating arbitrary casing
    pub fn parse(s: &str) -> Option<Weekday> {
        match s.trim().to_lowercase().as_str() {
            "monday" => Some(Weekday::Monday),
            "tuesday" => Some(Weekday::Tuesday),
            "wednesday" => Some(Weekday::Wednesday),
            "thursday" => Some(Weekday::Thursday),
            "friday" => Some(Weekday::Friday),
            "saturday" => Some(Weekday::Saturday),
            "sunday" => Some(Weekday::Sunday),
            _ => None,
        }
    }

    pub fn from_date(date: NaiveDate) -> Weekday {
        match date.weekday() {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attendance status of a schedule row. Serialized as "present"/"absent",
/// with the empty string accepted for unmarked rows (legacy blobs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Present,
    Absent,
    #[default]
    Unmarked,
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "present" => Status::Present,
            "absent" => Status::Absent,
            _ => Status::Unmarked,
        }
    }
}

impl From<Status> for String {
    fn from(s: Status) -> Self {
        match s {
            Status::Present => "present".to_string(),
            Status::Absent => "absent".to_string(),
            Status::Unmarked => String::new(),
        }
    }
}

/// A row's weight is either user-supplied or derived from its time range
/// by the weight resolver. Serialized as an optional positive integer so
/// rows without an explicit weight stay absent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Weight {
    Explicit(u32),
    #[default]
    Derived,
}

impl From<Option<u32>> for Weight {
    fn from(v: Option<u32>) -> Self {
        match v {
            Some(n) if n >= 1 => Weight::Explicit(n),
            _ => Weight::Derived,
        }
    }
}

impl From<Weight> for Option<u32> {
    fn from(w: Weight) -> Self {
        match w {
            Weight::Explicit(n) => Some(n),
            Weight::Derived => None,
        }
    }
}

/// One period of a weekday schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub sno: u32,
    #[serde(default)]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub weight: Weight,
}

impl ScheduleRow {
    /// A plain subject-only row, as produced by manual entry
    pub fn from_subject(sno: u32, subject: impl Into<String>) -> Self {
        ScheduleRow {
            sno,
            subject: subject.into(),
            time: None,
            status: Status::Unmarked,
            weight: Weight::Derived,
        }
    }
}

/// Date-specific instruction to use another weekday's schedule, or no
/// schedule while still treating the date as a working day. Serialized
/// as the source weekday name or the EMPTY_OVERRIDE marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DayOverride {
    UseDay(Weekday),
    Empty,
}

impl From<String> for DayOverride {
    fn from(s: String) -> Self {
        if s == EMPTY_OVERRIDE {
            return DayOverride::Empty;
        }
        match Weekday::parse(&s) {
            Some(day) => DayOverride::UseDay(day),
            None => DayOverride::Empty,
        }
    }
}

impl From<DayOverride> for String {
    fn from(o: DayOverride) -> Self {
        match o {
            DayOverride::UseDay(day) => day.as_str().to_string(),
            DayOverride::Empty => EMPTY_OVERRIDE.to_string(),
        }
    }
}

/// Weekday-qualified key ("YYYY-MM-DD-Weekday") used for date-specific
/// holidays and overrides
pub fn date_key(date: &str, day: Weekday) -> String {
    format!("{}-{}", date, day.as_str())
}

/// Parse an ISO "YYYY-MM-DD" date string
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Weekday of an ISO date string, if it parses
pub fn weekday_of(date: &str) -> Option<Weekday> {
    parse_date(date).map(Weekday::from_date)
}
