mod mapping;
mod report;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

pub use mapping::{CategoryAssignment, CategoryMapping, CategoryRule};
pub use report::{BucketRow, Report, ServiceTotal, aggregate, aggregate_in_span};

/// Storage format for local POS timestamps; sorts lexicographically.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    LineItem,
    Modifier,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LineItem => "line_item",
            Self::Modifier => "modifier",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "line_item" => Some(Self::LineItem),
            "modifier" => Some(Self::Modifier),
            _ => None,
        }
    }
}

/// One sold line item or modifier selection, after column resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: String,
    pub kind: ItemKind,
    pub product_id: String,
    pub quantity: f64,
    pub timestamp: NaiveDateTime,
    pub location: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Interval {
    #[default]
    Hour,
    HalfHour,
}

impl Interval {
    pub fn minutes(&self) -> u32 {
        match self {
            Self::Hour => 60,
            Self::HalfHour => 30,
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        match minutes {
            60 => Some(Self::Hour),
            30 => Some(Self::HalfHour),
            _ => None,
        }
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::minutes(self.minutes() as i64)
    }

    /// Truncates `ts` down to the start of its interval.
    pub fn bucket_start(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let minute = ts.minute() - ts.minute() % self.minutes();
        NaiveTime::from_hms_opt(ts.hour(), minute, 0)
            .map(|time| ts.date().and_time(time))
            .unwrap_or(ts)
    }

    /// `HH:MM-HH:MM` with an inclusive end minute, e.g. `09:30-09:59`.
    pub fn label(&self, start: NaiveDateTime) -> String {
        let end = start + self.duration() - TimeDelta::minutes(1);
        format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
    }
}

impl From<Interval> for u32 {
    fn from(value: Interval) -> Self {
        value.minutes()
    }
}

impl TryFrom<u32> for Interval {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Interval::from_minutes(value).ok_or_else(|| format!("unsupported interval {} minutes", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServicePeriod {
    Lunch,
    Dinner,
}

impl ServicePeriod {
    pub fn from_hour(hour: u32) -> Self {
        if (6..16).contains(&hour) {
            Self::Lunch
        } else {
            Self::Dinner
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
        }
    }
}

/// Half-open `[start, end)` range of local timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeSpan {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn for_date(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        Self {
            start,
            end: start + TimeDelta::days(1),
        }
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts < self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub last_updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub location: String,
    pub business_date: String,
    pub interval: Interval,
    pub report: Report,
    pub created_at: String,
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    // two-digit years first: `%Y` would read "24" as year 24
    "%m/%d/%y %I:%M %p",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
];

/// Parses POS export timestamps into wall-clock time. Offsets in RFC 3339
/// values are dropped rather than converted, so the local hour is kept.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local());
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    None
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok()
}

/// Trims a PLU and folds float-formatted integers (`"81831.0"`) to `"81831"`.
pub fn normalize_product_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some((whole, fraction)) = trimmed.split_once('.')
        && !whole.is_empty()
        && whole.chars().all(|ch| ch.is_ascii_digit())
        && fraction.chars().all(|ch| ch == '0')
    {
        return whole.to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).expect("timestamp")
    }

    #[test]
    fn bucket_start_truncates_to_interval() {
        assert_eq!(
            Interval::HalfHour.bucket_start(ts("2024-07-01T09:44:59")),
            ts("2024-07-01T09:30:00")
        );
        assert_eq!(
            Interval::Hour.bucket_start(ts("2024-07-01T09:44:59")),
            ts("2024-07-01T09:00:00")
        );
    }

    #[test]
    fn labels_use_inclusive_end_minute() {
        assert_eq!(Interval::Hour.label(ts("2024-07-01T13:00:00")), "13:00-13:59");
        assert_eq!(
            Interval::HalfHour.label(ts("2024-07-01T13:30:00")),
            "13:30-13:59"
        );
    }

    #[test]
    fn parses_common_export_formats() {
        let expected = ts("2024-07-01T12:30:00");
        assert_eq!(parse_timestamp("7/1/24 12:30 PM"), Some(expected));
        assert_eq!(parse_timestamp("07/01/2024 12:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-07-01 12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-07-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-07-01T12:30:00-05:00"), Some(expected));
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn normalizes_float_formatted_plus() {
        assert_eq!(normalize_product_id(" 81831.0 "), "81831");
        assert_eq!(normalize_product_id("81831"), "81831");
        assert_eq!(normalize_product_id("12.5"), "12.5");
        assert_eq!(normalize_product_id("ABC.00"), "ABC.00");
    }

    #[test]
    fn service_period_boundaries() {
        assert_eq!(ServicePeriod::from_hour(5), ServicePeriod::Dinner);
        assert_eq!(ServicePeriod::from_hour(6), ServicePeriod::Lunch);
        assert_eq!(ServicePeriod::from_hour(15), ServicePeriod::Lunch);
        assert_eq!(ServicePeriod::from_hour(16), ServicePeriod::Dinner);
    }

    #[test]
    fn interval_serializes_as_minutes() {
        let json = serde_json::to_string(&Interval::HalfHour).expect("serialize");
        assert_eq!(json, "30");
        let parsed: Interval = serde_json::from_str("60").expect("deserialize");
        assert_eq!(parsed, Interval::Hour);
        assert!(serde_json::from_str::<Interval>("15").is_err());
    }
}
