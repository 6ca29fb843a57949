use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use sales_core::{Interval, TimeSpan, parse_date, parse_timestamp};

use crate::config::ReportParams;
use crate::error::{AppError, Result};

/// Longest span a filled report may cover. Every interval in it becomes a row.
pub const MAX_FILL_DAYS: i64 = 31;

fn parse_day(value: &str, field: &str) -> Result<NaiveDate> {
    parse_date(value)
        .ok_or_else(|| AppError::InvalidInput(format!("invalid {}: {}", field, value)))
}

fn range_start(value: &str) -> Result<NaiveDateTime> {
    if let Some(date) = parse_date(value) {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    parse_timestamp(value)
        .ok_or_else(|| AppError::InvalidInput(format!("invalid start: {}", value)))
}

/// A bare date as `end` includes that whole day.
fn range_end(value: &str) -> Result<NaiveDateTime> {
    if let Some(date) = parse_date(value) {
        return Ok(date.and_time(NaiveTime::MIN) + TimeDelta::days(1));
    }
    parse_timestamp(value).ok_or_else(|| AppError::InvalidInput(format!("invalid end: {}", value)))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// `None` means the location's whole history.
pub fn resolve_span(params: &ReportParams) -> Result<Option<TimeSpan>> {
    let date = non_empty(&params.date);
    let start = non_empty(&params.start);
    let end = non_empty(&params.end);
    match (date, start, end) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(AppError::InvalidInput(
            "use either date or start/end, not both".to_string(),
        )),
        (Some(date), None, None) => Ok(Some(TimeSpan::for_date(parse_day(date, "date")?))),
        (None, Some(start), Some(end)) => {
            let span = TimeSpan::new(range_start(start)?, range_end(end)?);
            if span.start >= span.end {
                return Err(AppError::InvalidInput(
                    "start must be before end".to_string(),
                ));
            }
            Ok(Some(span))
        }
        (None, Some(_), None) | (None, None, Some(_)) => Err(AppError::InvalidInput(
            "start and end must be given together".to_string(),
        )),
        (None, None, None) => Ok(None),
    }
}

pub fn check_fill_span(span: &TimeSpan) -> Result<()> {
    if span.end - span.start > TimeDelta::days(MAX_FILL_DAYS) {
        return Err(AppError::InvalidInput(format!(
            "fill covers at most {} days; narrow start/end",
            MAX_FILL_DAYS
        )));
    }
    Ok(())
}

/// Business date as `YYYY-MM-DD` when the params name a single day.
pub fn business_date(params: &ReportParams) -> Result<Option<String>> {
    match non_empty(&params.date) {
        Some(date) => Ok(Some(
            parse_day(date, "date")?
                .format(sales_core::DATE_FORMAT)
                .to_string(),
        )),
        None => Ok(None),
    }
}

pub fn resolve_interval(minutes: Option<u32>, default: Interval) -> Result<Interval> {
    match minutes {
        Some(minutes) => Interval::from_minutes(minutes).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "unsupported interval {} minutes; use 60 or 30",
                minutes
            ))
        }),
        None => Ok(default),
    }
}

pub fn resolve_date_range(start: &str, end: Option<&str>) -> Result<(NaiveDate, NaiveDate)> {
    let start = parse_day(start, "start date")?;
    let end = match end.map(str::trim).filter(|value| !value.is_empty()) {
        Some(end) => parse_day(end, "end date")?,
        None => start,
    };
    if end < start {
        return Err(AppError::InvalidInput(
            "end date must not be before start date".to_string(),
        ));
    }
    Ok((start, end))
}
