use sales_core::{Interval, Report, ReportSnapshot, TimeSpan, aggregate, aggregate_in_span};
use sales_db::{Db, SnapshotSummary};
use serde::Serialize;

use crate::config::ReportParams;
use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db, require_location};
use crate::util::time::{business_date, check_fill_span, resolve_interval, resolve_span};

/// A freshly computed report and the range it covers.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReport {
    pub location: String,
    pub business_date: Option<String>,
    pub span: Option<TimeSpan>,
    pub last_updated_at: Option<String>,
    pub report: Report,
}

#[derive(Clone)]
pub struct ReportService {
    config: SharedConfig,
}

impl ReportService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Recomputes the report from stored rows. A single-day request also
    /// replaces that day's snapshot.
    pub fn generate(&self, params: &ReportParams) -> Result<GeneratedReport> {
        self.compute(params, true)
    }

    /// Same as `generate` but leaves stored snapshots untouched.
    pub fn preview(&self, params: &ReportParams) -> Result<GeneratedReport> {
        self.compute(params, false)
    }

    fn compute(&self, params: &ReportParams, persist: bool) -> Result<GeneratedReport> {
        let db = self.db()?;
        let location = require_location(&db, &params.location)?;
        let interval = resolve_interval(params.interval_minutes, db.get_default_interval()?)?;
        let span = resolve_span(params)?;
        let fill = params.fill.unwrap_or(false);
        if fill && let Some(span) = &span {
            check_fill_span(span)?;
        }
        let business_date = business_date(params)?;
        let mapping = db.load_category_mapping()?;
        let rows = db.load_sale_rows(location.id, span.as_ref())?;

        let report = match span {
            Some(span) if fill => {
                aggregate_in_span(&mapping, &rows, interval, span)
            }
            _ => aggregate(&mapping, &rows, interval),
        };

        if persist && let Some(date) = &business_date {
            let report_json = serde_json::to_string(&report)?;
            db.upsert_report_snapshot(location.id, date, interval.minutes(), &report_json)?;
        }

        tracing::info!(
            location = %location.name,
            rows = rows.len(),
            buckets = report.buckets.len(),
            categories = report.categories.len(),
            interval = interval.minutes(),
            "generated report"
        );
        Ok(GeneratedReport {
            location: location.name,
            business_date,
            span,
            last_updated_at: location.last_updated_at,
            report,
        })
    }

    /// The report stored for `date` the last time it was generated.
    pub fn snapshot(
        &self,
        location: &str,
        date: &str,
        interval_minutes: Option<u32>,
    ) -> Result<ReportSnapshot> {
        let db = self.db()?;
        let location = require_location(&db, location)?;
        let interval = resolve_interval(interval_minutes, db.get_default_interval()?)?;
        let params = ReportParams {
            date: Some(date.to_string()),
            ..ReportParams::default()
        };
        let Some(date) = business_date(&params)? else {
            return Err(AppError::InvalidInput("date is required".to_string()));
        };
        let stored = db
            .get_report_snapshot(location.id, &date, interval.minutes())?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no saved report for {} on {} at {} minutes",
                    location.name,
                    date,
                    interval.minutes()
                ))
            })?;
        let report: Report = serde_json::from_str(&stored.report_json)?;
        Ok(ReportSnapshot {
            location: stored.location,
            business_date: stored.business_date,
            interval: Interval::from_minutes(stored.interval_minutes).unwrap_or(interval),
            report,
            created_at: stored.created_at,
        })
    }

    pub fn list_snapshots(&self, location: &str) -> Result<Vec<SnapshotSummary>> {
        let db = self.db()?;
        let location = require_location(&db, location)?;
        Ok(db.list_report_snapshots(location.id)?)
    }
}
