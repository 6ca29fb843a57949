use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{CategoryMapping, Interval, SaleItem, ServicePeriod, TimeSpan};

/// One time bucket; `counts` lines up with `Report::categories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRow {
    pub start: NaiveDateTime,
    pub label: String,
    pub service: ServicePeriod,
    pub counts: Vec<f64>,
}

impl BucketRow {
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTotal {
    pub service: ServicePeriod,
    pub counts: Vec<f64>,
}

/// Category counts per bucket, ascending by bucket start, plus the column
/// totals. `totals` is kept apart from `buckets` so it always renders last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub interval: Interval,
    pub categories: Vec<String>,
    pub buckets: Vec<BucketRow>,
    pub totals: Vec<f64>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn category_index(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|name| name == category)
    }

    pub fn bucket(&self, start: NaiveDateTime) -> Option<&BucketRow> {
        self.buckets.iter().find(|bucket| bucket.start == start)
    }

    pub fn count(&self, start: NaiveDateTime, category: &str) -> Option<f64> {
        let index = self.category_index(category)?;
        self.bucket(start).map(|bucket| bucket.counts[index])
    }

    pub fn category_total(&self, category: &str) -> Option<f64> {
        self.category_index(category).map(|index| self.totals[index])
    }

    pub fn grand_total(&self) -> f64 {
        self.totals.iter().sum()
    }

    /// Lunch/Dinner subtotals for the periods that have buckets.
    pub fn service_totals(&self) -> Vec<ServiceTotal> {
        let mut by_service: BTreeMap<ServicePeriod, Vec<f64>> = BTreeMap::new();
        for bucket in &self.buckets {
            let counts = by_service
                .entry(bucket.service)
                .or_insert_with(|| vec![0.0; self.categories.len()]);
            for (sum, value) in counts.iter_mut().zip(&bucket.counts) {
                *sum += value;
            }
        }
        by_service
            .into_iter()
            .map(|(service, counts)| ServiceTotal { service, counts })
            .collect()
    }
}

type BucketSums = BTreeMap<NaiveDateTime, HashMap<usize, f64>>;

/// Sums mapped quantities per (bucket, category). Only buckets with at least
/// one mapped item appear.
pub fn aggregate<'a, I>(mapping: &CategoryMapping, items: I, interval: Interval) -> Report
where
    I: IntoIterator<Item = &'a SaleItem>,
{
    let mut sums = BucketSums::new();
    accumulate(mapping, items, interval, None, &mut sums);
    build_report(mapping, sums, interval)
}

/// Like [`aggregate`], restricted to `span`, with every bucket of the span
/// present even when empty.
pub fn aggregate_in_span<'a, I>(
    mapping: &CategoryMapping,
    items: I,
    interval: Interval,
    span: TimeSpan,
) -> Report
where
    I: IntoIterator<Item = &'a SaleItem>,
{
    let mut sums = BucketSums::new();
    let mut cursor = interval.bucket_start(span.start);
    while cursor < span.end {
        sums.entry(cursor).or_default();
        cursor += interval.duration();
    }
    accumulate(mapping, items, interval, Some(span), &mut sums);
    build_report(mapping, sums, interval)
}

fn accumulate<'a, I>(
    mapping: &CategoryMapping,
    items: I,
    interval: Interval,
    span: Option<TimeSpan>,
    sums: &mut BucketSums,
) where
    I: IntoIterator<Item = &'a SaleItem>,
{
    for item in items {
        if let Some(span) = span
            && !span.contains(item.timestamp)
        {
            continue;
        }
        let Some(category) = mapping.resolve_index(&item.product_id) else {
            continue;
        };
        let bucket = interval.bucket_start(item.timestamp);
        *sums.entry(bucket).or_default().entry(category).or_insert(0.0) += item.quantity;
    }
}

fn build_report(mapping: &CategoryMapping, sums: BucketSums, interval: Interval) -> Report {
    let used = sums
        .values()
        .flat_map(|counts| counts.keys().copied())
        .collect::<BTreeSet<_>>();
    let columns = used.into_iter().collect::<Vec<_>>();
    let categories = columns
        .iter()
        .map(|index| mapping.categories()[*index].clone())
        .collect::<Vec<_>>();

    let buckets = sums
        .into_iter()
        .map(|(start, counts)| BucketRow {
            start,
            label: interval.label(start),
            service: ServicePeriod::from_hour(start.hour()),
            counts: columns
                .iter()
                .map(|index| counts.get(index).copied().unwrap_or(0.0))
                .collect(),
        })
        .collect::<Vec<_>>();

    let mut totals = vec![0.0; columns.len()];
    for bucket in &buckets {
        for (sum, value) in totals.iter_mut().zip(&bucket.counts) {
            *sum += value;
        }
    }

    Report {
        interval,
        categories,
        buckets,
        totals,
    }
}
