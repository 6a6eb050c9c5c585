//! Bucketing engine
//!
//! Groups raw metric records by UTC calendar date and metric type, and reduces
//! each day's bucket to a single daily value for series and trend analysis.

use crate::summary::{finite_mean, summarize};
use crate::types::{DailyAggregation, MetricRecord, MetricType, Summary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Values recorded on one day, keyed by metric
pub type DayBuckets = BTreeMap<MetricType, Vec<f64>>;

/// Per-day buckets over a period, keyed by date
pub type Buckets = BTreeMap<NaiveDate, DayBuckets>;

/// One day's readings for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub date: NaiveDate,
    pub metric_type: MetricType,
    pub values: Vec<f64>,
}

/// A metric's reduced value for one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyValue {
    pub date: NaiveDate,
    pub value: f64,
}

/// Group records into per-day, per-metric value lists.
///
/// Only records dated within `[start, end]` (inclusive, UTC) are kept. Values
/// inside a bucket follow `recorded_at` order; ties keep their input order.
/// A start after the end yields an empty mapping.
pub fn bucket(records: &[MetricRecord], start: NaiveDate, end: NaiveDate) -> Buckets {
    let mut buckets = Buckets::new();
    if start > end {
        return buckets;
    }

    let mut in_range: Vec<&MetricRecord> = records
        .iter()
        .filter(|r| {
            let date = r.date();
            start <= date && date <= end
        })
        .collect();
    in_range.sort_by_key(|r| r.recorded_at);

    for record in in_range {
        buckets
            .entry(record.date())
            .or_default()
            .entry(record.metric_type)
            .or_default()
            .push(record.value);
    }

    buckets
}

/// Flatten the nested mapping into a date-then-metric ordered bucket list
pub fn flatten(buckets: &Buckets) -> Vec<Bucket> {
    buckets
        .iter()
        .flat_map(|(date, by_metric)| {
            by_metric.iter().map(move |(metric_type, values)| Bucket {
                date: *date,
                metric_type: *metric_type,
                values: values.clone(),
            })
        })
        .collect()
}

/// Total number of values across all buckets
pub fn value_count(buckets: &Buckets) -> usize {
    buckets
        .values()
        .flat_map(|by_metric| by_metric.values())
        .map(Vec::len)
        .sum()
}

/// Per-day summaries for one metric, oldest first
pub fn daily_summaries(
    buckets: &Buckets,
    metric_type: MetricType,
    unit: &str,
) -> Vec<(NaiveDate, Summary)> {
    buckets
        .iter()
        .filter_map(|(date, by_metric)| {
            by_metric
                .get(&metric_type)
                .map(|values| (*date, summarize(values, unit)))
        })
        .collect()
}

/// Reduce each day's bucket for one metric to a single value, oldest first.
///
/// Cumulative metrics are summed within the day, level metrics are averaged.
/// Non-finite values are skipped, and a day left with no finite values is
/// omitted rather than reported as zero.
pub fn daily_series(buckets: &Buckets, metric_type: MetricType) -> Vec<DailyValue> {
    let aggregation = metric_type.daily_aggregation();

    buckets
        .iter()
        .filter_map(|(date, by_metric)| {
            let values = by_metric.get(&metric_type)?;
            let value = reduce_day(values, aggregation)?;
            Some(DailyValue { date: *date, value })
        })
        .collect()
}

fn reduce_day(values: &[f64], aggregation: DailyAggregation) -> Option<f64> {
    match aggregation {
        DailyAggregation::Sum => {
            let mut finite = values.iter().copied().filter(|v| v.is_finite()).peekable();
            finite.peek()?;
            Some(finite.sum())
        }
        DailyAggregation::Mean => finite_mean(values),
    }
}
