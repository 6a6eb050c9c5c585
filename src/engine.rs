//! Report engine
//!
//! This module provides the public reporting API for Pulse Analytics. It runs
//! records for one user and period through every stage and assembles a single
//! report:
//!
//! 1. Bucketing - group records by day and metric
//! 2. Summaries - raw-value and daily-value profiles per metric
//! 3. Trends - recent vs older daily values
//! 4. Charts - normalized daily series
//! 5. Health score - banded score over daily averages
//! 6. Goals - progress against caller-supplied targets

use crate::bucketing::{bucket, daily_series, daily_summaries, value_count, Buckets, DailyValue};
use crate::config::{ChartMode, EngineConfig};
use crate::error::AnalyticsError;
use crate::goals::{track, GoalProgress};
use crate::ingest::RecordAdapter;
use crate::score::{score_breakdown, HealthScore};
use crate::series::{normalize_series, scale_to_reference, NormalizedSeries};
use crate::summary::summarize;
use crate::trend::{TrendAnalysis, TrendClassifier};
use crate::types::{Goal, HealthScoreInputs, MetricRecord, MetricType, Period, Summary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything computed for one metric over the period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub metric_type: MetricType,
    pub unit: String,
    /// Profile of every raw reading in the period
    pub summary: Summary,
    /// One reduced value per day with data, oldest first
    pub daily: Vec<DailyValue>,
    /// Profile of the daily values
    pub daily_summary: Summary,
    /// Trend over the daily values
    pub trend: TrendAnalysis,
    /// Chart of the daily values
    pub chart: NormalizedSeries,
}

/// Headline numbers for a dashboard card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub avg_daily_steps: Option<f64>,
    pub avg_daily_calories: Option<f64>,
    pub total_distance: Option<f64>,
    pub avg_sleep_hours: Option<f64>,
    pub avg_sleep_efficiency: Option<f64>,
    pub avg_resting_heart_rate: Option<f64>,
    pub avg_spo2: Option<f64>,
    pub total_active_minutes: Option<f64>,
}

/// Complete analytics output for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub period: Period,
    /// Readings that fell inside the period
    pub record_count: usize,
    /// Days with at least one reading
    pub days_with_data: usize,
    pub metrics: Vec<MetricReport>,
    pub dashboard: DashboardSummary,
    pub health_score: HealthScore,
    pub goals: Vec<GoalProgress>,
}

impl AnalyticsReport {
    pub fn metric(&self, metric_type: MetricType) -> Option<&MetricReport> {
        self.metrics.iter().find(|m| m.metric_type == metric_type)
    }
}

/// Configured report engine.
///
/// Holds only configuration, so one engine can serve any number of users.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    config: EngineConfig,
    classifier: TrendClassifier,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsEngine {
    /// Create an engine with default settings
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            classifier: TrendClassifier::default(),
        }
    }

    /// Create an engine from a validated configuration
    pub fn with_config(config: EngineConfig) -> Result<Self, AnalyticsError> {
        let classifier = config.trend_classifier()?;
        Ok(Self { config, classifier })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the report for `records` over `period`.
    ///
    /// Goals are checked before anything is computed; one bad target fails the
    /// whole report.
    pub fn analyze(
        &self,
        records: &[MetricRecord],
        period: Period,
        goals: &[Goal],
    ) -> Result<AnalyticsReport, AnalyticsError> {
        for goal in goals {
            goal.progress()?;
        }

        let buckets = bucket(records, period.start(), period.end());
        let units = units_in_period(records, period);

        let mut metrics = Vec::new();
        for metric_type in MetricType::ALL {
            let unit = units
                .get(&metric_type)
                .cloned()
                .unwrap_or_else(|| metric_type.default_unit().to_string());
            if let Some(report) = self.metric_report(&buckets, metric_type, unit)? {
                metrics.push(report);
            }
        }

        let daily_summaries: BTreeMap<MetricType, Summary> = metrics
            .iter()
            .map(|m| (m.metric_type, m.daily_summary.clone()))
            .collect();
        let health_score = score_breakdown(&HealthScoreInputs::from_summaries(&daily_summaries));

        let goals = goals
            .iter()
            .map(|goal| {
                let snapshot = goal.current_value.or_else(|| {
                    goal.goal_type
                        .metric_type()
                        .and_then(|metric| daily_summaries.get(&metric))
                        .and_then(Summary::average_if_any)
                });
                track(goal, snapshot, period.end())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AnalyticsReport {
            period,
            record_count: value_count(&buckets),
            days_with_data: buckets.len(),
            dashboard: dashboard(&daily_summaries),
            metrics,
            health_score,
            goals,
        })
    }

    /// Parse records (and optional goals) from JSON and return the report as JSON
    pub fn analyze_json(
        &self,
        records_json: &str,
        period: Period,
        goals_json: Option<&str>,
    ) -> Result<String, AnalyticsError> {
        let records = RecordAdapter::parse_valid_array(records_json)?;
        let goals: Vec<Goal> = match goals_json {
            Some(json) => serde_json::from_str(json)?,
            None => Vec::new(),
        };

        let report = self.analyze(&records, period, &goals)?;
        Ok(serde_json::to_string(&report)?)
    }

    fn metric_report(
        &self,
        buckets: &Buckets,
        metric_type: MetricType,
        unit: String,
    ) -> Result<Option<MetricReport>, AnalyticsError> {
        let per_day = daily_summaries(buckets, metric_type, &unit);
        if per_day.is_empty() {
            return Ok(None);
        }

        let parts: Vec<Summary> = per_day.into_iter().map(|(_, s)| s).collect();
        let summary = Summary::merge(&parts, unit.clone());

        let daily = daily_series(buckets, metric_type);
        let values: Vec<f64> = daily.iter().map(|d| d.value).collect();
        let daily_summary = summarize(&values, &unit);

        let most_recent_first: Vec<f64> = values.iter().rev().copied().collect();
        let trend = self.classifier.analyze(&most_recent_first);

        let chart = match self.config.chart_mode {
            ChartMode::Relative => normalize_series(&values),
            ChartMode::Reference => scale_to_reference(&values, metric_type.chart_reference())?,
        };

        Ok(Some(MetricReport {
            metric_type,
            unit,
            summary,
            daily,
            daily_summary,
            trend,
            chart,
        }))
    }
}

/// Build a report with the default engine
pub fn analyze(
    records: &[MetricRecord],
    period: Period,
    goals: &[Goal],
) -> Result<AnalyticsReport, AnalyticsError> {
    AnalyticsEngine::new().analyze(records, period, goals)
}

/// First unit seen per metric among the records inside the period
fn units_in_period(records: &[MetricRecord], period: Period) -> BTreeMap<MetricType, String> {
    let mut units = BTreeMap::new();
    for record in records.iter().filter(|r| period.contains(r.date())) {
        if !record.unit.is_empty() {
            units
                .entry(record.metric_type)
                .or_insert_with(|| record.unit.clone());
        }
    }
    units
}

fn dashboard(daily_summaries: &BTreeMap<MetricType, Summary>) -> DashboardSummary {
    let average = |metric: MetricType| {
        daily_summaries
            .get(&metric)
            .and_then(Summary::average_if_any)
    };
    let total = |metric: MetricType| {
        daily_summaries
            .get(&metric)
            .filter(|s| !s.is_empty())
            .map(Summary::total)
    };

    DashboardSummary {
        avg_daily_steps: average(MetricType::Steps),
        avg_daily_calories: average(MetricType::Calories),
        total_distance: total(MetricType::Distance),
        avg_sleep_hours: average(MetricType::SleepHours),
        avg_sleep_efficiency: average(MetricType::SleepEfficiency),
        avg_resting_heart_rate: average(MetricType::RestingHeartRate),
        avg_spo2: average(MetricType::Spo2),
        total_active_minutes: total(MetricType::ActiveMinutes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::ScoreRating;
    use crate::types::{GoalType, TrendLabel};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn record(metric: MetricType, value: f64, day: u32, hour: u32) -> MetricRecord {
        MetricRecord::new(metric, value, Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap())
    }

    /// A week of data with steps climbing in the last three days
    fn week_of_records() -> Vec<MetricRecord> {
        let mut records = Vec::new();
        let steps = [6000.0, 6200.0, 5800.0, 7000.0, 11000.0, 12000.0, 11500.0];
        for (i, &total) in steps.iter().enumerate() {
            let day = 10 + i as u32;
            // Split each day's steps over two readings
            records.push(record(MetricType::Steps, total * 0.25, day, 9));
            records.push(record(MetricType::Steps, total * 0.75, day, 19));
            records.push(record(MetricType::SleepHours, 8.0, day, 7));
            records.push(record(MetricType::SleepEfficiency, 88.0, day, 7));
            records.push(record(MetricType::HeartRate, 64.0, day, 12));
        }
        records
    }

    #[test]
    fn test_full_report() {
        let period = Period::new(date(10), date(16)).unwrap();
        let report = analyze(&week_of_records(), period, &[]).unwrap();

        assert_eq!(report.record_count, 35);
        assert_eq!(report.days_with_data, 7);
        assert_eq!(report.metrics.len(), 4);

        let steps = report.metric(MetricType::Steps).unwrap();
        assert_eq!(steps.summary.count, 14);
        assert_eq!(steps.daily.len(), 7);
        assert_eq!(steps.daily[4].value, 11000.0);
        assert_eq!(steps.daily_summary.maximum, 12000.0);
        assert_eq!(steps.trend.label, TrendLabel::Up);
        assert_eq!(steps.chart.points().len(), 7);

        let hr = report.metric(MetricType::HeartRate).unwrap();
        assert_eq!(hr.trend.label, TrendLabel::Stable);
        assert_eq!(hr.unit, "bpm");
    }

    #[test]
    fn test_health_score_from_daily_averages() {
        let period = Period::new(date(10), date(16)).unwrap();
        let report = analyze(&week_of_records(), period, &[]).unwrap();

        // Average daily steps is 8500: 25 + 35 + 35
        assert_eq!(report.health_score.total, 95);
        assert_eq!(report.health_score.steps_points, 25);
        assert_eq!(report.health_score.rating, ScoreRating::Excellent);
        assert!((report.dashboard.avg_daily_steps.unwrap() - 8500.0).abs() < 1e-9);
        assert_eq!(report.dashboard.avg_sleep_hours, Some(8.0));
        assert_eq!(report.dashboard.total_distance, None);
    }

    #[test]
    fn test_empty_period() {
        let period = Period::new(date(1), date(5)).unwrap();
        let report = analyze(&week_of_records(), period, &[]).unwrap();

        assert_eq!(report.record_count, 0);
        assert!(report.metrics.is_empty());
        assert_eq!(report.health_score.total, 20);
        assert_eq!(report.dashboard, DashboardSummary::default());
    }

    #[test]
    fn test_goal_snapshots() {
        let period = Period::new(date(10), date(16)).unwrap();
        let goals = vec![
            Goal::new(GoalType::DailySteps, 10_000.0, "steps"),
            Goal::new(GoalType::SleepHours, 8.0, "hours").with_current_value(4.0),
            Goal::new(GoalType::ActiveMinutes, 30.0, "minutes"),
            Goal::new(GoalType::Custom("meditation".into()), 10.0, "minutes")
                .with_target_date(date(20)),
        ];
        let report = analyze(&week_of_records(), period, &goals).unwrap();

        // Steps goal falls back to the daily average
        assert!((report.goals[0].progress_pct - 85.0).abs() < 1e-9);
        // An explicit snapshot wins over the data
        assert_eq!(report.goals[1].progress_pct, 50.0);
        // No data and no snapshot
        assert_eq!(report.goals[2].current_value, None);
        assert_eq!(report.goals[2].progress_pct, 0.0);
        assert_eq!(report.goals[3].days_remaining, Some(4));
    }

    #[test]
    fn test_invalid_goal_fails_report() {
        let period = Period::new(date(10), date(16)).unwrap();
        let goals = vec![
            Goal::new(GoalType::DailySteps, 10_000.0, "steps"),
            Goal::new(GoalType::SleepHours, 0.0, "hours"),
        ];
        let err = analyze(&week_of_records(), period, &goals).unwrap_err();
        assert!(matches!(err, AnalyticsError::NonPositiveTarget { .. }));
    }

    #[test]
    fn test_reference_chart_mode() {
        let config = EngineConfig {
            chart_mode: ChartMode::Reference,
            ..EngineConfig::default()
        };
        let engine = AnalyticsEngine::with_config(config).unwrap();
        let period = Period::new(date(10), date(16)).unwrap();
        let report = engine.analyze(&week_of_records(), period, &[]).unwrap();

        let steps = report.metric(MetricType::Steps).unwrap();
        // 6000 of a 12000 full scale
        assert_eq!(steps.chart.points()[0].height_pct, 50.0);
        assert_eq!(steps.chart.points()[5].height_pct, 100.0);
    }

    #[test]
    fn test_custom_trend_window() {
        let config = EngineConfig {
            trend_window: 1,
            ..EngineConfig::default()
        };
        let engine = AnalyticsEngine::with_config(config).unwrap();
        assert_eq!(engine.config().trend_window, 1);

        assert!(AnalyticsEngine::with_config(EngineConfig {
            trend_window: 0,
            ..EngineConfig::default()
        })
        .is_err());
    }

    #[test]
    fn test_analyze_json() {
        let records = r#"[
            {"metric_type": "steps", "value": 10000, "recorded_at": "2024-01-15T20:00:00Z"},
            {"metric_type": "sleep", "value": 7.5, "recorded_at": "2024-01-15T07:00:00Z"}
        ]"#;
        let goals = r#"[{"goal_type": "daily_steps", "target_value": 10000, "unit": "steps"}]"#;
        let period = Period::new(date(15), date(15)).unwrap();

        let json = AnalyticsEngine::new()
            .analyze_json(records, period, Some(goals))
            .unwrap();
        let report: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(report["record_count"], 2);
        assert_eq!(report["period"]["start"], "2024-01-15");
        assert_eq!(report["goals"][0]["progress_pct"], 100.0);
        assert_eq!(report["metrics"][1]["metric_type"], "sleep_hours");
        assert_eq!(report["metrics"][0]["trend"]["label"], "stable");
    }

    #[test]
    fn test_analyze_json_rejects_invalid_records() {
        let records = r#"[{"metric_type": "steps", "value": -4, "recorded_at": "2024-01-15T20:00:00Z"}]"#;
        let period = Period::new(date(15), date(15)).unwrap();
        assert!(AnalyticsEngine::new()
            .analyze_json(records, period, None)
            .is_err());
    }

    #[test]
    fn test_deterministic() {
        let records = week_of_records();
        let period = Period::new(date(10), date(16)).unwrap();
        let first = analyze(&records, period, &[]).unwrap();
        let second = analyze(&records, period, &[]).unwrap();
        assert_eq!(first, second);
    }
}
