use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use pulse_analytics::bucketing::{bucket, daily_series, flatten};
use pulse_analytics::engine::DashboardSummary;
use pulse_analytics::score::ScoreRating;
use pulse_analytics::{
    AnalyticsEngine, AnalyticsError, ChartMode, EngineConfig, MetricType, Period, RecordAdapter,
    TrendLabel,
};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

/// Two weeks of mixed readings as a device sync would deliver them
fn sync_ndjson() -> String {
    let mut lines = Vec::new();
    for day in 1..=14u32 {
        let steps = if day <= 7 { 4000 + day * 100 } else { 9000 + day * 100 };
        lines.push(format!(
            r#"{{"id": "s-{day}", "metric_type": "steps", "value": {steps}, "recorded_at": "2024-03-{day:02}T21:00:00Z", "device_id": "band"}}"#
        ));
        lines.push(format!(
            r#"{{"metric_type": "sleep_duration", "value": 7.5, "recorded_at": "2024-03-{day:02}T06:30:00Z"}}"#
        ));
        lines.push(format!(
            r#"{{"metric_type": "sleep_efficiency", "value": 80, "recorded_at": "2024-03-{day:02}T06:30:00Z"}}"#
        ));
        lines.push(format!(
            r#"{{"metric_type": "distance_km", "value": 2.5, "recorded_at": "2024-03-{day:02}T18:00:00Z"}}"#
        ));
        lines.push(format!(
            r#"{{"metric_type": "distance_km", "value": 1.5, "recorded_at": "2024-03-{day:02}T08:00:00Z"}}"#
        ));
        lines.push(format!(
            r#"{{"metric_type": "resting_heart_rate", "value": 58, "recorded_at": "2024-03-{day:02}T06:00:00Z"}}"#
        ));
        for (hour, spo2) in [(2, 96), (4, 98)] {
            lines.push(format!(
                r#"{{"metric_type": "spo2", "value": {spo2}, "recorded_at": "2024-03-{day:02}T{hour:02}:00:00Z"}}"#
            ));
        }
        for (hour, minutes) in [(12, 20), (17, 25)] {
            lines.push(format!(
                r#"{{"metric_type": "active_minutes", "value": {minutes}, "recorded_at": "2024-03-{day:02}T{hour:02}:30:00Z"}}"#
            ));
        }
    }
    lines.join("\n")
}

#[test]
fn test_two_week_report() {
    let records = RecordAdapter::parse_ndjson(&sync_ndjson()).unwrap();
    assert!(RecordAdapter::validate_records(&records).is_empty());

    let period = Period::ending(date(14), 14).unwrap();
    assert_eq!(period.start(), date(1));

    let report = AnalyticsEngine::new().analyze(&records, period, &[]).unwrap();

    assert_eq!(report.record_count, 140);
    assert_eq!(report.days_with_data, 14);

    let metrics: Vec<MetricType> = report.metrics.iter().map(|m| m.metric_type).collect();
    assert_eq!(
        metrics,
        vec![
            MetricType::Steps,
            MetricType::RestingHeartRate,
            MetricType::SleepHours,
            MetricType::SleepEfficiency,
            MetricType::Spo2,
            MetricType::ActiveMinutes,
            MetricType::Distance,
        ]
    );

    let steps = report.metric(MetricType::Steps).unwrap();
    assert_eq!(steps.trend.label, TrendLabel::Up);
    assert_eq!(steps.daily_summary.minimum, 4100.0);
    assert_eq!(steps.daily_summary.maximum, 10400.0);

    let distance = report.metric(MetricType::Distance).unwrap();
    assert_eq!(distance.summary.count, 28);
    assert_eq!(distance.daily[0].value, 4.0);
    assert_eq!(distance.trend.label, TrendLabel::Stable);

    // 14 days at 4 km and 45 active minutes each; steps average 7250
    assert_eq!(
        report.dashboard,
        DashboardSummary {
            avg_daily_steps: Some(7250.0),
            avg_daily_calories: None,
            total_distance: Some(56.0),
            avg_sleep_hours: Some(7.5),
            avg_sleep_efficiency: Some(80.0),
            avg_resting_heart_rate: Some(58.0),
            avg_spo2: Some(97.0),
            total_active_minutes: Some(630.0),
        }
    );

    // 20 + 35 + 25
    assert_eq!(report.health_score.total, 80);
    assert_eq!(report.health_score.rating, ScoreRating::Excellent);
}

#[test]
fn test_buckets_and_daily_series() {
    let records = RecordAdapter::parse_ndjson(&sync_ndjson()).unwrap();
    let buckets = bucket(&records, date(2), date(3));

    let flat = flatten(&buckets);
    assert_eq!(flat.len(), 14);
    assert_eq!(flat[0].date, date(2));
    assert_eq!(flat[0].metric_type, MetricType::Steps);

    // Distance readings are ordered by time within the day
    let distance = flat
        .iter()
        .find(|b| b.metric_type == MetricType::Distance)
        .unwrap();
    assert_eq!(distance.values, vec![1.5, 2.5]);

    let steps: Vec<f64> = daily_series(&buckets, MetricType::Steps)
        .iter()
        .map(|d| d.value)
        .collect();
    assert_eq!(steps, vec![4200.0, 4300.0]);

    assert!(bucket(&records, date(3), date(2)).is_empty());
}

#[test]
fn test_goals_from_json() {
    let records = RecordAdapter::parse_ndjson(&sync_ndjson()).unwrap();
    let records_json = serde_json::to_string(&records).unwrap();
    let goals = r#"[
        {"goal_type": "daily_steps", "target_value": 10000, "unit": "steps"},
        {"goal_type": "sleep_hours", "target_value": 7, "unit": "hours", "target_date": "2024-03-31"},
        {"goal_type": "read_pages", "target_value": 20, "unit": "pages", "current_value": 5}
    ]"#;

    let json = AnalyticsEngine::new()
        .analyze_json(&records_json, Period::new(date(1), date(14)).unwrap(), Some(goals))
        .unwrap();
    let report: serde_json::Value = serde_json::from_str(&json).unwrap();

    // Falls back to the 7250 daily step average
    let steps_pct = report["goals"][0]["progress_pct"].as_f64().unwrap();
    assert!((steps_pct - 72.5).abs() < 1e-9);
    assert_eq!(report["goals"][0]["achieved"], false);
    assert_eq!(report["goals"][1]["progress_pct"], 100.0);
    assert_eq!(report["goals"][1]["achieved"], true);
    assert_eq!(report["goals"][1]["days_remaining"], 17);
    assert_eq!(report["goals"][2]["goal_type"], "read_pages");
    assert_eq!(report["goals"][2]["progress_pct"], 25.0);
}

#[test]
fn test_reference_chart_config() {
    let records = RecordAdapter::parse_ndjson(&sync_ndjson()).unwrap();
    let config = EngineConfig::from_json(r#"{"chart_mode": "reference", "trend_window": 7}"#).unwrap();
    assert_eq!(config.chart_mode, ChartMode::Reference);

    let engine = AnalyticsEngine::with_config(config).unwrap();
    let report = engine
        .analyze(&records, Period::new(date(1), date(14)).unwrap(), &[])
        .unwrap();

    let sleep = report.metric(MetricType::SleepHours).unwrap();
    // 7.5 of a 10 hour full scale
    assert_eq!(sleep.chart.points()[0].height_pct, 75.0);
    assert_eq!(sleep.trend.sample_size, 14);
}

#[test]
fn test_configuration_errors() {
    assert!(matches!(
        Period::new(date(5), date(1)),
        Err(AnalyticsError::InvertedDateRange { .. })
    ));
    assert!(matches!(Period::ending(date(5), 0), Err(AnalyticsError::EmptyPeriod(0))));

    let err = EngineConfig::from_json(r#"{"trend_threshold_pct": -1}"#).unwrap_err();
    assert!(err.is_configuration_error());
}
