//! Core types for Pulse Analytics
//!
//! This module defines the data model the engine reads and produces: metric
//! records supplied by a storage layer, analysis periods, summaries, goals,
//! health score inputs and trend labels.

use crate::error::AnalyticsError;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of health metrics understood by the engine
///
/// Legacy names seen in stored data (`heart_rate_avg`, `sleep`, `sleep_duration`,
/// `calories_burned`, `distance_km`) are accepted as aliases when parsing, but
/// the engine only ever emits the canonical names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Steps,
    #[serde(alias = "heart_rate_avg")]
    HeartRate,
    RestingHeartRate,
    #[serde(alias = "sleep", alias = "sleep_duration")]
    SleepHours,
    SleepEfficiency,
    #[serde(alias = "calories_burned")]
    Calories,
    Spo2,
    ActiveMinutes,
    #[serde(alias = "distance_km")]
    Distance,
}

/// How multiple readings of the same metric on one day collapse into a daily value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyAggregation {
    /// Readings are increments of a running total (steps, calories)
    Sum,
    /// Readings are samples of a level (heart rate, SpO2)
    Mean,
}

impl MetricType {
    /// Every metric type, in canonical order
    pub const ALL: [MetricType; 9] = [
        MetricType::Steps,
        MetricType::HeartRate,
        MetricType::RestingHeartRate,
        MetricType::SleepHours,
        MetricType::SleepEfficiency,
        MetricType::Calories,
        MetricType::Spo2,
        MetricType::ActiveMinutes,
        MetricType::Distance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Steps => "steps",
            MetricType::HeartRate => "heart_rate",
            MetricType::RestingHeartRate => "resting_heart_rate",
            MetricType::SleepHours => "sleep_hours",
            MetricType::SleepEfficiency => "sleep_efficiency",
            MetricType::Calories => "calories",
            MetricType::Spo2 => "spo2",
            MetricType::ActiveMinutes => "active_minutes",
            MetricType::Distance => "distance",
        }
    }

    /// Unit assumed when a record arrives without one
    pub fn default_unit(&self) -> &'static str {
        match self {
            MetricType::Steps => "steps",
            MetricType::HeartRate | MetricType::RestingHeartRate => "bpm",
            MetricType::SleepHours => "hours",
            MetricType::SleepEfficiency | MetricType::Spo2 => "%",
            MetricType::Calories => "kcal",
            MetricType::ActiveMinutes => "minutes",
            MetricType::Distance => "km",
        }
    }

    pub fn daily_aggregation(&self) -> DailyAggregation {
        match self {
            MetricType::Steps
            | MetricType::Calories
            | MetricType::ActiveMinutes
            | MetricType::Distance => DailyAggregation::Sum,
            MetricType::HeartRate
            | MetricType::RestingHeartRate
            | MetricType::SleepHours
            | MetricType::SleepEfficiency
            | MetricType::Spo2 => DailyAggregation::Mean,
        }
    }

    /// Full-scale value for fixed-reference bar charts
    pub fn chart_reference(&self) -> f64 {
        match self {
            MetricType::Steps => 12_000.0,
            MetricType::ActiveMinutes => 120.0,
            MetricType::SleepHours => 10.0,
            MetricType::Spo2 | MetricType::SleepEfficiency => 100.0,
            _ => 120.0,
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "steps" => Ok(MetricType::Steps),
            "heart_rate" | "heart_rate_avg" => Ok(MetricType::HeartRate),
            "resting_heart_rate" => Ok(MetricType::RestingHeartRate),
            "sleep_hours" | "sleep" | "sleep_duration" => Ok(MetricType::SleepHours),
            "sleep_efficiency" => Ok(MetricType::SleepEfficiency),
            "calories" | "calories_burned" => Ok(MetricType::Calories),
            "spo2" => Ok(MetricType::Spo2),
            "active_minutes" => Ok(MetricType::ActiveMinutes),
            "distance" | "distance_km" => Ok(MetricType::Distance),
            other => Err(AnalyticsError::UnknownMetricType(other.to_string())),
        }
    }
}

fn generate_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A single timestamped reading from a wearable device or manual entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Record identifier (generated when absent from input)
    #[serde(default = "generate_record_id")]
    pub id: String,
    /// Metric this reading belongs to
    pub metric_type: MetricType,
    /// Reading value
    pub value: f64,
    /// Measurement unit (empty until ingestion fills in the metric default)
    #[serde(default)]
    pub unit: String,
    /// When the reading was taken (UTC)
    pub recorded_at: DateTime<Utc>,
    /// Source device, if the reading did not come from manual entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl MetricRecord {
    /// Create a record with a generated id and the metric's default unit
    pub fn new(metric_type: MetricType, value: f64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id: generate_record_id(),
            metric_type,
            value,
            unit: metric_type.default_unit().to_string(),
            recorded_at,
            device_id: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// UTC calendar date the record falls on
    pub fn date(&self) -> NaiveDate {
        self.recorded_at.date_naive()
    }
}

#[derive(Deserialize)]
struct PeriodBounds {
    start: NaiveDate,
    end: NaiveDate,
}

/// Inclusive range of calendar days an analysis covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PeriodBounds")]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<PeriodBounds> for Period {
    type Error = AnalyticsError;

    fn try_from(bounds: PeriodBounds) -> Result<Self, Self::Error> {
        Period::new(bounds.start, bounds.end)
    }
}

impl Period {
    /// Create a period, rejecting a start date after the end date
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AnalyticsError> {
        if start > end {
            return Err(AnalyticsError::InvertedDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days`-long window ending on (and including) `end`
    pub fn ending(end: NaiveDate, days: u32) -> Result<Self, AnalyticsError> {
        if days == 0 {
            return Err(AnalyticsError::EmptyPeriod(days));
        }
        let start = end
            .checked_sub_days(Days::new(u64::from(days) - 1))
            .ok_or(AnalyticsError::PeriodOutOfRange { end, days })?;
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, counting both ends
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Statistical profile of a value list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub count: usize,
    pub unit: String,
}

/// Summary tagged with the metric it describes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub metric_type: MetricType,
    #[serde(flatten)]
    pub summary: Summary,
}

/// Kind of target a goal tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    DailySteps,
    SleepHours,
    ActiveMinutes,
    DailyCalories,
    /// For goals the engine has no metric mapping for
    #[serde(untagged)]
    Custom(String),
}

impl GoalType {
    pub fn as_str(&self) -> &str {
        match self {
            GoalType::DailySteps => "daily_steps",
            GoalType::SleepHours => "sleep_hours",
            GoalType::ActiveMinutes => "active_minutes",
            GoalType::DailyCalories => "daily_calories",
            GoalType::Custom(name) => name.as_str(),
        }
    }

    /// Metric whose daily average can stand in for a missing current value
    pub fn metric_type(&self) -> Option<MetricType> {
        match self {
            GoalType::DailySteps => Some(MetricType::Steps),
            GoalType::SleepHours => Some(MetricType::SleepHours),
            GoalType::ActiveMinutes => Some(MetricType::ActiveMinutes),
            GoalType::DailyCalories => Some(MetricType::Calories),
            GoalType::Custom(_) => None,
        }
    }
}

/// A user-defined numeric target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub goal_type: GoalType,
    /// Target value, must be strictly positive
    pub target_value: f64,
    #[serde(default)]
    pub unit: String,
    /// Latest progress snapshot; `None` means no progress data yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

impl Goal {
    pub fn new(goal_type: GoalType, target_value: f64, unit: impl Into<String>) -> Self {
        Self {
            goal_type,
            target_value,
            unit: unit.into(),
            current_value: None,
            target_date: None,
        }
    }

    pub fn with_current_value(mut self, value: f64) -> Self {
        self.current_value = Some(value);
        self
    }

    pub fn with_target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }
}

/// Averages feeding the composite health score; any of them may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthScoreInputs {
    #[serde(default)]
    pub avg_steps: Option<f64>,
    #[serde(default)]
    pub avg_sleep_hours: Option<f64>,
    /// Sleep efficiency as a percentage (0-100)
    #[serde(default)]
    pub avg_sleep_efficiency: Option<f64>,
}

/// Direction of a metric relative to its recent history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Up,
    Down,
    Stable,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::Up => "up",
            TrendLabel::Down => "down",
            TrendLabel::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
