//! Composite health score
//!
//! Scores average steps, sleep duration and sleep efficiency against fixed
//! bands and sums the points into a 0-100 integer. Bands are step functions,
//! not interpolations, so a score can always be explained band by band.

use crate::types::{HealthScoreInputs, MetricType, Summary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum points from the steps band
pub const STEPS_MAX_POINTS: u8 = 30;
/// Maximum points from the sleep duration band
pub const SLEEP_DURATION_MAX_POINTS: u8 = 35;
/// Maximum points from the sleep efficiency band
pub const SLEEP_EFFICIENCY_MAX_POINTS: u8 = 35;

/// Qualitative reading of a total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRating {
    /// 80 and above
    Excellent,
    /// 60 to 79
    Good,
    NeedsAttention,
}

impl ScoreRating {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreRating::Excellent,
            60..=79 => ScoreRating::Good,
            _ => ScoreRating::NeedsAttention,
        }
    }
}

/// Health score with per-band points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub total: u8,
    pub steps_points: u8,
    pub sleep_duration_points: u8,
    pub sleep_efficiency_points: u8,
    pub rating: ScoreRating,
    /// Inputs the bands were applied to
    pub inputs: HealthScoreInputs,
}

/// Composite score in [0, 100]; missing inputs take their lowest band
pub fn health_score(inputs: &HealthScoreInputs) -> u8 {
    score_breakdown(inputs).total
}

/// Composite score with the points each band contributed
pub fn score_breakdown(inputs: &HealthScoreInputs) -> HealthScore {
    let steps_points = steps_points(finite(inputs.avg_steps));
    let sleep_duration_points = sleep_duration_points(finite(inputs.avg_sleep_hours));
    let sleep_efficiency_points = sleep_efficiency_points(finite(inputs.avg_sleep_efficiency));

    let total = steps_points + sleep_duration_points + sleep_efficiency_points;

    HealthScore {
        total,
        steps_points,
        sleep_duration_points,
        sleep_efficiency_points,
        rating: ScoreRating::from_score(total),
        inputs: *inputs,
    }
}

impl HealthScoreInputs {
    /// Pick score inputs out of per-metric summaries of daily values
    pub fn from_summaries(summaries: &BTreeMap<MetricType, Summary>) -> Self {
        let average = |metric: MetricType| summaries.get(&metric).and_then(Summary::average_if_any);

        Self {
            avg_steps: average(MetricType::Steps),
            avg_sleep_hours: average(MetricType::SleepHours),
            avg_sleep_efficiency: average(MetricType::SleepEfficiency),
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn steps_points(avg_steps: Option<f64>) -> u8 {
    match avg_steps {
        Some(steps) if steps >= 10_000.0 => 30,
        Some(steps) if steps >= 8_000.0 => 25,
        Some(steps) if steps >= 5_000.0 => 20,
        Some(steps) if steps >= 3_000.0 => 15,
        _ => 10,
    }
}

fn sleep_duration_points(avg_hours: Option<f64>) -> u8 {
    match avg_hours {
        Some(hours) if (7.0..=9.0).contains(&hours) => 35,
        Some(hours) if (6.0..=10.0).contains(&hours) => 25,
        Some(hours) if hours >= 5.0 => 15,
        _ => 5,
    }
}

fn sleep_efficiency_points(avg_efficiency: Option<f64>) -> u8 {
    match avg_efficiency {
        Some(pct) if pct >= 85.0 => 35,
        Some(pct) if pct >= 75.0 => 25,
        Some(pct) if pct >= 65.0 => 15,
        _ => 5,
    }
}
