//! Goal tracking
//!
//! Maps a goal and a current-value snapshot to a completion percentage.
//!
//! Progress is clamped to [0, 100] from both sides and there is no notion of a
//! "lower is better" goal. A weight-loss style target therefore reads as
//! proportional progress toward a higher number. This mirrors how goals have
//! always been reported and is kept until the product defines directional goals.

use crate::error::AnalyticsError;
use crate::types::{Goal, GoalType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Progress report for one goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_type: GoalType,
    pub target_value: f64,
    pub unit: String,
    /// Snapshot the percentage was computed from
    pub current_value: Option<f64>,
    /// Completion percentage (0-100)
    pub progress_pct: f64,
    pub achieved: bool,
    /// Days from the reference date to the target date (negative once past)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
}

/// Completion percentage of `goal` given a current value snapshot.
///
/// `None` means no progress data yet and yields 0. The result is
/// `min(current / target * 100, 100)`, never negative. A target that is not a
/// positive finite number is a configuration error.
pub fn goal_progress(goal: &Goal, current_value: Option<f64>) -> Result<f64, AnalyticsError> {
    validate_target(goal)?;

    let progress = match current_value {
        Some(current) if current.is_finite() => {
            (current / goal.target_value * 100.0).clamp(0.0, 100.0)
        }
        // A non-finite snapshot carries no usable progress
        _ => 0.0,
    };

    Ok(progress)
}

/// Build a full progress report for `goal` as of `as_of`
pub fn track(
    goal: &Goal,
    current_value: Option<f64>,
    as_of: NaiveDate,
) -> Result<GoalProgress, AnalyticsError> {
    let progress_pct = goal_progress(goal, current_value)?;

    Ok(GoalProgress {
        goal_type: goal.goal_type.clone(),
        target_value: goal.target_value,
        unit: goal.unit.clone(),
        current_value,
        progress_pct,
        achieved: progress_pct >= 100.0,
        days_remaining: goal.target_date.map(|d| (d - as_of).num_days()),
    })
}

impl Goal {
    /// Completion percentage from the goal's own snapshot
    pub fn progress(&self) -> Result<f64, AnalyticsError> {
        goal_progress(self, self.current_value)
    }
}

fn validate_target(goal: &Goal) -> Result<(), AnalyticsError> {
    if goal.target_value.is_finite() && goal.target_value > 0.0 {
        Ok(())
    } else {
        Err(AnalyticsError::NonPositiveTarget {
            goal_type: goal.goal_type.as_str().to_string(),
            target: goal.target_value,
        })
    }
}
