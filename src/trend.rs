//! Trend classification
//!
//! Labels a metric up, down or stable by comparing the average of its most
//! recent readings against the average of its oldest readings.
//!
//! With fewer than twice the window of points the two sub-windows overlap. A
//! small sample makes for a noisy trend and that is accepted as-is.

use crate::error::AnalyticsError;
use crate::summary::finite_mean;
use crate::types::TrendLabel;
use serde::{Deserialize, Serialize};

/// Default number of points in each of the recent and older sub-windows
pub const DEFAULT_TREND_WINDOW: usize = 3;

/// Default percent change beyond which a metric counts as moving
pub const DEFAULT_TREND_THRESHOLD_PCT: f64 = 5.0;

/// Trend label together with the numbers behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub label: TrendLabel,
    /// Average of the most recent sub-window
    pub recent_average: Option<f64>,
    /// Average of the oldest sub-window
    pub older_average: Option<f64>,
    /// Percent change from older to recent, when defined
    pub change_pct: Option<f64>,
    /// Number of finite points considered
    pub sample_size: usize,
}

impl TrendAnalysis {
    fn stable(sample_size: usize) -> Self {
        Self {
            label: TrendLabel::Stable,
            recent_average: None,
            older_average: None,
            change_pct: None,
            sample_size,
        }
    }
}

/// Sub-window trend classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendClassifier {
    window: usize,
    threshold_pct: f64,
}

impl Default for TrendClassifier {
    fn default() -> Self {
        Self {
            window: DEFAULT_TREND_WINDOW,
            threshold_pct: DEFAULT_TREND_THRESHOLD_PCT,
        }
    }
}

impl TrendClassifier {
    /// Create a classifier with a custom window and threshold
    pub fn new(window: usize, threshold_pct: f64) -> Result<Self, AnalyticsError> {
        if window == 0 {
            return Err(AnalyticsError::InvalidTrendWindow(window));
        }
        if !threshold_pct.is_finite() || threshold_pct < 0.0 {
            return Err(AnalyticsError::InvalidTrendThreshold(threshold_pct));
        }
        Ok(Self {
            window,
            threshold_pct,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }

    /// Classify a most-recent-first value sequence
    pub fn classify(&self, values: &[f64]) -> TrendLabel {
        self.analyze(values).label
    }

    /// Classify a most-recent-first value sequence and report the averages used.
    ///
    /// Non-finite values are dropped first. Fewer than two points is stable. A
    /// zero older average is also stable: a relative change from a zero
    /// baseline is undefined, and reporting "no trend" is the chosen policy.
    pub fn analyze(&self, values: &[f64]) -> TrendAnalysis {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let len = finite.len();

        if len < 2 {
            return TrendAnalysis::stable(len);
        }

        let k = self.window.min(len);
        let (recent, older) = match (finite_mean(&finite[..k]), finite_mean(&finite[len - k..])) {
            (Some(recent), Some(older)) => (recent, older),
            _ => return TrendAnalysis::stable(len),
        };

        if older == 0.0 {
            return TrendAnalysis {
                recent_average: Some(recent),
                older_average: Some(older),
                ..TrendAnalysis::stable(len)
            };
        }

        let change_pct = (recent - older) / older * 100.0;
        let label = if change_pct > self.threshold_pct {
            TrendLabel::Up
        } else if change_pct < -self.threshold_pct {
            TrendLabel::Down
        } else {
            TrendLabel::Stable
        };

        TrendAnalysis {
            label,
            recent_average: Some(recent),
            older_average: Some(older),
            change_pct: Some(change_pct),
            sample_size: len,
        }
    }
}

/// Classify a most-recent-first value sequence with the default window and threshold
pub fn classify_trend(values: &[f64]) -> TrendLabel {
    TrendClassifier::default().classify(values)
}
