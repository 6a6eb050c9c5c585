//! Engine configuration
//!
//! Tunables for the report engine. Configuration round-trips through JSON so
//! a host application can keep it alongside its own settings.

use crate::error::AnalyticsError;
use crate::trend::{TrendClassifier, DEFAULT_TREND_THRESHOLD_PCT, DEFAULT_TREND_WINDOW};
use serde::{Deserialize, Serialize};

/// Default analysis period in days
pub const DEFAULT_PERIOD_DAYS: u32 = 30;

/// Period lengths offered by the dashboards
pub const SUPPORTED_PERIOD_DAYS: [u32; 5] = [7, 14, 28, 30, 90];

/// How chart bars are scaled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    /// Against the series' own min/max
    #[default]
    Relative,
    /// Against each metric's fixed full-scale value
    Reference,
}

fn default_trend_window() -> usize {
    DEFAULT_TREND_WINDOW
}

fn default_trend_threshold_pct() -> f64 {
    DEFAULT_TREND_THRESHOLD_PCT
}

/// Report engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Points in each trend sub-window
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,
    /// Percent change needed to call a trend up or down
    #[serde(default = "default_trend_threshold_pct")]
    pub trend_threshold_pct: f64,
    #[serde(default)]
    pub chart_mode: ChartMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trend_window: DEFAULT_TREND_WINDOW,
            trend_threshold_pct: DEFAULT_TREND_THRESHOLD_PCT,
            chart_mode: ChartMode::default(),
        }
    }
}

impl EngineConfig {
    /// Check every setting, returning the first invalid one
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        self.trend_classifier().map(|_| ())
    }

    /// Classifier built from the trend settings
    pub fn trend_classifier(&self) -> Result<TrendClassifier, AnalyticsError> {
        TrendClassifier::new(self.trend_window, self.trend_threshold_pct)
    }

    /// Load configuration from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, AnalyticsError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.trend_window, 3);
        assert_eq!(config.trend_threshold_pct, 5.0);
        assert_eq!(config.chart_mode, ChartMode::Relative);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{"trend_window": 5}"#).unwrap();
        assert_eq!(config.trend_window, 5);
        assert_eq!(config.trend_threshold_pct, DEFAULT_TREND_THRESHOLD_PCT);

        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"trend_window": 0}"#),
            Err(AnalyticsError::InvalidTrendWindow(0))
        ));
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(AnalyticsError::JsonError(_))
        ));
    }

    #[test]
    fn test_serialization() {
        let config = EngineConfig {
            trend_window: 7,
            trend_threshold_pct: 2.5,
            chart_mode: ChartMode::Reference,
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"chart_mode\":\"reference\""));
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
