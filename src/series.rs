//! Series normalization for charts
//!
//! Rescales a value sequence to bar heights. The relative mode uses the
//! sequence's own min/max as the scale; the reference mode measures each value
//! against a fixed full-scale value per metric.

use crate::error::AnalyticsError;
use crate::summary::summarize;
use serde::{Deserialize, Serialize};

/// One chart point: the raw value and its bar height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub value: f64,
    /// Bar height as a percentage (0-100)
    pub height_pct: f64,
}

impl SeriesPoint {
    /// Height on a [0, 1] scale
    pub fn height_fraction(&self) -> f64 {
        self.height_pct / 100.0
    }
}

/// Result of normalizing a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NormalizedSeries {
    /// Nothing to chart
    NoData,
    Series {
        points: Vec<SeriesPoint>,
        /// Raw minimum, for captions
        min: f64,
        /// Raw maximum, for captions
        max: f64,
        /// Raw average, for captions
        average: f64,
    },
}

impl NormalizedSeries {
    pub fn is_empty(&self) -> bool {
        matches!(self, NormalizedSeries::NoData)
    }

    pub fn points(&self) -> &[SeriesPoint] {
        match self {
            NormalizedSeries::NoData => &[],
            NormalizedSeries::Series { points, .. } => points,
        }
    }
}

/// Scale each value into [0, 100] against the sequence's own range.
///
/// `height = (v - min) / (max - min) * 100`, with a range of zero replaced by
/// one, so a sequence of equal values charts as all-zero bars. Non-finite
/// values are left out of both the points and the stats.
pub fn normalize_series(values: &[f64]) -> NormalizedSeries {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let stats = summarize(&finite, "");
    if stats.is_empty() {
        return NormalizedSeries::NoData;
    }

    let (min, max) = (stats.minimum, stats.maximum);
    // Halve everything when the span itself overflows
    let scale = if (max - min).is_finite() { 1.0 } else { 0.5 };
    let range = max * scale - min * scale;
    let range = if range == 0.0 { 1.0 } else { range };

    let points = finite
        .iter()
        .map(|&value| SeriesPoint {
            value,
            height_pct: ((value * scale - min * scale) / range * 100.0).clamp(0.0, 100.0),
        })
        .collect();

    NormalizedSeries::Series {
        points,
        min,
        max,
        average: stats.average,
    }
}

/// Scale each value as a share of a fixed full-scale `reference`, capped at 100.
///
/// Negative values chart as empty bars. The reference must be a positive
/// finite number.
pub fn scale_to_reference(values: &[f64], reference: f64) -> Result<NormalizedSeries, AnalyticsError> {
    if !reference.is_finite() || reference <= 0.0 {
        return Err(AnalyticsError::InvalidChartReference(reference));
    }

    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let stats = summarize(&finite, "");
    if stats.is_empty() {
        return Ok(NormalizedSeries::NoData);
    }

    let points = finite
        .iter()
        .map(|&value| SeriesPoint {
            value,
            height_pct: (value / reference * 100.0).clamp(0.0, 100.0),
        })
        .collect();

    Ok(NormalizedSeries::Series {
        points,
        min: stats.minimum,
        max: stats.maximum,
        average: stats.average,
    })
}
