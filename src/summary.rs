//! Summary calculation
//!
//! Reduces a value list to `{average, minimum, maximum, count}` and recombines
//! per-day summaries into period summaries.

use crate::types::Summary;

impl Summary {
    /// The zero state for a value list with nothing in it
    pub fn empty(unit: impl Into<String>) -> Self {
        Self {
            average: 0.0,
            minimum: 0.0,
            maximum: 0.0,
            count: 0,
            unit: unit.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Sum of the summarized values, reconstructed from average and count
    pub fn total(&self) -> f64 {
        self.average * self.count as f64
    }

    /// Average if any values were summarized
    pub fn average_if_any(&self) -> Option<f64> {
        (self.count > 0).then_some(self.average)
    }

    /// Combine summaries of disjoint value lists into one.
    ///
    /// The average is the count-weighted mean of the parts, so merging per-day
    /// summaries reproduces the summary of the underlying raw values.
    pub fn merge(parts: &[Summary], unit: impl Into<String>) -> Summary {
        let unit = unit.into();
        let mut count = 0usize;
        let mut total = 0.0_f64;
        let mut minimum = f64::INFINITY;
        let mut maximum = f64::NEG_INFINITY;

        for part in parts.iter().filter(|p| !p.is_empty()) {
            count += part.count;
            total += part.total();
            minimum = minimum.min(part.minimum);
            maximum = maximum.max(part.maximum);
        }

        if count == 0 {
            return Summary::empty(unit);
        }

        Summary {
            average: (total / count as f64).clamp(minimum, maximum),
            minimum,
            maximum,
            count,
            unit,
        }
    }
}

/// Summarize a value list.
///
/// Non-finite values are skipped. An empty (or entirely non-finite) list yields
/// the all-zero summary with `count == 0`.
pub fn summarize(values: &[f64], unit: &str) -> Summary {
    let mut count = 0usize;
    let mut sum = 0.0_f64;
    let mut minimum = f64::INFINITY;
    let mut maximum = f64::NEG_INFINITY;

    for &value in values.iter().filter(|v| v.is_finite()) {
        count += 1;
        sum += value;
        minimum = minimum.min(value);
        maximum = maximum.max(value);
    }

    if count == 0 {
        return Summary::empty(unit);
    }

    // Rounding in the sum can push the mean a hair outside the observed range
    let average = (sum / count as f64).clamp(minimum, maximum);

    Summary {
        average,
        minimum,
        maximum,
        count,
        unit: unit.to_string(),
    }
}

/// Arithmetic mean of the finite values, or `None` if there are none
pub(crate) fn finite_mean(values: &[f64]) -> Option<f64> {
    let summary = summarize(values, "");
    summary.average_if_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_basic() {
        let summary = summarize(&[8000.0, 12000.0, 10000.0], "steps");

        assert!((summary.average - 10000.0).abs() < 1e-9);
        assert_eq!(summary.minimum, 8000.0);
        assert_eq!(summary.maximum, 12000.0);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.unit, "steps");
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[], "bpm");

        assert_eq!(summary, Summary::empty("bpm"));
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.minimum, 0.0);
        assert_eq!(summary.maximum, 0.0);
        assert!(summary.is_empty());
        assert_eq!(summary.average_if_any(), None);
    }

    #[test]
    fn test_summarize_skips_non_finite() {
        let summary = summarize(&[60.0, f64::NAN, 80.0, f64::INFINITY], "bpm");

        assert_eq!(summary.count, 2);
        assert!((summary.average - 70.0).abs() < 1e-9);
        assert_eq!(summary.maximum, 80.0);

        let summary = summarize(&[f64::NAN, f64::NEG_INFINITY], "bpm");
        assert!(summary.is_empty());
        assert_eq!(summary.average, 0.0);
    }

    #[test]
    fn test_average_within_range_for_repeated_values() {
        let summary = summarize(&[0.1, 0.1, 0.1], "hours");
        assert!(summary.minimum <= summary.average);
        assert!(summary.average <= summary.maximum);
    }

    #[test]
    fn test_summarize_large_magnitudes() {
        // A year of ~100k-step days must not lose the total
        let values = vec![100_000.0; 365];
        let summary = summarize(&values, "steps");
        assert_eq!(summary.total(), 36_500_000.0);
        assert_eq!(summary.average, 100_000.0);
    }

    #[test]
    fn test_merge_matches_direct_summary() {
        let day_one = [7000.0, 1500.0];
        let day_two = [9000.0];
        let day_three = [400.0, 600.0, 12000.0];

        let parts = vec![
            summarize(&day_one, "steps"),
            summarize(&day_two, "steps"),
            summarize(&day_three, "steps"),
        ];
        let merged = Summary::merge(&parts, "steps");

        let all: Vec<f64> = day_one
            .iter()
            .chain(day_two.iter())
            .chain(day_three.iter())
            .copied()
            .collect();
        let direct = summarize(&all, "steps");

        assert_eq!(merged.count, direct.count);
        assert_eq!(merged.minimum, direct.minimum);
        assert_eq!(merged.maximum, direct.maximum);
        assert!((merged.average - direct.average).abs() < 1e-9);
    }

    #[test]
    fn test_merge_ignores_empty_parts() {
        let parts = vec![Summary::empty("bpm"), summarize(&[70.0], "bpm")];
        let merged = Summary::merge(&parts, "bpm");
        assert_eq!(merged.count, 1);
        assert_eq!(merged.minimum, 70.0);

        assert_eq!(Summary::merge(&[], "bpm"), Summary::empty("bpm"));
    }
}
