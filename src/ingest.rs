//! Record ingestion
//!
//! Parses metric records handed over by the storage layer (JSON array or
//! NDJSON), fills in defaults, and validates values before they reach the
//! engine.

use crate::error::AnalyticsError;
use crate::types::MetricRecord;

/// Parser and validator for incoming metric records
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse a JSON string containing an array of records
    pub fn parse_array(json: &str) -> Result<Vec<MetricRecord>, AnalyticsError> {
        Ok(Self::incoming_array(json)?
            .into_iter()
            .map(|incoming| incoming.record)
            .collect())
    }

    /// Parse NDJSON (newline-delimited JSON) containing records
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<MetricRecord>, AnalyticsError> {
        Ok(Self::incoming_ndjson(ndjson)?
            .into_iter()
            .map(|incoming| incoming.record)
            .collect())
    }

    /// Parse and validate a JSON array, reporting only ids present in the input
    pub fn validate_array(json: &str) -> Result<BatchValidation, AnalyticsError> {
        Ok(BatchValidation::from_incoming(&Self::incoming_array(json)?))
    }

    /// Parse and validate NDJSON, reporting only ids present in the input
    pub fn validate_ndjson(ndjson: &str) -> Result<BatchValidation, AnalyticsError> {
        Ok(BatchValidation::from_incoming(&Self::incoming_ndjson(ndjson)?))
    }

    fn incoming_array(json: &str) -> Result<Vec<Incoming>, AnalyticsError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        values
            .into_iter()
            .map(|value| Ok(Incoming::from_value(value)?))
            .collect()
    }

    fn incoming_ndjson(ndjson: &str) -> Result<Vec<Incoming>, AnalyticsError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let parsed = serde_json::from_str::<serde_json::Value>(trimmed)
                .and_then(Incoming::from_value);
            match parsed {
                Ok(incoming) => records.push(incoming),
                Err(e) => {
                    return Err(AnalyticsError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Validate a batch of records, returning only the failures
    pub fn validate_records(records: &[MetricRecord]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .filter_map(|(idx, record)| {
                validate(record).err().map(|error| ValidationResult {
                    index: idx,
                    record_id: Some(record.id.clone()),
                    error,
                })
            })
            .collect()
    }

    /// Parse a JSON array and reject the batch if any record is invalid
    pub fn parse_valid_array(json: &str) -> Result<Vec<MetricRecord>, AnalyticsError> {
        let records = Self::parse_array(json)?;
        if let Some(failure) = Self::validate_records(&records).into_iter().next() {
            return Err(AnalyticsError::InvalidRecord {
                index: failure.index,
                reason: failure.error.to_string(),
            });
        }
        Ok(records)
    }
}

/// A record that failed validation
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    /// `None` when the id was generated during parsing
    pub record_id: Option<String>,
    pub error: RecordValidationError,
}

/// Outcome of validating a parsed batch
#[derive(Debug)]
pub struct BatchValidation {
    pub total: usize,
    pub failures: Vec<ValidationResult>,
}

impl BatchValidation {
    fn from_incoming(incoming: &[Incoming]) -> Self {
        let failures = incoming
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                validate(&item.record).err().map(|error| ValidationResult {
                    index: idx,
                    record_id: item.id_supplied.then(|| item.record.id.clone()),
                    error,
                })
            })
            .collect();

        Self {
            total: incoming.len(),
            failures,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A parsed record and whether its id came from the input
struct Incoming {
    record: MetricRecord,
    id_supplied: bool,
}

impl Incoming {
    fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let id_supplied = value.get("id").is_some();
        let record: MetricRecord = serde_json::from_value(value)?;
        Ok(Self {
            record: fill_defaults(record),
            id_supplied,
        })
    }
}

/// Validation errors for metric records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordValidationError {
    #[error("Record id is empty")]
    EmptyId,

    #[error("Value for {metric} is not a finite number")]
    NonFiniteValue { metric: String },

    #[error("Value for {metric} is negative: {value}")]
    NegativeValue { metric: String, value: f64 },

    #[error("Unit for {metric} is empty")]
    EmptyUnit { metric: String },
}

/// Check a single record
pub fn validate(record: &MetricRecord) -> Result<(), RecordValidationError> {
    let metric = record.metric_type.as_str().to_string();

    if record.id.trim().is_empty() {
        return Err(RecordValidationError::EmptyId);
    }
    if !record.value.is_finite() {
        return Err(RecordValidationError::NonFiniteValue { metric });
    }
    if record.value < 0.0 {
        return Err(RecordValidationError::NegativeValue {
            metric,
            value: record.value,
        });
    }
    if record.unit.trim().is_empty() {
        return Err(RecordValidationError::EmptyUnit { metric });
    }
    Ok(())
}

fn fill_defaults(mut record: MetricRecord) -> MetricRecord {
    if record.unit.trim().is_empty() {
        record.unit = record.metric_type.default_unit().to_string();
    }
    record
}
