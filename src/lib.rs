//! Pulse Analytics - Deterministic aggregation and scoring for wearable health metrics
//!
//! Pulse turns raw metric readings into the numbers a health dashboard shows:
//! bucketing by day → summaries → trends → chart series → health score → goal
//! progress. Every operation is a pure function of its inputs; the library
//! holds no global state and never reads the clock.
//!
//! ## Modules
//!
//! - **Core operations**: `bucketing`, `summary`, `trend`, `goals`, `score`, `series`
//! - **Report engine**: `engine` runs every stage for one user and period
//! - **Ingestion**: `ingest` parses and validates records handed over as JSON

pub mod bucketing;
pub mod config;
pub mod engine;
pub mod error;
pub mod goals;
pub mod ingest;
pub mod score;
pub mod series;
pub mod summary;
pub mod trend;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use bucketing::{bucket, Buckets};
pub use config::{ChartMode, EngineConfig};
pub use engine::{analyze, AnalyticsEngine, AnalyticsReport};
pub use error::AnalyticsError;
pub use goals::goal_progress;
pub use ingest::RecordAdapter;
pub use score::health_score;
pub use series::normalize_series;
pub use summary::summarize;
pub use trend::classify_trend;
pub use types::{Goal, GoalType, HealthScoreInputs, MetricRecord, MetricType, Period, Summary, TrendLabel};

/// Pulse version
pub const PULSE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "pulse-analytics";
