//! Pulse CLI - Command-line interface for Pulse Analytics
//!
//! Commands:
//! - report: Build the full analytics report for a period
//! - buckets: Group records by day and metric
//! - chart: Normalized daily series for one metric
//! - validate: Validate metric records
//! - doctor: Diagnose installation and configuration

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pulse_analytics::bucketing::{bucket, daily_series, flatten, DailyValue};
use pulse_analytics::config::{ChartMode, EngineConfig, DEFAULT_PERIOD_DAYS};
use pulse_analytics::series::{normalize_series, scale_to_reference, NormalizedSeries};
use pulse_analytics::{
    AnalyticsEngine, AnalyticsError, Goal, MetricRecord, MetricType, Period, RecordAdapter,
    PRODUCER_NAME, PULSE_VERSION,
};

/// Pulse - Aggregation and scoring for wearable health metrics
#[derive(Parser)]
#[command(name = "pulse")]
#[command(version = PULSE_VERSION)]
#[command(about = "Summarize, trend and score wearable health metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the analytics report for a period
    Report {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        period: PeriodArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Goals file (JSON array of goals)
        #[arg(long)]
        goals: Option<PathBuf>,

        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the trend window from the configuration
        #[arg(long)]
        trend_window: Option<usize>,

        /// Override the chart mode from the configuration
        #[arg(long)]
        chart_mode: Option<ChartModeArg>,
    },

    /// Group records into per-day, per-metric buckets
    Buckets {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        period: PeriodArgs,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Print the normalized daily series for one metric
    Chart {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        period: PeriodArgs,

        /// Metric to chart (e.g. steps, sleep_hours)
        #[arg(short, long)]
        metric: MetricType,

        /// Scale bars against the metric's fixed reference instead of the series range
        #[arg(long)]
        reference: bool,
    },

    /// Validate metric records
    Validate {
        #[command(flatten)]
        input: InputArgs,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose installation and configuration
    Doctor {
        /// Check an engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Input format
    #[arg(long, default_value = "ndjson")]
    input_format: InputFormat,
}

#[derive(Args)]
struct PeriodArgs {
    /// First day of the period (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the period (YYYY-MM-DD); defaults to the latest record's day
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Period length in days, used when --from is not given
    #[arg(long, default_value_t = DEFAULT_PERIOD_DAYS)]
    days: u32,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON
    Ndjson,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChartModeArg {
    /// Scale against the series' own min/max
    Relative,
    /// Scale against each metric's fixed full-scale value
    Reference,
}

impl From<ChartModeArg> for ChartMode {
    fn from(arg: ChartModeArg) -> Self {
        match arg {
            ChartModeArg::Relative => ChartMode::Relative,
            ChartModeArg::Reference => ChartMode::Reference,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PulseCliError> {
    match cli.command {
        Commands::Report {
            input,
            period,
            output,
            output_format,
            goals,
            config,
            trend_window,
            chart_mode,
        } => cmd_report(
            &input,
            &period,
            &output,
            output_format,
            goals.as_deref(),
            config.as_deref(),
            trend_window,
            chart_mode,
        ),

        Commands::Buckets {
            input,
            period,
            output_format,
        } => cmd_buckets(&input, &period, output_format),

        Commands::Chart {
            input,
            period,
            metric,
            reference,
        } => cmd_chart(&input, &period, metric, reference),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_report(
    input: &InputArgs,
    period_args: &PeriodArgs,
    output: &Path,
    output_format: OutputFormat,
    goals: Option<&Path>,
    config: Option<&Path>,
    trend_window: Option<usize>,
    chart_mode: Option<ChartModeArg>,
) -> Result<(), PulseCliError> {
    let records = read_valid_records(input)?;
    let period = resolve_period(period_args, &records)?;

    let mut engine_config = match config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    if let Some(window) = trend_window {
        engine_config.trend_window = window;
    }
    if let Some(mode) = chart_mode {
        engine_config.chart_mode = mode.into();
    }

    let goals: Vec<Goal> = match goals {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };

    let engine = AnalyticsEngine::with_config(engine_config)?;
    let report = engine.analyze(&records, period, &goals)?;

    let output_data = format_output(std::slice::from_ref(&report), &output_format)?;
    write_output(output, &output_data)
}

fn cmd_buckets(
    input: &InputArgs,
    period_args: &PeriodArgs,
    output_format: OutputFormat,
) -> Result<(), PulseCliError> {
    let records = read_valid_records(input)?;
    let period = resolve_period(period_args, &records)?;

    let buckets = flatten(&bucket(&records, period.start(), period.end()));
    print!("{}", format_output(&buckets, &output_format)?);

    Ok(())
}

fn cmd_chart(
    input: &InputArgs,
    period_args: &PeriodArgs,
    metric: MetricType,
    reference: bool,
) -> Result<(), PulseCliError> {
    let records = read_valid_records(input)?;
    let period = resolve_period(period_args, &records)?;

    let daily = daily_series(&bucket(&records, period.start(), period.end()), metric);
    let values: Vec<f64> = daily.iter().map(|d| d.value).collect();
    let chart = if reference {
        scale_to_reference(&values, metric.chart_reference())?
    } else {
        normalize_series(&values)
    };

    let output = ChartOutput {
        metric_type: metric,
        period,
        daily,
        chart,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn cmd_validate(input: &InputArgs, json: bool) -> Result<(), PulseCliError> {
    let data = read_input(&input.input)?;
    let batch = match input.input_format {
        InputFormat::Ndjson => RecordAdapter::validate_ndjson(&data)?,
        InputFormat::Json => RecordAdapter::validate_array(&data)?,
    };

    let report = ValidationReport {
        total_records: batch.total,
        valid_records: batch.total - batch.failures.len(),
        invalid_records: batch.failures.len(),
        errors: batch
            .failures
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                record_id: r.record_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Record {} (index {}): {}",
                    err.record_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(PulseCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), PulseCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "pulse_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Pulse version {}", PULSE_VERSION),
    });

    let metric_names: Vec<&str> = MetricType::ALL.iter().map(MetricType::as_str).collect();
    checks.push(DoctorCheck {
        name: "metric_types".to_string(),
        status: CheckStatus::Ok,
        message: format!("Supported metrics: {}", metric_names.join(", ")),
    });

    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Configuration file does not exist".to_string(),
            }
        } else {
            match fs::read_to_string(config_path) {
                Ok(content) => match EngineConfig::from_json(&content) {
                    Ok(cfg) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Configuration valid (trend window {}, threshold {}%)",
                            cfg.trend_window, cfg.trend_threshold_pct
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid configuration: {}", e),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read configuration file: {}", e),
                },
            }
        };
        checks.push(check);
    }

    let stdin_message = if atty::is(atty::Stream::Stdin) {
        "stdin is a TTY (pass records with --input)"
    } else {
        "stdin is a pipe (records can be read with --input -)"
    };
    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: stdin_message.to_string(),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: PULSE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Pulse Doctor Report");
        println!("===================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(PulseCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(path: &Path) -> Result<String, PulseCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn read_records(input: &InputArgs) -> Result<Vec<MetricRecord>, PulseCliError> {
    let data = read_input(&input.input)?;
    let records = match input.input_format {
        InputFormat::Ndjson => RecordAdapter::parse_ndjson(&data)?,
        InputFormat::Json => RecordAdapter::parse_array(&data)?,
    };
    Ok(records)
}

fn read_valid_records(input: &InputArgs) -> Result<Vec<MetricRecord>, PulseCliError> {
    let records = read_records(input)?;
    let failures = RecordAdapter::validate_records(&records);
    if !failures.is_empty() {
        return Err(PulseCliError::ValidationFailed(failures.len()));
    }
    Ok(records)
}

fn resolve_period(args: &PeriodArgs, records: &[MetricRecord]) -> Result<Period, PulseCliError> {
    let end = args
        .to
        .or_else(|| records.iter().map(MetricRecord::date).max())
        .ok_or(PulseCliError::NoRecords)?;

    let period = match args.from {
        Some(start) => Period::new(start, end)?,
        None => Period::ending(end, args.days)?,
    };
    Ok(period)
}

fn format_output<T: Serialize>(items: &[T], format: &OutputFormat) -> Result<String, PulseCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for item in items {
                lines.push(serde_json::to_string(item)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => match items {
            [single] => Ok(serde_json::to_string(single)?),
            _ => Ok(serde_json::to_string(items)?),
        },
        OutputFormat::JsonPretty => match items {
            [single] => Ok(serde_json::to_string_pretty(single)?),
            _ => Ok(serde_json::to_string_pretty(items)?),
        },
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), PulseCliError> {
    if output.to_string_lossy() == "-" {
        println!("{}", data.trim_end());
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum PulseCliError {
    Io(io::Error),
    Analytics(AnalyticsError),
    Json(serde_json::Error),
    NoRecords,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for PulseCliError {
    fn from(e: io::Error) -> Self {
        PulseCliError::Io(e)
    }
}

impl From<AnalyticsError> for PulseCliError {
    fn from(e: AnalyticsError) -> Self {
        PulseCliError::Analytics(e)
    }
}

impl From<serde_json::Error> for PulseCliError {
    fn from(e: serde_json::Error) -> Self {
        PulseCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PulseCliError> for CliError {
    fn from(e: PulseCliError) -> Self {
        match e {
            PulseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PulseCliError::Analytics(e) if e.is_configuration_error() => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the period, goals and configuration values".to_string()),
            },
            PulseCliError::Analytics(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure each record has metric_type, value and recorded_at".to_string()),
            },
            PulseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PulseCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Pass --to to analyze a period without data".to_string()),
            },
            PulseCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Run 'pulse validate' for details".to_string()),
            },
            PulseCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ChartOutput {
    metric_type: MetricType,
    period: Period,
    daily: Vec<DailyValue>,
    chart: NormalizedSeries,
}

#[derive(Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    index: usize,
    record_id: Option<String>,
    error: String,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
