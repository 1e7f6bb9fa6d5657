//! Observability module for structured logging setup, spans and metrics.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Spans for analysis and OCR operations
//! - Metric recording helpers over the `metrics` facade
//!
//! Logs go to stderr so that reports printed on stdout stay machine-readable.
//! No metrics exporter is installed here; without a recorder the helpers are
//! no-ops.

use anyhow::Result;
use std::time::Duration;
use tracing_subscriber::prelude::*;

use crate::observability_config::ObservabilityConfig;

/// Initialize structured logging from environment configuration
pub fn init_observability() -> Result<()> {
    let config = ObservabilityConfig::from_env();
    init_tracing_with_config(&config)
}

/// Initialize structured logging with tracing and configuration
pub fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("label_verdict={}", config.log_level.to_lowercase()).parse()?);

    if config.use_pretty_format() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Create a span for OCR operations
pub fn ocr_span(operation: &str) -> tracing::Span {
    tracing::info_span!("ocr_operation", operation = operation, component = "ocr")
}

/// Create a span for one label analysis
pub fn analysis_span(mode: &str) -> tracing::Span {
    tracing::info_span!("label_analysis", mode = mode, component = "analysis")
}

/// Record OCR operation metrics
pub fn record_ocr_metrics(success: bool, duration: Duration, image_size: u64) {
    metrics::counter!("ocr_operations_total", "result" => if success { "success" } else { "failure" }).increment(1);
    metrics::histogram!("ocr_duration_seconds").record(duration.as_secs_f64());
    metrics::histogram!("ocr_image_size_bytes").record(image_size as f64);
}

/// Record one completed label analysis
pub fn record_analysis(mode: &str, duration: Duration) {
    let mode = mode.to_string();
    metrics::counter!("label_analyses_total", "mode" => mode).increment(1);
    metrics::histogram!("label_analysis_duration_seconds").record(duration.as_secs_f64());
}

/// Record one vocabulary lookup and how it was resolved
pub fn record_vocabulary_lookup(vocabulary: &str, method: &str) {
    let vocabulary = vocabulary.to_string();
    let method = method.to_string();
    metrics::counter!("vocabulary_lookups_total", "vocabulary" => vocabulary, "method" => method).increment(1);
}

/// Record one verdict
pub fn record_verdict(mode: &str, verdict: &str) {
    let mode = mode.to_string();
    let verdict = verdict.to_string();
    metrics::counter!("verdicts_total", "mode" => mode, "verdict" => verdict).increment(1);
}
