// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for dnssync runs.
//!
//! All metric names carry the `dnssync_` prefix. A run is a short-lived process, so
//! instead of serving `/metrics` the registry is written once at the end of the run in
//! text exposition format (see [`write_textfile`]), ready for the node-exporter
//! textfile collector.
//!
//! # Metrics Categories
//!
//! - **Update Metrics** - Track dynamic updates by operation and outcome
//! - **Record Metrics** - Record-set sizes observed during the run
//! - **Zone Transfer Metrics** - Track zone transfer failures
//!
//! # Example
//!
//! ```rust,no_run
//! use dnssync::metrics::{gather_metrics, record_update};
//!
//! record_update("upsert", "applied", std::time::Duration::from_millis(12));
//! println!("{}", gather_metrics().unwrap());
//! ```

use anyhow::{Context, Result};
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounter, Opts, Registry,
    TextEncoder,
};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::METRICS_NAMESPACE;

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Update Metrics
// ============================================================================

/// Total number of dynamic updates by operation and outcome
///
/// Labels:
/// - `operation`: `upsert` or `withdraw`
/// - `outcome`: `applied` or `failed`
pub static UPDATES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_updates_total"),
        "Total number of dynamic updates by operation and outcome",
    );
    let counter = CounterVec::new(opts, &["operation", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of single-record dynamic updates in seconds
///
/// Labels:
/// - `operation`: `upsert` or `withdraw`
pub static UPDATE_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_update_duration_seconds"),
        "Duration of single-record dynamic updates in seconds",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Record Metrics
// ============================================================================

/// Number of records per state observed in the last run
///
/// Labels:
/// - `state`: `current`, `desired`, `to_upsert` or `to_delete`
pub static RECORDS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_records"),
        "Number of A records by state in the last run",
    );
    let gauge = GaugeVec::new(opts, &["state"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Zone Transfer Metrics
// ============================================================================

/// Total number of failed zone transfers
pub static ZONE_TRANSFER_FAILURES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_zone_transfer_failures_total"),
        "Total number of failed zone transfers",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record one dynamic update
///
/// # Arguments
/// * `operation` - `upsert` or `withdraw`
/// * `outcome` - `applied` or `failed`
/// * `duration` - Time spent in the update applier
pub fn record_update(operation: &str, outcome: &str, duration: Duration) {
    UPDATES_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    UPDATE_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

/// Set the record count for a state
///
/// # Arguments
/// * `state` - `current`, `desired`, `to_upsert` or `to_delete`
/// * `count` - Number of records
#[allow(clippy::cast_precision_loss)]
pub fn set_record_count(state: &str, count: usize) {
    RECORDS.with_label_values(&[state]).set(count as f64);
}

/// Record a failed zone transfer
pub fn record_zone_transfer_failure() {
    ZONE_TRANSFER_FAILURES_TOTAL.inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    // Touch every metric so the exposition is complete even for a no-op run
    LazyLock::force(&UPDATES_TOTAL);
    LazyLock::force(&UPDATE_DURATION_SECONDS);
    LazyLock::force(&RECORDS);
    LazyLock::force(&ZONE_TRANSFER_FAILURES_TOTAL);

    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

/// Write all metrics to `path` for the node-exporter textfile collector.
///
/// The file is written next to its destination and renamed into place, so the
/// collector never reads a partial exposition.
///
/// # Errors
/// Returns error if encoding fails or the file cannot be written
pub async fn write_textfile(path: &Path) -> Result<()> {
    let text = gather_metrics().context("Failed to encode metrics")?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    tokio::fs::write(&tmp, text)
        .await
        .with_context(|| format!("Failed to write metrics to {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move metrics file into {}", path.display()))?;

    Ok(())
}
