// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics. Installing a recorder is the host's job.

use metrics::{describe_counter, describe_histogram};
use mnema_entities::GcReport;

/// Register all Mnema metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "mnema_memories_surfaced_total",
        "Total memories surfaced into conversations"
    );
    describe_counter!(
        "mnema_evacuations_total",
        "Total pinned-set evacuation passes"
    );
    describe_counter!(
        "mnema_gc_outcomes_total",
        "Entity GC outcomes, labeled by action"
    );
    describe_histogram!(
        "mnema_surfacing_latency_seconds",
        "Memory surfacing latency in seconds"
    );
}

/// Record memories surfaced for one turn.
pub fn record_surfaced(count: usize) {
    metrics::counter!("mnema_memories_surfaced_total").increment(count as u64);
}

/// Record one completed evacuation pass.
pub fn record_evacuation() {
    metrics::counter!("mnema_evacuations_total").increment(1);
}

/// Record the outcome counts of one GC batch.
pub fn record_gc_outcomes(report: &GcReport) {
    metrics::counter!("mnema_gc_outcomes_total", "action" => "merge")
        .increment(report.merged as u64);
    metrics::counter!("mnema_gc_outcomes_total", "action" => "delete")
        .increment(report.deleted as u64);
    metrics::counter!("mnema_gc_outcomes_total", "action" => "keep").increment(report.kept as u64);
    metrics::counter!("mnema_gc_outcomes_total", "action" => "error")
        .increment(report.errors as u64);
}

/// Record surfacing latency.
pub fn record_surfacing_latency(seconds: f64) {
    metrics::histogram!("mnema_surfacing_latency_seconds").record(seconds);
}
