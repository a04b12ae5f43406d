//! Metric names and recording helpers for the ETL pipeline.
//!
//! Recording goes through the `metrics` facade. [`init_metrics`] installs a Prometheus recorder
//! without any HTTP listener and keeps its handle so the text exposition can be rendered
//! in-process; until then every call is a no-op.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder once per process and return its handle.
///
/// Returns `None` when another recorder was already installed by someone else.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics handle was already stored");
            }
            register_all_metrics();
            info!("Prometheus recorder installed");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    });
    HANDLE.get()
}

/// Prometheus text exposition of everything recorded so far; `None` without a recorder
pub fn render_metrics() -> Option<String> {
    HANDLE.get().map(PrometheusHandle::render)
}

/// Attach descriptions and units to every metric name
fn register_all_metrics() {
    for metric in MetricName::all_metrics() {
        let (_, description, unit) = metric.metadata();
        if unit.is_some() {
            ::metrics::describe_histogram!(metric.as_str(), ::metrics::Unit::Seconds, description);
        } else {
            ::metrics::describe_counter!(metric.as_str(), description);
        }
    }
}

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Pipeline metrics
    PipelineRuns,
    PipelineRunFailures,

    // Stage metrics
    StageDuration,
    StageFailures,

    // Record flow
    RecordsExtracted,
    RecordsTransformed,
    DuplicatesRemoved,
    RecordsLoaded,
    LoadFailures,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::PipelineRuns => "etl_pipeline_runs_total",
            MetricName::PipelineRunFailures => "etl_pipeline_run_failures_total",
            MetricName::StageDuration => "etl_stage_duration_seconds",
            MetricName::StageFailures => "etl_stage_failures_total",
            MetricName::RecordsExtracted => "etl_records_extracted_total",
            MetricName::RecordsTransformed => "etl_records_transformed_total",
            MetricName::DuplicatesRemoved => "etl_duplicates_removed_total",
            MetricName::RecordsLoaded => "etl_records_loaded_total",
            MetricName::LoadFailures => "etl_load_failures_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            PipelineRuns,
            PipelineRunFailures,
            StageDuration,
            StageFailures,
            RecordsExtracted,
            RecordsTransformed,
            DuplicatesRemoved,
            RecordsLoaded,
            LoadFailures,
        ]
        .into_iter()
    }

    /// (phase, description, unit)
    pub fn metadata(&self) -> (&'static str, &'static str, Option<&'static str>) {
        match self {
            MetricName::PipelineRuns => ("pipeline", "Full pipeline runs started", None),
            MetricName::PipelineRunFailures => ("pipeline", "Full pipeline runs that failed", None),
            MetricName::StageDuration => ("stage", "Stage duration by stage", Some("s")),
            MetricName::StageFailures => ("stage", "Stage failures by stage", None),
            MetricName::RecordsExtracted => ("extract", "Records produced by extraction", None),
            MetricName::RecordsTransformed => ("transform", "Records produced by transformation", None),
            MetricName::DuplicatesRemoved => ("transform", "Duplicate rows dropped", None),
            MetricName::RecordsLoaded => ("load", "Records written by destination", None),
            MetricName::LoadFailures => ("load", "Failed loads by destination", None),
        }
    }
}

pub mod pipeline {
    use super::MetricName;

    pub fn run_started() {
        ::metrics::counter!(MetricName::PipelineRuns.as_str()).increment(1);
    }

    pub fn run_failed() {
        ::metrics::counter!(MetricName::PipelineRunFailures.as_str()).increment(1);
    }
}

pub mod stage {
    use super::MetricName;

    pub fn duration_recorded(stage: &'static str, secs: f64) {
        ::metrics::histogram!(MetricName::StageDuration.as_str(), "stage" => stage).record(secs);
    }

    pub fn failed(stage: &'static str) {
        ::metrics::counter!(MetricName::StageFailures.as_str(), "stage" => stage).increment(1);
    }
}

pub mod records {
    use super::MetricName;

    pub fn extracted(count: usize) {
        ::metrics::counter!(MetricName::RecordsExtracted.as_str()).increment(count as u64);
    }

    pub fn transformed(count: usize, duplicates_removed: usize) {
        ::metrics::counter!(MetricName::RecordsTransformed.as_str()).increment(count as u64);
        ::metrics::counter!(MetricName::DuplicatesRemoved.as_str())
            .increment(duplicates_removed as u64);
    }

    pub fn loaded(destination: &'static str, count: usize) {
        ::metrics::counter!(MetricName::RecordsLoaded.as_str(), "destination" => destination)
            .increment(count as u64);
    }

    pub fn load_failed(destination: &'static str) {
        ::metrics::counter!(MetricName::LoadFailures.as_str(), "destination" => destination)
            .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_are_unique_and_prefixed() {
        let names: HashSet<&str> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), MetricName::all_metrics().count());
        assert!(names.iter().all(|n| n.starts_with("etl_")));
    }

    #[test]
    fn test_duration_metrics_carry_seconds_unit() {
        for metric in MetricName::all_metrics() {
            let (_, _, unit) = metric.metadata();
            assert_eq!(unit == Some("s"), metric.as_str().ends_with("_seconds"));
        }
    }

    #[test]
    fn test_only_stage_duration_is_a_histogram() {
        let durations: Vec<MetricName> = MetricName::all_metrics()
            .filter(|m| m.metadata().2.is_some())
            .collect();
        assert_eq!(durations, vec![MetricName::StageDuration]);
    }
}
