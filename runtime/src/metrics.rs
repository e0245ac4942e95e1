//! Prometheus metrics for background jobs.
//!
//! Metrics recorded by the job runner, all labelled with the job `kind`:
//!
//! - `jobs_submitted_total`
//! - `jobs_finished_total`
//! - `jobs_failed_total`
//! - `job_duration_seconds` (time from pickup to terminal state)
//!
//! # Example
//!
//! ```rust,no_run
//! use todo_kv_runtime::metrics::MetricsExporter;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut exporter = MetricsExporter::new();
//! exporter.install()?;
//!
//! // Serve this from a `/metrics` endpoint
//! let body = exporter.render().unwrap_or_default();
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Installs the global Prometheus recorder and renders its output.
#[derive(Default, Clone)]
pub struct MetricsExporter {
    handle: Option<PrometheusHandle>,
}

impl MetricsExporter {
    /// Create an exporter that has not been installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the global recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// Only one global recorder can exist per process. If one is already
    /// installed (e.g. by another test) this logs a warning and returns `Ok`
    /// without a handle.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                register_metrics();
                tracing::info!("Prometheus metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if this exporter did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

impl std::fmt::Debug for MetricsExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsExporter")
            .field("installed", &self.handle.is_some())
            .finish()
    }
}

fn register_metrics() {
    describe_counter!("jobs_submitted_total", "Total number of jobs submitted");
    describe_counter!("jobs_finished_total", "Total number of jobs that finished");
    describe_counter!("jobs_failed_total", "Total number of jobs that failed");
    describe_histogram!(
        "job_duration_seconds",
        "Time from a worker picking up a job to its terminal state"
    );
}

/// Job runner metrics recorder.
pub struct JobMetrics;

impl JobMetrics {
    /// Record a submitted job.
    pub fn record_submitted(kind: &'static str) {
        counter!("jobs_submitted_total", "kind" => kind).increment(1);
    }

    /// Record a job that finished successfully.
    pub fn record_finished(kind: &'static str, duration: Duration) {
        counter!("jobs_finished_total", "kind" => kind).increment(1);
        histogram!("job_duration_seconds", "kind" => kind).record(duration.as_secs_f64());
    }

    /// Record a job that failed.
    pub fn record_failed(kind: &'static str, duration: Duration) {
        counter!("jobs_failed_total", "kind" => kind).increment(1);
        histogram!("job_duration_seconds", "kind" => kind).record(duration.as_secs_f64());
    }
}
