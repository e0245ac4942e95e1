//! Background job records.
//!
//! A job moves through `queued -> running -> finished | failed`. The record
//! is stored as JSON at `job:{id}`, normally in a store separate from the
//! list data. Only the job runner writes these records; nothing deletes them.

use crate::error::{RecordError, StoreError};
use crate::keys;
use crate::kv::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Opaque job identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an identifier received from a client.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting for a worker
    Queued,
    /// Picked up by a worker
    Running,
    /// Handler returned a result
    Finished,
    /// Handler returned an error or panicked
    Failed,
}

impl JobStatus {
    /// Whether the job has reached a final state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }

    /// Lowercase name, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored status of a job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Identifier
    pub id: JobId,
    /// Handler kind, e.g. `complete_all`
    pub kind: String,
    /// Argument the handler was submitted with
    pub argument: serde_json::Value,
    /// Current state
    pub status: JobStatus,
    /// Handler output, once finished
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Failure description, once failed
    #[serde(default)]
    pub error: Option<String>,
    /// When the job was submitted
    pub enqueued_at: DateTime<Utc>,
    /// When a worker picked it up
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When it reached a terminal state
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// A freshly queued job.
    #[must_use]
    pub fn queued(id: JobId, kind: impl Into<String>, argument: serde_json::Value) -> Self {
        Self {
            id,
            kind: kind.into(),
            argument,
            status: JobStatus::Queued,
            result: None,
            error: None,
            enqueued_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }
}

/// Errors from job submission, execution and lookup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    /// No record exists for this job ID.
    #[error("Job {0} not found")]
    NotFound(JobId),

    /// The handler ran and reported a failure.
    #[error("{0}")]
    Handler(String),

    /// The handler panicked.
    #[error("Job handler panicked: {0}")]
    Panicked(String),

    /// The runner is shut down and accepts no more work.
    #[error("Job queue is closed")]
    QueueClosed,

    /// The job record could not be encoded or decoded.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The job store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persistence of job status records.
#[derive(Clone)]
pub struct JobStore {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for JobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobStore").finish_non_exhaustive()
    }
}

impl JobStore {
    /// Create a job store over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist a new queued record.
    ///
    /// # Errors
    ///
    /// Returns `JobError::Record` or `JobError::Store` on persistence failure.
    pub async fn create_queued(
        &self,
        kind: &str,
        argument: serde_json::Value,
    ) -> Result<JobRecord, JobError> {
        let record = JobRecord::queued(JobId::generate(), kind, argument);
        self.put(&record).await?;
        Ok(record)
    }

    /// Load a job record.
    ///
    /// # Errors
    ///
    /// Returns `JobError::NotFound` if no record exists (unknown or evicted).
    pub async fn get(&self, id: &JobId) -> Result<JobRecord, JobError> {
        let key = keys::job_key(id.as_str());
        let raw = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| JobError::NotFound(id.clone()))?;
        serde_json::from_str(&raw).map_err(|e| {
            JobError::Record(RecordError::Malformed {
                key,
                reason: e.to_string(),
            })
        })
    }

    /// Transition a job to `running`.
    ///
    /// # Errors
    ///
    /// Returns `JobError` if the record is missing or cannot be written.
    pub async fn mark_running(&self, id: &JobId) -> Result<JobRecord, JobError> {
        self.transition(id, |record| {
            record.status = JobStatus::Running;
            record.started_at = Some(Utc::now());
        })
        .await
    }

    /// Transition a job to `finished` with its result.
    ///
    /// # Errors
    ///
    /// Returns `JobError` if the record is missing or cannot be written.
    pub async fn mark_finished(
        &self,
        id: &JobId,
        result: serde_json::Value,
    ) -> Result<JobRecord, JobError> {
        self.transition(id, |record| {
            record.status = JobStatus::Finished;
            record.result = Some(result);
            record.ended_at = Some(Utc::now());
        })
        .await
    }

    /// Transition a job to `failed` with an error description.
    ///
    /// # Errors
    ///
    /// Returns `JobError` if the record is missing or cannot be written.
    pub async fn mark_failed(&self, id: &JobId, error: String) -> Result<JobRecord, JobError> {
        self.transition(id, |record| {
            record.status = JobStatus::Failed;
            record.error = Some(error);
            record.ended_at = Some(Utc::now());
        })
        .await
    }

    async fn transition(
        &self,
        id: &JobId,
        apply: impl FnOnce(&mut JobRecord) + Send,
    ) -> Result<JobRecord, JobError> {
        let mut record = self.get(id).await?;
        apply(&mut record);
        self.put(&record).await?;
        tracing::debug!(job_id = %id, status = %record.status, "Job status updated");
        Ok(record)
    }

    async fn put(&self, record: &JobRecord) -> Result<(), JobError> {
        let raw = serde_json::to_string(record).map_err(|e| RecordError::Encode(e.to_string()))?;
        self.store.set(&keys::job_key(record.id.as_str()), raw).await?;
        Ok(())
    }
}
