//! In-process job runner.
//!
//! Submitted jobs are recorded as `queued`, pushed onto an unbounded channel
//! and picked up by a fixed pool of tokio workers. Each handler runs inside
//! its own task so a panic is captured and recorded as a failure instead of
//! taking the worker down.

use crate::handler::JobHandler;
use crate::metrics::JobMetrics;
use futures::future::BoxFuture;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use todo_kv_core::{JobError, JobId, JobRecord, JobStore, RecordError};

/// Runner configuration.
#[derive(Clone, Debug)]
pub struct JobRunnerConfig {
    /// Number of worker tasks. Zero is treated as one.
    pub workers: usize,
}

impl Default for JobRunnerConfig {
    fn default() -> Self {
        Self { workers: 2 }
    }
}

impl JobRunnerConfig {
    /// Set the worker count.
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

struct QueuedJob {
    id: JobId,
    kind: &'static str,
    work: BoxFuture<'static, Result<serde_json::Value, JobError>>,
}

/// Background job runner backed by a [`JobStore`].
pub struct JobRunner {
    jobs: JobStore,
    sender: Mutex<Option<UnboundedSender<QueuedJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRunner")
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

impl JobRunner {
    /// Spawn the worker pool and return the runner.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(jobs: JobStore, config: &JobRunnerConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let receiver = Arc::new(Mutex::new(receiver));
        let count = config.workers.max(1);

        let workers = (0..count)
            .map(|index| tokio::spawn(worker_loop(index, jobs.clone(), Arc::clone(&receiver))))
            .collect();

        tracing::info!(workers = count, "Job runner started");

        Self {
            jobs,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        }
    }

    /// The job store this runner writes to.
    #[must_use]
    pub const fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    /// Enqueue a job and return its identifier immediately.
    ///
    /// # Errors
    ///
    /// - `JobError::Record` / `JobError::Store` if the queued record cannot be written
    /// - `JobError::QueueClosed` if the runner has been shut down; the record
    ///   is then marked failed
    pub async fn submit<H: JobHandler>(
        &self,
        handler: Arc<H>,
        argument: H::Argument,
    ) -> Result<JobId, JobError> {
        let encoded =
            serde_json::to_value(&argument).map_err(|e| RecordError::Encode(e.to_string()))?;
        let record = self.jobs.create_queued(H::KIND, encoded).await?;
        let id = record.id.clone();

        let job = QueuedJob {
            id: id.clone(),
            kind: H::KIND,
            work: Box::pin(async move { handler.handle(argument).await }),
        };

        let sent = {
            let sender = self.sender.lock().await;
            sender.as_ref().is_some_and(|tx| tx.send(job).is_ok())
        };

        if !sent {
            tracing::warn!(job_id = %id, kind = H::KIND, "Job submitted after shutdown");
            self.jobs
                .mark_failed(&id, JobError::QueueClosed.to_string())
                .await?;
            return Err(JobError::QueueClosed);
        }

        JobMetrics::record_submitted(H::KIND);
        tracing::info!(job_id = %id, kind = H::KIND, "Job queued");
        Ok(id)
    }

    /// Current record of a job.
    ///
    /// # Errors
    ///
    /// Returns `JobError::NotFound` for unknown IDs, or a store error.
    pub async fn status(&self, id: &JobId) -> Result<JobRecord, JobError> {
        self.jobs.get(id).await
    }

    /// Stop accepting jobs, let workers drain the queue, and wait for them.
    ///
    /// Calling this more than once is harmless.
    pub async fn shutdown(&self) {
        drop(self.sender.lock().await.take());

        let workers = std::mem::take(&mut *self.workers.lock().await);
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Job worker terminated abnormally");
            }
        }

        tracing::info!("Job runner stopped");
    }
}

async fn worker_loop(
    index: usize,
    jobs: JobStore,
    receiver: Arc<Mutex<UnboundedReceiver<QueuedJob>>>,
) {
    tracing::debug!(worker = index, "Job worker started");

    loop {
        let next = receiver.lock().await.recv().await;
        let Some(job) = next else {
            break;
        };
        run_job(&jobs, job).await;
    }

    tracing::debug!(worker = index, "Job worker stopped");
}

async fn run_job(jobs: &JobStore, job: QueuedJob) {
    let QueuedJob { id, kind, work } = job;
    let started = Instant::now();

    if let Err(e) = jobs.mark_running(&id).await {
        tracing::warn!(job_id = %id, error = %e, "Failed to mark job running");
    }

    let outcome = match tokio::spawn(work).await {
        Ok(result) => result,
        Err(join_error) if join_error.is_panic() => {
            Err(JobError::Panicked(panic_message(&*join_error.into_panic())))
        }
        Err(join_error) => Err(JobError::Handler(join_error.to_string())),
    };

    let elapsed = started.elapsed();
    let written = match outcome {
        Ok(result) => {
            JobMetrics::record_finished(kind, elapsed);
            tracing::info!(job_id = %id, kind, elapsed_ms = elapsed.as_millis(), "Job finished");
            jobs.mark_finished(&id, result).await
        }
        Err(error) => {
            JobMetrics::record_failed(kind, elapsed);
            tracing::warn!(job_id = %id, kind, error = %error, "Job failed");
            jobs.mark_failed(&id, error.to_string()).await
        }
    };

    if let Err(e) = written {
        tracing::error!(job_id = %id, error = %e, "Failed to record job outcome");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
