//! Application wiring.

use crate::config::{Config, StoreBackend};
use axum::Router;
use std::sync::Arc;
use todo_kv_core::{InMemoryKeyValueStore, JobStore, KeyValueStore, ListRepository};
use todo_kv_redis::RedisKeyValueStore;
use todo_kv_runtime::{JobRunner, JobRunnerConfig, MetricsExporter};
use todo_kv_web::{build_router, AppState};

/// Connected stores, job runner and HTTP state.
#[derive(Debug)]
pub struct TodoApp {
    state: AppState,
    runner: Arc<JobRunner>,
}

impl TodoApp {
    /// Connect the stores and start the job runner.
    ///
    /// List data and job records always live in separate stores: two Redis
    /// databases, or two in-memory maps.
    ///
    /// # Errors
    ///
    /// Returns error if a Redis store cannot be reached or the metrics
    /// recorder cannot be installed.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let (data, jobs): (Arc<dyn KeyValueStore>, Arc<dyn KeyValueStore>) =
            match config.store.backend {
                StoreBackend::Memory => (
                    Arc::new(InMemoryKeyValueStore::new()),
                    Arc::new(InMemoryKeyValueStore::new()),
                ),
                StoreBackend::Redis => (
                    Arc::new(RedisKeyValueStore::new(&config.store.data_url).await?),
                    Arc::new(RedisKeyValueStore::new(&config.store.jobs_url).await?),
                ),
            };
        tracing::info!(backend = %config.store.backend, "Stores connected");

        let runner = Arc::new(JobRunner::start(
            JobStore::new(jobs),
            &JobRunnerConfig::default().with_workers(config.jobs.workers),
        ));

        let mut state = AppState::new(ListRepository::new(data), Arc::clone(&runner));
        if config.metrics.enabled {
            let mut exporter = MetricsExporter::new();
            exporter.install()?;
            state = state.with_metrics(exporter);
        }

        Ok(Self { state, runner })
    }

    /// HTTP router over this application's state.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Shared handler state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Stop the job runner, letting queued jobs finish.
    pub async fn shutdown(&self) {
        self.runner.shutdown().await;
    }
}
