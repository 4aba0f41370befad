mod error;
mod orchestrator;
mod task;
mod worker;

pub use error::*;
pub use orchestrator::*;
pub use task::*;
pub use worker::{CleanupWorker, Worker, WorkerPool};

use std::time::Duration;

use crate::{
    config::{minutes_span, AppConfig},
    service::ServiceRegistry,
};

/// Owns the background workers for the lifetime of the bot.
pub struct RuntimeManager {
    workers: WorkerPool,
}

impl RuntimeManager {
    pub fn new(config: &AppConfig, services: &ServiceRegistry) -> Self {
        let mut workers = WorkerPool::new();

        if config.selection.ttl_minutes > 0 {
            workers.add_worker(CleanupWorker::new(
                Duration::from_secs(config.background_tasks.cleanup_interval_secs.max(1)),
                minutes_span(config.selection.ttl_minutes).unwrap_or(chrono::Duration::MAX),
                services.selection.clone(),
                services.ratelimit.clone(),
            ));
        } else {
            info!("Selection expiry disabled, tokens live until used");
        }

        Self { workers }
    }

    pub async fn start(&self) -> Result<(), RuntimeError> {
        info!("Starting {} background workers", self.workers.len());
        self.workers.start_all().await
    }

    pub async fn stop(&self) -> Result<(), RuntimeError> {
        self.workers.stop_all().await
    }
}
