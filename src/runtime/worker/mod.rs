mod cleanup;

pub use cleanup::CleanupWorker;

use async_trait::async_trait;
use std::collections::HashMap;

use super::RuntimeError;

#[async_trait]
pub trait Worker: Send + Sync + 'static {
    fn name(&self) -> &str;
    async fn start(&self) -> Result<(), RuntimeError>;
    async fn stop(&self) -> Result<(), RuntimeError>;
    fn is_running(&self) -> bool;
}

#[derive(Default)]
pub struct WorkerPool {
    workers: HashMap<String, Box<dyn Worker>>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_worker<W: Worker + 'static>(&mut self, worker: W) {
        self.workers.insert(worker.name().to_string(), Box::new(worker));
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub async fn start_all(&self) -> Result<(), RuntimeError> {
        for worker in self.workers.values() {
            info!("Starting worker {}", worker.name());
            worker.start().await?;
        }
        Ok(())
    }

    pub async fn stop_all(&self) -> Result<(), RuntimeError> {
        for worker in self.workers.values().filter(|w| w.is_running()) {
            info!("Stopping worker {}", worker.name());
            worker.stop().await?;
        }
        Ok(())
    }
}
