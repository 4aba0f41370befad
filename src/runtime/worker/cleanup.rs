use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{
    runtime::RuntimeError,
    service::{RateLimitService, SelectionService},
};

use super::Worker;

/// Periodically evicts expired selection tokens and elapsed cooldown records.
#[derive(Clone)]
pub struct CleanupWorker {
    name: String,
    interval: Duration,
    selection_ttl: chrono::Duration,
    selection: SelectionService,
    ratelimit: RateLimitService,
    shutdown: broadcast::Sender<()>,
    running: Arc<AtomicBool>,
}

impl CleanupWorker {
    pub fn new(
        interval: Duration,
        selection_ttl: chrono::Duration,
        selection: SelectionService,
        ratelimit: RateLimitService,
    ) -> Self {
        let (shutdown, _) = broadcast::channel(1);
        Self {
            name: "cleanup".to_string(),
            interval,
            selection_ttl,
            selection,
            ratelimit,
            shutdown,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn sweep(&self) -> (usize, usize) {
        let tokens = self.selection.purge_older_than(self.selection_ttl);
        let cooldowns = self.ratelimit.compact();
        if tokens + cooldowns > 0 {
            info!(
                "Cleanup evicted {} selection tokens ({} left) and {} cooldown records",
                tokens,
                self.selection.len(),
                cooldowns
            );
        }
        (tokens, cooldowns)
    }
}

#[async_trait]
impl Worker for CleanupWorker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), RuntimeError> {
        if self.interval.is_zero() {
            return Err(RuntimeError::WorkerError(format!("{} interval must be positive", self.name)));
        }

        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let worker = self.clone();
        let mut rx = self.shutdown.subscribe();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(worker.interval);
            // the first tick fires immediately
            ticker.tick().await;

            while worker.running.load(Ordering::SeqCst) {
                tokio::select! {
                    _ = ticker.tick() => {
                        worker.sweep();
                    }
                    _ = rx.recv() => {
                        break;
                    }
                }
            }
            debug!("Worker {} exited", worker.name);
        });

        Ok(())
    }

    async fn stop(&self) -> Result<(), RuntimeError> {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.shutdown.send(());
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
