//! DispatchHandle - runs a DispatchLoop on its own task

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use crate::dispatch::{DispatchLoop, SessionEnd};
use crate::error::DispatcherError;
use crate::metrics::DispatchMetrics;

/// Requests a graceful stop of a running dispatch loop
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownTrigger {
    /// Ask the loop to stop after the in-flight tick
    pub fn fire(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Handle to a spawned dispatch loop
pub struct DispatchHandle {
    trigger: ShutdownTrigger,
    metrics: Arc<DispatchMetrics>,
    task: JoinHandle<SessionEnd>,
}

impl DispatchHandle {
    /// Spawn the loop on the current runtime
    pub fn spawn(dispatch: DispatchLoop) -> Self {
        let (tx, rx) = watch::channel(false);
        let metrics = dispatch.metrics();
        let task = tokio::spawn(dispatch.run(rx));
        Self {
            trigger: ShutdownTrigger { tx: Arc::new(tx) },
            metrics,
            task,
        }
    }

    /// Trigger usable after the handle has been consumed by `wait`
    pub fn trigger(&self) -> ShutdownTrigger {
        self.trigger.clone()
    }

    /// Live counters
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to end on its own (client disconnect) or through a
    /// trigger fired elsewhere
    pub async fn wait(self) -> Result<SessionEnd, DispatcherError> {
        self.task.await.map_err(|e| {
            error!(error = %e, "dispatch task failed");
            DispatcherError::from(e)
        })
    }

    /// Stop the loop gracefully and wait for it
    #[instrument(name = "dispatch_handle_shutdown", skip(self))]
    pub async fn shutdown(self) -> Result<SessionEnd, DispatcherError> {
        self.trigger.fire();
        let end = self.wait().await?;
        debug!(reason = %end.reason, "dispatch handle shutdown complete");
        Ok(end)
    }
}
