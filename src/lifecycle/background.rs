//! Background task runner seam.
//!
//! The server starts the runner once per `run` and hands it the shared
//! shutdown signal. What the runner does (session expiry, cleanup) belongs to
//! the session layer.

use async_trait::async_trait;

use crate::lifecycle::shutdown::ShutdownSignal;

/// Long-running routine that lives as long as the server.
#[async_trait]
pub trait BackgroundTasks: Send + Sync + 'static {
    /// Run until `shutdown` fires.
    async fn run(&self, shutdown: ShutdownSignal);
}

/// Runner with no work; parks until shutdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleBackgroundTasks;

#[async_trait]
impl BackgroundTasks for IdleBackgroundTasks {
    async fn run(&self, mut shutdown: ShutdownSignal) {
        shutdown.recv().await;
        tracing::debug!("Background tasks stopped");
    }
}
