//! Graceful shutdown for background tasks.
//!
//! The signal is a `tokio::sync::watch` flag, so a task that subscribes after
//! shutdown was triggered still observes it.

use tokio::signal;
use tokio::sync::watch;

/// Coordinates graceful shutdown across node tasks.
///
/// Tasks call [`subscribe`](Self::subscribe) and `select!` on
/// [`ShutdownController::wait`] alongside their main loop.
#[derive(Debug)]
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Trigger shutdown programmatically.
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once shutdown has been triggered, or the controller is gone.
    pub async fn wait(rx: &mut watch::Receiver<bool>) {
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    /// Wait for SIGTERM or SIGINT, then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("received SIGINT, shutting down"); }
            _ = terminate => { tracing::info!("received SIGTERM, shutting down"); }
        }

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn programmatic_shutdown_notifies_subscribers() {
        let controller = ShutdownController::new();
        let mut rx1 = controller.subscribe();
        let mut rx2 = controller.subscribe();
        controller.shutdown();
        ShutdownController::wait(&mut rx1).await;
        ShutdownController::wait(&mut rx2).await;
        assert!(controller.is_shutdown());
    }

    #[tokio::test]
    async fn late_subscriber_sees_shutdown() {
        let controller = ShutdownController::new();
        controller.shutdown();
        let mut rx = controller.subscribe();
        ShutdownController::wait(&mut rx).await;
        assert!(*rx.borrow());
    }
}
