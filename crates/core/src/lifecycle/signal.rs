//! OS signal handling: SIGINT/SIGTERM shut down, SIGHUP reloads.

use tokio::sync::watch;

/// Owns the shutdown sender; the paired receiver flips to `true` once.
pub struct SignalHandler {
    shutdown_tx: watch::Sender<bool>,
}

impl SignalHandler {
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (shutdown_tx, rx) = watch::channel(false);
        (Self { shutdown_tx }, rx)
    }

    /// Wait for signals until a shutdown signal arrives, calling `on_reload`
    /// for every SIGHUP in between.
    pub async fn run<F>(self, on_reload: F) -> anyhow::Result<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let name = wait_for_shutdown(on_reload).await?;
        tracing::info!("Received {name}, shutting down");
        self.trigger();
        Ok(())
    }

    /// Flip the shutdown receiver without waiting for a signal.
    pub fn trigger(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

#[cfg(unix)]
async fn wait_for_shutdown<F: Fn()>(on_reload: F) -> anyhow::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                return Ok("SIGINT");
            }
            _ = sigterm.recv() => return Ok("SIGTERM"),
            _ = sighup.recv() => {
                tracing::info!("Received SIGHUP, reloading configuration");
                on_reload();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown<F: Fn()>(_on_reload: F) -> anyhow::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_flips_receiver() {
        let (handler, rx) = SignalHandler::new();
        assert!(!*rx.borrow());
        handler.trigger();
        assert!(*rx.borrow());
    }
}
