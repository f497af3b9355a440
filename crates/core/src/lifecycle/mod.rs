//! Process lifecycle: readiness notification, signal handling, and logging.

pub mod logging;
pub mod notify;
pub mod signal;

/// Lifecycle event sink (foreground vs systemd).
pub trait Lifecycle: Send + Sync {
    /// The listener is bound and accepting connections.
    fn on_ready(&self);
    /// A configuration reload has started.
    fn on_reloading(&self);
    /// A configuration reload has finished (successfully or not).
    fn on_reloaded(&self);
    /// The server is draining and about to exit.
    fn on_stopping(&self);
}

/// Logs events only.
pub struct ForegroundLifecycle;

impl Lifecycle for ForegroundLifecycle {
    fn on_ready(&self) {
        tracing::info!("Analyzer ready");
    }

    fn on_reloading(&self) {
        tracing::info!("Reloading configuration...");
    }

    fn on_reloaded(&self) {
        tracing::info!("Configuration reload finished");
    }

    fn on_stopping(&self) {
        tracing::info!("Analyzer stopping...");
    }
}

/// Sends sd-notify messages, then logs.
pub struct SystemdLifecycle;

impl Lifecycle for SystemdLifecycle {
    fn on_ready(&self) {
        notify::sd_ready();
        tracing::info!("Analyzer ready (notified systemd)");
    }

    fn on_reloading(&self) {
        notify::sd_reloading();
        tracing::info!("Reloading configuration (notified systemd)...");
    }

    fn on_reloaded(&self) {
        notify::sd_ready();
        tracing::info!("Configuration reload finished (notified systemd)");
    }

    fn on_stopping(&self) {
        notify::sd_stopping();
        tracing::info!("Analyzer stopping (notified systemd)...");
    }
}

/// `SystemdLifecycle` when `NOTIFY_SOCKET` is set, else `ForegroundLifecycle`.
pub fn detect_lifecycle() -> Box<dyn Lifecycle> {
    if std::env::var_os("NOTIFY_SOCKET").is_some() {
        Box::new(SystemdLifecycle)
    } else {
        Box::new(ForegroundLifecycle)
    }
}
