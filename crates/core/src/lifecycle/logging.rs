//! Tracing subscriber setup: stderr by default, daily-rotated file on request.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "ecolens.log";

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
///
/// With `to_file`, logs go through a non-blocking daily appender in `log_dir`
/// (default `./logs`) and the returned guard must be held until exit so the
/// buffer is flushed.
pub fn init_logging(level: &str, to_file: bool, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    if !to_file {
        builder.init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(log_dir.unwrap_or("./logs"), LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    builder.with_writer(writer).with_ansi(false).init();
    Some(guard)
}
