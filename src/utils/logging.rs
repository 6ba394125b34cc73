use camino::Utf8Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "zmm.log";

/// Installs stdout + daily rolling file logging.
/// `RUST_LOG` wins over `default_filter`. Keep the guard alive for the life of the process,
/// dropping it flushes the file writer.
pub fn init(log_dir: &Utf8Path, default_filter: &str) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init();

    if let Err(e) = result {
        // Already initialised by the host or a previous call.
        tracing::debug!("logging already initialised: {e}");
    }

    guard
}
