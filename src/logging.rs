use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_PREFIX: &str = "multi_toolbox.log";

/// Initialise logging. The default level is `info`; `debug` can be explicitly
/// enabled via the settings file, in which case `RUST_LOG` may override it.
///
/// When `log_dir` is given, output is also written to a daily rolling file and
/// the returned guard must be kept alive to flush it.
pub fn init(debug: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Without debug logging we force `info` regardless of `RUST_LOG` so a stray
    // environment variable cannot make the CLI noisy.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr.and(file_writer))
                .try_init();
            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
            None
        }
    }
}
