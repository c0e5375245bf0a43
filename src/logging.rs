//! Logging initialisation for band-terminal.
//!
//! Stderr output is always on, filtered by `RUST_LOG` or, failing that, by
//! the default directive (`warn`, or `band_terminal=debug` with `--verbose`).
//! With `BAND_TERMINAL_LOG=1` a plain-text copy also goes to
//! `band-terminal.log` in the log directory and the default rises to `info`.
//!
//! Returns a guard that must be kept alive for the duration of the process
//! so that buffered log lines are flushed on exit.

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub struct LogGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

fn default_directive(verbose: bool, file_logging: bool) -> &'static str {
    match (verbose, file_logging) {
        (true, _) => "warn,band_terminal=debug",
        (false, true) => "info",
        (false, false) => "warn",
    }
}

/// Initialise the global tracing subscriber.
///
/// Call once from `main`, store the returned `LogGuard` in a local variable
/// for the duration of the process.
pub fn init(verbose: bool) -> LogGuard {
    let file_logging = std::env::var("BAND_TERMINAL_LOG").as_deref() == Ok("1");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, file_logging)));

    let (file_layer, file_guard) = if file_logging {
        let dir = crate::paths::log_dir();
        let _ = std::fs::create_dir_all(&dir);
        let appender = tracing_appender::rolling::never(dir, "band-terminal.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(non_blocking).with_ansi(false).boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    LogGuard { _file_guard: file_guard }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_wins_over_file_logging() {
        assert_eq!(default_directive(true, true), "warn,band_terminal=debug");
        assert_eq!(default_directive(false, true), "info");
        assert_eq!(default_directive(false, false), "warn");
    }
}
