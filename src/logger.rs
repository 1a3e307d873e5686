use std::path::Path;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

// Holding the worker guard here keeps the non-blocking writer flushing for
// the life of the process.
static LOGGER: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize file logging once for the whole process; later calls are
/// no-ops. `filter` is a tracing directive string such as
/// "outpost::moves::perft=trace,info"; a `RUST_LOG` env var wins over it.
pub fn init_logging<P: AsRef<Path>>(path: P, filter: &str) {
    LOGGER.get_or_init(|| {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("open log file");

        let (writer, guard) = tracing_appender::non_blocking(file);

        let env_filter = if std::env::var_os("RUST_LOG").is_some() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer)
            .finish();

        // Tests may race to install a subscriber; losing the race is fine.
        let _ = tracing::subscriber::set_global_default(subscriber);

        guard
    });
}
