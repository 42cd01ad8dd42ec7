use std::io::Write;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

/// Destination for formatted log lines
pub type Sink = Box<dyn Write + Send>;

struct SdLogger {
    sink: Mutex<Sink>,
    filter: LevelFilter,
    start: Instant,
}

impl Log for SdLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.start.elapsed().as_secs_f64();
        let _ = writeln!(
            self.sink.lock(),
            "[{elapsed:.3}s] [{}] {} - {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = self.sink.lock().flush();
    }
}

/// Level to log at: everything with `--debug`, else `RUST_LOG`, else warnings.
#[must_use]
pub fn level_filter(debug: bool, rust_log: Option<&str>) -> LevelFilter {
    if debug {
        return LevelFilter::Debug;
    }
    rust_log
        .and_then(|s| s.parse().ok())
        .unwrap_or(LevelFilter::Warn)
}

/// Install the global logger, writing to stderr.
///
/// # Errors
///
/// Returns `SetLoggerError` if a logger is already installed.
pub fn init(filter: LevelFilter) -> Result<(), log::SetLoggerError> {
    init_with_sink(filter, Box::new(std::io::stderr()))
}

/// Install the global logger, writing to `sink`.
///
/// # Errors
///
/// Returns `SetLoggerError` if a logger is already installed.
pub fn init_with_sink(filter: LevelFilter, sink: Sink) -> Result<(), log::SetLoggerError> {
    let logger = SdLogger {
        sink: Mutex::new(sink),
        filter,
        start: Instant::now(),
    };

    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(filter);
    Ok(())
}
