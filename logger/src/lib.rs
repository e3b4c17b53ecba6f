//! Minimal global logger for the objview workspace.
//!
//! Compiled to a no-op unless the `logger` feature is enabled, so the core
//! crate can keep log call sites in place without paying for them.

#[cfg(feature = "logger")]
use chrono::Utc;
#[cfg(feature = "logger")]
use once_cell::sync::OnceCell;
#[cfg(feature = "logger")]
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    sync::Mutex,
    time::Instant,
};

#[cfg(feature = "logger")]
static LOGGER: OnceCell<Logger> = OnceCell::new();

/// Where log lines end up: the console, or a file in the temp directory
/// named `objview-<timestamp>.log`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum LogKind {
    Stdout,
    File,
}

#[cfg(feature = "logger")]
struct Logger {
    sink: Mutex<Box<dyn Write + Send>>,
    started: Instant,
}

#[cfg(feature = "logger")]
impl Logger {
    fn new(kind: LogKind) -> Self {
        let sink: Box<dyn Write + Send> = match kind {
            LogKind::Stdout => Box::new(io::stdout()),
            LogKind::File => {
                let path =
                    std::env::temp_dir().join(format!("objview-{}.log", Utc::now().timestamp()));
                println!("Logging to file: {path:?}");
                Box::new(BufWriter::new(File::create(path).unwrap()))
            }
        };

        Self {
            sink: Mutex::new(sink),
            started: Instant::now(),
        }
    }

    fn log<T: std::fmt::Display>(&self, data: T) {
        let elapsed = self.started.elapsed();
        let seconds = elapsed.as_secs();

        if let Ok(ref mut sink) = self.sink.lock() {
            writeln!(
                sink,
                "[{:02}:{:02}:{:02}.{:03}] {data}",
                seconds / 3600,
                (seconds / 60) % 60,
                seconds % 60,
                elapsed.subsec_millis()
            )
            .unwrap();
        }
    }

    fn flush(&self) {
        if let Ok(ref mut sink) = self.sink.lock() {
            sink.flush().ok();
        }
    }
}

/// Installs the global logger. Later calls are ignored, the first sink wins.
#[cfg(feature = "logger")]
pub fn init_logger(kind: LogKind) {
    LOGGER.set(Logger::new(kind)).ok();
}

/// Writes one line through the global logger, prefixed with the time
/// elapsed since `init_logger` was called.
pub fn log<T: std::fmt::Display>(data: T) {
    let _ = data;
    #[cfg(feature = "logger")]
    if let Some(logger) = LOGGER.get() {
        logger.log(data);
    }
}

/// Forces buffered log lines out to the sink.
pub fn flush() {
    #[cfg(feature = "logger")]
    if let Some(logger) = LOGGER.get() {
        logger.flush();
    }
}
