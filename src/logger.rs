use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Writes records to the browser console on wasm and to stderr elsewhere.
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{} {}] {}", record.level(), record.target(), record.args());
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::console::log_1(&line.into());
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            eprintln!("{}", line);
        }
    }

    fn flush(&self) {}
}

/// Install the console logger. Calling it again is a no-op.
pub fn init() -> Result<(), SetLoggerError> {
    init_with_level(LevelFilter::Info)
}

pub fn init_with_level(level: LevelFilter) -> Result<(), SetLoggerError> {
    match log::set_logger(&LOGGER) {
        Ok(()) => {
            log::set_max_level(level);
            Ok(())
        }
        // Already installed by an earlier call.
        Err(_) if log::max_level() != LevelFilter::Off => Ok(()),
        Err(err) => Err(err),
    }
}

/// Milliseconds since an arbitrary epoch, for coarse timings.
pub fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}
