use parking_lot::Mutex;
/// Debug logging for wave-bridge
///
/// Controlled by DEBUG_LEVEL environment variable:
/// - 0 or unset: No debugging
/// - 1: Errors only
/// - 2: Info level (connection lifecycle, registrations)
/// - 3: Debug level (commands and parsed replies)
/// - 4: Trace level (every line exchanged with the interpreter)
///
/// All output goes to wave_bridge_debug.log in the system temp directory
/// so that callers printing viewer data to stdout are not disturbed.
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    fn from_env() -> Option<Self> {
        let val = std::env::var("DEBUG_LEVEL").ok()?;
        match val.trim().parse::<u8>() {
            Ok(0) => Some(DebugLevel::Off),
            Ok(1) => Some(DebugLevel::Error),
            Ok(2) => Some(DebugLevel::Info),
            Ok(3) => Some(DebugLevel::Debug),
            Ok(4) => Some(DebugLevel::Trace),
            _ => None,
        }
    }

    fn from_level_filter(filter: log::LevelFilter) -> Self {
        match filter {
            log::LevelFilter::Off => DebugLevel::Off,
            log::LevelFilter::Error | log::LevelFilter::Warn => DebugLevel::Error,
            log::LevelFilter::Info => DebugLevel::Info,
            log::LevelFilter::Debug => DebugLevel::Debug,
            log::LevelFilter::Trace => DebugLevel::Trace,
        }
    }

    fn to_level_filter(self) -> log::LevelFilter {
        match self {
            DebugLevel::Off => log::LevelFilter::Off,
            DebugLevel::Error => log::LevelFilter::Warn,
            DebugLevel::Info => log::LevelFilter::Info,
            DebugLevel::Debug => log::LevelFilter::Debug,
            DebugLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Global debug logger
struct DebugLogger {
    level: DebugLevel,
    file: Option<std::fs::File>,
}

impl DebugLogger {
    fn new(level: DebugLevel) -> Self {
        let file = if level != DebugLevel::Off {
            match OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(log_path())
            {
                Ok(f) => {
                    let mut logger = DebugLogger {
                        level,
                        file: Some(f),
                    };
                    logger.write_raw(&format!(
                        "\n{}\nwave-bridge debug session started at {} (level={:?})\n{}\n",
                        "=".repeat(80),
                        get_timestamp(),
                        level,
                        "=".repeat(80)
                    ));
                    return logger;
                }
                // Logging must never break the bridge itself
                Err(_e) => None,
            }
        } else {
            None
        };

        DebugLogger { level, file }
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.file {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }

    fn log(&mut self, level: DebugLevel, category: &str, msg: &str) {
        if level <= self.level {
            let level_str = match level {
                DebugLevel::Error => "ERROR",
                DebugLevel::Info => "INFO ",
                DebugLevel::Debug => "DEBUG",
                DebugLevel::Trace => "TRACE",
                DebugLevel::Off => return,
            };
            self.write_raw(&format!(
                "[{}] [{}] [{}] {}\n",
                get_timestamp(),
                level_str,
                category,
                msg
            ));
        }
    }
}

static LOGGER: OnceLock<Mutex<DebugLogger>> = OnceLock::new();

fn get_logger() -> &'static Mutex<DebugLogger> {
    LOGGER.get_or_init(|| {
        Mutex::new(DebugLogger::new(
            DebugLevel::from_env().unwrap_or(DebugLevel::Off),
        ))
    })
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Location of the debug log file.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("wave_bridge_debug.log")
}

/// Check if debugging is enabled at given level
pub fn is_enabled(level: DebugLevel) -> bool {
    let logger = get_logger().lock();
    level <= logger.level
}

/// Log a message at specified level
pub fn log(level: DebugLevel, category: &str, msg: &str) {
    let mut logger = get_logger().lock();
    logger.log(level, category, msg);
}

/// Log formatted message
pub fn logf(level: DebugLevel, category: &str, args: fmt::Arguments) {
    if is_enabled(level) {
        log(level, category, &format!("{}", args));
    }
}

/// `log` facade backend writing into the debug log file.
struct LogBridge {
    mirror_stderr: bool,
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            log::Level::Error | log::Level::Warn => DebugLevel::Error,
            log::Level::Info => DebugLevel::Info,
            log::Level::Debug => DebugLevel::Debug,
            log::Level::Trace => DebugLevel::Trace,
        };
        let msg = format!("{}", record.args());
        log(level, record.target(), &msg);
        if self.mirror_stderr {
            eprintln!("[{}] {}: {}", record.level(), record.target(), msg);
        }
    }

    fn flush(&self) {}
}

/// Route `log::info!()` and friends into the debug log file.
///
/// Precedence: an explicit `level` (CLI flag or config) wins, then
/// `DEBUG_LEVEL`, otherwise logging stays off. When `RUST_LOG` is set,
/// records are also mirrored to stderr. The `log` backend is installed by
/// the first call only; later calls just reopen the file logger.
pub fn init_log_bridge(level: Option<log::LevelFilter>) {
    let debug_level = level
        .map(DebugLevel::from_level_filter)
        .or_else(DebugLevel::from_env)
        .unwrap_or(DebugLevel::Off);

    let filter = level.unwrap_or_else(|| debug_level.to_level_filter());
    *get_logger().lock() = DebugLogger::new(debug_level);

    let bridge = LogBridge {
        mirror_stderr: std::env::var_os("RUST_LOG").is_some(),
    };
    if log::set_boxed_logger(Box::new(bridge)).is_ok() {
        log::set_max_level(filter);
    }
}

// Convenience macros for logging
#[macro_export]
macro_rules! debug_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Error, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Info, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Debug, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_trace {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Trace, $category, format_args!($($arg)*))
    };
}
