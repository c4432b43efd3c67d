//! Leveled diagnostic logging for the `strata` containers.
//!
//! A single global filter decides which records are written. Records go to
//! standard error as one colored line each, tagged with the module path of
//! the call site.
//!
//! The filter starts at [`LevelFilter::Warn`] and can be changed at runtime
//! with [`set_level`], or read from the `STRATA_LOG` environment variable with
//! [`init_from_env`].
//!
//! # Example
//!
//! ```
//! use strata_log::{debug, info, trace, LevelFilter};
//!
//! strata_log::set_level(LevelFilter::Debug);
//!
//! info!("arena holds {} bytes", 128);
//! debug!("cache hit at offset {}", 4);
//! trace!("this record is filtered out");
//! ```

use std::fmt::{self, Arguments};
use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable consulted by [`init_from_env`].
pub const ENV_VAR: &str = "STRATA_LOG";

/// Severity of a single log record.
///
/// Ordered from most severe (`Error`) to least severe (`Trace`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// A contract was violated or an operation was rejected.
    Error = 1,
    /// Something surprising that callers may want to know about.
    Warn = 2,
    /// Coarse lifecycle events.
    Info = 3,
    /// Per-operation detail such as clears and merges.
    Debug = 4,
    /// Hot-path detail such as cache hits and buffer growth.
    Trace = 5,
}

impl Level {
    const fn color_code(self) -> &'static str {
        match self {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[32m",
            Level::Debug => "\x1b[36m",
            Level::Trace => "\x1b[35m",
        }
    }

    /// Returns the upper-case name of this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }
}

/// The most verbose level a logger lets through, or `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LevelFilter {
    /// Nothing is written.
    Off = 0,
    /// Only [`Level::Error`].
    Error = 1,
    /// [`Level::Warn`] and above.
    Warn = 2,
    /// [`Level::Info`] and above.
    Info = 3,
    /// [`Level::Debug`] and above.
    Debug = 4,
    /// Everything.
    Trace = 5,
}

impl LevelFilter {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LevelFilter::Off,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            4 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Error returned when a level name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(pub String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid log level: {:?}", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for LevelFilter {
    type Err = ParseLevelError;

    /// Parses a level name, case-insensitively.
    ///
    /// ```
    /// use strata_log::LevelFilter;
    ///
    /// assert_eq!("trace".parse(), Ok(LevelFilter::Trace));
    /// assert_eq!("OFF".parse(), Ok(LevelFilter::Off));
    /// assert!("loud".parse::<LevelFilter>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(LevelFilter::Off),
            "error" => Ok(LevelFilter::Error),
            "warn" => Ok(LevelFilter::Warn),
            "info" => Ok(LevelFilter::Info),
            "debug" => Ok(LevelFilter::Debug),
            "trace" => Ok(LevelFilter::Trace),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// A level filter shared by every call site.
///
/// The filter is a single atomic byte, so checking it from a hot path costs
/// one relaxed load.
pub struct Logger {
    filter: AtomicU8,
}

impl Logger {
    const fn new(filter: LevelFilter) -> Self {
        Logger {
            filter: AtomicU8::new(filter as u8),
        }
    }

    /// Replaces the current filter.
    pub fn set_level(&self, filter: LevelFilter) {
        self.filter.store(filter as u8, Ordering::Relaxed);
    }

    /// Returns the current filter.
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        LevelFilter::from_u8(self.filter.load(Ordering::Relaxed))
    }

    /// Returns true if a record at `level` would be written.
    #[inline]
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        level as u8 <= self.filter.load(Ordering::Relaxed)
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Returns the global logger, creating it at [`LevelFilter::Warn`] on first use.
pub fn get_logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(LevelFilter::Warn))
}

/// Sets the global filter.
pub fn set_level(filter: LevelFilter) {
    get_logger().set_level(filter);
}

/// Sets the global filter from a level name.
///
/// # Errors
///
/// Returns [`ParseLevelError`] if `s` does not name a level; the filter is
/// left unchanged in that case.
pub fn set_level_from_str(s: &str) -> Result<(), ParseLevelError> {
    set_level(s.parse()?);
    Ok(())
}

/// Sets the global filter from the `STRATA_LOG` environment variable.
///
/// An unset variable leaves the filter alone and returns `Ok(None)`.
///
/// # Errors
///
/// Returns [`ParseLevelError`] if the variable is set to something that is not
/// a level name.
pub fn init_from_env() -> Result<Option<LevelFilter>, ParseLevelError> {
    match std::env::var(ENV_VAR) {
        Ok(value) => {
            let filter: LevelFilter = value.parse()?;
            set_level(filter);
            Ok(Some(filter))
        }
        Err(_) => Ok(None),
    }
}

#[doc(hidden)]
pub fn __log_with_target(level: Level, target: &str, args: Arguments<'_>) {
    const RESET: &str = "\x1b[0m";

    let color = level.color_code();
    let name = level.as_str();

    // A closed stderr is not worth failing the caller over.
    let _ = writeln!(std::io::stderr().lock(), "{color}[{name}]{RESET} {target}: {args}");
}

/// Writes a record at the given level if the global filter allows it.
///
/// ```
/// use strata_log::{log, Level};
///
/// log!(level: Level::Warn, "ring buffer full after {} adds", 8);
/// ```
#[macro_export]
macro_rules! log {
    (level: $level:expr, $($arg:tt)*) => {{
        let level = $level;
        if $crate::get_logger().enabled(level) {
            $crate::__log_with_target(level, module_path!(), format_args!($($arg)*));
        }
    }};
}

/// Writes a record at [`Level::Error`].
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Error, $($arg)*)
    };
}

/// Writes a record at [`Level::Warn`].
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Warn, $($arg)*)
    };
}

/// Writes a record at [`Level::Info`].
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Info, $($arg)*)
    };
}

/// Writes a record at [`Level::Debug`].
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Debug, $($arg)*)
    };
}

/// Writes a record at [`Level::Trace`].
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Trace, $($arg)*)
    };
}
