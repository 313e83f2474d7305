//! appconfig logging
//!
//! Line-oriented stderr logging for the appconfig crates. The threshold is
//! taken from the environment the first time any macro checks it, so
//! `debug!` lines are honoured even if nothing was logged before.
//!
//! ```rust
//! use appconfig_log::{debug, error, info, warn};
//!
//! info!("Loaded {} features", 12);
//! debug!(target: "appconfig::features", "Evaluating '{}'", "dark-mode");
//! warn!("Skipping invalid feature at index {}", 3);
//! error!("Snapshot rejected");
//! ```
//!
//! # Environment Variables
//!
//! - `APPCONFIG_DEBUG=1` - Shorthand for `APPCONFIG_LOG_LEVEL=debug`
//! - `APPCONFIG_LOG_LEVEL=trace|debug|info|warn|error|off` - Threshold, wins over `APPCONFIG_DEBUG`
//! - `APPCONFIG_LOG_FORMAT=json|compact` - Line format (default `json`)
//! - `APPCONFIG_LOG_TIMESTAMPS=1|0` - Include timestamps (default on)

use once_cell::sync::Lazy;
use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Threshold only; never attached to a line
    Off = 5,
}

impl Level {
    const ALL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Off,
    ];

    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warning" => Some(Level::Warn),
            "none" => Some(Level::Off),
            name => Self::ALL
                .into_iter()
                .find(|level| level.as_str().eq_ignore_ascii_case(name)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `{"timestamp":..,"level":..,"target":..,"message":..}`
    Json,
    /// `12:00:01 W appconfig_features::snapshot: message`
    Compact,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "compact" => Some(Format::Compact),
            _ => None,
        }
    }
}

/// Settings read from `APPCONFIG_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub format: Format,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: Format::Json,
            timestamps: true,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let switch = |key: &str| {
            lookup(key).map(|v| v.trim() == "1" || v.trim().eq_ignore_ascii_case("true"))
        };
        let defaults = Self::default();

        let debug_level = switch("APPCONFIG_DEBUG")
            .filter(|on| *on)
            .map(|_| Level::Debug);
        let level = lookup("APPCONFIG_LOG_LEVEL")
            .and_then(|s| Level::parse(&s))
            .or(debug_level)
            .unwrap_or(defaults.level);

        Self {
            level,
            format: lookup("APPCONFIG_LOG_FORMAT")
                .and_then(|s| Format::parse(&s))
                .unwrap_or(defaults.format),
            timestamps: switch("APPCONFIG_LOG_TIMESTAMPS").unwrap_or(defaults.timestamps),
        }
    }
}

static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

const UNSET: u8 = u8::MAX;

/// Current threshold; `UNSET` until the environment has been read or a
/// level was set explicitly.
static THRESHOLD: AtomicU8 = AtomicU8::new(UNSET);

fn threshold() -> Level {
    let raw = THRESHOLD.load(Ordering::Acquire);
    if raw != UNSET {
        return Level::from_u8(raw).unwrap_or(Level::Off);
    }

    // An explicit set_level that raced with this read takes precedence.
    let from_env = CONFIG.level as u8;
    let raw = match THRESHOLD.compare_exchange(UNSET, from_env, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => from_env,
        Err(current) => current,
    };
    Level::from_u8(raw).unwrap_or(Level::Off)
}

/// Read the environment now instead of on the first log line.
pub fn init() {
    threshold();
}

pub fn config() -> &'static LogConfig {
    &CONFIG
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    level != Level::Off && level >= threshold()
}

pub fn current_level() -> Level {
    threshold()
}

/// Override the threshold at runtime.
pub fn set_level(level: Level) {
    THRESHOLD.store(level as u8, Ordering::Release);
}

#[derive(Serialize)]
struct Line<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    level: &'static str,
    target: &'a str,
    message: &'a str,
}

fn render(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    match config.format {
        Format::Json => {
            let line = Line {
                timestamp: config.timestamps.then(|| chrono::Utc::now().to_rfc3339()),
                level: level.as_str(),
                target,
                message,
            };
            serde_json::to_string(&line).unwrap_or_default()
        }
        Format::Compact => {
            let initial = level.as_str().chars().next().unwrap_or('?');
            match config.timestamps {
                true => format!(
                    "{} {} {}: {}",
                    chrono::Local::now().format("%H:%M:%S"),
                    initial,
                    target,
                    message
                ),
                false => format!("{} {}: {}", initial, target, message),
            }
        }
    }
}

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    if !is_level_enabled(level) {
        return;
    }
    let line = render(config(), level, target, message);
    let _ = writeln!(std::io::stderr().lock(), "{}", line);
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, $target, &format!($($arg)+));
        }
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::__log_at!($level, target: module_path!(), $($arg)+)
    };
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Trace, $($arg)+) };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Error, $($arg)+) };
}
