/// Log levels shared by the host logger and its plugin-side proxy
use crate::error::Error;
use std::fmt;
use strum_macros::{AsRefStr, EnumString, VariantNames};

/// Ordered log levels.
///
/// A message at level `L` is written iff `L >= threshold`. `All` and `Off` are
/// only meaningful as thresholds.
#[derive(
    EnumString,
    VariantNames,
    AsRefStr,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
)]
#[strum(serialize_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Level {
    All = 0,
    Trace = 1,
    Debug = 2,
    Info = 3,
    #[default]
    Warn = 4,
    Error = 5,
    Fatal = 6,
    Off = 7,
}

impl Level {
    /// Whether a message at `self` passes `threshold`.
    ///
    /// `Off` never passes.
    pub fn passes(self, threshold: Level) -> bool {
        self != Level::Off && self >= threshold
    }

    /// Closest `log` facade level for a message at `self`.
    pub fn to_facade(self) -> Option<log::Level> {
        match self {
            Level::All | Level::Trace => Some(log::Level::Trace),
            Level::Debug => Some(log::Level::Debug),
            Level::Info => Some(log::Level::Info),
            Level::Warn => Some(log::Level::Warn),
            Level::Error | Level::Fatal => Some(log::Level::Error),
            Level::Off => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so callers can align with `{:<5}`
        f.pad(match self {
            Level::All => "ALL",
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Off => "OFF",
        })
    }
}

impl TryFrom<i32> for Level {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Error> {
        match value {
            0 => Ok(Level::All),
            1 => Ok(Level::Trace),
            2 => Ok(Level::Debug),
            3 => Ok(Level::Info),
            4 => Ok(Level::Warn),
            5 => Ok(Level::Error),
            6 => Ok(Level::Fatal),
            7 => Ok(Level::Off),
            _ => Err(Error::InvalidLevel(value)),
        }
    }
}

impl From<Level> for i32 {
    fn from(level: Level) -> Self {
        level as i32
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug => Level::Debug,
            log::Level::Trace => Level::Trace,
        }
    }
}
