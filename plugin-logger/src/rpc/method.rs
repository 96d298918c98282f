/// Remotely callable logger methods
use crate::level::Level;
use std::fmt;
use strum_macros::{AsRefStr, EnumString, VariantNames};

#[derive(EnumString, VariantNames, AsRefStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Log,
    IsTrace,
    IsDebug,
    IsInfo,
    IsWarn,
    SetLevel,
}

impl Method {
    /// Emit method for messages at `level`, if one exists.
    pub fn emit_for(level: Level) -> Option<Method> {
        match level {
            Level::Trace => Some(Method::Trace),
            Level::Debug => Some(Method::Debug),
            Level::Info => Some(Method::Info),
            Level::Warn => Some(Method::Warn),
            Level::Error => Some(Method::Error),
            Level::Fatal => Some(Method::Fatal),
            Level::All | Level::Off => None,
        }
    }

    /// Level written by an emit method.
    pub fn emit_level(self) -> Option<Level> {
        match self {
            Method::Trace => Some(Level::Trace),
            Method::Debug => Some(Level::Debug),
            Method::Info => Some(Level::Info),
            Method::Warn => Some(Level::Warn),
            Method::Error => Some(Level::Error),
            Method::Fatal => Some(Level::Fatal),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}
