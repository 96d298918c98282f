/// Host logger writing formatted lines to any `Write` sink
use crate::context::Context;
use crate::error::{Error, Result};
use crate::level::Level;
use crate::logger::threshold::Threshold;
use crate::logger::Logger;
use chrono::Local;
use serde_json::{Map, Value};
use std::io::Write;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use strum_macros::{EnumString, VariantNames};

/// Environment variable selecting the line format (`standard` or `json`).
pub const LOG_FORMAT_ENV: &str = "PLUGIN_LOG_FORMAT";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

#[derive(EnumString, VariantNames, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[strum(serialize_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum LogFormat {
    /// `<timestamp> [LEVEL] name: message key=value ...`
    #[default]
    Standard,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Reads [`LOG_FORMAT_ENV`], falling back to `Standard` when unset or unknown.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|value| LogFormat::from_str(value.trim()).ok())
            .unwrap_or_default()
    }
}

/// A real logger owning its sink and its level threshold.
///
/// Fatal records are written whatever the threshold, and the sink is flushed
/// after them. Other records are left to the sink's own buffering; call
/// [`flush`](WriterLogger::flush) when reading a buffered sink back.
///
/// ```
/// use plugin_logger::{Level, Logger, WriterLogger};
///
/// let logger = WriterLogger::new(Vec::new(), Level::Trace).with_name("core");
/// logger.debug("foobar", None);
/// let out = String::from_utf8(logger.into_inner()).unwrap();
/// assert!(out.contains("[DEBUG] core: foobar"));
/// ```
pub struct WriterLogger<W: Write + Send> {
    sink: Mutex<W>,
    threshold: Threshold,
    name: Option<String>,
    format: LogFormat,
}

impl<W: Write + Send> WriterLogger<W> {
    pub fn new(sink: W, level: Level) -> Self {
        Self {
            sink: Mutex::new(sink),
            threshold: Threshold::new(level),
            name: None,
            format: LogFormat::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn level(&self) -> Level {
        self.threshold.get()
    }

    pub fn flush(&self) -> Result<()> {
        self.sink.lock().map_err(|_| Error::Poisoned("sink"))?.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn enabled(&self, level: Level) -> bool {
        level == Level::Fatal || self.threshold.permits(level)
    }

    fn render(&self, level: Level, message: &str, context: Option<&Context>) -> String {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        match self.format {
            LogFormat::Standard => {
                let mut line = format!("{timestamp} [{level:<5}] ");
                if let Some(ref name) = self.name {
                    line.push_str(name);
                    line.push_str(": ");
                }
                push_single_line(&mut line, message);
                if let Some(context) = context.filter(|c| !c.is_empty()) {
                    line.push(' ');
                    line.push_str(&context.to_string());
                }
                line.push('\n');
                line
            }
            LogFormat::Json => {
                let mut record = Map::new();
                record.insert("@timestamp".to_string(), Value::String(timestamp));
                record.insert(
                    "@level".to_string(),
                    Value::String(level.as_ref().to_string()),
                );
                if let Some(ref name) = self.name {
                    record.insert("@module".to_string(), Value::String(name.clone()));
                }
                record.insert("@message".to_string(), Value::String(message.to_string()));
                for (key, value) in context.into_iter().flat_map(Context::iter) {
                    // `@` names belong to the record itself
                    let key = if key.starts_with('@') {
                        format!("context.{key}")
                    } else {
                        key.to_string()
                    };
                    record.insert(key, Value::String(value.to_string()));
                }
                format!("{}\n", Value::Object(record))
            }
        }
    }
}

/// Append `message` with line breaks escaped, so one record stays one line.
fn push_single_line(line: &mut String, message: &str) {
    for c in message.chars() {
        match c {
            '\n' => line.push_str("\\n"),
            '\r' => line.push_str("\\r"),
            c => line.push(c),
        }
    }
}

impl<W: Write + Send> Logger for WriterLogger<W> {
    fn log(&self, level: Level, message: &str, context: Option<&Context>) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        let line = self.render(level, message, context);
        let mut sink = self.sink.lock().map_err(|_| Error::Poisoned("sink"))?;
        sink.write_all(line.as_bytes())?;
        if level == Level::Fatal {
            sink.flush()?;
        }
        Ok(())
    }

    fn is_trace(&self) -> bool {
        self.threshold.permits(Level::Trace)
    }

    fn is_debug(&self) -> bool {
        self.threshold.permits(Level::Debug)
    }

    fn is_info(&self) -> bool {
        self.threshold.permits(Level::Info)
    }

    fn is_warn(&self) -> bool {
        self.threshold.permits(Level::Warn)
    }

    fn set_level(&self, level: Level) -> Result<()> {
        self.threshold.set(level);
        Ok(())
    }
}
