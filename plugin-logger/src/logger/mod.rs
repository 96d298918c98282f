//! The logger capability and the host-side loggers that implement it.
//!
//! [`Logger`] is implemented both by real loggers living in the host
//! ([`WriterLogger`], [`FacadeLogger`]) and by the plugin-side proxy
//! [`LoggerClient`](crate::client::LoggerClient), so plugin code can take any
//! `&dyn Logger` without knowing which side of the process boundary it is on.
//!
//! # Example
//!
//! ```
//! use plugin_logger::{Context, Level, Logger, WriterLogger};
//!
//! let logger = WriterLogger::new(Vec::new(), Level::Info);
//! logger.info("mounted backend", Some(&Context::new().with("path", "secret/")));
//! assert!(logger.is_info());
//! assert!(!logger.is_debug());
//! ```

mod facade;
mod threshold;
mod writer;

pub use facade::FacadeLogger;
pub use threshold::Threshold;
pub use writer::{LogFormat, WriterLogger, LOG_FORMAT_ENV};

use crate::context::Context;
use crate::error::Result;
use crate::level::Level;

/// Logging operations shared by real loggers and their remote proxy.
///
/// Implementors only need [`log`](Logger::log), the four predicates and
/// [`set_level`](Logger::set_level); the emit methods default to `log` and
/// drop its error.
pub trait Logger: Send + Sync {
    /// Generic entry point. Returns errors from the sink or the channel.
    fn log(&self, level: Level, message: &str, context: Option<&Context>) -> Result<()>;

    fn trace(&self, message: &str, context: Option<&Context>) {
        let _ = self.log(Level::Trace, message, context);
    }

    fn debug(&self, message: &str, context: Option<&Context>) {
        let _ = self.log(Level::Debug, message, context);
    }

    fn info(&self, message: &str, context: Option<&Context>) {
        let _ = self.log(Level::Info, message, context);
    }

    fn warn(&self, message: &str, context: Option<&Context>) {
        let _ = self.log(Level::Warn, message, context);
    }

    fn error(&self, message: &str, context: Option<&Context>) {
        let _ = self.log(Level::Error, message, context);
    }

    /// Record a fatal message.
    ///
    /// Host-side loggers only record it. The plugin-side proxy additionally
    /// terminates the calling process once the message has been sent.
    fn fatal(&self, message: &str, context: Option<&Context>) {
        let _ = self.log(Level::Fatal, message, context);
    }

    fn is_trace(&self) -> bool;

    fn is_debug(&self) -> bool;

    fn is_info(&self) -> bool;

    fn is_warn(&self) -> bool;

    /// Change the threshold. Takes effect for every subsequent call.
    fn set_level(&self, level: Level) -> Result<()>;
}
