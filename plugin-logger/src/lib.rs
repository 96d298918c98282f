//! Forward a host process's logger to plugin processes.
//!
//! A plugin holds a [`LoggerClient`], an ordinary synchronous [`Logger`], and
//! every call on it becomes a blocking thrift call to a [`LoggerServer`] in
//! the host. Formatting, filtering and the level threshold live only in the
//! host. `fatal` is recorded by the host and then terminates the plugin; the
//! host itself is never terminated by a remote call.
//!
//! ```no_run
//! use plugin_logger::prelude::*;
//!
//! // host
//! let mut handler = Handler::new();
//! handler.register_name(
//!     DEFAULT_SERVICE,
//!     LoggerServer::new(WriterLogger::new(std::io::stderr(), Level::Info)),
//! );
//! let mut server = Server::new("/tmp/host-logger.sock", handler);
//! server.start()?;
//!
//! // plugin
//! let logger = LoggerClient::connect("/tmp/host-logger.sock", DEFAULT_TIMEOUT)?;
//! logger.info("mounted backend", Some(&Context::new().with("path", "secret/")));
//! if logger.is_debug() {
//!     logger.debug("expensive detail", None);
//! }
//! # Ok::<(), plugin_logger::Error>(())
//! ```
#![forbid(unsafe_code)]

pub mod channel;
pub mod client;
pub mod context;
pub mod error;
pub mod level;
pub mod logger;
pub mod rpc;
pub mod server;
mod util;

pub use crate::client::{
    AbortProcess, FatalExit, LoggerClient, Terminate, ThriftTransport, Transport, UnwindOnFatal,
    DEFAULT_TIMEOUT,
};
pub use crate::context::Context;
pub use crate::error::{Error, Result};
pub use crate::level::Level;
pub use crate::logger::{FacadeLogger, LogFormat, Logger, WriterLogger};
pub use crate::rpc::DEFAULT_SERVICE;
pub use crate::server::{Handler, LoggerServer, Server, ServerStopHandle};

///
/// Everything a host or plugin needs in the common case
///
/// ```
/// use plugin_logger::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Context, FacadeLogger, Handler, Level, LogFormat, Logger, LoggerClient, LoggerServer,
        Server, ServerStopHandle, WriterLogger, DEFAULT_SERVICE, DEFAULT_TIMEOUT,
    };
}
