//! Plugin-side half of the proxy.
//!
//! The main components are:
//!
//! - `trait_def`: the [`Transport`] seam the client calls through
//! - `thrift_transport`: thrift binary protocol over a Unix socket
//! - `logger_client`: [`LoggerClient`], the `Logger` implementation plugins use
//! - `terminate`: what happens after a fatal call has been sent
//! - `log_bridge`: routes the plugin's `log` macros through the client

mod log_bridge;
pub mod logger_client;
pub mod terminate;
pub mod thrift_transport;
pub mod trait_def;

pub use logger_client::LoggerClient;
pub use terminate::{AbortProcess, FatalExit, Terminate, UnwindOnFatal};
pub use thrift_transport::{ThriftTransport, DEFAULT_TIMEOUT};
pub use trait_def::Transport;
