//! Host-side half of the proxy.
//!
//! The main components are:
//!
//! - `logger_server`: [`LoggerServer`], which services calls against a real logger
//! - `handler`: [`Handler`], the named-service registry and thrift processor
//! - `core`: [`Server`], the Unix socket listener and its lifecycle
//! - `stop_handle`: thread-safe stop handle for graceful shutdown

pub mod core;
pub mod handler;
pub mod logger_server;
pub mod stop_handle;

pub use core::{Server, DEFAULT_POLL_INTERVAL};
pub use handler::Handler;
pub use logger_server::LoggerServer;
pub use stop_handle::ServerStopHandle;
