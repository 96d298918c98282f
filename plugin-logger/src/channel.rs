//! In-process client/server pairs.
//!
//! Useful when host and plugin share a process (tests, embedded plugins) or
//! when the host hands one end of a socketpair to a child it spawns.

use crate::client::LoggerClient;
use crate::error::Result;
use crate::server::Handler;
use std::os::unix::net::UnixStream;
use std::thread;

/// Connect a [`LoggerClient`] to `handler` over a fresh `UnixStream::pair()`.
///
/// The handler is served on a background thread until the client is dropped;
/// the returned handle yields the outcome of that connection. The client
/// addresses [`DEFAULT_SERVICE`](crate::rpc::DEFAULT_SERVICE).
pub fn pair(handler: Handler) -> Result<(LoggerClient, thread::JoinHandle<thrift::Result<()>>)> {
    let (client_end, server_end) = UnixStream::pair()?;
    let serving = thread::spawn(move || handler.serve(server_end));
    let client = LoggerClient::from_stream(client_end)?;
    Ok((client, serving))
}
