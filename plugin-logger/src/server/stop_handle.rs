/// Stop handle for a running logger server
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle that asks a [`Server`](crate::server::Server) to stop from another
/// thread.
///
/// Cloneable and idempotent. Stopping only raises the flag: the thread inside
/// [`Server::run`](crate::server::Server::run) notices it, wakes the listener,
/// closes open connections and removes the socket file.
///
/// # Example
///
/// ```no_run
/// use plugin_logger::{Handler, Server};
///
/// let mut server = Server::new("/tmp/host-logger.sock", Handler::new());
/// let handle = server.get_stop_handle();
///
/// std::thread::spawn(move || {
///     // ... some condition ...
///     handle.stop();
/// });
///
/// server.run()?; // returns once stop() is called
/// # Ok::<(), plugin_logger::Error>(())
/// ```
#[derive(Clone)]
pub struct ServerStopHandle {
    shutdown_flag: Arc<AtomicBool>,
}

impl ServerStopHandle {
    pub fn new(shutdown_flag: Arc<AtomicBool>) -> Self {
        Self { shutdown_flag }
    }

    pub fn stop(&self) {
        self.shutdown_flag.store(true, Ordering::Release);
    }

    /// `false` once any handle (or the server itself) has requested a stop.
    pub fn is_running(&self) -> bool {
        !self.shutdown_flag.load(Ordering::Acquire)
    }
}
