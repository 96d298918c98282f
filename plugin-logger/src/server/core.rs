/// Unix socket server hosting logger services for plugins
use crate::error::Result;
use crate::server::handler::Handler;
use crate::server::stop_handle::ServerStopHandle;
use std::collections::HashMap;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// How often [`Server::run`] checks for a stop request.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Open plugin connections, kept so shutdown can close them.
#[derive(Default)]
struct Connections {
    next_id: AtomicU64,
    streams: Mutex<HashMap<u64, UnixStream>>,
}

impl Connections {
    fn track(&self, stream: &UnixStream) -> Option<u64> {
        let clone = match stream.try_clone() {
            Ok(clone) => clone,
            Err(e) => {
                log::warn!("Failed to track connection: {e}");
                return None;
            }
        };
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.streams.lock().ok()?.insert(id, clone);
        Some(id)
    }

    fn forget(&self, id: Option<u64>) {
        if let (Some(id), Ok(mut streams)) = (id, self.streams.lock()) {
            streams.remove(&id);
        }
    }

    fn close_all(&self) {
        let Ok(mut streams) = self.streams.lock() else {
            return;
        };
        for (_, stream) in streams.drain() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
    }
}

/// Accepts plugin connections on a Unix socket and serves each one on its own
/// thread through a shared [`Handler`].
pub struct Server {
    socket_path: PathBuf,
    handler: Arc<Handler>,
    poll_interval: Duration,
    shutdown_flag: Arc<AtomicBool>,
    listener_thread: Option<thread::JoinHandle<()>>,
    connections: Arc<Connections>,
    bound: bool,
}

impl Server {
    pub fn new<P: AsRef<Path>>(socket_path: P, handler: Handler) -> Self {
        Server {
            socket_path: socket_path.as_ref().to_path_buf(),
            handler: Arc::new(handler),
            poll_interval: DEFAULT_POLL_INTERVAL,
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            listener_thread: None,
            connections: Arc::new(Connections::default()),
            bound: false,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Run the server, blocking until a stop is requested.
    pub fn run(&mut self) -> Result<()> {
        self.start()?;
        self.run_loop();
        self.shutdown_and_cleanup();
        Ok(())
    }

    /// Like [`run`](Server::run), but SIGINT and SIGTERM also stop the server.
    ///
    /// A handler that fails to register is logged and skipped; the stop
    /// handle keeps working either way.
    pub fn run_with_signal_handling(&mut self) -> Result<()> {
        use signal_hook::consts::{SIGINT, SIGTERM};

        for signal in [SIGINT, SIGTERM] {
            if let Err(e) = signal_hook::flag::register(signal, self.shutdown_flag.clone()) {
                log::warn!("Failed to register handler for signal {signal}: {e}");
            }
        }
        self.run()
    }

    /// Bind the socket and start accepting connections in the background.
    ///
    /// A stale socket file left by a dead host is replaced; a live one is
    /// reported as an error.
    pub fn start(&mut self) -> Result<()> {
        if self.listener_thread.is_some() {
            return Ok(());
        }
        self.remove_stale_socket();
        let listener = UnixListener::bind(&self.socket_path)?;
        self.bound = true;
        log::info!("Serving logger on {}", self.socket_path.display());

        let handler = self.handler.clone();
        let shutdown_flag = self.shutdown_flag.clone();
        let connections = self.connections.clone();
        self.listener_thread = Some(thread::spawn(move || {
            accept_loop(listener, handler, shutdown_flag, connections)
        }));
        Ok(())
    }

    fn run_loop(&self) {
        while !self.should_shutdown() {
            thread::sleep(self.poll_interval);
        }
    }

    fn should_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::Acquire)
    }

    fn request_shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::Release);
    }

    /// Remove a socket file nobody is listening on. Anything that is not a
    /// socket is left alone for `bind` to fail on.
    fn remove_stale_socket(&self) {
        let is_socket = std::fs::symlink_metadata(&self.socket_path)
            .is_ok_and(|metadata| metadata.file_type().is_socket());
        if !is_socket || UnixStream::connect(&self.socket_path).is_ok() {
            return;
        }
        match std::fs::remove_file(&self.socket_path) {
            Ok(()) => log::debug!("Removed stale socket file: {}", self.socket_path.display()),
            Err(e) => log::warn!(
                "Failed to remove stale socket file {}: {e}",
                self.socket_path.display()
            ),
        }
    }

    fn shutdown_and_cleanup(&mut self) {
        log::info!("Shutting down");
        self.join_listener_thread();
        self.connections.close_all();
        self.cleanup_socket();
    }

    /// Attempt to join the listener thread, waking it while it sits in accept().
    fn join_listener_thread(&mut self) {
        const JOIN_TIMEOUT: Duration = Duration::from_millis(100);
        const POLL_INTERVAL: Duration = Duration::from_millis(10);

        let Some(thread) = self.listener_thread.take() else {
            return;
        };

        let start = Instant::now();
        while !thread.is_finished() && start.elapsed() < JOIN_TIMEOUT {
            self.wake_listener();
            thread::sleep(POLL_INTERVAL);
        }

        if let Err(e) = thread.join() {
            log::warn!("Listener thread panicked: {e:?}");
        }
    }

    fn wake_listener(&self) {
        let _ = UnixStream::connect(&self.socket_path);
    }

    fn cleanup_socket(&mut self) {
        if !self.bound {
            log::debug!("No socket to clean up");
            return;
        }
        self.bound = false;
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                log::warn!(
                    "Failed to remove socket file {}: {e}",
                    self.socket_path.display()
                );
            } else {
                log::debug!("Cleaned up socket file: {}", self.socket_path.display());
            }
        }
    }

    pub fn get_stop_handle(&self) -> ServerStopHandle {
        ServerStopHandle::new(self.shutdown_flag.clone())
    }

    /// Stop accepting, close open connections and remove the socket file.
    pub fn stop(&mut self) {
        self.request_shutdown();
        self.shutdown_and_cleanup();
    }

    pub fn is_running(&self) -> bool {
        !self.should_shutdown()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if self.listener_thread.is_some() || self.bound {
            self.stop();
        }
    }
}

fn accept_loop(
    listener: UnixListener,
    handler: Arc<Handler>,
    shutdown_flag: Arc<AtomicBool>,
    connections: Arc<Connections>,
) {
    for stream in listener.incoming() {
        if shutdown_flag.load(Ordering::Acquire) {
            break;
        }
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!("Accept failed, stopping listener: {e}");
                break;
            }
        };
        log::debug!("Plugin connected");

        let id = connections.track(&stream);
        let handler = handler.clone();
        let connections = connections.clone();
        thread::spawn(move || {
            if let Err(e) = handler.serve(stream) {
                log::debug!("Connection closed with error: {e}");
            }
            connections.forget(id);
        });
    }
    log::debug!("Listener stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_creation() {
        let server = Server::new("/tmp/test.sock", Handler::new());
        assert_eq!(server.socket_path(), Path::new("/tmp/test.sock"));
        assert_eq!(server.poll_interval, DEFAULT_POLL_INTERVAL);
        assert!(server.listener_thread.is_none());
        assert!(server.is_running());
    }

    #[test]
    fn test_server_stop_handle() {
        let server = Server::new("/tmp/test.sock", Handler::new());
        let handle = server.get_stop_handle();
        assert!(handle.is_running());

        handle.stop();

        assert!(!server.is_running());
        assert!(!handle.is_running());
    }

    #[test]
    fn test_start_and_stop_removes_socket() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("host.sock");

        let mut server = Server::new(&socket_path, Handler::new());
        server.start().unwrap();
        assert!(socket_path.exists());

        server.stop();
        assert!(!socket_path.exists());
        assert!(!server.is_running());
    }

    #[test]
    fn test_stale_socket_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("host.sock");
        drop(UnixListener::bind(&socket_path).unwrap());
        assert!(socket_path.exists());

        let mut server = Server::new(&socket_path, Handler::new());
        server.start().unwrap();
        server.stop();
        assert!(!socket_path.exists());
    }

    #[test]
    fn test_live_socket_is_not_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("host.sock");

        let mut first = Server::new(&socket_path, Handler::new());
        first.start().unwrap();

        let mut second = Server::new(&socket_path, Handler::new());
        assert!(second.start().is_err());

        first.stop();
    }

    #[test]
    fn test_regular_file_is_not_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("host.sock");
        std::fs::write(&socket_path, "precious data").unwrap();

        let mut server = Server::new(&socket_path, Handler::new());
        assert!(server.start().is_err());
        drop(server);

        assert_eq!(std::fs::read_to_string(&socket_path).unwrap(), "precious data");
    }
}
