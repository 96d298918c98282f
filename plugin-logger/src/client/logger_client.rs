/// Plugin-side logger that forwards every call to the host
use crate::client::terminate::{AbortProcess, Terminate};
use crate::client::thrift_transport::ThriftTransport;
use crate::client::trait_def::Transport;
use crate::context::Context;
use crate::error::Result;
use crate::level::Level;
use crate::logger::Logger;
use crate::rpc::{LogRequest, Method};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

/// [`Logger`] whose every method is a blocking call to a
/// [`LoggerServer`](crate::server::LoggerServer) in the host.
///
/// Nothing is decided locally: predicates always ask the host, and the
/// threshold only exists there. Failures are handled per method:
///
/// - emit methods (`trace` .. `error`) drop transport errors
/// - predicates answer `false`
/// - `log` and `set_level` return them
/// - `fatal` terminates the process whether or not the call got through
pub struct LoggerClient<T: Transport = ThriftTransport> {
    transport: T,
    terminator: Box<dyn Terminate>,
}

impl LoggerClient<ThriftTransport> {
    /// Connect to the host socket at `socket_path`.
    pub fn connect<P: AsRef<Path>>(socket_path: P, timeout: Duration) -> Result<Self> {
        Ok(Self::with_transport(ThriftTransport::connect(
            socket_path,
            timeout,
        )?))
    }

    pub fn from_stream(stream: UnixStream) -> Result<Self> {
        Ok(Self::with_transport(ThriftTransport::from_stream(stream)?))
    }
}

impl<T: Transport> LoggerClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            terminator: Box::new(AbortProcess),
        }
    }

    /// Replace what happens after a fatal call has been sent.
    pub fn with_terminator<D: Terminate + 'static>(mut self, terminator: D) -> Self {
        self.terminator = Box::new(terminator);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(super) fn emit(&self, method: Method, message: &str, context: Option<&Context>) {
        let request = LogRequest::emit(message, context);
        // no result slot to report into
        let _ = self.transport.call(method, &request);
    }

    fn query(&self, method: Method) -> bool {
        match self
            .transport
            .call(method, &LogRequest::query())
            .and_then(|response| response.into_result())
        {
            Ok(enabled) => enabled.unwrap_or(false),
            Err(_) => false,
        }
    }
}

impl<T: Transport> Logger for LoggerClient<T> {
    fn log(&self, level: Level, message: &str, context: Option<&Context>) -> Result<()> {
        let request = LogRequest::log(level, message, context);
        self.transport.call(Method::Log, &request)?.into_result()?;
        Ok(())
    }

    fn trace(&self, message: &str, context: Option<&Context>) {
        self.emit(Method::Trace, message, context);
    }

    fn debug(&self, message: &str, context: Option<&Context>) {
        self.emit(Method::Debug, message, context);
    }

    fn info(&self, message: &str, context: Option<&Context>) {
        self.emit(Method::Info, message, context);
    }

    fn warn(&self, message: &str, context: Option<&Context>) {
        self.emit(Method::Warn, message, context);
    }

    fn error(&self, message: &str, context: Option<&Context>) {
        self.emit(Method::Error, message, context);
    }

    fn fatal(&self, message: &str, context: Option<&Context>) {
        self.emit(Method::Fatal, message, context);
        self.terminator.terminate(message)
    }

    fn is_trace(&self) -> bool {
        self.query(Method::IsTrace)
    }

    fn is_debug(&self) -> bool {
        self.query(Method::IsDebug)
    }

    fn is_info(&self) -> bool {
        self.query(Method::IsInfo)
    }

    fn is_warn(&self) -> bool {
        self.query(Method::IsWarn)
    }

    fn set_level(&self, level: Level) -> Result<()> {
        self.transport
            .call(Method::SetLevel, &LogRequest::set_level(level))?
            .into_result()?;
        Ok(())
    }
}
