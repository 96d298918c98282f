/// Service registry and thrift processor for logger calls
use crate::rpc::{LogRequest, LogResponse, Method, Reply};
use crate::server::logger_server::LoggerServer;
use crate::util::OrUnknown;
use std::collections::HashMap;
use std::os::unix::net::UnixStream;
use std::str::FromStr;
use thrift::protocol::{
    TBinaryInputProtocol, TBinaryOutputProtocol, TInputProtocol, TMessageIdentifier,
    TMessageType, TOutputProtocol,
};
use thrift::server::TProcessor;
use thrift::transport::{TBufferedReadTransport, TBufferedWriteTransport};
use thrift::TransportErrorKind;

/// Routes `"<service>.<Method>"` calls to registered [`LoggerServer`]s.
#[derive(Clone, Default)]
pub struct Handler {
    services: HashMap<String, LoggerServer>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `server` to the channel under `name`. A later registration
    /// under the same name replaces the earlier one.
    pub fn register_name(&mut self, name: impl Into<String>, server: LoggerServer) -> &mut Self {
        let name = name.into();
        log::debug!("registered logger service {name}");
        self.services.insert(name, server);
        self
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Service one call by its full message name.
    ///
    /// Unknown services and methods are answered with a failure status so the
    /// connection stays usable.
    pub fn handle_call(&self, name: &str, request: &LogRequest) -> Reply {
        log::trace!("Call: {name}");
        log::trace!("Request: {request:?}");

        match self.route(name) {
            Ok((server, method)) => server.handle_call(method, request),
            Err(thrift::Error::Application(e)) => {
                log::debug!("rejected call {name}: {}", e.message);
                Reply::Failure(e.message)
            }
            Err(e) => Reply::Failure(e.to_string()),
        }
    }

    fn route(&self, name: &str) -> thrift::Result<(&LoggerServer, Method)> {
        let (service, method) = name.rsplit_once('.').or_unknown("call", name)?;
        let server = self.services.get(service).or_unknown("service", service)?;
        let method = Method::from_str(method).or_unknown("method", method)?;
        Ok((server, method))
    }

    /// Serve calls from one connected stream until the peer hangs up.
    pub fn serve(&self, stream: UnixStream) -> thrift::Result<()> {
        let socket_rx = stream.try_clone()?;
        let mut i_prot = TBinaryInputProtocol::new(TBufferedReadTransport::new(socket_rx), true);
        let mut o_prot = TBinaryOutputProtocol::new(TBufferedWriteTransport::new(stream), true);

        loop {
            match self.process(&mut i_prot, &mut o_prot) {
                Ok(()) => {}
                Err(thrift::Error::Transport(ref e)) if e.kind == TransportErrorKind::EndOfFile => {
                    log::trace!("peer closed connection");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl TProcessor for Handler {
    fn process(
        &self,
        i_prot: &mut dyn TInputProtocol,
        o_prot: &mut dyn TOutputProtocol,
    ) -> thrift::Result<()> {
        let message_ident = i_prot.read_message_begin()?;
        let request = LogRequest::read_from_in_protocol(i_prot)?;
        i_prot.read_message_end()?;

        let response: LogResponse = match message_ident.message_type {
            TMessageType::Call => self.handle_call(&message_ident.name, &request).into(),
            other => Reply::Failure(format!("unexpected message type: {other:?}")).into(),
        };

        o_prot.write_message_begin(&TMessageIdentifier::new(
            message_ident.name,
            TMessageType::Reply,
            message_ident.sequence_number,
        ))?;
        response.write_to_out_protocol(o_prot)?;
        o_prot.write_message_end()?;
        o_prot.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::logger::WriterLogger;
    use crate::rpc::DEFAULT_SERVICE;
    use thrift::ApplicationErrorKind;

    fn handler() -> Handler {
        let mut handler = Handler::new();
        handler.register_name(
            DEFAULT_SERVICE,
            LoggerServer::new(WriterLogger::new(Vec::new(), Level::Warn)),
        );
        handler
    }

    #[test]
    fn test_routes_registered_service() {
        let handler = handler();
        assert!(handler.is_registered(DEFAULT_SERVICE));
        assert_eq!(
            handler.handle_call("Plugin.IsWarn", &LogRequest::query()),
            Reply::Enabled(true)
        );
    }

    #[test]
    fn test_unknown_service() {
        let reply = handler().handle_call("Audit.IsWarn", &LogRequest::query());
        assert_eq!(reply, Reply::Failure("unknown service: Audit".to_string()));
    }

    #[test]
    fn test_unknown_method() {
        let reply = handler().handle_call("Plugin.Panic", &LogRequest::query());
        assert_eq!(reply, Reply::Failure("unknown method: Panic".to_string()));
    }

    #[test]
    fn test_malformed_name() {
        let reply = handler().handle_call("IsWarn", &LogRequest::query());
        assert_eq!(reply, Reply::Failure("unknown call: IsWarn".to_string()));
    }

    #[test]
    fn test_route_misses_are_unknown_method_errors() {
        let handler = handler();
        for name in ["IsWarn", "Audit.IsWarn", "Plugin.Panic", "Plugin."] {
            match handler.route(name) {
                Err(thrift::Error::Application(e)) => {
                    assert_eq!(e.kind, ApplicationErrorKind::UnknownMethod, "{name}")
                }
                Err(other) => panic!("{name}: expected application error, got {other}"),
                Ok(_) => panic!("{name}: expected a miss"),
            }
        }
        let (_, method) = handler.route("Plugin.SetLevel").unwrap();
        assert_eq!(method, Method::SetLevel);
    }

    #[test]
    fn test_serve_ends_cleanly_on_hangup() {
        let (client, server) = UnixStream::pair().unwrap();
        drop(client);
        assert!(handler().serve(server).is_ok());
    }
}
