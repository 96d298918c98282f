/// Thrift binary transport over a Unix socket
use crate::client::trait_def::Transport;
use crate::error::{Error, Result};
use crate::rpc::{message_name, LogRequest, LogResponse, Method, DEFAULT_SERVICE};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use thrift::protocol::{
    verify_expected_message_type, verify_expected_sequence_number, verify_expected_service_call,
    TBinaryInputProtocol, TBinaryOutputProtocol, TInputProtocol, TMessageIdentifier,
    TMessageType, TOutputProtocol, TType,
};
use thrift::transport::{TBufferedReadTransport, TBufferedWriteTransport};
use thrift::{TransportError, TransportErrorKind};

/// Read/write timeout applied by [`ThriftTransport::connect`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

type InputProtocol = TBinaryInputProtocol<TBufferedReadTransport<UnixStream>>;
type OutputProtocol = TBinaryOutputProtocol<TBufferedWriteTransport<UnixStream>>;

struct Channel {
    input: InputProtocol,
    output: OutputProtocol,
    socket: UnixStream,
    sequence: i32,
    closed: bool,
}

/// Production [`Transport`]: one socket, one call in flight at a time.
///
/// Calls from several threads queue on an internal lock, so each request is
/// matched with its own reply. A reply that arrives after its call timed out
/// is discarded by the next call. Any failure that leaves the stream at an
/// unknown position shuts the socket down, and every later call fails
/// immediately.
pub struct ThriftTransport {
    service: String,
    channel: Mutex<Channel>,
}

impl ThriftTransport {
    /// Connect to a host socket. A zero `timeout` disables socket timeouts.
    pub fn connect<P: AsRef<Path>>(socket_path: P, timeout: Duration) -> Result<Self> {
        let stream = UnixStream::connect(socket_path)?;
        let timeout = (!timeout.is_zero()).then_some(timeout);
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;
        Self::from_stream(stream)
    }

    /// Wrap an already-connected stream.
    pub fn from_stream(stream: UnixStream) -> Result<Self> {
        let socket_rx = stream.try_clone()?;
        let socket_tx = stream.try_clone()?;

        let input = TBinaryInputProtocol::new(TBufferedReadTransport::new(socket_rx), true);
        let output = TBinaryOutputProtocol::new(TBufferedWriteTransport::new(socket_tx), true);

        Ok(ThriftTransport {
            service: DEFAULT_SERVICE.to_string(),
            channel: Mutex::new(Channel {
                input,
                output,
                socket: stream,
                sequence: 0,
                closed: false,
            }),
        })
    }

    /// Address calls to `service` instead of [`DEFAULT_SERVICE`].
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

/// Whether `received` belongs to a call issued before `expected`.
fn is_stale(expected: i32, received: i32) -> bool {
    expected.wrapping_sub(received) > 0
}

impl Channel {
    fn round_trip(&mut self, name: &str, request: &LogRequest) -> thrift::Result<LogResponse> {
        if self.closed {
            return Err(thrift::Error::Transport(TransportError::new(
                TransportErrorKind::NotOpen,
                "channel closed after an earlier failure",
            )));
        }
        self.sequence = self.sequence.wrapping_add(1);
        let sequence = self.sequence;

        let sent = self.send(name, sequence, request);
        self.close_on_err(sent)?;
        self.receive(name, sequence)
    }

    fn send(&mut self, name: &str, sequence: i32, request: &LogRequest) -> thrift::Result<()> {
        self.output.write_message_begin(&TMessageIdentifier::new(
            name,
            TMessageType::Call,
            sequence,
        ))?;
        request.write_to_out_protocol(&mut self.output)?;
        self.output.write_message_end()?;
        self.output.flush()
    }

    fn receive(&mut self, name: &str, sequence: i32) -> thrift::Result<LogResponse> {
        loop {
            let message_ident = match self.input.read_message_begin() {
                Ok(message_ident) => message_ident,
                Err(e) => {
                    // a timeout before the header leaves the stream aligned
                    let waiting = matches!(
                        &e,
                        thrift::Error::Transport(t) if t.kind != TransportErrorKind::EndOfFile
                    );
                    return if waiting { Err(e) } else { self.close_on_err(Err(e)) };
                }
            };

            if is_stale(sequence, message_ident.sequence_number) {
                log::debug!(
                    "discarding late reply #{} to {}",
                    message_ident.sequence_number,
                    message_ident.name
                );
                let discarded = self.discard_body();
                self.close_on_err(discarded)?;
                continue;
            }

            let checked = verify_expected_sequence_number(sequence, message_ident.sequence_number)
                .and_then(|()| verify_expected_service_call(name, &message_ident.name))
                .and_then(|()| {
                    verify_expected_message_type(TMessageType::Reply, message_ident.message_type)
                });
            if let Err(e) = checked {
                let discarded = self.discard_body();
                self.close_on_err(discarded)?;
                return Err(e);
            }

            let response = self.read_body();
            return self.close_on_err(response);
        }
    }

    fn read_body(&mut self) -> thrift::Result<LogResponse> {
        let response = LogResponse::read_from_in_protocol(&mut self.input)?;
        self.input.read_message_end()?;
        Ok(response)
    }

    fn discard_body(&mut self) -> thrift::Result<()> {
        self.input.skip(TType::Struct)?;
        self.input.read_message_end()
    }

    fn close_on_err<T>(&mut self, result: thrift::Result<T>) -> thrift::Result<T> {
        if result.is_err() && !self.closed {
            log::debug!("closing logger channel after a failed call");
            self.closed = true;
            let _ = self.socket.shutdown(Shutdown::Both);
        }
        result
    }
}

impl Transport for ThriftTransport {
    fn call(&self, method: Method, request: &LogRequest) -> Result<LogResponse> {
        let name = message_name(&self.service, method);
        log::trace!("calling {name}");
        let mut channel = self.channel.lock().map_err(|_| Error::Poisoned("channel"))?;
        Ok(channel.round_trip(&name, request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::Reply;
    use std::io::{ErrorKind, Write};
    use std::thread;

    /// One scripted answer: the reply name override, the delay, the value.
    struct Answer {
        name: Option<&'static str>,
        delay: Duration,
        enabled: bool,
    }

    impl Answer {
        fn prompt(enabled: bool) -> Self {
            Answer {
                name: None,
                delay: Duration::ZERO,
                enabled,
            }
        }
    }

    /// Answer one call per entry of `script`, in order.
    fn respond(stream: UnixStream, script: Vec<Answer>) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let rx = stream.try_clone().unwrap();
            let mut i_prot = TBinaryInputProtocol::new(rx, true);
            let mut o_prot = TBinaryOutputProtocol::new(stream, true);

            for answer in script {
                let ident = i_prot.read_message_begin().unwrap();
                LogRequest::read_from_in_protocol(&mut i_prot).unwrap();
                i_prot.read_message_end().unwrap();

                thread::sleep(answer.delay);
                let name = answer.name.map(str::to_string).unwrap_or(ident.name);
                o_prot
                    .write_message_begin(&TMessageIdentifier::new(
                        name,
                        TMessageType::Reply,
                        ident.sequence_number,
                    ))
                    .unwrap();
                LogResponse::from(Reply::Enabled(answer.enabled))
                    .write_to_out_protocol(&mut o_prot)
                    .unwrap();
                o_prot.write_message_end().unwrap();
                o_prot.flush().unwrap();
            }
        })
    }

    #[test]
    fn test_connect_with_invalid_path() {
        let result = ThriftTransport::connect("/nonexistent/socket", DEFAULT_TIMEOUT);
        match result {
            Err(Error::Io(err)) => assert_eq!(err.kind(), ErrorKind::NotFound),
            Err(other) => panic!("expected I/O error, got {other}"),
            Ok(_) => panic!("expected connect to fail"),
        }
    }

    #[test]
    fn test_connect_with_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ThriftTransport::connect(dir.path(), DEFAULT_TIMEOUT).is_err());
    }

    #[test]
    fn test_call_round_trip() {
        let (client, server) = UnixStream::pair().unwrap();
        let responder = respond(server, vec![Answer::prompt(true)]);

        let transport = ThriftTransport::from_stream(client).unwrap();
        assert_eq!(transport.service(), DEFAULT_SERVICE);
        let response = transport.call(Method::IsInfo, &LogRequest::query()).unwrap();
        assert_eq!(response.enabled, Some(true));
        responder.join().unwrap();
    }

    #[test]
    fn test_mismatched_reply_name_is_rejected() {
        let (client, server) = UnixStream::pair().unwrap();
        let wrong_name = Answer {
            name: Some("Plugin.IsWarn"),
            ..Answer::prompt(false)
        };
        let responder = respond(server, vec![wrong_name, Answer::prompt(true)]);

        let transport = ThriftTransport::from_stream(client).unwrap();
        let result = transport.call(Method::IsInfo, &LogRequest::query());
        assert!(matches!(result, Err(Error::Transport(_))));

        // the rejected reply was consumed whole, so the next call lines up
        let response = transport.call(Method::IsInfo, &LogRequest::query()).unwrap();
        assert_eq!(response.enabled, Some(true));
        responder.join().unwrap();
    }

    #[test]
    fn test_late_reply_is_discarded_by_the_next_call() {
        let (client, server) = UnixStream::pair().unwrap();
        client
            .set_read_timeout(Some(Duration::from_millis(200)))
            .unwrap();
        let slow = Answer {
            delay: Duration::from_millis(300),
            ..Answer::prompt(false)
        };
        let responder = respond(
            server,
            vec![slow, Answer::prompt(true), Answer::prompt(true)],
        );

        let transport = ThriftTransport::from_stream(client).unwrap();
        let timed_out = transport.call(Method::IsInfo, &LogRequest::query());
        assert!(matches!(timed_out, Err(Error::Transport(_))));

        for _ in 0..2 {
            let response = transport.call(Method::IsInfo, &LogRequest::query()).unwrap();
            assert_eq!(response.enabled, Some(true));
        }
        responder.join().unwrap();
    }

    #[test]
    fn test_garbage_reply_closes_the_channel() {
        let (client, server) = UnixStream::pair().unwrap();
        let host = thread::spawn(move || {
            let rx = server.try_clone().unwrap();
            let mut i_prot = TBinaryInputProtocol::new(rx, true);
            i_prot.read_message_begin().unwrap();
            LogRequest::read_from_in_protocol(&mut i_prot).unwrap();
            i_prot.read_message_end().unwrap();

            (&server).write_all(&[0, 0, 0, 1, 0xff, 0xff]).unwrap();

            // the client shut the socket down instead of sending again
            assert!(i_prot.read_message_begin().is_err());
        });

        let transport = ThriftTransport::from_stream(client).unwrap();
        assert!(transport.call(Method::IsInfo, &LogRequest::query()).is_err());
        match transport.call(Method::IsInfo, &LogRequest::query()) {
            Err(Error::Transport(thrift::Error::Transport(e))) => {
                assert_eq!(e.kind, TransportErrorKind::NotOpen)
            }
            other => panic!("expected a closed channel, got {other:?}"),
        }
        host.join().unwrap();
    }

    #[test]
    fn test_stale_sequence_numbers_wrap() {
        assert!(is_stale(3, 1));
        assert!(!is_stale(3, 3));
        assert!(!is_stale(3, 5));
        assert!(is_stale(i32::MIN, i32::MAX));
    }

    #[test]
    fn test_peer_hangup_is_an_error() {
        let (client, server) = UnixStream::pair().unwrap();
        drop(server);

        let transport = ThriftTransport::from_stream(client)
            .unwrap()
            .with_service("audit");
        assert_eq!(transport.service(), "audit");
        assert!(transport.call(Method::Info, &LogRequest::emit("foobar", None)).is_err());
    }
}
