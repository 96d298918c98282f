//! Host-side `FacadeLogger` feeding a `log` backend, driven through the proxy.
//!
//! A process has one global `log` backend, so everything here runs in a
//! single test.

use plugin_logger::channel;
use plugin_logger::{Context, FacadeLogger, Handler, Level, Logger, LoggerServer, DEFAULT_SERVICE};
use std::sync::Mutex;

static CAPTURED: Mutex<Vec<(log::Level, String, String)>> = Mutex::new(Vec::new());

struct Capture;

impl log::Log for Capture {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        // ignore the crate's own diagnostics
        if record.target().starts_with("plugin_logger") || record.target().starts_with("thrift") {
            return;
        }
        CAPTURED.lock().expect("capture lock").push((
            record.level(),
            record.target().to_string(),
            record.args().to_string(),
        ));
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture;

#[test]
fn test_facade_logger_through_proxy() {
    log::set_logger(&CAPTURE).expect("no other logger installed");
    log::set_max_level(log::LevelFilter::Trace);

    let mut handler = Handler::new();
    handler.register_name(
        DEFAULT_SERVICE,
        LoggerServer::new(FacadeLogger::new("plugin::vault", Level::Info)),
    );
    let (client, serving) = channel::pair(handler).expect("socket pair");

    client.debug("hidden", None);
    client.info("foobar", Some(&Context::new().with("path", "secret/")));
    client
        .log(Level::Error, "failed", None)
        .expect("log call");
    assert!(client.is_info());
    assert!(!client.is_debug());

    drop(client);
    assert!(serving.join().expect("server thread").is_ok());

    let captured = CAPTURED.lock().expect("capture lock");
    assert_eq!(
        *captured,
        vec![
            (
                log::Level::Info,
                "plugin::vault".to_string(),
                "foobar path=secret/".to_string()
            ),
            (
                log::Level::Error,
                "plugin::vault".to_string(),
                "failed".to_string()
            ),
        ]
    );
}
