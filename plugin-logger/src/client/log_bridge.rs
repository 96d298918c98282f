//! `log` facade integration for plugins.
//!
//! Installing a [`LoggerClient`] as the global `log` backend sends every
//! `log::info!` (and friends) to the host, where the authoritative threshold
//! decides what is written.

use crate::client::logger_client::LoggerClient;
use crate::client::trait_def::Transport;
use crate::context::Context;
use crate::level::Level;
use crate::logger::Logger;
use crate::rpc::Method;
use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// Targets never forwarded, so the proxy cannot log about itself through itself.
const SKIPPED_TARGETS: [&str; 2] = ["plugin_logger", "thrift"];

/// Whether `target` is one of [`SKIPPED_TARGETS`] or a module below one.
fn is_internal(target: &str) -> bool {
    SKIPPED_TARGETS.iter().any(|skipped| {
        target
            .strip_prefix(skipped)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

impl<T: Transport + 'static> LoggerClient<T> {
    /// Install this client as the process-wide `log` backend.
    ///
    /// The facade's max level is opened to `Trace`; filtering happens in the
    /// host. Fails if another backend is already installed.
    pub fn install(self) -> Result<&'static Self, SetLoggerError> {
        let logger: &'static Self = Box::leak(Box::new(self));
        log::set_logger(logger)?;
        log::set_max_level(LevelFilter::Trace);
        Ok(logger)
    }
}

impl<T: Transport> log::Log for LoggerClient<T> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if is_internal(metadata.target()) {
            return false;
        }
        match Level::from(metadata.level()) {
            Level::Trace => self.is_trace(),
            Level::Debug => self.is_debug(),
            Level::Info => self.is_info(),
            Level::Warn => self.is_warn(),
            // no remote predicate above warn; the host still applies its
            // threshold when the record arrives
            _ => true,
        }
    }

    fn log(&self, record: &Record) {
        if is_internal(record.target()) {
            return;
        }
        let Some(method) = Method::emit_for(Level::from(record.level())) else {
            return;
        };
        let context = Context::new().with("target", record.target());
        self.emit(method, &record.args().to_string(), Some(&context));
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::trait_def::MockTransport;
    use crate::rpc::Reply;
    use log::Log;

    #[test]
    fn test_record_is_forwarded_with_target() {
        let mut mock = MockTransport::new();
        mock.expect_call()
            .withf(|method, request| {
                *method == Method::Warn
                    && request.message() == "disk 91% full"
                    && request
                        .context()
                        .map(|c| c.iter().eq([("target", "storage::gc")]))
                        .unwrap_or(false)
            })
            .times(1)
            .returning(|_, _| Ok(Reply::Done.into()));

        let client = LoggerClient::with_transport(mock);
        Log::log(
            &client,
            &Record::builder()
                .args(format_args!("disk {}% full", 91))
                .level(log::Level::Warn)
                .target("storage::gc")
                .build(),
        );
    }

    #[test]
    fn test_internal_targets_are_skipped() {
        let mut mock = MockTransport::new();
        mock.expect_call().times(0);

        let client = LoggerClient::with_transport(mock);
        for target in ["plugin_logger::client", "thrift::transport"] {
            let record = Record::builder()
                .args(format_args!("calling"))
                .level(log::Level::Trace)
                .target(target)
                .build();
            assert!(!client.enabled(record.metadata()));
            Log::log(&client, &record);
        }
    }

    #[test]
    fn test_lookalike_targets_are_forwarded() {
        let mut mock = MockTransport::new();
        mock.expect_call()
            .withf(|method, _| *method == Method::Info)
            .times(3)
            .returning(|_, _| Ok(Reply::Done.into()));

        let client = LoggerClient::with_transport(mock);
        for target in ["thrifty_app", "plugin_logger_ext::io", "thrift_cache"] {
            assert!(!is_internal(target), "{target} is not internal");
            Log::log(
                &client,
                &Record::builder()
                    .args(format_args!("started"))
                    .level(log::Level::Info)
                    .target(target)
                    .build(),
            );
        }
        assert!(is_internal("thrift"));
        assert!(is_internal("plugin_logger"));
    }

    #[test]
    fn test_enabled_asks_the_host() {
        let mut mock = MockTransport::new();
        mock.expect_call()
            .withf(|method, _| *method == Method::IsDebug)
            .times(1)
            .returning(|_, _| Ok(Reply::Enabled(false).into()));

        let client = LoggerClient::with_transport(mock);
        let debug = Metadata::builder()
            .level(log::Level::Debug)
            .target("plugin")
            .build();
        assert!(!client.enabled(&debug));

        let error = Metadata::builder()
            .level(log::Level::Error)
            .target("plugin")
            .build();
        assert!(client.enabled(&error));
    }
}
