/// Host-side service object exposing a real logger to plugins
use crate::level::Level;
use crate::logger::Logger;
use crate::rpc::{LogRequest, Method, Reply};
use std::sync::Arc;

/// Services remote [`Method`] calls against a real [`Logger`].
///
/// The wrapped logger owns the only threshold, so a `SetLevel` from any plugin
/// is seen by every other plugin sharing it. Servicing `Fatal` records the
/// message and returns; the host process is never terminated by a remote call.
#[derive(Clone)]
pub struct LoggerServer {
    logger: Arc<dyn Logger>,
}

impl LoggerServer {
    pub fn new<L: Logger + 'static>(logger: L) -> Self {
        Self::from_arc(Arc::new(logger))
    }

    /// Share a logger the host also uses directly.
    pub fn from_arc(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    pub fn handle_call(&self, method: Method, request: &LogRequest) -> Reply {
        let message = request.message();
        let context = request.context();
        match method {
            Method::Trace => self.logger.trace(message, context),
            Method::Debug => self.logger.debug(message, context),
            Method::Info => self.logger.info(message, context),
            Method::Warn => self.logger.warn(message, context),
            Method::Error => self.logger.error(message, context),
            Method::Fatal => {
                // never `fatal()`: a chained proxy would end the host
                let _ = self.logger.log(Level::Fatal, message, context);
            }
            Method::Log => {
                let result = request
                    .level()
                    .and_then(|level| self.logger.log(level, message, context));
                if let Err(e) = result {
                    return Reply::Failure(e.to_string());
                }
            }
            Method::IsTrace => return Reply::Enabled(self.logger.is_trace()),
            Method::IsDebug => return Reply::Enabled(self.logger.is_debug()),
            Method::IsInfo => return Reply::Enabled(self.logger.is_info()),
            Method::IsWarn => return Reply::Enabled(self.logger.is_warn()),
            Method::SetLevel => {
                let result = request
                    .level()
                    .and_then(|level| self.logger.set_level(level).map(|()| level));
                match result {
                    Ok(level) => log::debug!("threshold set to {level}"),
                    Err(e) => return Reply::Failure(e.to_string()),
                }
            }
        }
        Reply::Done
    }
}
