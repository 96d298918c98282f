/// Registry lookups that answer a miss with a thrift application error
use thrift::{ApplicationError, ApplicationErrorKind};

pub(crate) trait OrUnknown<T> {
    /// A miss becomes `UnknownMethod` with the message `unknown <what>: <name>`.
    fn or_unknown(self, what: &str, name: &str) -> thrift::Result<T>;
}

impl<T> OrUnknown<T> for Option<T> {
    fn or_unknown(self, what: &str, name: &str) -> thrift::Result<T> {
        self.ok_or_else(|| unknown(what, name))
    }
}

impl<T, E> OrUnknown<T> for std::result::Result<T, E> {
    fn or_unknown(self, what: &str, name: &str) -> thrift::Result<T> {
        self.map_err(|_| unknown(what, name))
    }
}

fn unknown(what: &str, name: &str) -> thrift::Error {
    thrift::Error::Application(ApplicationError::new(
        ApplicationErrorKind::UnknownMethod,
        format!("unknown {what}: {name}"),
    ))
}
