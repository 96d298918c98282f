use thiserror::Error;

/// Errors surfaced by the logger proxy.
///
/// Only the paths with a result slot (`Logger::log`, `Logger::set_level`) hand
/// these to callers; emit methods drop them after the attempt.
#[derive(Error, Debug)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] thrift::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote call failed with code {code}: {message}")]
    Remote { code: i32, message: String },

    #[error("invalid log level: {0}")]
    InvalidLevel(i32),

    #[error("missing field in request: {0}")]
    MissingField(&'static str),

    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = Error::Remote {
            code: 1,
            message: "sink closed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "remote call failed with code 1: sink closed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_thrift_error_conversion() {
        let app = thrift::Error::Application(thrift::ApplicationError::new(
            thrift::ApplicationErrorKind::InternalError,
            "boom",
        ));
        let err: Error = app.into();
        assert!(matches!(err, Error::Transport(_)));
    }
}
