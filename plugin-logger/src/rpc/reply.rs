use crate::rpc::message::{CallStatus, LogResponse};

pub const STATUS_OK: i32 = 0;
pub const STATUS_FAILURE: i32 = 1;

/// Outcome of servicing one call, before it is put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Done,
    Enabled(bool),
    Failure(String),
}

impl From<Reply> for LogResponse {
    fn from(value: Reply) -> Self {
        match value {
            Reply::Done => LogResponse {
                status: CallStatus::new(STATUS_OK, None),
                enabled: None,
            },
            Reply::Enabled(enabled) => LogResponse {
                status: CallStatus::new(STATUS_OK, None),
                enabled: Some(enabled),
            },
            Reply::Failure(msg) => LogResponse {
                status: CallStatus::new(STATUS_FAILURE, Some(msg)),
                enabled: None,
            },
        }
    }
}
