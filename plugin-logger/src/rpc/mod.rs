//! Wire layer shared by the host and plugin sides.
//!
//! Every call is one thrift message (binary protocol) named
//! `"<service>.<Method>"`, carrying a [`LogRequest`] and answered by a
//! [`LogResponse`] under the same name and sequence number.

pub mod message;
pub mod method;
pub mod reply;

pub use message::{CallStatus, LogRequest, LogResponse};
pub use method::Method;
pub use reply::{Reply, STATUS_FAILURE, STATUS_OK};

/// Service name both sides use unless configured otherwise.
pub const DEFAULT_SERVICE: &str = "Plugin";

/// Full thrift message name for `method` on `service`.
pub fn message_name(service: &str, method: Method) -> String {
    format!("{service}.{method}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_name() {
        assert_eq!(message_name(DEFAULT_SERVICE, Method::IsDebug), "Plugin.IsDebug");
        assert_eq!(message_name("audit", Method::SetLevel), "audit.SetLevel");
    }
}
