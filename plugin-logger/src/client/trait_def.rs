/// Transport seam between the plugin-side client and the host
use crate::error::Result;
use crate::rpc::{LogRequest, LogResponse, Method};

/// Synchronous request/response call primitive.
///
/// Implementations must serialize concurrent callers: each call is one
/// complete request/response unit. Implementing this trait also allows
/// exercising [`LoggerClient`](crate::client::LoggerClient) without a socket.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Send `request` to `method` and block until the reply arrives.
    fn call(&self, method: Method, request: &LogRequest) -> Result<LogResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::rpc::Reply;

    #[test]
    fn test_mock_transport() {
        let mut mock = MockTransport::new();

        mock.expect_call()
            .withf(|method, _| *method == Method::IsInfo)
            .times(1)
            .returning(|_, _| Ok(Reply::Enabled(true).into()));

        mock.expect_call()
            .withf(|method, _| *method == Method::SetLevel)
            .times(1)
            .returning(|_, _| Err(Error::Poisoned("channel")));

        let response = mock.call(Method::IsInfo, &LogRequest::query()).unwrap();
        assert_eq!(response.enabled, Some(true));

        let result = mock.call(
            Method::SetLevel,
            &LogRequest::set_level(crate::level::Level::Info),
        );
        assert!(result.is_err());
    }
}
