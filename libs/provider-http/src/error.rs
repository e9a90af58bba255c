use std::time::Duration;
use thiserror::Error;

/// Which part of a URL failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    ParseError,
    MissingAuthority,
    MissingScheme,
}

/// Transport-level failures.
///
/// Non-success HTTP statuses are not errors at this layer; the caller
/// classifies them.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// The request did not complete within the configured deadline.
    #[error("request timed out after {}", humanize(*.0))]
    Timeout(Duration),

    /// Network failure: DNS, connect, reset, protocol.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("response body too large: limit {limit} bytes, got {actual} bytes")]
    BodyTooLarge { limit: usize, actual: usize },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The bearer-token provider could not supply a token.
    #[error("credentials unavailable: {0}")]
    Credentials(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request queue is full.
    #[error("client overloaded: request queue is full")]
    Overloaded,

    /// The background worker driving the client stopped.
    #[error("client unavailable: internal worker stopped")]
    ServiceClosed,

    #[error("invalid URL '{url}': {reason}")]
    InvalidUri {
        url: String,
        kind: InvalidUriKind,
        reason: String,
    },

    #[error("URL scheme '{scheme}' not allowed: {reason}")]
    InvalidScheme { scheme: String, reason: String },
}

impl HttpError {
    /// True for failures that happened before anything reached the network.
    #[must_use]
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            HttpError::RequestBuild(_)
                | HttpError::InvalidHeaderName(_)
                | HttpError::InvalidHeaderValue(_)
                | HttpError::Json(_)
                | HttpError::InvalidUri { .. }
                | HttpError::InvalidScheme { .. }
        )
    }
}

fn humanize(d: Duration) -> String {
    format!("{}ms", d.as_millis())
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fmt;

    #[derive(Debug)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection refused")
        }
    }

    impl Error for Refused {}

    #[test]
    fn transport_error_keeps_its_source() {
        let err = HttpError::Transport(Box::new(Refused));
        let source = err.source().unwrap();
        assert!(source.downcast_ref::<Refused>().is_some());
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn timeout_message_names_the_deadline() {
        let err = HttpError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "request timed out after 1500ms");
    }

    #[test]
    fn request_errors_are_classified() {
        let err = HttpError::InvalidScheme {
            scheme: "ftp".to_owned(),
            reason: "unsupported".to_owned(),
        };
        assert!(err.is_request_error());
        assert!(!HttpError::Overloaded.is_request_error());
    }
}
