use std::fmt;
use std::time::Duration;

use provider_http::HttpError;
use provider_kit::Diagnostic;
use thiserror::Error;

/// Coarse classification reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigInvalid,
    BackendRefused,
    BackendUnavailable,
    Timeout,
    NotFound,
    Cancelled,
}

impl ErrorKind {
    #[must_use]
    pub fn short(self) -> &'static str {
        match self {
            ErrorKind::ConfigInvalid => "invalid configuration",
            ErrorKind::BackendRefused => "request refused by the backend",
            ErrorKind::BackendUnavailable => "backend unavailable",
            ErrorKind::Timeout => "request timed out",
            ErrorKind::NotFound => "resource not found",
            ErrorKind::Cancelled => "operation cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    /// Configuration or plan rejected before any backend mutation.
    #[error("{0}")]
    Config(String),

    /// Non-success status; `body` is the raw response body.
    #[error("{method} {path} returned {status}: {body}")]
    Refused {
        method: http::Method,
        path: String,
        status: u16,
        body: String,
    },

    /// 2xx answer the gateway could not interpret.
    #[error("unexpected response from {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("{resource} '{id}' does not exist")]
    NotFound { resource: &'static str, id: String },

    #[error("no response within {}", humantime::format_duration(*.0))]
    Timeout(Duration),

    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error("operation cancelled by the host")]
    Cancelled,
}

impl DomainError {
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        DomainError::Config(message.into())
    }

    #[must_use]
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        DomainError::NotFound {
            resource,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn decode(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DomainError::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Config(_) => ErrorKind::ConfigInvalid,
            DomainError::Refused { .. } | DomainError::Decode { .. } => ErrorKind::BackendRefused,
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::Timeout(_) | DomainError::Transport(HttpError::Timeout(_)) => {
                ErrorKind::Timeout
            }
            DomainError::Transport(HttpError::Credentials(_)) => ErrorKind::ConfigInvalid,
            DomainError::Transport(_) => ErrorKind::BackendUnavailable,
            DomainError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// True for a 404 or 204 answer to a lookup.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Host-facing error: `"<action> <resource> failed: <kind>"` with this
    /// error's message as detail.
    #[must_use]
    pub fn to_diagnostic(&self, resource: &str, action: &str) -> Diagnostic {
        Diagnostic::error(
            format!("{action} {resource} failed: {}", self.kind()),
            self.to_string(),
        )
    }
}
