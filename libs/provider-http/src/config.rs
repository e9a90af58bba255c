use std::time::Duration;

/// User-Agent sent when the caller configures none.
pub const DEFAULT_USER_AGENT: &str = concat!("cidaas-provider/", env!("CARGO_PKG_VERSION"));

/// Default cap on response bodies (10 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Where trusted root certificates come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Mozilla roots bundled through webpki.
    #[default]
    WebPki,
    /// The operating system certificate store.
    Native,
}

/// Whether plain `http://` URLs are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    #[default]
    TlsOnly,
    /// Local mock servers only.
    AllowInsecureHttp,
}

/// Settings of an [`HttpClient`](crate::HttpClient).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Deadline for each request. `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
    pub max_body_size: usize,
    pub user_agent: String,
    pub transport: TransportSecurity,
    pub tls_roots: TlsRootConfig,
    /// Requests that may queue for the background worker; clamped to at least 1.
    pub buffer_capacity: usize,
    pub pool_idle_timeout: Option<Duration>,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: None,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::WebPki,
            buffer_capacity: 256,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 8,
        }
    }
}

impl HttpClientConfig {
    /// Plain HTTP allowed and a short deadline; for mock-server tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(5)),
            transport: TransportSecurity::AllowInsecureHttp,
            ..Self::default()
        }
    }
}
