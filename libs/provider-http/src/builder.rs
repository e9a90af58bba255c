use crate::client::{BufferedService, HttpClient};
use crate::config::{HttpClientConfig, TlsRootConfig, TransportSecurity};
use crate::error::HttpError;
use crate::layers::UserAgentLayer;
use crate::response::ResponseBody;
use crate::tls;
use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;

/// Builds an [`HttpClient`] from an [`HttpClientConfig`].
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    /// Per-request deadline. Without one, requests wait as long as the backend does.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    #[must_use]
    pub fn tls_roots(mut self, roots: TlsRootConfig) -> Self {
        self.config.tls_roots = roots;
        self
    }

    /// Accept `http://` URLs. Only for local mock servers.
    #[must_use]
    #[cfg(any(debug_assertions, feature = "allow-insecure-http"))]
    pub fn allow_insecure_http(mut self) -> Self {
        self.config.transport = TransportSecurity::AllowInsecureHttp;
        self
    }

    /// Assemble the middleware stack.
    ///
    /// Request flow: Buffer, error mapping, Timeout, User-Agent, Decompression, hyper.
    /// Every HTTP status comes back as `Ok`; only transport failures are errors.
    ///
    /// # Errors
    /// Returns [`HttpError::Tls`] when the root store cannot be loaded and
    /// [`HttpError::InvalidHeaderValue`] for an unusable User-Agent.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        if self.config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!("plain HTTP enabled; traffic to the backend is not encrypted");
        }

        let timeout = self.config.request_timeout;
        let https = build_https_connector(self.config.tls_roots, self.config.transport)?;

        let mut pool = Client::builder(TokioExecutor::new());
        // pool_idle_timeout needs a timer to take effect
        pool.pool_timer(TokioTimer::new())
            .pool_max_idle_per_host(self.config.pool_max_idle_per_host);
        if let Some(idle) = self.config.pool_idle_timeout {
            pool.pool_idle_timeout(idle);
        }
        let hyper_client = pool.build::<_, Full<Bytes>>(https);

        let service = ServiceBuilder::new()
            .option_layer(timeout.map(TimeoutLayer::new))
            .map_err(tower::BoxError::from)
            .layer(UserAgentLayer::try_new(&self.config.user_agent)?)
            .layer(DecompressionLayer::new())
            .service(hyper_client)
            .map_response(box_response_body)
            .map_err(move |e: tower::BoxError| map_tower_error(e, timeout))
            .boxed_clone();

        let service: BufferedService = Buffer::new(service, self.config.buffer_capacity.max(1));

        Ok(HttpClient {
            service,
            max_body_size: self.config.max_body_size,
            transport_security: self.config.transport,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn map_tower_error(err: tower::BoxError, timeout: Option<Duration>) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout.unwrap_or_default());
    }
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(other) => HttpError::Transport(other),
    }
}

fn box_response_body<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, body.map_err(Into::into).boxed())
}

fn build_https_connector(
    roots: TlsRootConfig,
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let builder = match roots {
        TlsRootConfig::WebPki => hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(tls::crypto_provider())
            .map_err(|e| HttpError::Tls(Box::new(e)))?,
        TlsRootConfig::Native => {
            let config = tls::native_roots_client_config().map_err(|e| HttpError::Tls(e.into()))?;
            hyper_rustls::HttpsConnectorBuilder::new().with_tls_config(config)
        }
    };
    let connector = match transport {
        TransportSecurity::AllowInsecureHttp => builder.https_or_http().enable_all_versions().build(),
        TransportSecurity::TlsOnly => builder.https_only().enable_all_versions().build(),
    };
    Ok(connector)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_config() {
        let builder = HttpClientBuilder::new()
            .timeout(Duration::from_secs(3))
            .user_agent("cidaas-test/1")
            .max_body_size(64);
        assert_eq!(builder.config.request_timeout, Some(Duration::from_secs(3)));
        assert_eq!(builder.config.user_agent, "cidaas-test/1");
        assert_eq!(builder.config.max_body_size, 64);
    }

    #[test]
    fn elapsed_maps_to_timeout() {
        let err = map_tower_error(
            Box::new(tower::timeout::error::Elapsed::new()),
            Some(Duration::from_secs(2)),
        );
        assert!(matches!(err, HttpError::Timeout(d) if d == Duration::from_secs(2)));
    }

    #[test]
    fn typed_errors_survive_boxing() {
        let err = map_tower_error(Box::new(HttpError::Overloaded), None);
        assert!(matches!(err, HttpError::Overloaded));
    }

    #[tokio::test]
    async fn rejects_invalid_user_agent() {
        let result = HttpClientBuilder::new().user_agent("bad\nagent").build();
        assert!(matches!(result, Err(HttpError::InvalidHeaderValue(_))));
    }
}
