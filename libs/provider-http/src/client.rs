use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use bytes::Bytes;
use http::{Method, Request, Response};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use tower::Service;
use tower::buffer::Buffer;

pub type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

pub type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

/// HTTP client over a buffered tower stack.
///
/// `Clone + Send + Sync`; clones share the connection pool and worker.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: BufferedService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
}

impl HttpClient {
    /// Client with default configuration.
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails.
    pub fn new() -> Result<Self, HttpError> {
        HttpClientBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Request builder for an absolute URL.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            method,
            url.to_owned(),
            self.transport_security,
        )
    }
}

pub fn map_buffer_error(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(err) => {
            tracing::error!(error = %err, "http worker stopped unexpectedly");
            HttpError::ServiceClosed
        }
    }
}

/// Poll the buffer once; a full queue fails with [`HttpError::Overloaded`] instead of waiting.
pub async fn try_acquire_buffer_slot(service: &mut BufferedService) -> Result<(), HttpError> {
    use std::task::Poll;

    let polled = std::future::poll_fn(|cx| match service.poll_ready(cx) {
        Poll::Ready(result) => Poll::Ready(Some(result)),
        Poll::Pending => Poll::Ready(None),
    })
    .await;

    match polled {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(map_buffer_error(e)),
        None => Err(HttpError::Overloaded),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn test_client() -> HttpClient {
        HttpClientBuilder::new().allow_insecure_http().build().unwrap()
    }

    #[tokio::test]
    async fn get_returns_body() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/apps-srv/clients/c1");
            then.status(200).json_body(json!({"client_id": "c1"}));
        });

        let resp = test_client()
            .request(http::Method::GET, &server.url("/apps-srv/clients/c1"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&resp.bytes().await.unwrap()).unwrap();
        assert_eq!(body["client_id"], "c1");
    }

    #[tokio::test]
    async fn error_statuses_are_not_transport_errors() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(DELETE).path("/roles-srv/role/admin");
            then.status(409).body("conflict");
        });

        let resp = test_client()
            .request(http::Method::DELETE, &server.url("/roles-srv/role/admin"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::CONFLICT);
        assert_eq!(resp.bytes().await.unwrap(), Bytes::from_static(b"conflict"));
    }

    #[tokio::test]
    async fn sends_json_with_content_type() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/scopes-srv/scope")
                .header("content-type", "application/json")
                .json_body(json!({"scopeKey": "profile"}));
            then.status(200);
        });

        test_client()
            .request(http::Method::POST, &server.url("/scopes-srv/scope"))
            .json(&json!({"scopeKey": "profile"}))
            .unwrap()
            .send()
            .await
            .unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn body_limit_is_enforced() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/large");
            then.status(200).body("x".repeat(4096));
        });

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .max_body_size(1024)
            .build()
            .unwrap();
        let result = client.request(http::Method::GET, &server.url("/large")).send().await.unwrap().bytes().await;
        assert!(matches!(result, Err(HttpError::BodyTooLarge { limit: 1024, .. })));
    }

    #[tokio::test]
    async fn sets_user_agent() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/ua").header("user-agent", "cidaas-test/1");
            then.status(200);
        });

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .user_agent("cidaas-test/1")
            .build()
            .unwrap();
        client.request(http::Method::GET, &server.url("/ua")).send().await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(std::time::Duration::from_millis(500));
        });

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .timeout(std::time::Duration::from_millis(50))
            .build()
            .unwrap();
        let result = client.request(http::Method::GET, &server.url("/slow")).send().await;
        assert!(matches!(result, Err(HttpError::Timeout(_))));
    }

    #[tokio::test]
    async fn https_only_rejects_plain_http() {
        let client = HttpClientBuilder::new().build().unwrap();
        let result = client.request(http::Method::GET, "http://localhost:1/x").send().await;
        assert!(matches!(result, Err(HttpError::InvalidScheme { .. })));
    }
}
