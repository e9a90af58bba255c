//! The seam between the gateways and the network.

use crate::client::HttpClient;
use crate::error::HttpError;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};

/// A fully-formed backend request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

/// Status, headers and the fully read body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Sends one request. Every HTTP status is `Ok`; status policy belongs to the caller.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// # Errors
    /// Returns `HttpError` for transport failures, timeouts and oversized bodies.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, HttpError>;
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, HttpError> {
        let (status, headers, body) = self
            .request(request.method, &request.url)
            .headers(request.headers)
            .body_bytes(request.body)
            .send()
            .await?
            .into_parts()
            .await?;
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::HttpClientBuilder;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn forwards_headers_and_body() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(PUT)
                .path("/password-policy-srv/policy")
                .header("x-request-tag", "1")
                .body("{\"id\":\"p\"}");
            then.status(200).body("{\"success\":true}");
        });

        let client = HttpClientBuilder::new().allow_insecure_http().build().unwrap();
        let mut request = TransportRequest::new(http::Method::PUT, server.url("/password-policy-srv/policy"));
        request.headers.insert("x-request-tag", http::HeaderValue::from_static("1"));
        request.body = Bytes::from_static(b"{\"id\":\"p\"}");

        let response = client.send(request).await.unwrap();
        m.assert();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Bytes::from_static(b"{\"success\":true}"));
    }
}
