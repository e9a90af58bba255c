//! Authenticated JSON calls against the tenant with the backend's status policy.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use http::{Method, StatusCode};
use provider_http::{
    HttpClientBuilder, HttpClientConfig, HttpTransport, StaticToken, TokenProvider,
    TransportRequest, TransportSecurity, bearer_header,
};
use serde_json::Value as Json;
use tracing::Instrument;
use url::Url;

use crate::config::ProviderConfig;
use crate::domain::error::DomainError;

/// Client for the tenant's REST surface.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    transport: Arc<dyn HttpTransport>,
    token: Arc<dyn TokenProvider>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// `base_url` should end with `/`; paths are joined below it.
    #[must_use]
    pub fn new(base_url: Url, transport: Arc<dyn HttpTransport>, token: Arc<dyn TokenProvider>) -> Self {
        Self {
            base_url,
            transport,
            token,
            timeout: None,
        }
    }

    /// Per-call deadline; `None` leaves calls unbounded.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the hyper client and static token described by `config`.
    ///
    /// # Errors
    /// Returns [`DomainError::Config`] for an invalid configuration or a
    /// missing token, and [`DomainError::Transport`] when TLS setup fails.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, DomainError> {
        config.validate()?;
        let base_url = config.base_url()?;
        let token = config
            .access_token
            .clone()
            .ok_or_else(|| DomainError::config("access_token is required (set CIDAAS_ACCESS_TOKEN)"))?;

        let http = HttpClientBuilder::with_config(HttpClientConfig {
            request_timeout: config.request_timeout,
            max_body_size: config.max_body_size,
            user_agent: config.user_agent.clone(),
            transport: if config.allow_insecure_http {
                TransportSecurity::AllowInsecureHttp
            } else {
                TransportSecurity::TlsOnly
            },
            ..HttpClientConfig::default()
        })
        .build()?;

        Ok(Self::new(base_url, Arc::new(http), Arc::new(StaticToken::new(token)))
            .with_timeout(config.request_timeout))
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL for `segments` below the base URL; each segment is percent-encoded.
    ///
    /// # Errors
    /// Returns [`DomainError::Config`] when the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, DomainError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| DomainError::config(format!("base_url '{}' cannot be a base", self.base_url)))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// GET expecting 200.
    ///
    /// # Errors
    /// [`DomainError::NotFound`] on 204 or 404, [`DomainError::Refused`] on
    /// any other non-200 status, transport and timeout errors otherwise.
    pub async fn get(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Json, DomainError> {
        self.call(Method::GET, segments, query, None).await
    }

    /// POST expecting 200, 201 or 204.
    ///
    /// # Errors
    /// Same as [`get`](Self::get), without the not-found mapping.
    pub async fn post(&self, segments: &[&str], body: &Json) -> Result<Json, DomainError> {
        self.call(Method::POST, segments, &[], Some(body)).await
    }

    /// PUT expecting 200.
    ///
    /// # Errors
    /// Same as [`post`](Self::post).
    pub async fn put(&self, segments: &[&str], body: &Json) -> Result<Json, DomainError> {
        self.call(Method::PUT, segments, &[], Some(body)).await
    }

    /// DELETE expecting 200, 201, 202 or 204.
    ///
    /// # Errors
    /// [`DomainError::NotFound`] on 404; callers treat it as already deleted.
    pub async fn delete(&self, segments: &[&str]) -> Result<(), DomainError> {
        self.call(Method::DELETE, segments, &[], None).await.map(drop)
    }

    async fn call(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&Json>,
    ) -> Result<Json, DomainError> {
        let url = self.endpoint(segments, query)?;
        let path = segments.join("/");
        let span = tracing::debug_span!("backend_call", method = %method, path = %path);
        let deadline = self.timeout;

        let exchange = async {
            let mut request = TransportRequest::new(method.clone(), url.as_str());
            let token = self.token.token().await?;
            request.headers.insert(AUTHORIZATION, bearer_header(&token)?);
            request
                .headers
                .insert(ACCEPT, HeaderValue::from_static("application/json"));
            if let Some(body) = body {
                request.body = Bytes::from(serde_json::to_vec(body).map_err(provider_http::HttpError::from)?);
            }
            if !request.body.is_empty() && !request.headers.contains_key(CONTENT_TYPE) {
                request
                    .headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            let response = self.transport.send(request).await?;
            tracing::debug!(status = response.status.as_u16(), bytes = response.body.len(), "backend answered");
            classify(&method, &path, response.status, &response.body)
        }
        .instrument(span);

        match deadline {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| DomainError::Timeout(limit))?,
            None => exchange.await,
        }
    }
}

fn accepts(method: &Method, status: StatusCode) -> bool {
    let code = status.as_u16();
    match *method {
        Method::POST => matches!(code, 200 | 201 | 204),
        Method::DELETE => matches!(code, 200..=202 | 204),
        _ => code == 200,
    }
}

fn classify(method: &Method, path: &str, status: StatusCode, body: &[u8]) -> Result<Json, DomainError> {
    let lookup = *method == Method::GET || *method == Method::DELETE;
    if lookup && (status == StatusCode::NOT_FOUND || (*method == Method::GET && status == StatusCode::NO_CONTENT)) {
        return Err(DomainError::not_found("resource", path));
    }
    if !accepts(method, status) {
        return Err(DomainError::Refused {
            method: method.clone(),
            path: path.to_owned(),
            status: status.as_u16(),
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Json::Null);
    }
    let json: Json =
        serde_json::from_slice(body).map_err(|e| DomainError::decode(path, format!("invalid JSON: {e}")))?;
    unwrap_envelope(method, path, status, json)
}

/// `{"success": .., "status": .., "data": ..}` becomes its `data`; anything else passes through.
fn unwrap_envelope(method: &Method, path: &str, status: StatusCode, json: Json) -> Result<Json, DomainError> {
    let Json::Object(mut map) = json else {
        return Ok(json);
    };
    if !map.contains_key("success") || !(map.contains_key("data") || map.contains_key("status")) {
        return Ok(Json::Object(map));
    }
    if map.get("success") == Some(&Json::Bool(false)) {
        return Err(DomainError::Refused {
            method: method.clone(),
            path: path.to_owned(),
            status: status.as_u16(),
            body: Json::Object(map).to_string(),
        });
    }
    Ok(map.remove("data").unwrap_or(Json::Null))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_encodes_segments_and_query() {
        let api = ApiClient::new(
            Url::parse("https://acme.cidaas.de/base/").unwrap(),
            Arc::new(NoTransport),
            Arc::new(StaticToken::new(secrecy::SecretString::from("t".to_owned()))),
        );
        let url = api.endpoint(&["apps-srv", "clients", "a/b c"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://acme.cidaas.de/base/apps-srv/clients/a%2Fb%20c");
        let url = api.endpoint(&["scopes-srv", "scope"], &[("scopekey", "x&y")]).unwrap();
        assert_eq!(url.as_str(), "https://acme.cidaas.de/base/scopes-srv/scope?scopekey=x%26y");
    }

    struct NoTransport;

    #[async_trait::async_trait]
    impl HttpTransport for NoTransport {
        async fn send(
            &self,
            _request: TransportRequest,
        ) -> Result<provider_http::TransportResponse, provider_http::HttpError> {
            Err(provider_http::HttpError::ServiceClosed)
        }
    }

    #[test]
    fn status_policy_per_method() {
        assert!(accepts(&Method::GET, StatusCode::OK));
        assert!(!accepts(&Method::GET, StatusCode::CREATED));
        assert!(!accepts(&Method::PUT, StatusCode::NO_CONTENT));
        assert!(accepts(&Method::POST, StatusCode::NO_CONTENT));
        assert!(!accepts(&Method::POST, StatusCode::ACCEPTED));
        assert!(accepts(&Method::DELETE, StatusCode::ACCEPTED));
        assert!(!accepts(&Method::DELETE, StatusCode::MULTI_STATUS));
    }

    #[test]
    fn lookups_map_absence_to_not_found() {
        let gone = classify(&Method::GET, "roles-srv/role", StatusCode::NO_CONTENT, b"");
        assert!(gone.unwrap_err().is_not_found());
        let gone = classify(&Method::DELETE, "roles-srv/role/x", StatusCode::NOT_FOUND, b"");
        assert!(gone.unwrap_err().is_not_found());
        let created = classify(&Method::POST, "roles-srv/role", StatusCode::NO_CONTENT, b"");
        assert_eq!(created.unwrap(), Json::Null);
    }

    #[test]
    fn failure_body_becomes_detail() {
        let err = classify(&Method::PUT, "apps-srv/clients", StatusCode::BAD_REQUEST, b"bad client").unwrap_err();
        assert!(matches!(err, DomainError::Refused { status: 400, ref body, .. } if body == "bad client"));
    }

    #[test]
    fn envelope_is_unwrapped() {
        let body = json!({"success": true, "status": 200, "data": {"role": "admin"}}).to_string();
        let json = classify(&Method::GET, "roles-srv/role", StatusCode::OK, body.as_bytes()).unwrap();
        assert_eq!(json, json!({"role": "admin"}));

        let plain = classify(&Method::GET, "x", StatusCode::OK, b"{\"role\":\"admin\"}").unwrap();
        assert_eq!(plain, json!({"role": "admin"}));
    }

    #[test]
    fn unsuccessful_envelope_is_refused() {
        let body = json!({"success": false, "status": 200, "error": {"code": 4}}).to_string();
        let err = classify(&Method::POST, "x", StatusCode::OK, body.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::BackendRefused);
    }
}
