#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTPS transport for the cidaas provider.
//!
//! A hyper client with rustls, pooled connections, optional per-request
//! deadline, User-Agent injection and transparent decompression. Body size
//! limits apply to decompressed bytes. Non-success statuses are returned
//! as ordinary responses through [`HttpTransport`].

mod auth;
mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
mod tls;
mod transport;

pub use auth::{StaticToken, TokenProvider, bearer_header};
pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{
    DEFAULT_MAX_BODY_SIZE, DEFAULT_USER_AGENT, HttpClientConfig, TlsRootConfig, TransportSecurity,
};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{UserAgentLayer, UserAgentService};
pub use request::RequestBuilder;
pub use response::{HttpResponse, ResponseBody};
pub use transport::{HttpTransport, TransportRequest, TransportResponse};
