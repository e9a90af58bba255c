//! Backend gateways, one per resource kind.
//!
//! Gateways translate canonical records into calls on [`ApiClient`] and
//! shape the answers back into records. They hold no state beyond the client.

pub mod app;
pub mod consent;
pub mod custom_provider;
pub mod group_type;
pub mod hosted_page;
pub mod password_policy;
pub mod registration_field;
pub mod role;
pub mod scope;
pub mod social_provider;
pub mod template;
pub mod template_group;
pub mod user_group;
pub mod webhook;

use provider_kit::Record;
use serde_json::Value as Json;

use crate::domain::error::DomainError;

#[cfg(test)]
use crate::infra::api::ApiClient;

/// Response body as a record; a body without an object is a decode error.
///
/// # Errors
/// [`DomainError::Decode`] when `json` is not an object.
pub fn into_record(json: Json, path: &str) -> Result<Record, DomainError> {
    match json {
        Json::Object(map) => Ok(map),
        other => Err(DomainError::decode(path, format!("expected an object, got {}", kind(&other)))),
    }
}

/// Response body as a record, falling back to the request body for empty
/// answers (`204` or `null`).
///
/// # Errors
/// [`DomainError::Decode`] for a body that is neither empty nor an object.
pub fn record_or_sent(json: Json, sent: Record, path: &str) -> Result<Record, DomainError> {
    match json {
        Json::Null => Ok(sent),
        other => into_record(other, path),
    }
}

/// Picks the element whose `field` equals `value` from a list answer; an
/// object answer is accepted when it matches too.
///
/// # Errors
/// [`DomainError::NotFound`] when nothing matches.
pub fn find_by(json: Json, field: &str, value: &str, resource: &'static str) -> Result<Record, DomainError> {
    let matches = |map: &Record| map.get(field).and_then(Json::as_str) == Some(value);
    let found = match json {
        Json::Array(items) => items.into_iter().find_map(|item| match item {
            Json::Object(map) if matches(&map) => Some(map),
            _ => None,
        }),
        Json::Object(map) if matches(&map) => Some(map),
        _ => None,
    };
    found.ok_or_else(|| DomainError::not_found(resource, value))
}

/// String member of a record.
///
/// # Errors
/// [`DomainError::Decode`] when the member is missing or not a string.
pub fn str_member<'a>(record: &'a Record, field: &str, path: &str) -> Result<&'a str, DomainError> {
    record
        .get(field)
        .and_then(Json::as_str)
        .ok_or_else(|| DomainError::decode(path, format!("response has no '{field}'")))
}

fn kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// Client against `server` over plain HTTP with a fixed token.
#[cfg(test)]
pub fn test_api(server: &httpmock::MockServer) -> ApiClient {
    use std::sync::Arc;

    use provider_http::{HttpClientBuilder, StaticToken};
    use secrecy::SecretString;

    let http = HttpClientBuilder::new().allow_insecure_http().build().unwrap();
    let base = url::Url::parse(&server.url("/")).unwrap();
    ApiClient::new(base, Arc::new(http), Arc::new(StaticToken::new(SecretString::from("test-token".to_owned()))))
}
