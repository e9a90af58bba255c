#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use cidaas_provider::{Provider, ProviderConfig, ResourceHandler};
use httpmock::MockServer;
use secrecy::SecretString;

pub const TOKEN: &str = "test-token";

pub fn config(server: &MockServer) -> ProviderConfig {
    ProviderConfig {
        base_url: server.base_url(),
        access_token: Some(SecretString::from(TOKEN.to_owned())),
        allow_insecure_http: true,
        ..ProviderConfig::default()
    }
}

/// Provider talking plain HTTP to `server`. Needs a tokio runtime.
pub fn provider(server: &MockServer) -> Provider {
    Provider::from_config(&config(server)).unwrap()
}

pub fn provider_with_timeout(server: &MockServer, timeout: Duration) -> Provider {
    let config = ProviderConfig {
        request_timeout: Some(timeout),
        ..config(server)
    };
    Provider::from_config(&config).unwrap()
}

pub fn handler(provider: &Provider, type_name: &str) -> Arc<dyn ResourceHandler> {
    provider.handler(type_name).unwrap()
}
