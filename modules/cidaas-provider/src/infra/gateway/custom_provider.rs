use provider_kit::Record;
use serde_json::Value as Json;

use super::{into_record, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

const CUSTOM: [&str; 2] = ["providers-srv", "custom"];

pub struct CustomProviderGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> CustomProviderGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn create(&self, provider: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&CUSTOM, &Json::Object(provider.clone())).await?;
        record_or_sent(json, provider, "providers-srv/custom")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when no provider has this name.
    pub async fn get(&self, provider_name: &str) -> Result<Record, DomainError> {
        let json = self.api.get(&["providers-srv", "custom", provider_name], &[]).await?;
        into_record(json, "providers-srv/custom")
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn update(&self, provider: Record) -> Result<Record, DomainError> {
        let json = self.api.put(&CUSTOM, &Json::Object(provider.clone())).await?;
        record_or_sent(json, provider, "providers-srv/custom")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the provider is already gone.
    pub async fn delete(&self, provider_name: &str) -> Result<(), DomainError> {
        self.api.delete(&["providers-srv", "custom", provider_name]).await
    }
}
