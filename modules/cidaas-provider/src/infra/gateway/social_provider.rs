use provider_kit::Record;
use serde_json::Value as Json;

use super::{into_record, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

const PROVIDERS: [&str; 3] = ["providers-srv", "multi", "providers"];

pub struct SocialProviderGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> SocialProviderGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn create(&self, provider: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&PROVIDERS, &Json::Object(provider)).await?;
        into_record(json, "providers-srv/multi/providers")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the provider instance does not exist.
    pub async fn get(&self, provider_name: &str, id: &str) -> Result<Record, DomainError> {
        let json = self
            .api
            .get(&["providers-srv", "multi", "providers", provider_name, id], &[])
            .await?;
        into_record(json, "providers-srv/multi/providers")
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn update(&self, provider: Record) -> Result<Record, DomainError> {
        let json = self.api.put(&PROVIDERS, &Json::Object(provider.clone())).await?;
        record_or_sent(json, provider, "providers-srv/multi/providers")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the instance is already gone.
    pub async fn delete(&self, provider_name: &str, id: &str) -> Result<(), DomainError> {
        self.api
            .delete(&["providers-srv", "multi", "providers", provider_name, id])
            .await
    }
}
