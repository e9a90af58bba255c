use provider_kit::Record;
use serde_json::Value as Json;

use super::{into_record, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

const HP_GROUP: [&str; 2] = ["hostedpages-srv", "hpgroup"];

pub struct HostedPageGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> HostedPageGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn upsert(&self, group: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&HP_GROUP, &Json::Object(group.clone())).await?;
        record_or_sent(json, group, "hostedpages-srv/hpgroup")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the page group does not exist.
    pub async fn get(&self, name: &str) -> Result<Record, DomainError> {
        let json = self.api.get(&["hostedpages-srv", "hpgroup", name], &[]).await?;
        into_record(json, "hostedpages-srv/hpgroup")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the page group is already gone.
    pub async fn delete(&self, name: &str) -> Result<(), DomainError> {
        self.api.delete(&["hostedpages-srv", "hpgroup", name]).await
    }
}
