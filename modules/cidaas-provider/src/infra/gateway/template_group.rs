use provider_kit::Record;
use serde_json::Value as Json;

use super::{into_record, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

const GROUPS: [&str; 2] = ["templates-srv", "groups"];

pub struct TemplateGroupGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> TemplateGroupGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn create(&self, group: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&GROUPS, &Json::Object(group.clone())).await?;
        record_or_sent(json, group, "templates-srv/groups")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the group does not exist.
    pub async fn get(&self, group_id: &str) -> Result<Record, DomainError> {
        let json = self.api.get(&["templates-srv", "groups", group_id], &[]).await?;
        into_record(json, "templates-srv/groups")
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn update(&self, group: Record) -> Result<Record, DomainError> {
        let json = self.api.put(&GROUPS, &Json::Object(group.clone())).await?;
        record_or_sent(json, group, "templates-srv/groups")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the group is already gone.
    pub async fn delete(&self, group_id: &str) -> Result<(), DomainError> {
        self.api.delete(&["templates-srv", "groups", group_id]).await
    }
}
