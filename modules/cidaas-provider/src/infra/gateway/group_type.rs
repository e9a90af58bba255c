use provider_kit::Record;
use serde_json::Value as Json;

use super::{into_record, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

const GROUP_TYPES: [&str; 2] = ["groups-srv", "grouptypes"];

pub struct GroupTypeGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> GroupTypeGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn create(&self, group_type: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&GROUP_TYPES, &Json::Object(group_type.clone())).await?;
        record_or_sent(json, group_type, "groups-srv/grouptypes")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the group type does not exist.
    pub async fn get(&self, group_type: &str) -> Result<Record, DomainError> {
        let json = self.api.get(&["groups-srv", "grouptypes", group_type], &[]).await?;
        into_record(json, "groups-srv/grouptypes")
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn update(&self, group_type: Record) -> Result<Record, DomainError> {
        let json = self.api.put(&GROUP_TYPES, &Json::Object(group_type.clone())).await?;
        record_or_sent(json, group_type, "groups-srv/grouptypes")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the group type is already gone.
    pub async fn delete(&self, group_type: &str) -> Result<(), DomainError> {
        self.api.delete(&["groups-srv", "grouptypes", group_type]).await
    }
}
