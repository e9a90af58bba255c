//! User groups and their sub-group listing.

use provider_kit::Record;
use serde_json::{Value as Json, json};

use super::{into_record, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

const USER_GROUPS: [&str; 3] = ["groups-srv", "graph", "usergroups"];

pub struct UserGroupGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> UserGroupGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn create(&self, group: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&USER_GROUPS, &Json::Object(group.clone())).await?;
        record_or_sent(json, group, "groups-srv/graph/usergroups")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the group does not exist.
    pub async fn get(&self, group_id: &str) -> Result<Record, DomainError> {
        let json = self
            .api
            .get(&["groups-srv", "graph", "usergroups", group_id], &[])
            .await?;
        into_record(json, "groups-srv/graph/usergroups")
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn update(&self, group: Record) -> Result<Record, DomainError> {
        let json = self.api.put(&USER_GROUPS, &Json::Object(group.clone())).await?;
        record_or_sent(json, group, "groups-srv/graph/usergroups")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the group is already gone.
    pub async fn delete(&self, group_id: &str) -> Result<(), DomainError> {
        self.api
            .delete(&["groups-srv", "graph", "usergroups", group_id])
            .await
    }

    /// Ids of the direct children of `parent_id`.
    ///
    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn sub_groups(&self, parent_id: &str) -> Result<Vec<String>, DomainError> {
        let json = self
            .api
            .post(
                &["groups-srv", "graph", "usergroups", "list"],
                &json!({ "parentId": parent_id }),
            )
            .await?;
        let items = match json {
            Json::Array(items) => items,
            Json::Object(mut map) => match map.remove("groups") {
                Some(Json::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Ok(items
            .iter()
            .filter_map(|g| g.get("groupId").and_then(Json::as_str))
            .filter(|id| *id != parent_id)
            .map(str::to_owned)
            .collect())
    }
}
