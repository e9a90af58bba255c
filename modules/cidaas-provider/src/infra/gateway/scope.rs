//! Scopes and scope groups.

use provider_kit::Record;
use serde_json::Value as Json;

use super::{find_by, into_record, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

const SCOPE: [&str; 2] = ["scopes-srv", "scope"];
const GROUP: [&str; 2] = ["scopes-srv", "group"];

pub struct ScopeGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> ScopeGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn upsert(&self, scope: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&SCOPE, &Json::Object(scope.clone())).await?;
        record_or_sent(json, scope, "scopes-srv/scope")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when no scope has this key.
    pub async fn get(&self, scope_key: &str) -> Result<Record, DomainError> {
        let json = self.api.get(&SCOPE, &[("scopekey", scope_key)]).await?;
        find_by(json, "scopeKey", scope_key, "scope")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the scope is already gone.
    pub async fn delete(&self, scope_key: &str) -> Result<(), DomainError> {
        self.api.delete(&["scopes-srv", "scope", scope_key]).await
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn upsert_group(&self, group: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&GROUP, &Json::Object(group.clone())).await?;
        record_or_sent(json, group, "scopes-srv/group")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the group does not exist.
    pub async fn get_group(&self, group_name: &str) -> Result<Record, DomainError> {
        let json = self.api.get(&["scopes-srv", "group", group_name], &[]).await?;
        into_record(json, "scopes-srv/group")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the group is already gone.
    pub async fn delete_group(&self, group_name: &str) -> Result<(), DomainError> {
        self.api.delete(&["scopes-srv", "group", group_name]).await
    }
}
