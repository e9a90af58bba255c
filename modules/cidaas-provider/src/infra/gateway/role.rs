use provider_kit::Record;
use serde_json::Value as Json;

use super::{find_by, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

const ROLE: [&str; 2] = ["roles-srv", "role"];

pub struct RoleGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> RoleGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Create and update share one endpoint.
    ///
    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn upsert(&self, role: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&ROLE, &Json::Object(role.clone())).await?;
        record_or_sent(json, role, "roles-srv/role")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the role does not exist.
    pub async fn get(&self, role: &str) -> Result<Record, DomainError> {
        let json = self.api.get(&ROLE, &[("role", role)]).await?;
        find_by(json, "role", role, "role")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the role is already gone.
    pub async fn delete(&self, role: &str) -> Result<(), DomainError> {
        self.api.delete(&["roles-srv", "role", role]).await
    }
}
