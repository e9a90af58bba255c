//! Tenant password policy. The backend offers no create or delete.

use provider_kit::Record;
use serde_json::Value as Json;

use super::{into_record, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

pub struct PasswordPolicyGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> PasswordPolicyGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// [`DomainError::NotFound`] when no policy has this id.
    pub async fn get(&self, id: &str) -> Result<Record, DomainError> {
        let json = self.api.get(&["password-policy-srv", "policy", id], &[]).await?;
        into_record(json, "password-policy-srv/policy")
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn update(&self, policy: Record) -> Result<Record, DomainError> {
        let json = self
            .api
            .put(&["password-policy-srv", "policy"], &Json::Object(policy.clone()))
            .await?;
        record_or_sent(json, policy, "password-policy-srv/policy")
    }
}
