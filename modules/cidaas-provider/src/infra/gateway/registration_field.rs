use provider_kit::Record;
use serde_json::Value as Json;

use super::{into_record, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

const FIELDS: [&str; 2] = ["registration-setup-srv", "fields"];

pub struct RegistrationFieldGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> RegistrationFieldGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn upsert(&self, field: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&FIELDS, &Json::Object(field.clone())).await?;
        record_or_sent(json, field, "registration-setup-srv/fields")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when no field has this key.
    pub async fn get(&self, field_key: &str) -> Result<Record, DomainError> {
        let json = self
            .api
            .get(&["registration-setup-srv", "fields", "flat", "field", field_key], &[])
            .await?;
        into_record(json, "registration-setup-srv/fields/flat/field")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the field is already gone.
    pub async fn delete(&self, field_key: &str) -> Result<(), DomainError> {
        self.api.delete(&["registration-setup-srv", "fields", field_key]).await
    }
}
