use provider_kit::Record;
use serde_json::Value as Json;

use super::into_record;
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

const WEBHOOK: [&str; 2] = ["webhook-srv", "webhook"];

pub struct WebhookGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> WebhookGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Creates when the record has no `id`, updates otherwise.
    ///
    /// # Errors
    /// Any [`DomainError`] from the call or a non-object answer.
    pub async fn upsert(&self, webhook: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&WEBHOOK, &Json::Object(webhook)).await?;
        into_record(json, "webhook-srv/webhook")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when no webhook has this id.
    pub async fn get(&self, id: &str) -> Result<Record, DomainError> {
        let json = self.api.get(&WEBHOOK, &[("id", id)]).await?;
        into_record(json, "webhook-srv/webhook")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the webhook is already gone.
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.api.delete(&["webhook-srv", "webhook", id]).await
    }
}
