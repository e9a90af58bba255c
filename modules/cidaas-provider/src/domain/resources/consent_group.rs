//! `cidaas_consent_group`.

use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{Attribute, ObjectValue, Record, Schema, Validator, WireCase};

use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, simple_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::consent::ConsentGateway;

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_consent_group",
        WireCase::Snake,
        vec![
            Attribute::string("id").read_only().wire("_id"),
            Attribute::string("group_name")
                .required()
                .identifier()
                .validate(Validator::non_empty()),
            Attribute::string("description"),
            Attribute::timestamp("created_at").read_only().wire("createdTime"),
            Attribute::timestamp("updated_at").read_only().wire("updatedTime"),
        ],
    )
});

#[derive(Debug, Default)]
pub struct ConsentGroupResource;

#[async_trait]
impl Resource for ConsentGroupResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        ConsentGateway::new(api).upsert_group(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        ConsentGateway::new(api).get_group(key(state, "id")?).await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        ConsentGateway::new(api).upsert_group(record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        ConsentGateway::new(api).delete_group(key(state, "id")?).await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        simple_import_id(id, "id")
    }
}
