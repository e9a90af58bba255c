//! `cidaas_consent`: a named consent inside a consent group.

use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{Attribute, ObjectValue, Record, Schema, Validator, WireCase};

use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, split_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::consent::ConsentGateway;

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_consent",
        WireCase::Snake,
        vec![
            Attribute::string("id").read_only().wire("_id"),
            Attribute::string("consent_group_id").required().identifier(),
            Attribute::string("name")
                .required()
                .identifier()
                .wire("consent_name")
                .validate(Validator::non_empty()),
            Attribute::string("status")
                .computed()
                .validate(Validator::one_of(&["ACTIVE", "INACTIVE"])),
            Attribute::timestamp("created_at").read_only().wire("createdTime"),
            Attribute::timestamp("updated_at").read_only().wire("updatedTime"),
        ],
    )
});

#[derive(Debug, Default)]
pub struct ConsentResource;

#[async_trait]
impl Resource for ConsentResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        ConsentGateway::new(api).create_instance(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        ConsentGateway::new(api)
            .find_instance(key(state, "consent_group_id")?, key(state, "name")?)
            .await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        ConsentGateway::new(api).update_instance(key(prior, "id")?, record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        ConsentGateway::new(api)
            .delete_instance(key(state, "consent_group_id")?, key(state, "id")?)
            .await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        split_import_id(id, &["consent_group_id", "name"])
    }
}
