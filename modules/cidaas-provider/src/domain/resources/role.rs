//! `cidaas_role`.

use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{Attribute, ObjectValue, Record, Schema, Validator, WireCase};

use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, simple_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::role::RoleGateway;

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_role",
        WireCase::Snake,
        vec![
            Attribute::string("role")
                .required()
                .identifier()
                .validate(Validator::non_empty()),
            Attribute::string("name"),
            Attribute::string("description"),
        ],
    )
});

#[derive(Debug, Default)]
pub struct RoleResource;

#[async_trait]
impl Resource for RoleResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        RoleGateway::new(api).upsert(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        RoleGateway::new(api).get(key(state, "role")?).await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        RoleGateway::new(api).upsert(record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        RoleGateway::new(api).delete(key(state, "role")?).await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        simple_import_id(id, "role")
    }
}
