//! `cidaas_password_policy`: the tenant's existing password policy.
//!
//! The backend owns the policy's lifecycle. It has to be imported before it
//! can be managed, and destroy only forgets it.

use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{Attribute, ObjectValue, Record, Schema, Validator, WireCase};

use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, simple_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::password_policy::PasswordPolicyGateway;

fn days(name: &'static str) -> Attribute {
    Attribute::int64(name).validate(Validator::Between { min: 0, max: 3650 })
}

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_password_policy",
        WireCase::Snake,
        vec![
            Attribute::string("id").read_only().identifier(),
            Attribute::string("policy_name").required(),
            Attribute::string("description"),
            Attribute::object(
                "password_policy",
                vec![
                    Attribute::bool("block_compromised").default(false),
                    Attribute::int64("deny_usage_count").validate(Validator::Between { min: 0, max: 64 }),
                    Attribute::string_set("strength_regexes"),
                    Attribute::object(
                        "change_enforcement",
                        vec![days("expiration_in_days"), days("notify_user_before_in_days")],
                    ),
                ],
            )
            .computed(),
        ],
    )
});

#[derive(Debug, Default)]
pub struct PasswordPolicyResource;

#[async_trait]
impl Resource for PasswordPolicyResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    async fn create(&self, _api: &ApiClient, _record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        Err(DomainError::config(
            "password policies cannot be created; import the existing policy by id first, then apply changes",
        ))
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        PasswordPolicyGateway::new(api).get(key(state, "id")?).await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        PasswordPolicyGateway::new(api).update(record).await
    }

    async fn delete(&self, _api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        tracing::info!(
            id = state.str_of("id").unwrap_or_default(),
            "password policies cannot be deleted, removing from state only"
        );
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        simple_import_id(id, "id")
    }
}
