//! `cidaas_user_group`.
//!
//! Deleting a group that still has sub-groups would orphan them, so delete
//! lists the children first and refuses while any exist.

use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{Attribute, ObjectValue, Record, Schema, Validator, WireCase};

use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, simple_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::user_group::UserGroupGateway;

const VISIBILITY: &[&str] = &["none", "public", "full"];

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_user_group",
        WireCase::Camel,
        vec![
            Attribute::string("id").read_only().wire("_id"),
            Attribute::string("group_type").required(),
            Attribute::string("group_id")
                .required()
                .identifier()
                .validate(Validator::non_empty()),
            Attribute::string("group_name").required(),
            Attribute::string("logo_url"),
            Attribute::string("description"),
            Attribute::map("custom_fields"),
            Attribute::bool("make_first_user_admin").default(false),
            Attribute::string("member_profile_visibility")
                .default("full")
                .validate(Validator::one_of(VISIBILITY)),
            Attribute::string("none_member_profile_visibility")
                .default("none")
                .validate(Validator::one_of(&["none", "public"])),
            Attribute::string("parent_id").default("root"),
            Attribute::timestamp("created_at").read_only().wire("createdTime"),
            Attribute::timestamp("updated_at").read_only().wire("updatedTime"),
        ],
    )
});

#[derive(Debug, Default)]
pub struct UserGroupResource;

#[async_trait]
impl Resource for UserGroupResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        UserGroupGateway::new(api).create(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        UserGroupGateway::new(api).get(key(state, "group_id")?).await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        UserGroupGateway::new(api).update(record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        let gateway = UserGroupGateway::new(api);
        let group_id = key(state, "group_id")?;
        let children = gateway.sub_groups(group_id).await?;
        if !children.is_empty() {
            return Err(DomainError::config(format!(
                "user group '{group_id}' still has sub-groups [{}]; delete them first",
                children.join(", ")
            )));
        }
        gateway.delete(group_id).await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        simple_import_id(id, "group_id")
    }
}
