//! `cidaas_group_type`.

use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{AttrPath, Attribute, Diagnostics, ObjectValue, Record, Schema, Validator, WireCase};

use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, simple_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::group_type::GroupTypeGateway;

const ROLE_MODES: &[&str] = &["any_roles", "no_roles", "roles_required", "allowed_roles"];

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_group_type",
        WireCase::Camel,
        vec![
            Attribute::string("id").read_only().wire("_id"),
            Attribute::string("group_type")
                .required()
                .identifier()
                .validate(Validator::non_empty()),
            Attribute::string("role_mode")
                .required()
                .validate(Validator::one_of(ROLE_MODES)),
            Attribute::string_set("allowed_roles"),
            Attribute::string("description"),
            Attribute::timestamp("created_at").read_only().wire("createdTime"),
            Attribute::timestamp("updated_at").read_only().wire("updatedTime"),
        ],
    )
});

#[derive(Debug, Default)]
pub struct GroupTypeResource;

fn check_roles(config: &ObjectValue, diags: &mut Diagnostics) {
    let Some(mode) = config.str_of("role_mode") else {
        return;
    };
    let roles = config.get("allowed_roles");
    if roles.is_unknown() {
        return;
    }
    let needs_roles = matches!(mode, "roles_required" | "allowed_roles");
    if needs_roles && !roles.is_non_empty() {
        diags.attribute_error(
            AttrPath::root("allowed_roles"),
            "Missing required argument",
            format!("allowed_roles must not be empty when role_mode is '{mode}'"),
        );
    } else if !needs_roles && roles.is_non_empty() {
        diags.attribute_error(
            AttrPath::root("allowed_roles"),
            "Invalid Attribute Combination",
            format!("allowed_roles must be empty when role_mode is '{mode}'"),
        );
    }
}

#[async_trait]
impl Resource for GroupTypeResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    fn validate_config(&self, config: &ObjectValue, diags: &mut Diagnostics) {
        check_roles(config, diags);
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        GroupTypeGateway::new(api).create(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        GroupTypeGateway::new(api).get(key(state, "group_type")?).await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        GroupTypeGateway::new(api).update(record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        GroupTypeGateway::new(api).delete(key(state, "group_type")?).await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        simple_import_id(id, "group_type")
    }
}
