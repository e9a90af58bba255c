//! `cidaas_registration_field`: fields of the registration form.

use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{AttrPath, Attribute, Diagnostics, ObjectValue, Record, Schema, Validator, WireCase};

use super::fill_language;
use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, simple_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::registration_field::RegistrationFieldGateway;

const DATA_TYPES: &[&str] = &[
    "TEXT",
    "NUMBER",
    "SELECT",
    "MULTISELECT",
    "RADIO",
    "CHECKBOX",
    "PASSWORD",
    "DATE",
    "URL",
    "EMAIL",
    "TEXTAREA",
    "MOBILE",
    "CONSENT",
    "JSON_STRING",
    "USERNAME",
    "ARRAY",
    "GROUPING",
    "DAYDATE",
];

fn local_texts() -> Attribute {
    Attribute::object_list(
        "local_texts",
        vec![
            Attribute::string("locale").required(),
            Attribute::string("language").computed(),
            Attribute::string("name").required(),
            Attribute::string("required_msg"),
            Attribute::string("max_length_msg"),
            Attribute::string("min_length_msg"),
            Attribute::object_list(
                "attributes",
                vec![Attribute::string("key").required(), Attribute::string("value")],
            ),
        ],
    )
    .wire("localeText")
}

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_registration_field",
        WireCase::Camel,
        vec![
            Attribute::string("id").read_only().wire("_id"),
            Attribute::string("field_key")
                .required()
                .identifier()
                .validate(Validator::non_empty()),
            Attribute::string("data_type")
                .required()
                .validate(Validator::one_of(DATA_TYPES)),
            Attribute::string("field_type")
                .default("CUSTOM")
                .validate(Validator::one_of(&["CUSTOM", "SYSTEM"])),
            Attribute::bool("enabled").default(true),
            Attribute::bool("required").default(false),
            Attribute::int64("order").default(1_i64).validate(Validator::Between {
                min: 1,
                max: i64::from(i32::MAX),
            }),
            Attribute::bool("internal").default(false),
            Attribute::bool("read_only").default(false),
            Attribute::bool("is_group").default(false),
            Attribute::string("parent_group_id").default("DEFAULT"),
            Attribute::string_set("scopes"),
            local_texts(),
            Attribute::object(
                "field_definition",
                vec![
                    Attribute::int64("min_length"),
                    Attribute::int64("max_length"),
                    Attribute::timestamp("min_date"),
                    Attribute::timestamp("max_date"),
                    Attribute::timestamp("initial_date"),
                ],
            ),
        ],
    )
});

#[derive(Debug, Default)]
pub struct RegistrationFieldResource;

fn check_rules(config: &ObjectValue, diags: &mut Diagnostics) {
    let is_group = config.bool_of("is_group").unwrap_or(false);
    if let Some(data_type) = config.str_of("data_type")
        && !config.get("is_group").is_unknown()
        && (data_type == "GROUPING") != is_group
    {
        diags.attribute_error(
            AttrPath::root("is_group"),
            "Invalid Attribute Combination",
            "is_group must be true exactly when data_type is 'GROUPING'",
        );
    }
    if let Ok(definition) = config.get("field_definition").as_object()
        && let (Ok(min), Ok(max)) = (
            definition.get("min_length").as_i64(),
            definition.get("max_length").as_i64(),
        )
        && min > max
    {
        diags.attribute_error(
            AttrPath::root("field_definition").attr("min_length"),
            "Invalid Attribute Value",
            format!("min_length ({min}) must not exceed max_length ({max})"),
        );
    }
}

#[async_trait]
impl Resource for RegistrationFieldResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    fn validate_config(&self, config: &ObjectValue, diags: &mut Diagnostics) {
        check_rules(config, diags);
    }

    fn complete_plan(&self, plan: &mut ObjectValue) {
        fill_language(plan, "local_texts");
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        RegistrationFieldGateway::new(api).upsert(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        RegistrationFieldGateway::new(api).get(key(state, "field_key")?).await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        RegistrationFieldGateway::new(api).upsert(record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        RegistrationFieldGateway::new(api).delete(key(state, "field_key")?).await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        simple_import_id(id, "field_key")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn run(config: &ObjectValue) -> usize {
        let mut diags = Diagnostics::new();
        check_rules(config, &mut diags);
        diags.errors().count()
    }

    #[test]
    fn grouping_fields_are_groups() {
        let config = ObjectValue::new().with("data_type", "GROUPING").with("is_group", false);
        assert_eq!(run(&config), 1);
        let config = ObjectValue::new().with("data_type", "TEXT").with("is_group", false);
        assert_eq!(run(&config), 0);
    }

    #[test]
    fn length_bounds_are_ordered() {
        let definition = ObjectValue::new().with("min_length", 10_i64).with("max_length", 5_i64);
        let config = ObjectValue::new().with("field_definition", definition);
        assert_eq!(run(&config), 1);
    }
}
