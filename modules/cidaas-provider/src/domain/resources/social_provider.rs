//! `cidaas_social_provider`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{AttrPath, Attribute, Diagnostics, ObjectValue, Record, Schema, Validator, WireCase};

use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, split_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::social_provider::SocialProviderGateway;

const PROVIDERS: &[&str] = &[
    "google",
    "facebook",
    "linkedin",
    "amazon",
    "foursquare",
    "github",
    "instagram",
    "yammer",
    "wordpress",
    "microsoft",
    "yahoo",
    "officeenterprise",
    "salesforce",
    "paypal",
    "paypal_sandbox",
    "twitter",
    "apple",
];

fn claims() -> Vec<Attribute> {
    vec![
        Attribute::string_set("user_info"),
        Attribute::string_set("id_token"),
    ]
}

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_social_provider",
        WireCase::Snake,
        vec![
            Attribute::string("id").read_only(),
            Attribute::string("name")
                .required()
                .identifier()
                .validate(Validator::non_empty()),
            Attribute::string("provider_name")
                .required()
                .identifier()
                .validate(Validator::one_of(PROVIDERS)),
            Attribute::string("client_id").required(),
            Attribute::string("client_secret").required().sensitive(),
            Attribute::bool("enabled").default(false),
            Attribute::bool("enabled_for_admin_portal").default(false),
            Attribute::string_set("scopes"),
            Attribute::object(
                "claims",
                vec![
                    Attribute::object("required_claims", claims()),
                    Attribute::object("optional_claims", claims()),
                ],
            ),
            Attribute::object_list(
                "userinfo_fields",
                vec![
                    Attribute::string("inner_key").required(),
                    Attribute::string("external_key"),
                    Attribute::bool("is_custom_field").default(false),
                    Attribute::bool("is_system_field").default(false),
                ],
            ),
        ],
    )
});

#[derive(Debug, Default)]
pub struct SocialProviderResource;

fn check_userinfo_fields(config: &ObjectValue, diags: &mut Diagnostics) {
    let Ok(fields) = config.get("userinfo_fields").as_elements() else {
        return;
    };
    let mut custom = BTreeSet::new();
    let mut system = BTreeSet::new();
    for (i, field) in fields.iter().enumerate() {
        let Ok(field) = field.as_object() else {
            continue;
        };
        let path = AttrPath::root("userinfo_fields").index(i);
        let is_custom = field.bool_of("is_custom_field").unwrap_or(false);
        let is_system = field.bool_of("is_system_field").unwrap_or(false);
        if is_custom == is_system {
            diags.attribute_error(
                path.clone(),
                "Invalid Attribute Combination",
                "exactly one of is_custom_field and is_system_field must be true",
            );
            continue;
        }
        let family = if is_custom { &mut custom } else { &mut system };
        if let Some(inner) = field.str_of("inner_key")
            && !family.insert(inner)
        {
            diags.attribute_error(
                path.attr("inner_key"),
                "Duplicate userinfo field",
                format!("inner_key '{inner}' is mapped more than once"),
            );
        }
    }
}

#[async_trait]
impl Resource for SocialProviderResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    fn validate_config(&self, config: &ObjectValue, diags: &mut Diagnostics) {
        check_userinfo_fields(config, diags);
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        SocialProviderGateway::new(api).create(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        SocialProviderGateway::new(api)
            .get(key(state, "provider_name")?, key(state, "id")?)
            .await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        SocialProviderGateway::new(api).update(record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        SocialProviderGateway::new(api)
            .delete(key(state, "provider_name")?, key(state, "id")?)
            .await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        split_import_id(id, &["provider_name", "id"])
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use provider_kit::Value;

    fn field(inner: &str, custom: bool, system: bool) -> Value {
        Value::Object(
            ObjectValue::new()
                .with("inner_key", inner)
                .with("external_key", "ext")
                .with("is_custom_field", custom)
                .with("is_system_field", system),
        )
    }

    fn run(fields: Vec<Value>) -> Vec<String> {
        let config = ObjectValue::new().with("userinfo_fields", Value::list(fields));
        let mut diags = Diagnostics::new();
        check_userinfo_fields(&config, &mut diags);
        diags.errors().map(|d| d.path.as_ref().unwrap().to_string()).collect()
    }

    #[test]
    fn fields_belong_to_exactly_one_family() {
        assert_eq!(run(vec![field("email", true, true)]), ["userinfo_fields[0]"]);
        assert_eq!(run(vec![field("email", false, false)]), ["userinfo_fields[0]"]);
        assert!(run(vec![field("email", false, true)]).is_empty());
    }

    #[test]
    fn inner_keys_are_unique_per_family() {
        let errors = run(vec![
            field("email", false, true),
            field("email", true, false),
            field("email", false, true),
        ]);
        assert_eq!(errors, ["userinfo_fields[2].inner_key"]);
    }
}
