//! `cidaas_custom_provider`: third-party OAuth2/OIDC identity providers.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{AttrPath, Attribute, Diagnostics, ObjectValue, Record, Schema, Validator, WireCase};

use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, simple_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::custom_provider::CustomProviderGateway;

const HTTP_URL: &str = "^https?://";

fn endpoint(name: &'static str) -> Attribute {
    Attribute::string(name).validate(Validator::matches(HTTP_URL, "must be an http(s) URL"))
}

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_custom_provider",
        WireCase::Snake,
        vec![
            Attribute::string("id").read_only().wire("_id"),
            Attribute::string("provider_name")
                .required()
                .identifier()
                .validate(Validator::non_empty()),
            Attribute::string("display_name").required(),
            Attribute::string("standard_type")
                .default("OAUTH2")
                .validate(Validator::one_of(&["OAUTH2", "OPENID_CONNECT"])),
            Attribute::string("client_id").required(),
            Attribute::string("client_secret").required().sensitive(),
            endpoint("logo_url"),
            endpoint("authorization_endpoint").required(),
            endpoint("token_endpoint").required(),
            endpoint("userinfo_endpoint"),
            Attribute::string("scope_display_label"),
            Attribute::object_list(
                "scopes",
                vec![
                    Attribute::string("scope_name").required(),
                    Attribute::bool("required").default(false),
                    Attribute::bool("recommended").default(false),
                ],
            ),
            Attribute::map("userinfo_fields"),
            Attribute::string_set("domains"),
        ],
    )
});

#[derive(Debug, Default)]
pub struct CustomProviderResource;

#[async_trait]
impl Resource for CustomProviderResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    fn validate_config(&self, config: &ObjectValue, diags: &mut Diagnostics) {
        let Ok(scopes) = config.get("scopes").as_elements() else {
            return;
        };
        let mut seen = BTreeSet::new();
        for (i, scope) in scopes.iter().enumerate() {
            if let Some(name) = scope.as_object().ok().and_then(|s| s.str_of("scope_name"))
                && !seen.insert(name)
            {
                diags.attribute_error(
                    AttrPath::root("scopes").index(i).attr("scope_name"),
                    "Duplicate scope",
                    format!("scope '{name}' is listed more than once"),
                );
            }
        }
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        CustomProviderGateway::new(api).create(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        CustomProviderGateway::new(api).get(key(state, "provider_name")?).await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        CustomProviderGateway::new(api).update(record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        CustomProviderGateway::new(api).delete(key(state, "provider_name")?).await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        simple_import_id(id, "provider_name")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use provider_kit::Value;

    #[test]
    fn scope_names_are_unique() {
        let scope = |name: &str| Value::Object(ObjectValue::new().with("scope_name", name));
        let config = ObjectValue::new().with("scopes", Value::list([scope("email"), scope("email")]));
        let mut diags = Diagnostics::new();
        CustomProviderResource.validate_config(&config, &mut diags);
        assert_eq!(diags.errors().count(), 1);
    }
}
