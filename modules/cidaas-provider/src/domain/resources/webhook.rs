//! `cidaas_webhook`.

use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{AttrPath, Attribute, Diagnostics, ObjectValue, Record, Schema, Validator, WireCase};

use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, simple_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::webhook::WebhookGateway;

/// Auth type and the sub-object it needs.
const AUTH_CONFIGS: &[(&str, &str)] = &[
    ("APIKEY", "apikey_config"),
    ("TOTP", "totp_config"),
    ("CIDAAS_OAUTH2", "cidaas_auth_config"),
];

fn key_config(name: &'static str) -> Attribute {
    Attribute::object(
        name,
        vec![
            Attribute::string("key").required().sensitive(),
            Attribute::string("placeholder").required(),
            Attribute::string("placement")
                .required()
                .validate(Validator::one_of(&["query", "header"])),
        ],
    )
}

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_webhook",
        WireCase::Snake,
        vec![
            Attribute::string("id").read_only().identifier(),
            Attribute::string("auth_type")
                .required()
                .validate(Validator::one_of(&["APIKEY", "TOTP", "CIDAAS_OAUTH2"])),
            Attribute::string("url")
                .required()
                .validate(Validator::matches("^https?://", "must be an http(s) URL")),
            Attribute::string_set("events")
                .required()
                .validate(Validator::SizeAtLeast(1)),
            Attribute::bool("disable").default(false),
            key_config("apikey_config"),
            key_config("totp_config"),
            Attribute::object(
                "cidaas_auth_config",
                vec![Attribute::string("client_id").required()],
            ),
            Attribute::timestamp("created_at").read_only().wire("createdTime"),
            Attribute::timestamp("updated_at").read_only().wire("updatedTime"),
        ],
    )
});

#[derive(Debug, Default)]
pub struct WebhookResource;

fn check_auth_config(config: &ObjectValue, diags: &mut Diagnostics) {
    let Some(auth_type) = config.str_of("auth_type") else {
        return;
    };
    for (ty, needed) in AUTH_CONFIGS {
        if *ty == auth_type && config.get(needed).is_null() {
            diags.attribute_error(
                AttrPath::root(*needed),
                "Missing required argument",
                format!("attribute '{needed}' is required when auth_type is '{auth_type}'"),
            );
        }
    }
}

#[async_trait]
impl Resource for WebhookResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    fn validate_config(&self, config: &ObjectValue, diags: &mut Diagnostics) {
        check_auth_config(config, diags);
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        WebhookGateway::new(api).upsert(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        WebhookGateway::new(api).get(key(state, "id")?).await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        WebhookGateway::new(api).upsert(record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        WebhookGateway::new(api).delete(key(state, "id")?).await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        simple_import_id(id, "id")
    }
}
