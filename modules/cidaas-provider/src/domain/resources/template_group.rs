//! `cidaas_template_group`: sender settings shared by a set of templates.

use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{Attribute, ObjectValue, Record, Schema, Validator, WireCase};

use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, simple_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::template_group::TemplateGroupGateway;

fn sender(name: &'static str, extra: Vec<Attribute>) -> Attribute {
    let mut fields = vec![
        Attribute::string("id").computed(),
        Attribute::string_set("sender_names").computed(),
    ];
    fields.extend(extra);
    Attribute::object(name, fields).computed()
}

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_template_group",
        WireCase::Snake,
        vec![
            Attribute::string("id").read_only().wire("_id"),
            Attribute::string("group_id")
                .required()
                .identifier()
                .validate(Validator::Length { min: 1, max: Some(15) }),
            sender(
                "email_sender_config",
                vec![
                    Attribute::string("from_email"),
                    Attribute::string("from_name"),
                    Attribute::string("reply_to"),
                ],
            ),
            sender("sms_sender_config", vec![Attribute::string("from_name")]),
            sender("ivr_sender_config", Vec::new()),
            sender("push_sender_config", Vec::new()),
        ],
    )
});

#[derive(Debug, Default)]
pub struct TemplateGroupResource;

#[async_trait]
impl Resource for TemplateGroupResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        TemplateGroupGateway::new(api).create(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        TemplateGroupGateway::new(api).get(key(state, "group_id")?).await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        TemplateGroupGateway::new(api).update(record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        TemplateGroupGateway::new(api).delete(key(state, "group_id")?).await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        simple_import_id(id, "group_id")
    }
}
