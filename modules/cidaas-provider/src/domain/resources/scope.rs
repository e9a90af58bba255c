//! `cidaas_scope`.

use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{Attribute, DriftPolicy, ObjectValue, Record, Schema, Validator, WireCase};

use super::fill_language;
use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, simple_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::scope::ScopeGateway;

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_scope",
        WireCase::Camel,
        vec![
            Attribute::string("id").read_only().wire("_id"),
            Attribute::string("scope_key")
                .required()
                .identifier()
                .validate(Validator::non_empty()),
            Attribute::string("security_level")
                .default("PUBLIC")
                .validate(Validator::one_of(&["PUBLIC", "CONFIDENTIAL"])),
            Attribute::bool("required_user_consent").computed(),
            Attribute::string_set("group_name").wire("group_name"),
            Attribute::string("scope_owner").read_only(),
            Attribute::object_list(
                "localized_descriptions",
                vec![
                    Attribute::string("locale").required(),
                    Attribute::string("language").computed(),
                    Attribute::string("title"),
                    Attribute::string("description"),
                ],
            )
            .wire("localeWiseDescription"),
        ],
    )
});

#[derive(Debug, Default)]
pub struct ScopeResource;

#[async_trait]
impl Resource for ScopeResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    fn drift_policy(&self) -> DriftPolicy {
        DriftPolicy {
            watched: &["security_level"],
            empty_sets: &[],
        }
    }

    fn complete_plan(&self, plan: &mut ObjectValue) {
        fill_language(plan, "localized_descriptions");
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        ScopeGateway::new(api).upsert(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        ScopeGateway::new(api).get(key(state, "scope_key")?).await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        ScopeGateway::new(api).upsert(record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        ScopeGateway::new(api).delete(key(state, "scope_key")?).await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        simple_import_id(id, "scope_key")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use provider_kit::{Value, expand};

    #[test]
    fn descriptions_get_a_language() {
        let entry = ObjectValue::new().with("locale", "de-CH").with("title", "Profil");
        let mut plan = ObjectValue::new()
            .with("scope_key", "profile")
            .with("localized_descriptions", Value::list([Value::Object(entry)]));
        ScopeResource.complete_plan(&mut plan);

        let record = expand(&SCHEMA, &plan);
        let entries = record["localeWiseDescription"].as_array().unwrap();
        assert_eq!(entries[0]["language"], "de");
        assert_eq!(entries[0]["locale"], "de-CH");
        assert_eq!(record["scopeKey"], "profile");
    }
}
