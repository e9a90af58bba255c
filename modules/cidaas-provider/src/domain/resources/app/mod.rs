//! `cidaas_app`: OAuth2/OIDC client registrations.

mod rules;
pub mod schema;

use async_trait::async_trait;
use provider_kit::{Diagnostics, DriftPolicy, ObjectValue, Record, Schema, Value};
use serde_json::Value as Json;

use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, simple_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::app::AppGateway;

pub use schema::{COMMON_CONFIGS, SCHEMA};

#[derive(Debug, Default)]
pub struct AppResource;

#[async_trait]
impl Resource for AppResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    fn drift_policy(&self) -> DriftPolicy {
        schema::DRIFT
    }

    fn common_defaults(&self) -> Option<&'static str> {
        Some(COMMON_CONFIGS)
    }

    fn validate_config(&self, config: &ObjectValue, diags: &mut Diagnostics) {
        rules::check(config, diags);
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        AppGateway::new(api).create(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        AppGateway::new(api).get(key(state, "client_id")?).await
    }

    async fn update(
        &self,
        api: &ApiClient,
        mut record: Record,
        _plan: &ObjectValue,
        prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        let client_id = key(prior, "client_id")?;
        record.insert("client_id".to_owned(), Json::from(client_id));
        record.insert("_id".to_owned(), Json::from(client_id));
        AppGateway::new(api).update(record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        AppGateway::new(api).delete(key(state, "client_id")?).await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        simple_import_id(id, "client_id")
    }

    fn finish_state(&self, state: &mut ObjectValue) {
        let client_id = state.get("client_id").clone();
        if client_id.is_known() {
            state.set("id", client_id);
        } else if state.get("id").is_unknown() {
            state.set("id", Value::Null);
        }
    }
}
