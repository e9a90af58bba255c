//! `apps-srv` client registrations.

use provider_kit::Record;
use serde_json::Value as Json;

use super::{into_record, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

const CLIENTS: [&str; 2] = ["apps-srv", "clients"];

pub struct AppGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> AppGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Any [`DomainError`] from the call or a non-object answer.
    pub async fn create(&self, app: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&CLIENTS, &Json::Object(app)).await?;
        into_record(json, "apps-srv/clients")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when no client has this id.
    pub async fn get(&self, client_id: &str) -> Result<Record, DomainError> {
        let json = self.api.get(&["apps-srv", "clients", client_id], &[]).await?;
        into_record(json, "apps-srv/clients")
    }

    /// The payload must carry `client_id` and `_id` of the existing client.
    ///
    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn update(&self, app: Record) -> Result<Record, DomainError> {
        let json = self.api.put(&CLIENTS, &Json::Object(app.clone())).await?;
        record_or_sent(json, app, "apps-srv/clients")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the client is already gone.
    pub async fn delete(&self, client_id: &str) -> Result<(), DomainError> {
        self.api.delete(&["apps-srv", "clients", client_id]).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::infra::gateway::test_api;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn get_unwraps_envelope_and_sends_bearer() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/apps-srv/clients/c-1")
                .header("authorization", "Bearer test-token")
                .header("accept", "application/json");
            then.status(200)
                .json_body(json!({"success": true, "status": 200, "data": {"client_id": "c-1"}}));
        });

        let record = AppGateway::new(&test_api(&server)).get("c-1").await.unwrap();
        assert_eq!(record.get("client_id"), Some(&json!("c-1")));
        m.assert();
    }

    #[tokio::test]
    async fn missing_client_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/apps-srv/clients/nope");
            then.status(204);
        });
        let err = AppGateway::new(&test_api(&server)).get("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
