//! Consent groups, consent instances, versions and their locales.

use provider_kit::Record;
use serde_json::Value as Json;

use super::{find_by, into_record, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

const SRV: &str = "consent-management-srv";

pub struct ConsentGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> ConsentGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn upsert_group(&self, group: Record) -> Result<Record, DomainError> {
        let json = self.api.post(&[SRV, "v2", "groups"], &Json::Object(group.clone())).await?;
        record_or_sent(json, group, "v2/groups")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the group does not exist.
    pub async fn get_group(&self, id: &str) -> Result<Record, DomainError> {
        let json = self.api.get(&[SRV, "v2", "groups", id], &[]).await?;
        into_record(json, "v2/groups")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the group is already gone.
    pub async fn delete_group(&self, id: &str) -> Result<(), DomainError> {
        self.api.delete(&[SRV, "v2", "groups", id]).await
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn create_instance(&self, consent: Record) -> Result<Record, DomainError> {
        let json = self
            .api
            .post(&[SRV, "v2", "consent", "instance"], &Json::Object(consent))
            .await?;
        into_record(json, "v2/consent/instance")
    }

    /// Looks the consent up by name within its group.
    ///
    /// # Errors
    /// [`DomainError::NotFound`] when the group has no consent with this name.
    pub async fn find_instance(&self, consent_group_id: &str, name: &str) -> Result<Record, DomainError> {
        let json = self
            .api
            .get(&[SRV, "v2", "consent", "instance", consent_group_id], &[])
            .await?;
        find_by(json, "consent_name", name, "consent")
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn update_instance(&self, id: &str, consent: Record) -> Result<Record, DomainError> {
        let json = self
            .api
            .put(&[SRV, "v2", "consent", "instance", id], &Json::Object(consent.clone()))
            .await?;
        record_or_sent(json, consent, "v2/consent/instance")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the consent is already gone.
    pub async fn delete_instance(&self, consent_group_id: &str, id: &str) -> Result<(), DomainError> {
        self.api
            .delete(&[SRV, "v2", "consent", "instance", consent_group_id, id])
            .await
    }

    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn create_version(&self, version: Record) -> Result<Record, DomainError> {
        let json = self
            .api
            .post(&[SRV, "v2", "consent", "versions"], &Json::Object(version))
            .await?;
        into_record(json, "v2/consent/versions")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the version does not exist.
    pub async fn get_version(&self, id: &str) -> Result<Record, DomainError> {
        let json = self
            .api
            .get(&[SRV, "v2", "consent", "versions", "details", id], &[])
            .await?;
        into_record(json, "v2/consent/versions/details")
    }

    /// Creates (`update = false`) or updates one locale entry of a version.
    ///
    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn put_locale(&self, entry: Record, update: bool) -> Result<Record, DomainError> {
        let path = [SRV, "v2", "consent", "locale"];
        let body = Json::Object(entry.clone());
        let json = if update {
            self.api.put(&path, &body).await?
        } else {
            self.api.post(&path, &body).await?
        };
        record_or_sent(json, entry, "v2/consent/locale")
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the version has no entry for `locale`.
    pub async fn get_locale(&self, version_id: &str, locale: &str) -> Result<Record, DomainError> {
        let json = self
            .api
            .get(&[SRV, "v2", "consent", "locale", version_id], &[("locale", locale)])
            .await?;
        into_record(json, "v2/consent/locale")
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
    async fn instance_lookup_filters_group_listing_by_name() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/consent-management-srv/v2/consent/instance/g1");
            then.status(200).json_body(json!({"success": true, "status": 200, "data": [
                {"_id": "c1", "consent_name": "terms"},
                {"_id": "c2", "consent_name": "newsletter"}
            ]}));
        });
        let api = test_api(&server);
        let gw = ConsentGateway::new(&api);
        let found = gw.find_instance("g1", "newsletter").await.unwrap();
        assert_eq!(found.get("_id"), Some(&json!("c2")));
        assert!(gw.find_instance("g1", "privacy").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn locale_lookup_sends_locale_query() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/consent-management-srv/v2/consent/locale/v1")
                .query_param("locale", "de-DE");
            then.status(200).json_body(json!({"locale": "de-DE", "content": "Inhalt"}));
        });
        let entry = ConsentGateway::new(&test_api(&server))
            .get_locale("v1", "de-DE")
            .await
            .unwrap();
        assert_eq!(entry.get("content"), Some(&json!("Inhalt")));
        m.assert();
    }
}
