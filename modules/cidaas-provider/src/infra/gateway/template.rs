//! Custom and system templates plus the system-template master list.

use provider_kit::Record;
use serde::Deserialize;
use serde_json::Value as Json;

use super::{into_record, record_or_sent};
use crate::domain::error::DomainError;
use crate::infra::api::ApiClient;

/// One entry of the master list returned for a template group.
#[derive(Debug, Clone, Deserialize)]
pub struct MasterTemplate {
    pub template_key: String,
    #[serde(default)]
    pub template_types: Vec<MasterTemplateType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MasterTemplateType {
    pub template_type: String,
    #[serde(default)]
    pub processing_types: Vec<MasterProcessingType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MasterProcessingType {
    pub processing_type: String,
    #[serde(default)]
    pub verification_types: Vec<MasterVerificationType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MasterVerificationType {
    pub verification_type: String,
    #[serde(default)]
    pub usage_types: Vec<String>,
}

/// A fully expanded combination a system template may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTemplateSlot {
    pub template_key: String,
    pub template_type: String,
    pub processing_type: String,
    pub verification_type: Option<String>,
    pub usage_type: Option<String>,
}

impl std::fmt::Display for SystemTemplateSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.template_key, self.template_type, self.processing_type)?;
        if let Some(v) = &self.verification_type {
            write!(f, "/{v}")?;
        }
        if let Some(u) = &self.usage_type {
            write!(f, "/{u}")?;
        }
        Ok(())
    }
}

/// Expands the nested master list into flat slots.
#[must_use]
pub fn slots(master: &[MasterTemplate]) -> Vec<SystemTemplateSlot> {
    let mut out = Vec::new();
    for template in master {
        for ty in &template.template_types {
            for processing in &ty.processing_types {
                let slot = |verification: Option<&str>, usage: Option<&str>| SystemTemplateSlot {
                    template_key: template.template_key.clone(),
                    template_type: ty.template_type.clone(),
                    processing_type: processing.processing_type.clone(),
                    verification_type: verification.map(str::to_owned),
                    usage_type: usage.map(str::to_owned),
                };
                if processing.verification_types.is_empty() {
                    out.push(slot(None, None));
                }
                for verification in &processing.verification_types {
                    let v = Some(verification.verification_type.as_str());
                    if verification.usage_types.is_empty() {
                        out.push(slot(v, None));
                    }
                    for usage in &verification.usage_types {
                        out.push(slot(v, Some(usage)));
                    }
                }
            }
        }
    }
    out
}

pub struct TemplateGateway<'a> {
    api: &'a ApiClient,
}

impl<'a> TemplateGateway<'a> {
    #[must_use]
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Create and update share one endpoint per template family.
    ///
    /// # Errors
    /// Any [`DomainError`] from the call.
    pub async fn save(&self, template: Record, system: bool) -> Result<Record, DomainError> {
        let family = if system { "system" } else { "custom" };
        let json = self
            .api
            .post(&["templates-srv", "template", family], &Json::Object(template.clone()))
            .await?;
        record_or_sent(json, template, "templates-srv/template")
    }

    /// Looks a template up by the identifying members of `query`.
    ///
    /// # Errors
    /// [`DomainError::NotFound`] when nothing matches.
    pub async fn find(&self, query: Record) -> Result<Record, DomainError> {
        let key = query
            .get("template_key")
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_owned();
        let json = self
            .api
            .post(&["templates-srv", "template", "custom", "find"], &Json::Object(query))
            .await?;
        match json {
            Json::Null => Err(DomainError::not_found("template", key)),
            other => into_record(other, "templates-srv/template/custom/find"),
        }
    }

    /// # Errors
    /// [`DomainError::NotFound`] when the template is already gone.
    pub async fn delete(&self, template_key: &str, template_type: &str) -> Result<(), DomainError> {
        self.api
            .delete(&["templates-srv", "template", "custom", template_key, template_type])
            .await
    }

    /// Master list of system templates available to `group_id`.
    ///
    /// # Errors
    /// [`DomainError::Decode`] when the answer does not have the expected shape.
    pub async fn master_list(&self, group_id: &str) -> Result<Vec<MasterTemplate>, DomainError> {
        let path = "templates-srv/master/settings";
        let json = self
            .api
            .get(&["templates-srv", "master", "settings", group_id], &[])
            .await?;
        if json.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(json).map_err(|e| DomainError::decode(path, e.to_string()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::infra::gateway::test_api;
    use httpmock::prelude::*;
    use serde_json::json;

    fn master() -> serde_json::Value {
        json!([{
            "template_key": "VERIFY_USER",
            "template_types": [{
                "template_type": "EMAIL",
                "processing_types": [{
                    "processing_type": "GENERAL",
                    "verification_types": [{"verification_type": "EMAIL", "usage_types": ["VERIFICATION_CONFIGURATION", "MULTIFACTOR_AUTHENTICATION"]}]
                }]
            }]
        }, {
            "template_key": "NOTIFY_COMMUNICATION_CHANGE",
            "template_types": [{"template_type": "SMS", "processing_types": [{"processing_type": "GENERAL"}]}]
        }])
    }

    #[tokio::test]
    async fn master_list_expands_into_slots() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/templates-srv/master/settings/default");
            then.status(200).json_body(json!({"success": true, "status": 200, "data": master()}));
        });
        let list = TemplateGateway::new(&test_api(&server))
            .master_list("default")
            .await
            .unwrap();
        let slots = slots(&list);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].usage_type.as_deref(), Some("VERIFICATION_CONFIGURATION"));
        assert_eq!(slots[2].to_string(), "NOTIFY_COMMUNICATION_CHANGE/SMS/GENERAL");
        assert!(slots[2].verification_type.is_none());
    }

    #[tokio::test]
    async fn empty_find_answer_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/templates-srv/template/custom/find");
            then.status(204);
        });
        let mut query = Record::new();
        query.insert("template_key".to_owned(), json!("WELCOME"));
        let err = TemplateGateway::new(&test_api(&server)).find(query).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
