//! `cidaas_consent_version`: a versioned consent text with per-locale entries.
//!
//! The version and its locale entries live behind separate endpoints. Create
//! posts the version first and then one entry per locale; update only touches
//! the entries since every version attribute is an identifier. The backend
//! has no delete for versions, so destroy only drops the state.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use futures::future::try_join_all;
use provider_kit::{AttrPath, Attribute, Diagnostics, ObjectValue, Record, Schema, Validator, Value, WireCase};
use serde_json::Value as Json;

use super::fill_language;
use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, split_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::consent::ConsentGateway;
use crate::infra::gateway::str_member;

const LOCALES: &str = "consent_locales";

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_consent_version",
        WireCase::Snake,
        vec![
            Attribute::string("id").read_only().wire("_id"),
            Attribute::string("consent_id").required().identifier(),
            Attribute::float64("version").required().identifier(),
            Attribute::string("consent_type")
                .required()
                .identifier()
                .validate(Validator::one_of(&["SCOPES", "URL"])),
            Attribute::string_set("scopes").identifier(),
            Attribute::string_set("required_fields").identifier(),
            Attribute::object_set(
                LOCALES,
                vec![
                    Attribute::string("locale").required(),
                    Attribute::string("language").computed(),
                    Attribute::string("content"),
                    Attribute::string("url"),
                ],
            )
            .required()
            .validate(Validator::SizeAtLeast(1)),
        ],
    )
});

#[derive(Debug, Default)]
pub struct ConsentVersionResource;

fn entries(value: &Value) -> impl Iterator<Item = &ObjectValue> {
    value
        .as_elements()
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_object().ok())
}

fn check_rules(config: &ObjectValue, diags: &mut Diagnostics) {
    let Some(consent_type) = config.str_of("consent_type") else {
        return;
    };
    let scoped = consent_type == "SCOPES";
    for field in ["scopes", "required_fields"] {
        let value = config.get(field);
        if scoped && value.is_null() {
            diags.attribute_error(
                AttrPath::root(field),
                "Missing required argument",
                format!("attribute '{field}' is required when consent_type is 'SCOPES'"),
            );
        } else if !scoped && !value.is_null() {
            diags.attribute_error(
                AttrPath::root(field),
                "Invalid Attribute Combination",
                format!("attribute '{field}' not supported when consent_type is '{consent_type}'"),
            );
        }
    }

    let mut seen = BTreeSet::new();
    for (i, entry) in entries(config.get(LOCALES)).enumerate() {
        let path = AttrPath::root(LOCALES).index(i);
        let url = entry.get("url");
        if scoped && !url.is_null() {
            diags.attribute_error(
                path.attr("url"),
                "Invalid Attribute Combination",
                "attribute 'url' not supported when consent_type is 'SCOPES'",
            );
        } else if !scoped && url.is_null() {
            diags.attribute_error(
                path.attr("url"),
                "Missing required argument",
                "attribute 'url' is required when consent_type is 'URL'",
            );
        }
        if let Some(locale) = entry.str_of("locale")
            && !seen.insert(locale)
        {
            diags.attribute_error(
                path.attr("locale"),
                "Duplicate locale",
                format!("locale '{locale}' is listed more than once"),
            );
        }
    }
}

/// Wire entries of `consent_locales`, tagged with the owning version.
fn locale_payloads(locales: Option<Json>, consent_id: &str, version_id: &str) -> Vec<Record> {
    let Some(Json::Array(items)) = locales else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Json::Object(mut entry) => {
                entry.insert("consent_id".to_owned(), Json::from(consent_id));
                entry.insert("consent_version_id".to_owned(), Json::from(version_id));
                Some(entry)
            }
            _ => None,
        })
        .collect()
}

#[async_trait]
impl Resource for ConsentVersionResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    fn validate_config(&self, config: &ObjectValue, diags: &mut Diagnostics) {
        check_rules(config, diags);
    }

    fn complete_plan(&self, plan: &mut ObjectValue) {
        fill_language(plan, LOCALES);
    }

    async fn create(&self, api: &ApiClient, mut record: Record, plan: &ObjectValue) -> Result<Record, DomainError> {
        let gateway = ConsentGateway::new(api);
        let consent_id = key(plan, "consent_id")?;
        let locales = record.remove(LOCALES);
        let mut version = gateway.create_version(record).await?;
        let version_id = str_member(&version, "_id", "v2/consent/versions")?.to_owned();

        let mut saved = Vec::new();
        for entry in locale_payloads(locales, consent_id, &version_id) {
            saved.push(Json::Object(gateway.put_locale(entry, false).await?));
        }
        version.insert(LOCALES.to_owned(), Json::Array(saved));
        Ok(version)
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        let gateway = ConsentGateway::new(api);
        let version_id = key(state, "id")?;
        let mut version = gateway.get_version(version_id).await?;

        let gateway = &gateway;
        let lookups = entries(state.get(LOCALES))
            .filter_map(|entry| entry.str_of("locale"))
            .map(|locale| async move {
                match gateway.get_locale(version_id, locale).await {
                    Ok(saved) => Ok(Some(Json::Object(saved))),
                    Err(err) if err.is_not_found() => {
                        tracing::debug!(locale, "consent locale no longer exists");
                        Ok(None)
                    }
                    Err(err) => Err(err),
                }
            });
        let found: Vec<Json> = try_join_all(lookups).await?.into_iter().flatten().collect();
        if !found.is_empty() {
            version.insert(LOCALES.to_owned(), Json::Array(found));
        }
        Ok(version)
    }

    async fn update(
        &self,
        api: &ApiClient,
        mut record: Record,
        plan: &ObjectValue,
        prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        let gateway = ConsentGateway::new(api);
        let consent_id = key(plan, "consent_id")?;
        let version_id = key(prior, "id")?;
        let existing: BTreeSet<&str> = entries(prior.get(LOCALES))
            .filter_map(|e| e.str_of("locale"))
            .collect();

        let mut saved = Vec::new();
        for entry in locale_payloads(record.remove(LOCALES), consent_id, version_id) {
            let update = entry
                .get("locale")
                .and_then(Json::as_str)
                .is_some_and(|l| existing.contains(l));
            saved.push(Json::Object(gateway.put_locale(entry, update).await?));
        }
        record.insert(LOCALES.to_owned(), Json::Array(saved));
        Ok(record)
    }

    async fn delete(&self, _api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        tracing::info!(
            id = state.str_of("id").unwrap_or_default(),
            "consent versions cannot be deleted, removing from state only"
        );
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        split_import_id(id, &["consent_id", "id"])
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn locale(code: &str, url: Option<&str>) -> Value {
        let mut entry = ObjectValue::new().with("locale", code).with("content", "text");
        if let Some(url) = url {
            entry.set("url", Value::from(url));
        }
        Value::Object(entry)
    }

    fn run(config: &ObjectValue) -> Diagnostics {
        let mut diags = Diagnostics::new();
        check_rules(config, &mut diags);
        diags
    }

    #[test]
    fn url_versions_reject_scopes() {
        let config = ObjectValue::new()
            .with("consent_type", "URL")
            .with("scopes", Value::string_set(["s1"]))
            .with(LOCALES, Value::set([locale("en", Some("https://acme.example/terms"))]));
        let diags = run(&config);
        let errors: Vec<_> = diags.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].detail, "attribute 'scopes' not supported when consent_type is 'URL'");
    }

    #[test]
    fn scope_versions_need_scopes_and_no_urls() {
        let config = ObjectValue::new()
            .with("consent_type", "SCOPES")
            .with(LOCALES, Value::set([locale("en", Some("https://x"))]));
        let paths: Vec<String> = run(&config)
            .errors()
            .filter_map(|d| d.path.as_ref().map(ToString::to_string))
            .collect();
        assert_eq!(paths, ["scopes", "required_fields", "consent_locales[0].url"]);
    }

    #[test]
    fn duplicate_locales_are_rejected() {
        let config = ObjectValue::new()
            .with("consent_type", "URL")
            .with(
                LOCALES,
                Value::list([locale("de", Some("https://a")), locale("de", Some("https://b"))]),
            );
        let diags = run(&config);
        assert!(diags.errors().any(|d| d.summary == "Duplicate locale"));
    }

    #[test]
    fn locale_payloads_carry_the_version() {
        let json = serde_json::json!([{ "locale": "en" }]);
        let payloads = locale_payloads(Some(json), "c1", "v1");
        assert_eq!(payloads[0]["consent_version_id"], "v1");
        assert_eq!(payloads[0]["consent_id"], "c1");
    }
}
