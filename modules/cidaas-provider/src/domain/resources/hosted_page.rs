//! `cidaas_hosted_page`: a group of hosted login and registration pages.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{AttrPath, Attribute, Diagnostics, ObjectValue, Record, Schema, Validator, WireCase};

use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, simple_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::hosted_page::HostedPageGateway;

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_hosted_page",
        WireCase::Snake,
        vec![
            Attribute::string("hosted_page_group_name")
                .required()
                .identifier()
                .wire("_id")
                .validate(Validator::non_empty()),
            Attribute::string("default_locale").default("en-US"),
            Attribute::object_list(
                "hosted_pages",
                vec![
                    Attribute::string("hosted_page_id").required(),
                    Attribute::string("locale").default("en-US"),
                    Attribute::string("url").validate(Validator::matches("^https?://", "must be an http(s) URL")),
                    Attribute::string("content"),
                ],
            )
            .required()
            .validate(Validator::SizeAtLeast(1)),
            Attribute::timestamp("created_at").read_only().wire("createdTime"),
            Attribute::timestamp("updated_at").read_only().wire("updatedTime"),
        ],
    )
});

#[derive(Debug, Default)]
pub struct HostedPageResource;

#[async_trait]
impl Resource for HostedPageResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    fn validate_config(&self, config: &ObjectValue, diags: &mut Diagnostics) {
        let Ok(pages) = config.get("hosted_pages").as_elements() else {
            return;
        };
        let mut seen = BTreeSet::new();
        for (i, page) in pages.iter().enumerate() {
            let Ok(page) = page.as_object() else {
                continue;
            };
            let Some(id) = page.str_of("hosted_page_id") else {
                continue;
            };
            let locale = page.str_of("locale").unwrap_or("en-US");
            if !seen.insert((id, locale)) {
                diags.attribute_error(
                    AttrPath::root("hosted_pages").index(i),
                    "Duplicate hosted page",
                    format!("hosted page '{id}' is defined more than once for locale '{locale}'"),
                );
            }
        }
    }

    async fn create(&self, api: &ApiClient, record: Record, _plan: &ObjectValue) -> Result<Record, DomainError> {
        HostedPageGateway::new(api).upsert(record).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        HostedPageGateway::new(api)
            .get(key(state, "hosted_page_group_name")?)
            .await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        _plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        HostedPageGateway::new(api).upsert(record).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        HostedPageGateway::new(api)
            .delete(key(state, "hosted_page_group_name")?)
            .await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        simple_import_id(id, "hosted_page_group_name")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use provider_kit::Value;

    #[test]
    fn pages_are_unique_per_locale() {
        let page = |id: &str, locale: &str| {
            Value::Object(ObjectValue::new().with("hosted_page_id", id).with("locale", locale))
        };
        let config = ObjectValue::new().with(
            "hosted_pages",
            Value::list([page("login", "en-US"), page("login", "de-DE"), page("login", "en-US")]),
        );
        let mut diags = Diagnostics::new();
        HostedPageResource.validate_config(&config, &mut diags);
        let paths: Vec<String> = diags.errors().map(|d| d.path.as_ref().unwrap().to_string()).collect();
        assert_eq!(paths, ["hosted_pages[2]"]);
    }
}
