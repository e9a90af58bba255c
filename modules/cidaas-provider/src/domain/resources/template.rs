//! `cidaas_template`: custom and system message templates.
//!
//! System templates can only take combinations the tenant's master list
//! offers for their template group; the plan fetches that list and rejects
//! anything else before a write is attempted.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use provider_kit::{AttrPath, Attribute, Diagnostics, ObjectValue, Record, Schema, Validator, WireCase};
use serde_json::Value as Json;

use super::fill_entry_language;
use crate::domain::error::DomainError;
use crate::domain::resource::{Resource, key, split_import_id};
use crate::infra::api::ApiClient;
use crate::infra::gateway::template::{SystemTemplateSlot, TemplateGateway, slots};

const CUSTOM_TYPES: &[&str] = &["EMAIL", "SMS", "IVR", "PUSH"];
const SYSTEM_ONLY: &[&str] = &["group_id", "processing_type", "verification_type", "usage_type"];

pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "cidaas_template",
        WireCase::Snake,
        vec![
            Attribute::string("id").read_only().wire("_id"),
            Attribute::string("locale").required().identifier(),
            Attribute::string("language").computed(),
            Attribute::string("template_key")
                .required()
                .identifier()
                .validate(Validator::non_empty()),
            Attribute::string("template_type").required().identifier(),
            Attribute::string("content").required(),
            Attribute::string("subject"),
            Attribute::string("template_owner").read_only(),
            Attribute::string("group_id"),
            Attribute::string("processing_type"),
            Attribute::string("verification_type"),
            Attribute::string("usage_type"),
            Attribute::bool("is_system_template").default(false),
        ],
    )
});

#[derive(Debug, Default)]
pub struct TemplateResource;

fn is_system(obj: &ObjectValue) -> bool {
    obj.bool_of("is_system_template").unwrap_or(false)
}

fn check_rules(config: &ObjectValue, diags: &mut Diagnostics) {
    if let Some(ty) = config.str_of("template_type") {
        let subject = config.get("subject");
        if ty == "EMAIL" && subject.is_null() {
            diags.attribute_error(
                AttrPath::root("subject"),
                "Missing required argument",
                "attribute 'subject' is required when template_type is 'EMAIL'",
            );
        } else if ty != "EMAIL" && !subject.is_null() {
            diags.attribute_error(
                AttrPath::root("subject"),
                "Invalid Attribute Combination",
                format!("attribute 'subject' not supported when template_type is '{ty}'"),
            );
        }
    }

    if config.get("is_system_template").is_unknown() {
        return;
    }
    if is_system(config) {
        for field in ["group_id", "processing_type"] {
            if config.get(field).is_null() {
                diags.attribute_error(
                    AttrPath::root(field),
                    "Missing required argument",
                    format!("attribute '{field}' is required for system templates"),
                );
            }
        }
    } else {
        // System template types come from the tenant's master list.
        Validator::one_of(CUSTOM_TYPES).check(
            &AttrPath::root("template_type"),
            config.get("template_type"),
            false,
            diags,
        );
        for field in SYSTEM_ONLY {
            if !config.get(field).is_null() {
                diags.attribute_error(
                    AttrPath::root(*field),
                    "Invalid Attribute Combination",
                    format!("attribute '{field}' is only supported when is_system_template is true"),
                );
            }
        }
    }
}

fn matches_slot(plan: &ObjectValue, slot: &SystemTemplateSlot) -> bool {
    plan.str_of("template_key") == Some(slot.template_key.as_str())
        && plan.str_of("template_type") == Some(slot.template_type.as_str())
        && plan.str_of("processing_type") == Some(slot.processing_type.as_str())
        && plan.str_of("verification_type") == slot.verification_type.as_deref()
        && plan.str_of("usage_type") == slot.usage_type.as_deref()
}

/// Explains why no master-list slot matches the planned combination.
fn report_mismatch(plan: &ObjectValue, group_id: &str, available: &[SystemTemplateSlot], diags: &mut Diagnostics) {
    let template_key = plan.str_of("template_key").unwrap_or_default();
    let same_key: Vec<String> = available
        .iter()
        .filter(|s| s.template_key == template_key)
        .map(ToString::to_string)
        .collect();
    if same_key.is_empty() {
        let keys: BTreeSet<&str> = available.iter().map(|s| s.template_key.as_str()).collect();
        let keys: Vec<&str> = keys.into_iter().collect();
        diags.attribute_error(
            AttrPath::root("template_key"),
            "Invalid system template",
            format!(
                "template_key '{template_key}' is not available in template group '{group_id}'; valid keys: [{}]",
                keys.join(", ")
            ),
        );
    } else {
        diags.attribute_error(
            AttrPath::root("template_key"),
            "Invalid system template",
            format!(
                "no system template in group '{group_id}' matches the planned combination; \
                 allowed (key/type/processing[/verification][/usage]): [{}]",
                same_key.join(", ")
            ),
        );
    }
}

fn lookup(state: &ObjectValue) -> Result<Record, DomainError> {
    let mut query = Record::new();
    for name in ["template_key", "template_type", "locale"] {
        query.insert(name.to_owned(), Json::from(key(state, name)?));
    }
    if let Some(group_id) = state.str_of("group_id") {
        query.insert("group_id".to_owned(), Json::from(group_id));
    }
    Ok(query)
}

#[async_trait]
impl Resource for TemplateResource {
    fn schema(&self) -> &'static Schema {
        &SCHEMA
    }

    fn validate_config(&self, config: &ObjectValue, diags: &mut Diagnostics) {
        check_rules(config, diags);
    }

    fn complete_plan(&self, plan: &mut ObjectValue) {
        fill_entry_language(plan);
    }

    async fn check_plan(&self, api: &ApiClient, plan: &ObjectValue, diags: &mut Diagnostics) -> Result<(), DomainError> {
        if !is_system(plan) {
            return Ok(());
        }
        let Some(group_id) = plan.str_of("group_id") else {
            return Ok(());
        };
        let master = TemplateGateway::new(api).master_list(group_id).await?;
        let available = slots(&master);
        if !available.iter().any(|slot| matches_slot(plan, slot)) {
            report_mismatch(plan, group_id, &available, diags);
        }
        Ok(())
    }

    async fn create(&self, api: &ApiClient, record: Record, plan: &ObjectValue) -> Result<Record, DomainError> {
        TemplateGateway::new(api).save(record, is_system(plan)).await
    }

    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError> {
        TemplateGateway::new(api).find(lookup(state)?).await
    }

    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        plan: &ObjectValue,
        _prior: &ObjectValue,
    ) -> Result<Record, DomainError> {
        TemplateGateway::new(api).save(record, is_system(plan)).await
    }

    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError> {
        if is_system(state) {
            tracing::info!(
                template_key = state.str_of("template_key").unwrap_or_default(),
                "system templates cannot be deleted, removing from state only"
            );
            return Ok(());
        }
        TemplateGateway::new(api)
            .delete(key(state, "template_key")?, key(state, "template_type")?)
            .await
    }

    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError> {
        split_import_id(id, &["template_key", "template_type", "locale"])
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use provider_kit::Value;

    fn run(config: &ObjectValue) -> Vec<String> {
        let mut diags = Diagnostics::new();
        check_rules(config, &mut diags);
        diags.errors().map(|d| d.path.as_ref().unwrap().to_string()).collect()
    }

    fn email() -> ObjectValue {
        ObjectValue::new()
            .with("template_key", "WELCOME")
            .with("template_type", "EMAIL")
            .with("locale", "en-US")
            .with("content", "<p>hi</p>")
    }

    #[test]
    fn email_templates_need_a_subject() {
        assert_eq!(run(&email()), ["subject"]);
        assert!(run(&email().with("subject", "Welcome")).is_empty());
        let sms = email().with("template_type", "SMS").with("subject", "Welcome");
        assert_eq!(run(&sms), ["subject"]);
    }

    #[test]
    fn custom_templates_reject_system_fields() {
        let config = email().with("subject", "s").with("usage_type", "GENERAL");
        assert_eq!(run(&config), ["usage_type"]);
    }

    #[test]
    fn system_templates_need_group_and_processing_type() {
        let config = email().with("subject", "s").with("is_system_template", true);
        assert_eq!(run(&config), ["group_id", "processing_type"]);
    }

    #[test]
    fn slot_matching_compares_the_full_tuple() {
        let slot = SystemTemplateSlot {
            template_key: "VERIFY_USER".to_owned(),
            template_type: "EMAIL".to_owned(),
            processing_type: "GENERAL".to_owned(),
            verification_type: Some("EMAIL".to_owned()),
            usage_type: None,
        };
        let plan = ObjectValue::new()
            .with("template_key", "VERIFY_USER")
            .with("template_type", "EMAIL")
            .with("processing_type", "GENERAL")
            .with("verification_type", "EMAIL");
        assert!(matches_slot(&plan, &slot));
        assert!(!matches_slot(&plan.clone().with("usage_type", "X"), &slot));
        assert!(!matches_slot(&plan.with("verification_type", Value::Null), &slot));
    }

    #[test]
    fn unknown_keys_list_the_valid_ones() {
        let available = vec![SystemTemplateSlot {
            template_key: "VERIFY_USER".to_owned(),
            template_type: "EMAIL".to_owned(),
            processing_type: "GENERAL".to_owned(),
            verification_type: None,
            usage_type: None,
        }];
        let plan = ObjectValue::new().with("template_key", "K").with("template_type", "T");
        let mut diags = Diagnostics::new();
        report_mismatch(&plan, "default", &available, &mut diags);
        let detail = &diags.errors().next().unwrap().detail;
        assert!(detail.contains("'K'"));
        assert!(detail.contains("[VERIFY_USER]"));
    }
}
