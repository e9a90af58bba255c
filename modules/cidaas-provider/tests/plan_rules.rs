#![allow(clippy::unwrap_used, clippy::expect_used, clippy::use_debug)]

//! Plan-time rules that must stop an operation before the backend is touched.

mod common;

use httpmock::prelude::*;
use provider_kit::{HostRequest, ObjectValue, Value};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use cidaas_provider::language_for_locale;
use common::{handler, provider};

fn first_error_path(diags: &provider_kit::Diagnostics) -> String {
    diags
        .errors()
        .next()
        .and_then(|d| d.path.as_ref())
        .map(ToString::to_string)
        .unwrap_or_default()
}

#[tokio::test]
async fn renaming_a_role_is_rejected_without_a_call() {
    let server = MockServer::start();
    let upsert = server.mock(|when, then| {
        when.method(POST).path("/roles-srv/role");
        then.status(200);
    });
    let provider = provider(&server);

    let prior = ObjectValue::new().with("role", "admin").with("name", "Admin");
    let plan = ObjectValue::new().with("role", "superadmin").with("name", "Admin");
    let mut req = HostRequest::update(plan.clone(), plan, prior);
    handler(&provider, "cidaas_role").update(&mut req).await;

    upsert.assert_calls(0);
    assert_eq!(req.state_writes(), 0);
    assert_eq!(first_error_path(req.diagnostics()), "role");
    let err = req.diagnostics().errors().next().unwrap();
    assert!(err.detail.contains("\"admin\""), "{}", err.detail);
    assert!(err.detail.contains("\"superadmin\""), "{}", err.detail);
}

#[tokio::test]
async fn identifiers_are_immutable_across_kinds() {
    let server = MockServer::start();
    let provider = provider(&server);
    let cases = [
        (
            "cidaas_scope_group",
            ObjectValue::new().with("group_name", "old"),
            ObjectValue::new().with("group_name", "new"),
            "group_name",
        ),
        (
            "cidaas_consent",
            ObjectValue::new()
                .with("id", "c-1")
                .with("consent_group_id", "g-1")
                .with("name", "terms"),
            ObjectValue::new().with("consent_group_id", "g-2").with("name", "terms"),
            "consent_group_id",
        ),
        (
            "cidaas_group_type",
            ObjectValue::new().with("group_type", "team").with("role_mode", "any_roles"),
            ObjectValue::new().with("group_type", "squad").with("role_mode", "any_roles"),
            "group_type",
        ),
    ];
    for (kind, prior, config, attr) in cases {
        let outcome = handler(&provider, kind)
            .plan(&config, Some(&prior), &CancellationToken::new())
            .await;
        assert!(outcome.planned.is_none(), "{kind}");
        let paths: Vec<String> = outcome
            .diagnostics
            .errors()
            .filter_map(|d| d.path.as_ref().map(ToString::to_string))
            .collect();
        assert!(paths.iter().any(|p| p == attr), "{kind}: {paths:?}");
    }
}

#[tokio::test]
async fn url_consent_versions_reject_scopes() {
    let server = MockServer::start();
    let provider = provider(&server);
    let entry = ObjectValue::new()
        .with("locale", "en")
        .with("url", "https://acme.example/terms");
    let config = ObjectValue::new()
        .with("consent_id", "c-1")
        .with("version", 1.0)
        .with("consent_type", "URL")
        .with("scopes", Value::string_set(["s1"]))
        .with("consent_locales", Value::set([Value::Object(entry)]));

    let diags = handler(&provider, "cidaas_consent_version").validate_config(&config);
    let messages: Vec<&str> = diags.errors().map(|d| d.detail.as_str()).collect();
    assert_eq!(messages, ["attribute 'scopes' not supported when consent_type is 'URL'"]);
}

#[tokio::test]
async fn webhook_auth_type_needs_matching_config() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST).path("/webhook-srv/webhook");
        then.status(200);
    });
    let provider = provider(&server);
    let plan = ObjectValue::new()
        .with("auth_type", "APIKEY")
        .with("url", "https://hooks.acme.example/cidaas")
        .with("events", Value::string_set(["ACCOUNT_MODIFIED"]))
        .with("apikey_config", Value::Null);
    let mut req = HostRequest::create(plan.clone(), plan);
    handler(&provider, "cidaas_webhook").create(&mut req).await;

    create.assert_calls(0);
    assert_eq!(first_error_path(req.diagnostics()), "apikey_config");
    assert!(req.diagnostics().errors().next().unwrap().detail.contains("apikey_config"));
}

#[tokio::test]
async fn unknown_system_template_lists_valid_keys() {
    let server = MockServer::start();
    let master = server.mock(|when, then| {
        when.method(GET).path("/templates-srv/master/settings/default");
        then.status(200).json_body(json!([
            {"template_key": "VERIFY_USER", "template_types": [
                {"template_type": "EMAIL", "processing_types": [{"processing_type": "GENERAL"}]}
            ]},
            {"template_key": "RESET_PASSWORD", "template_types": [
                {"template_type": "EMAIL", "processing_types": [{"processing_type": "GENERAL"}]}
            ]}
        ]));
    });
    let save = server.mock(|when, then| {
        when.method(POST).path("/templates-srv/template/system");
        then.status(200);
    });
    let provider = provider(&server);
    let plan = ObjectValue::new()
        .with("is_system_template", true)
        .with("template_key", "K")
        .with("template_type", "T")
        .with("content", "<p>hi</p>")
        .with("locale", "en-us")
        .with("group_id", "default")
        .with("processing_type", "GENERAL");
    let mut req = HostRequest::create(plan.clone(), plan);
    handler(&provider, "cidaas_template").create(&mut req).await;

    master.assert_calls(1);
    save.assert_calls(0);
    assert_eq!(req.state_writes(), 0);
    let err = req.diagnostics().errors().next().unwrap();
    assert_eq!(first_error_path(req.diagnostics()), "template_key");
    assert!(err.detail.contains("[RESET_PASSWORD, VERIFY_USER]"), "{}", err.detail);
}

#[tokio::test]
async fn custom_templates_reject_system_fields() {
    let server = MockServer::start();
    let provider = provider(&server);
    let config = ObjectValue::new()
        .with("template_key", "WELCOME")
        .with("template_type", "SMS")
        .with("content", "hi")
        .with("locale", "de-de")
        .with("processing_type", "GENERAL");
    let diags = handler(&provider, "cidaas_template").validate_config(&config);
    assert_eq!(first_error_path(&diags), "processing_type");
}

#[tokio::test]
async fn custom_templates_use_the_fixed_type_list() {
    let server = MockServer::start();
    let provider = provider(&server);
    let config = ObjectValue::new()
        .with("template_key", "WELCOME")
        .with("template_type", "T")
        .with("content", "hi")
        .with("locale", "de-de");
    let diags = handler(&provider, "cidaas_template").validate_config(&config);
    assert_eq!(first_error_path(&diags), "template_type");
    assert!(diags.errors().next().unwrap().detail.contains("\"SMS\""));
}

#[tokio::test]
async fn template_language_follows_locale() {
    let server = MockServer::start();
    let provider = provider(&server);
    let config = ObjectValue::new()
        .with("template_key", "WELCOME")
        .with("template_type", "SMS")
        .with("content", "hi")
        .with("locale", "de-CH");
    let outcome = handler(&provider, "cidaas_template")
        .plan(&config, None, &CancellationToken::new())
        .await;
    let planned = outcome.planned.unwrap();
    assert_eq!(planned.str_of("language"), Some("de"));
    assert_eq!(planned.bool_of("is_system_template"), Some(false));
}

#[test]
fn locales_map_to_languages() {
    assert_eq!(language_for_locale("de-CH"), "de");
    assert_eq!(language_for_locale(""), "en");
    assert_eq!(language_for_locale("xx-YY"), "en");
}

#[tokio::test]
async fn user_group_with_children_is_not_deleted() {
    let server = MockServer::start();
    let children = server.mock(|when, then| {
        when.method(POST)
            .path("/groups-srv/graph/usergroups/list")
            .json_body(json!({"parentId": "sales"}));
        then.status(200).json_body(json!([{"groupId": "sales-emea"}, {"groupId": "sales-apac"}]));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/groups-srv/graph/usergroups/sales");
        then.status(200);
    });
    let provider = provider(&server);
    let mut req = HostRequest::delete(ObjectValue::new().with("group_id", "sales"));
    handler(&provider, "cidaas_user_group").delete(&mut req).await;

    children.assert_calls(1);
    delete.assert_calls(0);
    assert_eq!(req.state_writes(), 0);
    let err = req.diagnostics().errors().next().unwrap();
    assert!(err.detail.contains("sales-emea, sales-apac"), "{}", err.detail);
}

#[tokio::test]
async fn password_policies_must_be_imported() {
    let server = MockServer::start();
    let provider = provider(&server);
    let plan = ObjectValue::new().with("policy_name", "default");
    let mut req = HostRequest::create(plan.clone(), plan);
    handler(&provider, "cidaas_password_policy").create(&mut req).await;
    assert_eq!(req.state_writes(), 0);
    let err = req.diagnostics().errors().next().unwrap();
    assert!(err.summary.contains("invalid configuration"), "{}", err.summary);
    assert!(err.detail.contains("import"));
}
