#![allow(clippy::unwrap_used, clippy::expect_used, clippy::use_debug)]

//! Wire shape and state handling of the simpler resource kinds.

mod common;

use httpmock::prelude::*;
use provider_kit::{HostRequest, ObjectValue, Value};
use serde_json::json;

use common::{handler, provider};

#[tokio::test]
async fn role_round_trips_through_create_and_read() {
    let server = MockServer::start();
    let upsert = server.mock(|when, then| {
        when.method(POST)
            .path("/roles-srv/role")
            .json_body(json!({"role": "auditor", "name": "Auditor", "description": "read-only access"}));
        then.status(204);
    });
    let lookup = server.mock(|when, then| {
        when.method(GET).path("/roles-srv/role").query_param("role", "auditor");
        then.status(200).json_body(json!({
            "success": true,
            "status": 200,
            "data": [
                {"role": "admin", "name": "Admin"},
                {"role": "auditor", "name": "Auditor", "description": "read-only access"}
            ]
        }));
    });
    let provider = provider(&server);
    let role = handler(&provider, "cidaas_role");

    let plan = ObjectValue::new()
        .with("role", "auditor")
        .with("name", "Auditor")
        .with("description", "read-only access");
    let mut create = HostRequest::create(plan.clone(), plan.clone());
    role.create(&mut create).await;
    upsert.assert_calls(1);
    let created = create.new_state().unwrap().clone();

    let mut read = HostRequest::read(created.clone());
    role.read(&mut read).await;
    lookup.assert_calls(1);
    let observed = read.new_state().unwrap();
    for (name, value) in plan.iter() {
        assert_eq!(created.get(name), value, "{name}");
        assert_eq!(observed.get(name), value, "{name}");
    }
}

#[tokio::test]
async fn scope_uses_camel_case_and_fills_language() {
    let server = MockServer::start();
    let upsert = server.mock(|when, then| {
        when.method(POST).path("/scopes-srv/scope").json_body(json!({
            "scopeKey": "profile_read",
            "securityLevel": "PUBLIC",
            "localeWiseDescription": [{"locale": "de-CH", "language": "de", "title": "Profil"}]
        }));
        then.status(200).json_body(json!({
            "_id": "s-1",
            "scopeKey": "profile_read",
            "securityLevel": "PUBLIC",
            "requiredUserConsent": false,
            "localeWiseDescription": [{"locale": "de-CH", "language": "de", "title": "Profil"}]
        }));
    });
    let provider = provider(&server);
    let entry = ObjectValue::new().with("locale", "de-CH").with("title", "Profil");
    let plan = ObjectValue::new()
        .with("scope_key", "profile_read")
        .with("localized_descriptions", Value::list([Value::Object(entry)]));
    let mut req = HostRequest::create(plan.clone(), plan);
    handler(&provider, "cidaas_scope").create(&mut req).await;

    upsert.assert_calls(1);
    assert!(!req.diagnostics().has_errors(), "{:?}", req.diagnostics());
    let state = req.new_state().unwrap();
    assert_eq!(state.str_of("id"), Some("s-1"));
    assert_eq!(state.str_of("security_level"), Some("PUBLIC"));
    assert_eq!(state.bool_of("required_user_consent"), Some(false));
    let descriptions = state.get("localized_descriptions").as_elements().unwrap();
    assert_eq!(descriptions[0].as_object().unwrap().str_of("language"), Some("de"));
}

#[tokio::test]
async fn consent_version_posts_version_then_locales() {
    let server = MockServer::start();
    let version = server.mock(|when, then| {
        when.method(POST)
            .path("/consent-management-srv/v2/consent/versions")
            .json_body(json!({"consent_id": "c-1", "version": 1.0, "consent_type": "URL"}));
        then.status(201).json_body(json!({
            "_id": "v-1",
            "consent_id": "c-1",
            "version": 1.0,
            "consent_type": "URL"
        }));
    });
    let locale = server.mock(|when, then| {
        when.method(POST)
            .path("/consent-management-srv/v2/consent/locale")
            .json_body(json!({
                "locale": "en",
                "language": "en",
                "url": "https://acme.example/terms",
                "consent_id": "c-1",
                "consent_version_id": "v-1"
            }));
        then.status(204);
    });
    let provider = provider(&server);
    let entry = ObjectValue::new()
        .with("locale", "en")
        .with("url", "https://acme.example/terms");
    let plan = ObjectValue::new()
        .with("consent_id", "c-1")
        .with("version", 1.0)
        .with("consent_type", "URL")
        .with("consent_locales", Value::set([Value::Object(entry)]));
    let mut req = HostRequest::create(plan.clone(), plan);
    handler(&provider, "cidaas_consent_version").create(&mut req).await;

    version.assert_calls(1);
    locale.assert_calls(1);
    assert!(!req.diagnostics().has_errors(), "{:?}", req.diagnostics());
    let state = req.new_state().unwrap();
    assert_eq!(state.str_of("id"), Some("v-1"));
    assert_eq!(state.get("consent_locales").as_elements().unwrap().len(), 1);
}

#[tokio::test]
async fn consent_version_destroy_only_drops_state() {
    let server = MockServer::start();
    let provider = provider(&server);
    let prior = ObjectValue::new().with("id", "v-1").with("consent_id", "c-1");
    let mut req = HostRequest::delete(prior);
    handler(&provider, "cidaas_consent_version").delete(&mut req).await;
    assert_eq!(req.written_state(), Some(None));
    assert!(req.diagnostics().is_empty());
}

#[tokio::test]
async fn consent_import_splits_group_and_name() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET).path("/consent-management-srv/v2/consent/instance/g-1");
        then.status(200).json_body(json!([
            {"_id": "c-1", "consent_group_id": "g-1", "consent_name": "terms", "status": "ACTIVE"}
        ]));
    });
    let provider = provider(&server);
    let mut req = HostRequest::import("g-1:terms");
    handler(&provider, "cidaas_consent").import(&mut req).await;
    lookup.assert_calls(1);
    let state = req.new_state().unwrap();
    assert_eq!(state.str_of("id"), Some("c-1"));
    assert_eq!(state.str_of("name"), Some("terms"));
    assert_eq!(state.str_of("status"), Some("ACTIVE"));
}

#[tokio::test]
async fn malformed_composite_import_id_is_rejected() {
    let server = MockServer::start();
    let provider = provider(&server);
    let mut req = HostRequest::import("only-one-part");
    handler(&provider, "cidaas_consent").import(&mut req).await;
    assert_eq!(req.state_writes(), 0);
    let err = req.diagnostics().errors().next().unwrap();
    assert!(err.summary.contains("invalid configuration"), "{}", err.summary);
}

#[tokio::test]
async fn missing_import_target_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/webhook-srv/webhook");
        then.status(404);
    });
    let provider = provider(&server);
    let mut req = HostRequest::import("wh-404");
    handler(&provider, "cidaas_webhook").import(&mut req).await;
    assert_eq!(req.state_writes(), 0);
    let err = req.diagnostics().errors().next().unwrap();
    assert!(err.summary.contains("resource not found"), "{}", err.summary);
    assert!(err.detail.contains("wh-404"), "{}", err.detail);
}
