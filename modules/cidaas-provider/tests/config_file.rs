#![allow(clippy::unwrap_used, clippy::expect_used, clippy::use_debug)]

//! A provider built from a YAML file plus environment, used against a mock tenant.

use std::io::Write;

use cidaas_provider::{Provider, ProviderConfig};
use httpmock::prelude::*;
use provider_kit::{HostRequest, ObjectValue};
use serde_json::json;

#[tokio::test]
async fn file_and_env_configure_a_working_provider() -> anyhow::Result<()> {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET)
            .path("/roles-srv/role")
            .query_param("role", "admin")
            .header("authorization", "Bearer from-env");
        then.status(200).json_body(json!([{"role": "admin", "name": "Admin"}]));
    });

    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "base_url: {}", server.base_url())?;
    writeln!(file, "allow_insecure_http: true")?;
    writeln!(file, "request_timeout: 5s")?;

    let config = temp_env::with_vars(
        [("CIDAAS_ACCESS_TOKEN", Some("from-env")), ("CIDAAS_BASE_URL", None)],
        || ProviderConfig::load(file.path()),
    )?;
    let provider = Provider::from_config(&config)?;
    let role = provider
        .handler("cidaas_role")
        .ok_or_else(|| anyhow::anyhow!("cidaas_role is not registered"))?;

    let mut req = HostRequest::read(ObjectValue::new().with("role", "admin"));
    role.read(&mut req).await;

    lookup.assert_calls(1);
    let state = req
        .new_state()
        .ok_or_else(|| anyhow::anyhow!("read wrote no state: {:?}", req.diagnostics()))?;
    assert_eq!(state.str_of("name"), Some("Admin"));
    Ok(())
}

#[test]
fn missing_token_is_reported_before_any_call() -> anyhow::Result<()> {
    let config = temp_env::with_vars(
        [
            ("CIDAAS_BASE_URL", Some("https://acme.cidaas.de")),
            ("CIDAAS_ACCESS_TOKEN", None),
        ],
        ProviderConfig::from_env,
    )?;
    let err = Provider::from_config(&config).unwrap_err();
    assert!(err.to_string().contains("access_token"), "{err}");
    Ok(())
}
