//! Registry of the resource kinds the provider serves.

use std::collections::BTreeMap;
use std::sync::Arc;

use provider_kit::Schema;

use crate::config::ProviderConfig;
use crate::domain::error::DomainError;
use crate::domain::reconcile::{Driver, ResourceHandler};
use crate::domain::resource::Resource;
use crate::domain::resources::{
    app::AppResource, consent::ConsentResource, consent_group::ConsentGroupResource,
    consent_version::ConsentVersionResource, custom_provider::CustomProviderResource,
    group_type::GroupTypeResource, hosted_page::HostedPageResource,
    password_policy::PasswordPolicyResource, registration_field::RegistrationFieldResource,
    role::RoleResource, scope::ScopeResource, scope_group::ScopeGroupResource,
    social_provider::SocialProviderResource, template::TemplateResource,
    template_group::TemplateGroupResource, user_group::UserGroupResource,
    webhook::WebhookResource,
};
use crate::infra::api::ApiClient;

/// Every resource kind bound to one tenant client.
///
/// Handlers are independent; the host may drive several at once.
#[derive(Clone)]
pub struct Provider {
    handlers: BTreeMap<&'static str, Arc<dyn ResourceHandler>>,
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("resource_types", &self.handlers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Provider {
    /// # Errors
    /// Returns [`DomainError::Config`] for an invalid configuration and
    /// [`DomainError::Transport`] when the HTTP client cannot be built.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, DomainError> {
        Ok(Self::new(ApiClient::from_config(config)?))
    }

    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let mut provider = Self {
            handlers: BTreeMap::new(),
        };
        provider.register(AppResource, &api);
        provider.register(RoleResource, &api);
        provider.register(ScopeResource, &api);
        provider.register(ScopeGroupResource, &api);
        provider.register(ConsentGroupResource, &api);
        provider.register(ConsentResource, &api);
        provider.register(ConsentVersionResource, &api);
        provider.register(CustomProviderResource, &api);
        provider.register(SocialProviderResource, &api);
        provider.register(TemplateResource, &api);
        provider.register(TemplateGroupResource, &api);
        provider.register(HostedPageResource, &api);
        provider.register(UserGroupResource, &api);
        provider.register(GroupTypeResource, &api);
        provider.register(RegistrationFieldResource, &api);
        provider.register(WebhookResource, &api);
        provider.register(PasswordPolicyResource, &api);
        tracing::debug!(kinds = provider.handlers.len(), base_url = %api.base_url(), "provider ready");
        provider
    }

    fn register<R: Resource>(&mut self, resource: R, api: &ApiClient) {
        let handler = Driver::new(resource, api.clone());
        self.handlers.insert(handler.type_name(), Arc::new(handler));
    }

    /// Registered type names in alphabetical order.
    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    #[must_use]
    pub fn schema(&self, type_name: &str) -> Option<&'static Schema> {
        self.handlers.get(type_name).map(|h| h.schema())
    }

    #[must_use]
    pub fn handler(&self, type_name: &str) -> Option<Arc<dyn ResourceHandler>> {
        self.handlers.get(type_name).cloned()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use secrecy::SecretString;

    /// Building the client spawns its buffer task, so callers need a runtime.
    fn provider() -> Provider {
        let config = ProviderConfig {
            base_url: "https://acme.cidaas.de".to_owned(),
            access_token: Some(SecretString::from("t".to_owned())),
            ..ProviderConfig::default()
        };
        Provider::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn registers_every_kind() {
        let provider = provider();
        let types: Vec<_> = provider.resource_types().collect();
        assert_eq!(types.len(), 17);
        assert!(types.contains(&"cidaas_app"));
        assert!(types.contains(&"cidaas_password_policy"));
        assert_eq!(provider.schema("cidaas_role").unwrap().type_name(), "cidaas_role");
        assert!(provider.handler("cidaas_unknown").is_none());
    }

    #[tokio::test]
    async fn every_schema_builds_and_names_an_identifier() {
        let provider = provider();
        for name in provider.resource_types() {
            let schema = provider.schema(name).unwrap();
            assert!(schema.identifiers().next().is_some(), "{name}");
        }
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let config = ProviderConfig {
            base_url: "https://acme.cidaas.de".to_owned(),
            ..ProviderConfig::default()
        };
        let err = Provider::from_config(&config).unwrap_err();
        assert_eq!(err.kind(), crate::domain::error::ErrorKind::ConfigInvalid);
    }
}
