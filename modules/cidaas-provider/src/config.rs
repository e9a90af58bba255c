//! Provider configuration.
//!
//! Layered with figment: built-in defaults, an optional YAML file, then
//! `CIDAAS_`-prefixed environment variables.

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use provider_http::{DEFAULT_MAX_BODY_SIZE, DEFAULT_USER_AGENT};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Tenant URL, e.g. `https://acme.cidaas.de`.
    pub base_url: String,

    /// Static bearer token. Skipped when serialized.
    #[serde(skip_serializing)]
    pub access_token: Option<SecretString>,

    /// Per-call deadline in humantime syntax (`30s`, `2m`). Unbounded when absent.
    #[serde(with = "humantime_option")]
    pub request_timeout: Option<Duration>,

    pub user_agent: String,

    pub max_body_size: usize,

    /// Raises the default log level to debug.
    pub debug: bool,

    /// Accept `http://` base URLs. Only for local test servers.
    pub allow_insecure_http: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_token: None,
            request_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            debug: false,
            allow_insecure_http: false,
        }
    }
}

impl ProviderConfig {
    /// Defaults overlaid with `CIDAAS_*` environment variables.
    ///
    /// # Errors
    /// Returns [`DomainError::Config`] when a variable cannot be parsed.
    pub fn from_env() -> Result<Self, DomainError> {
        extract(Figment::new().merge(Serialized::defaults(Self::default())))
    }

    /// Defaults, then the YAML file at `path`, then `CIDAAS_*` variables.
    ///
    /// # Errors
    /// Returns [`DomainError::Config`] for unreadable files, unknown keys or bad values.
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        extract(
            Figment::new()
                .merge(Serialized::defaults(Self::default()))
                .merge(Yaml::file_exact(path)),
        )
    }

    /// Parsed tenant URL, normalized to end with `/` so relative paths join below it.
    ///
    /// # Errors
    /// Returns [`DomainError::Config`] for a missing or malformed URL, or a
    /// plain-HTTP URL when insecure HTTP is not allowed.
    pub fn base_url(&self) -> Result<Url, DomainError> {
        let raw = self.base_url.trim();
        if raw.is_empty() {
            return Err(DomainError::config("base_url is required (set CIDAAS_BASE_URL)"));
        }
        let mut url = Url::parse(raw)
            .map_err(|e| DomainError::config(format!("base_url '{raw}' is not a valid URL: {e}")))?;
        match url.scheme() {
            "https" => {}
            "http" if self.allow_insecure_http => {}
            other => {
                return Err(DomainError::config(format!(
                    "base_url must use https, got '{other}'"
                )));
            }
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// # Errors
    /// Returns [`DomainError::Config`] describing the first invalid setting.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.base_url()?;
        if self.max_body_size == 0 {
            return Err(DomainError::config("max_body_size must be greater than zero"));
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(DomainError::config("request_timeout must be greater than zero"));
        }
        Ok(())
    }
}

fn extract(figment: Figment) -> Result<ProviderConfig, DomainError> {
    let config: ProviderConfig = figment
        .merge(Env::prefixed("CIDAAS_"))
        .extract()
        .map_err(|e| DomainError::config(format!("invalid provider configuration: {e}")))?;
    tracing::debug!(
        base_url = %config.base_url,
        has_token = config.access_token.is_some(),
        debug = config.debug,
        "provider configuration loaded"
    );
    Ok(config)
}

mod humantime_option {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&humantime::format_duration(*d).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|s| humantime::parse_duration(&s).map_err(de::Error::custom))
            .transpose()
    }
}
