//! Logging setup. Output goes to stderr; stdout belongs to the host protocol.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::ProviderConfig;

const DEFAULT_FILTER: &str = "info";
const DEBUG_FILTER: &str = "info,cidaas_provider=debug,provider_kit=debug,provider_http=debug";

/// Filter used when `RUST_LOG` is not set.
#[must_use]
pub fn default_filter(config: &ProviderConfig) -> &'static str {
    if config.debug { DEBUG_FILTER } else { DEFAULT_FILTER }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over the
/// debug flag. A subscriber installed earlier is left in place.
pub fn init_logging(config: &ProviderConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(config)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();

    if installed.is_ok() {
        tracing::debug!(debug = config.debug, "logging initialized");
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_selects_debug_filter() {
        let mut cfg = ProviderConfig::default();
        assert_eq!(default_filter(&cfg), "info");
        cfg.debug = true;
        assert!(default_filter(&cfg).contains("cidaas_provider=debug"));
    }

    #[test]
    fn init_is_repeatable() {
        let cfg = ProviderConfig::default();
        init_logging(&cfg);
        init_logging(&cfg);
    }
}
