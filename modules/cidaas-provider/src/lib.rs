#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Provider core for the cidaas IAM backend.
//!
//! A host plugin runtime drives plan, create, read, update, delete and import
//! for each `cidaas_*` resource kind through [`Provider::handler`]. The crate
//! validates configuration, talks to the tenant's REST API and turns every
//! outcome into state plus diagnostics.

pub mod config;
pub mod domain;
pub mod infra;
pub mod locale;
pub mod provider;
pub mod telemetry;

pub use config::ProviderConfig;
pub use domain::error::{DomainError, ErrorKind};
pub use domain::reconcile::{PlanOutcome, ResourceHandler};
pub use infra::api::ApiClient;
pub use locale::language_for_locale;
pub use provider::Provider;
pub use telemetry::init_logging;
