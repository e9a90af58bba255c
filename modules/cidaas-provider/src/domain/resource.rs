//! Per-kind reconciliation hooks.
//!
//! A [`Resource`] describes one kind: its schema, its cross-field rules and
//! how it maps onto backend calls. The generic driver in
//! [`reconcile`](super::reconcile) turns it into a host-facing handler.

use async_trait::async_trait;
use provider_kit::{Diagnostics, DriftPolicy, ObjectValue, Record, Schema, Value};

use super::error::DomainError;
use crate::infra::api::ApiClient;

#[async_trait]
pub trait Resource: Send + Sync + 'static {
    fn schema(&self) -> &'static Schema;

    fn drift_policy(&self) -> DriftPolicy {
        DriftPolicy::default()
    }

    /// Name of the state-only attribute holding common defaults, if any.
    fn common_defaults(&self) -> Option<&'static str> {
        None
    }

    /// Rules spanning several attributes. Runs before immutability checks.
    fn validate_config(&self, _config: &ObjectValue, _diags: &mut Diagnostics) {}

    /// Local plan completion after defaults, e.g. deriving `language` from `locale`.
    fn complete_plan(&self, _plan: &mut ObjectValue) {}

    /// Plan checks that need the backend. Returning an error aborts the plan.
    ///
    /// # Errors
    /// Backend failures while fetching reference data.
    async fn check_plan(
        &self,
        _api: &ApiClient,
        _plan: &ObjectValue,
        _diags: &mut Diagnostics,
    ) -> Result<(), DomainError> {
        Ok(())
    }

    /// Sends the expanded plan; returns the backend's view of the new object.
    ///
    /// # Errors
    /// Any [`DomainError`] from the gateway.
    async fn create(&self, api: &ApiClient, record: Record, plan: &ObjectValue) -> Result<Record, DomainError>;

    /// Fetches the object described by `state`.
    ///
    /// # Errors
    /// [`DomainError::NotFound`] when the object is gone.
    async fn read(&self, api: &ApiClient, state: &ObjectValue) -> Result<Record, DomainError>;

    /// # Errors
    /// Any [`DomainError`] from the gateway.
    async fn update(
        &self,
        api: &ApiClient,
        record: Record,
        plan: &ObjectValue,
        prior: &ObjectValue,
    ) -> Result<Record, DomainError>;

    /// Absence is reported as [`DomainError::NotFound`] and treated as success by the driver.
    ///
    /// # Errors
    /// Any [`DomainError`] from the gateway.
    async fn delete(&self, api: &ApiClient, state: &ObjectValue) -> Result<(), DomainError>;

    /// Minimal state the driver hands to `read` for an import.
    ///
    /// # Errors
    /// [`DomainError::Config`] for a malformed import id.
    fn import_state(&self, id: &str) -> Result<ObjectValue, DomainError>;

    /// Adjusts a freshly flattened state, e.g. mirroring a computed key into `id`.
    fn finish_state(&self, _state: &mut ObjectValue) {}
}

/// Known string attribute of a plan or state.
///
/// # Errors
/// [`DomainError::Config`] when the attribute is null or unknown.
pub fn key<'a>(obj: &'a ObjectValue, name: &str) -> Result<&'a str, DomainError> {
    obj.str_of(name)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::config(format!("attribute '{name}' is not set")))
}

/// Splits a composite import id (`a:b:c`) into the named string attributes.
///
/// # Errors
/// [`DomainError::Config`] naming the expected format when the part count is wrong.
pub fn split_import_id(id: &str, names: &[&'static str]) -> Result<ObjectValue, DomainError> {
    let parts: Vec<&str> = id.split(':').collect();
    if parts.len() != names.len() || parts.iter().any(|p| p.is_empty()) {
        return Err(DomainError::config(format!(
            "invalid import id '{id}', expected {}",
            names.join(":")
        )));
    }
    Ok(names
        .iter()
        .zip(parts)
        .map(|(name, part)| (*name, Value::from(part)))
        .collect())
}

/// Single-key import: `name = id`.
///
/// # Errors
/// [`DomainError::Config`] for an empty id.
pub fn simple_import_id(id: &str, name: &'static str) -> Result<ObjectValue, DomainError> {
    split_import_id(id, &[name])
}
