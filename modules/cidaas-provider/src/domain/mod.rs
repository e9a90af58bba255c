//! Reconciliation logic: the error taxonomy, the per-kind [`resource::Resource`]
//! hooks, the generic driver and every resource kind.

pub mod error;
pub mod reconcile;
pub mod resource;
pub mod resources;
