#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Building blocks for declarative resource providers.
//!
//! - [`Value`] / [`ObjectValue`]: tri-state (known, null, unknown) attribute values
//! - [`Schema`]: static per-resource declarations with validators and wire names
//! - [`plan`]: common-defaults merge, static defaults, immutability checks
//! - [`codec`]: expand plans into wire records and flatten responses into state
//! - [`host`]: the contract a plugin host offers to a reconciler
//!
//! Nothing here performs I/O.

pub mod codec;
pub mod diag;
pub mod host;
pub mod path;
pub mod plan;
mod redact;
pub mod schema;
pub mod value;

pub use codec::{DriftPolicy, Flatten, Operation, Record, empty_sentinel, expand, is_empty_sentinel};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use host::{HostRequest, ResourceRequest};
pub use path::AttrPath;
pub use redact::Redacted;
pub use schema::{AttrType, Attribute, Presence, Schema, Validator, WireCase, WireMode};
pub use value::{ObjectValue, Value, ValueError};
