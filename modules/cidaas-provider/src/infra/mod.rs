//! Backend access: the tenant API client and one gateway per resource kind.

pub mod api;
pub mod gateway;
