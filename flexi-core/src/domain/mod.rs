//! Core domain types
//!
//! These mirror the entities the FlexiFaaS backend returns. They are shared
//! between the HTTP client (decodes them) and the poller (interprets them).

pub mod execution;
pub mod function;
pub mod user;
