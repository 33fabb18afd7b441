//! Flexi Core
//!
//! Core types and abstractions for the FlexiFaaS client tooling.
//!
//! This crate contains:
//! - Domain types: backend entities (execution records, functions, users)
//! - DTOs: request bodies sent to the backend
//! - Poll: the execution-status state machine, free of IO and timers

pub mod domain;
pub mod dto;
pub mod poll;
pub mod time;

/// Backend identifier of an uploaded function
pub type FunctionId = i64;

/// Backend identifier of a user
pub type UserId = i64;
