//! Data Transfer Objects sent to the backend

pub mod execution;
pub mod function;
