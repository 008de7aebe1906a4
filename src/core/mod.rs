//! Shared foundations: configuration, error types, path containment.

pub mod config;
pub mod errors;
pub mod paths;
