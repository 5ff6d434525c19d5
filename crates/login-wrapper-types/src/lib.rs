//! Shared types, adapter traits, and error types for the Login Wrapper server.
//!
//! The framework crate, the feature crate and every storage adapter depend on
//! this crate only, so adapters can be compiled without pulling in the web
//! stack of the server.

pub mod auth_adapter;
pub mod error;
pub mod option_adapter;
pub mod prelude;

// vim: ts=4
