//! Login Wrapper enriches a site login with configurable URLs.
//!
//! # Features
//!
//! - Login page URL used by the contextual menu link
//! - Redirect after login, bypassed for principals managing options
//! - Redirect after logout, carried by the generated logout link
//! - Contextual login/logout menu item (`#sukellosloginout#`)
//!
//! Settings are edited on the `tools` admin page, built with
//! [`login_wrapper_core`].

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub use login_wrapper_types::auth_adapter;
pub use login_wrapper_types::error;
pub use login_wrapper_types::option_adapter;

pub mod app;
pub mod handler;
pub mod menu;
pub mod prelude;
pub mod redirect;
pub mod routes;
pub mod settings;

pub use crate::app::{App, AppBuilder};

// vim: ts=4
