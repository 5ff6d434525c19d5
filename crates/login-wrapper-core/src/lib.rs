//! Settings-page framework for Login Wrapper.
//!
//! Pages hold typed items built by a factory from loosely typed
//! configuration. Fields persist through an option store, are cleaned by a
//! per-type sanitizer and render to admin markup. Submissions are guarded by
//! a capability check and an anti-forgery token.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod choices;
pub mod extract;
pub mod factory;
pub mod form;
pub mod handler;
pub mod hooks;
pub mod html;
pub mod item;
pub mod item_type;
pub mod license;
pub mod middleware;
pub mod nonce;
pub mod notices;
pub mod page;
pub mod prelude;
pub mod sanitize;
pub mod template;
pub mod value;

pub use app::{App, AppBuilderOpts, AppState};
pub use extract::{Auth, OptionalAuth};
pub use factory::ItemFactory;
pub use form::FormData;
pub use item::{Item, ItemConfig};
pub use page::{AdminPage, AdminRegistry, FrozenAdminRegistry, PageSettings, SubmitOutcome};
pub use template::TemplateEngine;
pub use value::FieldValue;

// vim: ts=4
