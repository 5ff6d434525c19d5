pub use login_wrapper_types::prelude::*;

pub use crate::app::App;
pub use crate::extract::{Auth, OptionalAuth};

// vim: ts=4
