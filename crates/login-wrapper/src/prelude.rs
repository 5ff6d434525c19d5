pub use login_wrapper_core::prelude::*;

// vim: ts=4
