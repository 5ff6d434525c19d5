//! App state type

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::license::{LicenseApi, LicenseManager};
use crate::nonce::NonceService;
use crate::page::FrozenAdminRegistry;
use crate::prelude::*;
use login_wrapper_types::auth_adapter::{AuthAdapter, AuthCtx};
use login_wrapper_types::option_adapter::OptionAdapter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,

	pub auth_adapter: Arc<dyn AuthAdapter>,
	pub option_adapter: Arc<dyn OptionAdapter>,
	pub license_api: Arc<dyn LicenseApi>,

	// Admin pages and their items
	pub admin: Arc<FrozenAdminRegistry>,
	pub licenses: LicenseManager,

	pub nonces: NonceService,
}

impl AppState {
	/// Anti-forgery token for `action`, bound to the principal
	pub fn nonce(&self, action: &str, auth: Option<&AuthCtx>) -> ClResult<String> {
		self.nonces.create(action, crate::page::principal(auth))
	}
}

pub type App = Arc<AppState>;

#[derive(Debug)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	/// Site root, with trailing slash
	pub home_url: Box<str>,
	pub login_url: Box<str>,
	/// Path of the logout endpoint, relative to `home_url`
	pub logout_path: Box<str>,
	pub nonce_lifetime: Duration,
	/// Served under the asset prefix of admin documents
	pub asset_dir: Box<Path>,
}

// vim: ts=4
