//! App builder - constructs and runs the Login Wrapper server

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::prelude::*;
use crate::{routes, settings};
pub use login_wrapper_core::app::{App, AppBuilderOpts, AppState, VERSION};
use login_wrapper_core::item::ItemDeps;
use login_wrapper_core::license::{HyperLicenseApi, LicenseApi, LicenseManager};
use login_wrapper_core::nonce::{self, NonceService};
use login_wrapper_core::notices::Notices;
use login_wrapper_core::page::AdminRegistry;
use login_wrapper_types::auth_adapter::AuthAdapter;
use login_wrapper_types::option_adapter::OptionAdapter;

pub struct Adapters {
	pub auth_adapter: Option<Arc<dyn AuthAdapter>>,
	pub option_adapter: Option<Arc<dyn OptionAdapter>>,
	pub license_api: Option<Arc<dyn LicenseApi>>,
}

pub struct AppBuilder {
	opts: AppBuilderOpts,
	secret: Option<Box<[u8]>>,
	adapters: Adapters,
}

impl AppBuilder {
	pub fn new() -> Self {
		// A second builder in the same process keeps the first subscriber
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppBuilderOpts {
				listen: "127.0.0.1:8080".into(),
				home_url: "http://localhost:8080/".into(),
				login_url: "".into(),
				logout_path: "logout".into(),
				nonce_lifetime: nonce::DEFAULT_LIFETIME,
				asset_dir: PathBuf::from("./assets").into(),
			},
			secret: None,
			adapters: Adapters { auth_adapter: None, option_adapter: None, license_api: None },
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	/// Site root. A trailing slash is added when missing.
	pub fn home_url(&mut self, home_url: impl Into<String>) -> &mut Self {
		let mut home_url: String = home_url.into();
		if !home_url.ends_with('/') {
			home_url.push('/');
		}
		self.opts.home_url = home_url.into();
		self
	}
	pub fn login_url(&mut self, login_url: impl Into<Box<str>>) -> &mut Self {
		self.opts.login_url = login_url.into();
		self
	}
	pub fn logout_path(&mut self, logout_path: impl Into<Box<str>>) -> &mut Self {
		self.opts.logout_path = logout_path.into();
		self
	}
	pub fn nonce_lifetime(&mut self, lifetime: Duration) -> &mut Self {
		self.opts.nonce_lifetime = lifetime;
		self
	}
	pub fn asset_dir(&mut self, asset_dir: impl Into<Box<std::path::Path>>) -> &mut Self {
		self.opts.asset_dir = asset_dir.into();
		self
	}
	/// Key of the anti-forgery tokens
	pub fn secret(&mut self, secret: impl AsRef<[u8]>) -> &mut Self {
		self.secret = Some(secret.as_ref().into());
		self
	}

	// Adapters
	pub fn auth_adapter(&mut self, auth_adapter: Arc<dyn AuthAdapter>) -> &mut Self {
		self.adapters.auth_adapter = Some(auth_adapter);
		self
	}
	pub fn option_adapter(&mut self, option_adapter: Arc<dyn OptionAdapter>) -> &mut Self {
		self.adapters.option_adapter = Some(option_adapter);
		self
	}
	pub fn license_api(&mut self, license_api: Arc<dyn LicenseApi>) -> &mut Self {
		self.adapters.license_api = Some(license_api);
		self
	}

	/// Register the settings pages and assemble the shared state
	pub async fn build(self) -> ClResult<App> {
		let Some(auth_adapter) = self.adapters.auth_adapter else {
			error!("FATAL: No auth adapter configured");
			return Err(Error::Internal("No auth adapter configured".to_string()));
		};
		let Some(option_adapter) = self.adapters.option_adapter else {
			error!("FATAL: No option adapter configured");
			return Err(Error::Internal("No option adapter configured".to_string()));
		};
		let license_api = self.adapters.license_api.unwrap_or_else(|| Arc::new(HyperLicenseApi::new()));

		let mut opts = self.opts;
		if opts.login_url.is_empty() {
			opts.login_url = format!("{}wp-login.php", opts.home_url).into();
		}

		let secret = if let Some(secret) = self.secret {
			secret
		} else {
			warn!("No anti-forgery secret configured, tokens will not survive a restart");
			nonce::random_secret().into_bytes().into()
		};
		let nonces = NonceService::new(&secret, opts.nonce_lifetime);

		// Settings pages
		let notices = Arc::new(Notices::new());
		let deps = ItemDeps {
			store: option_adapter.clone(),
			license_api: license_api.clone(),
			site_url: opts.home_url.clone(),
		};
		let mut registry = AdminRegistry::new(deps, notices.clone())?;
		settings::register_settings(&mut registry, &opts)?;
		let admin = Arc::new(registry.freeze());
		info!("Registered {} admin pages", admin.pages().len());
		if !notices.is_empty() {
			warn!("{} admin notices raised during registration", notices.len());
		}

		let licenses = LicenseManager::new(option_adapter.clone());
		match admin.sync_licenses(&licenses).await {
			Ok(0) => {}
			Ok(count) => info!("Registered {} license fields", count),
			Err(e) => warn!("Failed to register license fields: {}", e),
		}

		Ok(Arc::new(AppState {
			opts,
			auth_adapter,
			option_adapter,
			license_api,
			admin,
			licenses,
			nonces,
		}))
	}

	pub async fn run(self) -> ClResult<()> {
		info!(" _                _        __        __                               ");
		info!("| |    ___   __ _(_)_ __   \\ \\      / / __ __ _ _ __  _ __   ___ _ __ ");
		info!("| |   / _ \\ / _` | | '_ \\   \\ \\ /\\ / / '__/ _` | '_ \\| '_ \\ / _ \\ '__|");
		info!("| |__| (_) | (_| | | | | |   \\ V  V /| | | (_| | |_) | |_) |  __/ |   ");
		info!("|_____\\___/ \\__, |_|_| |_|    \\_/\\_/ |_|  \\__,_| .__/| .__/ \\___|_|   ");
		info!("            |___/                              |_|   |_|              ");
		info!("V{}", VERSION);
		info!("");

		let app = self.build().await?;
		let router = routes::init(app.clone());

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await.map_err(|e| {
			error!("FATAL: Cannot listen on {}: {}", app.opts.listen, e);
			Error::from(e)
		})?;
		info!("Listening on HTTP {}", app.opts.listen);
		axum::serve(listener, router).await?;

		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
