//! Login Wrapper server
//!
//! Configured from the environment:
//!
//! - `LISTEN`: address to bind (`127.0.0.1:8080`)
//! - `DB_DIR`: directory of the option database (`./data`)
//! - `HOME_URL`: site root (`http://localhost:8080/`)
//! - `LOGIN_URL`: default login page (`<HOME_URL>wp-login.php`)
//! - `ASSET_DIR`: admin stylesheets and scripts (`./assets`)
//! - `NONCE_SECRET`: anti-forgery key, random per start when unset
//! - `ADMIN_TOKEN`, `USER_TOKEN`: static bearer tokens of an administrator
//!   and of a regular member

use std::{env, path, process::ExitCode, sync::Arc};

use login_wrapper::auth_adapter::{AuthCtx, ROLE_ADMIN, StaticAuthAdapter};
use login_wrapper::prelude::*;
use login_wrapper::AppBuilder;
use login_wrapper_option_adapter_sqlite::OptionAdapterSqlite;

pub struct Config {
	pub listen: String,
	pub db_dir: path::PathBuf,
	pub home_url: String,
	pub login_url: Option<String>,
	pub asset_dir: path::PathBuf,
	pub nonce_secret: Option<String>,
	pub admin_token: Option<String>,
	pub user_token: Option<String>,
}

impl Config {
	fn from_env() -> Self {
		Config {
			listen: env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
			db_dir: path::PathBuf::from(env::var("DB_DIR").unwrap_or_else(|_| "./data".to_string())),
			home_url: env::var("HOME_URL").unwrap_or_else(|_| "http://localhost:8080/".to_string()),
			login_url: env::var("LOGIN_URL").ok(),
			asset_dir: path::PathBuf::from(
				env::var("ASSET_DIR").unwrap_or_else(|_| "./assets".to_string()),
			),
			nonce_secret: env::var("NONCE_SECRET").ok(),
			admin_token: env::var("ADMIN_TOKEN").ok(),
			user_token: env::var("USER_TOKEN").ok(),
		}
	}
}

fn auth_adapter(config: &Config) -> StaticAuthAdapter {
	let mut adapter = StaticAuthAdapter::new();
	if let Some(token) = &config.admin_token {
		adapter = adapter.with_session(token.as_str(), AuthCtx::new("admin", &[ROLE_ADMIN]));
	}
	if let Some(token) = &config.user_token {
		adapter = adapter.with_session(token.as_str(), AuthCtx::new("user", &["USER"]));
	}
	if config.admin_token.is_none() {
		warn!("ADMIN_TOKEN is not set, the settings page is unreachable");
	}
	adapter
}

async fn run(config: Config) -> ClResult<()> {
	let mut builder = AppBuilder::new();

	let option_adapter = OptionAdapterSqlite::new(&config.db_dir).await.inspect_err(|e| {
		error!("FATAL: Cannot open option store in {}: {}", config.db_dir.display(), e);
	})?;

	builder
		.listen(config.listen.as_str())
		.home_url(config.home_url.as_str())
		.asset_dir(config.asset_dir.as_path())
		.auth_adapter(Arc::new(auth_adapter(&config)))
		.option_adapter(Arc::new(option_adapter));
	if let Some(login_url) = &config.login_url {
		builder.login_url(login_url.as_str());
	}
	if let Some(secret) = &config.nonce_secret {
		builder.secret(secret);
	}

	builder.run().await
}

#[tokio::main]
async fn main() -> ExitCode {
	let config = Config::from_env();
	match run(config).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("Server stopped: {}", e);
			ExitCode::FAILURE
		}
	}
}

// vim: ts=4
