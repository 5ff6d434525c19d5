//! Login Wrapper settings page
//!
//! One page under the tools menu with the three URLs the feature works with.
//! Stored values are read straight from the option store by the menu and
//! redirect code. An empty stored URL is replaced by its default, and the
//! default is written back.

use login_wrapper_core::item::ItemConfig;
use login_wrapper_core::page::{AdminRegistry, PageSettings};
use login_wrapper_types::option_adapter::OptionAdapter;
use serde_json::Value;

use crate::prelude::*;
use login_wrapper_core::AppBuilderOpts;

pub const PAGE_ID: &str = "tools";
pub const HEADER_ID: &str = "header_login_logout";

pub const LOGIN_PAGE_URL: &str = "login_page_url";
pub const LOGIN_REDIRECT_URL: &str = "login_redirect_url";
pub const LOGOUT_REDIRECT_URL: &str = "logout_redirect_url";

pub fn register_settings(registry: &mut AdminRegistry, opts: &AppBuilderOpts) -> ClResult<()> {
	let mut page = registry.page(PageSettings::new(PAGE_ID, "Login Wrapper"));

	page.create_header(
		ItemConfig::new("header", HEADER_ID).with("name", "Login Wrapper").with(
			"desc",
			"Enrich the WordPress login with basic features (redirection, front end profile shortcode...)",
		),
	);
	page.create_option(
		ItemConfig::new("text", LOGIN_PAGE_URL)
			.with("name", "Login page URL")
			.with("desc", "Page containing the login form")
			.with("default", opts.login_url.as_ref()),
	);
	page.create_option(
		ItemConfig::new("text", LOGIN_REDIRECT_URL)
			.with("name", "URL after login")
			.with("desc", "Redirect URL after login")
			.with("default", opts.home_url.as_ref()),
	);
	page.create_option(
		ItemConfig::new("text", LOGOUT_REDIRECT_URL)
			.with("name", "Logout page URL")
			.with("desc", "Redirect URL after logout")
			.with("default", opts.home_url.as_ref()),
	);

	page.finish()
}

/// Stored URL of `id`, or `fallback` when it is missing. Only an empty
/// string is overwritten with the fallback; other scalars read as text.
pub async fn url_option(store: &dyn OptionAdapter, id: &str, fallback: &str) -> ClResult<String> {
	match store.read_option(id).await? {
		Some(Value::String(url)) if url.is_empty() => {
			debug!(option = %id, "Empty URL replaced by its default");
			store.update_option(id, Some(fallback.into())).await?;
			Ok(fallback.to_string())
		}
		Some(Value::String(url)) => Ok(url),
		Some(value @ (Value::Number(_) | Value::Bool(_))) => Ok(value.to_string()),
		Some(_) | None => Ok(fallback.to_string()),
	}
}


// vim: ts=4
