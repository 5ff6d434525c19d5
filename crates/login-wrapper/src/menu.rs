//! Contextual login/logout menu link
//!
//! A custom menu item whose URL is the placeholder `#sukellosloginout#`
//! becomes a login link for anonymous visitors and a logout link for
//! authenticated ones. Its title holds both labels as `Login|Logout`.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::prelude::*;
use login_wrapper_core::html::escape;

pub const PLACEHOLDER: &str = "#sukellosloginout#";
/// Any URL containing this is rewritten
pub const PLACEHOLDER_MARKER: &str = "#sukellos";
pub const PLACEHOLDER_OBJECT: &str = "sukelloslog";
pub const LOGOUT_ACTION: &str = "log-out";

const DEFAULT_LOGIN_TITLE: &str = "Login";
const DEFAULT_LOGOUT_TITLE: &str = "Logout";

/// Placeholder links offered to the menu editor, with their labels
const ENTRIES: &[(&str, &str)] = &[(PLACEHOLDER, "Contextual Login or Logout")];

#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuItem {
	pub db_id: u64,
	pub object: String,
	pub object_id: String,
	pub menu_item_parent: u64,
	#[serde(rename = "type")]
	pub typ: String,
	pub title: String,
	pub url: String,
	pub target: String,
	pub attr_title: String,
	pub classes: Vec<String>,
	pub xfn: String,
	/// Label shown by the menu editor
	pub type_label: Option<String>,
}

impl MenuItem {
	pub fn is_placeholder(&self) -> bool {
		self.url.contains(PLACEHOLDER_MARKER)
	}
}

/// Targets of a rewritten placeholder
#[derive(Clone, Debug)]
pub struct MenuLinks {
	pub login_url: String,
	pub logout_url: String,
}

/// Logout endpoint URL carrying the redirect target and the logout token
pub fn logout_url(home_url: &str, logout_path: &str, redirect_to: &str, nonce: &str) -> ClResult<String> {
	let query = serde_urlencoded::to_string(&[("redirect_to", redirect_to), ("_wpnonce", nonce)])
		.map_err(|e| Error::Internal(format!("cannot encode logout query: {}", e)))?;
	Ok(format!("{}{}?{}", home_url, logout_path.trim_start_matches('/'), query))
}

/// Label for the current state from a `Login|Logout` title
pub fn loginout_title(title: &str, logged_in: bool) -> String {
	let mut titles = title.split('|');
	let login = titles.next();
	let logout = titles.next();
	let label = if logged_in {
		logout.unwrap_or(DEFAULT_LOGOUT_TITLE)
	} else {
		login.unwrap_or(DEFAULT_LOGIN_TITLE)
	};
	escape(label)
}

/// Replace the placeholder URL and title of `item`
pub fn rewrite_item(item: &mut MenuItem, links: &MenuLinks, logged_in: bool) {
	if !item.is_placeholder() {
		return;
	}
	item.url = if logged_in { links.logout_url.clone() } else { links.login_url.clone() };
	item.title = loginout_title(&item.title, logged_in);
}

/// Menu editor label of placeholder items
pub fn setup_type_label(item: &mut MenuItem) {
	if item.object == "custom" && ENTRIES.iter().any(|(url, _)| item.url == *url) {
		item.type_label = Some("Dynamic Link".into());
	}
}

/// Items the menu editor offers for insertion
pub fn placeholder_entries() -> Vec<MenuItem> {
	ENTRIES
		.iter()
		.map(|(url, title)| MenuItem {
			object: PLACEHOLDER_OBJECT.into(),
			object_id: escape(url),
			typ: "custom".into(),
			title: escape(title),
			url: escape(url),
			..MenuItem::default()
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn placeholder(title: &str) -> MenuItem {
		MenuItem {
			object: "custom".into(),
			typ: "custom".into(),
			title: title.into(),
			url: PLACEHOLDER.into(),
			..MenuItem::default()
		}
	}

	fn links() -> MenuLinks {
		MenuLinks {
			login_url: "https://site/wp-login.php".into(),
			logout_url: "https://site/logout?redirect_to=https%3A%2F%2Fsite%2F&_wpnonce=n".into(),
		}
	}

	#[test]
	fn test_titles() {
		assert_eq!(loginout_title("Sign in|Sign out", false), "Sign in");
		assert_eq!(loginout_title("Sign in|Sign out", true), "Sign out");
		assert_eq!(loginout_title("Sign in", true), "Logout");
		assert_eq!(loginout_title("", false), "");
		assert_eq!(loginout_title("<b>In</b>|Out", false), "&lt;b&gt;In&lt;/b&gt;");
	}

	#[test]
	fn test_rewrite_by_auth_state() {
		let mut anonymous = placeholder("In|Out");
		rewrite_item(&mut anonymous, &links(), false);
		assert_eq!(anonymous.url, "https://site/wp-login.php");
		assert_eq!(anonymous.title, "In");

		let mut member = placeholder("In|Out");
		rewrite_item(&mut member, &links(), true);
		assert!(member.url.starts_with("https://site/logout?"));
		assert_eq!(member.title, "Out");
	}

	#[test]
	fn test_regular_items_untouched() {
		let mut item = MenuItem { title: "Blog".into(), url: "https://site/blog".into(), ..MenuItem::default() };
		let before = item.clone();
		rewrite_item(&mut item, &links(), true);
		setup_type_label(&mut item);
		assert_eq!(item, before);
	}

	#[test]
	fn test_type_label() {
		let mut item = placeholder("In|Out");
		setup_type_label(&mut item);
		assert_eq!(item.type_label.as_deref(), Some("Dynamic Link"));

		let mut entry = placeholder_entries().remove(0);
		setup_type_label(&mut entry);
		assert_eq!(entry.type_label, None);
		assert_eq!(entry.object, PLACEHOLDER_OBJECT);
		assert_eq!(entry.object_id, PLACEHOLDER);
		assert_eq!(entry.title, "Contextual Login or Logout");
	}

	#[test]
	fn test_logout_url() -> ClResult<()> {
		let url = logout_url("https://site/", "/logout", "https://site/bye", "abc")?;
		assert_eq!(url, "https://site/logout?redirect_to=https%3A%2F%2Fsite%2Fbye&_wpnonce=abc");
		Ok(())
	}

	#[test]
	fn test_menu_item_json() -> ClResult<()> {
		let item: MenuItem = serde_json::from_str(
			r##"{"title":"In|Out","url":"#sukellosloginout#","type":"custom"}"##,
		)?;
		assert_eq!(item.typ, "custom");
		assert!(item.is_placeholder());
		let json = serde_json::to_value(&item)?;
		assert!(json.get("typeLabel").is_none());
		assert_eq!(json["objectId"], "");
		Ok(())
	}
}

// vim: ts=4
