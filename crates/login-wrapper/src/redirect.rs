//! Post-login and post-logout redirects

use login_wrapper_types::auth_adapter::{AuthCtx, capability};
use login_wrapper_types::option_adapter::OptionAdapter;
use url::Url;

use crate::prelude::*;
use crate::settings::{LOGIN_REDIRECT_URL, url_option};

/// Where a principal lands after logging in. Failed logins and principals
/// managing options keep the proposed target.
pub async fn login_redirect(
	store: &dyn OptionAdapter,
	home_url: &str,
	proposed: &str,
	auth: Option<&AuthCtx>,
) -> ClResult<String> {
	match auth {
		Some(auth) if !auth.can(capability::MANAGE_OPTIONS) => {
			url_option(store, LOGIN_REDIRECT_URL, home_url).await
		}
		_ => Ok(proposed.to_string()),
	}
}

/// Keep redirects on this site
///
/// `target` is resolved against `home_url` and accepted only when the result
/// has the same scheme, host and port. Anything else lands on `home_url`.
pub fn safe_redirect(target: &str, home_url: &str) -> String {
	let Ok(home) = Url::parse(home_url) else {
		warn!(home_url = %home_url, "Home URL does not parse");
		return home_url.to_string();
	};
	match home.join(target) {
		Ok(url)
			if url.scheme() == home.scheme()
				&& url.host() == home.host()
				&& url.port_or_known_default() == home.port_or_known_default() =>
		{
			url.into()
		}
		_ => {
			debug!(target = %target, "Redirect leaves the site");
			home_url.to_string()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use login_wrapper_types::auth_adapter::ROLE_ADMIN;
	use login_wrapper_types::option_adapter::MemoryOptionAdapter;
	use serde_json::json;

	const HOME: &str = "https://site/";
	const PROPOSED: &str = "https://site/wp-admin/";

	#[tokio::test]
	async fn test_override_for_members_only() -> ClResult<()> {
		let store = MemoryOptionAdapter::new();
		store.update_option(LOGIN_REDIRECT_URL, Some(json!("https://site/thanks"))).await?;
		let user = AuthCtx::new("alice", &["USER"]);
		let admin = AuthCtx::new("admin", &[ROLE_ADMIN]);

		assert_eq!(login_redirect(&store, HOME, PROPOSED, Some(&user)).await?, "https://site/thanks");
		assert_eq!(login_redirect(&store, HOME, PROPOSED, Some(&admin)).await?, PROPOSED);
		assert_eq!(login_redirect(&store, HOME, PROPOSED, None).await?, PROPOSED);
		Ok(())
	}

	#[tokio::test]
	async fn test_empty_option_falls_back_to_home() -> ClResult<()> {
		let store = MemoryOptionAdapter::new();
		let user = AuthCtx::new("alice", &["USER"]);
		assert_eq!(login_redirect(&store, HOME, PROPOSED, Some(&user)).await?, HOME);

		store.update_option(LOGIN_REDIRECT_URL, Some(json!(""))).await?;
		assert_eq!(login_redirect(&store, HOME, PROPOSED, Some(&user)).await?, HOME);
		assert_eq!(store.read_option(LOGIN_REDIRECT_URL).await?, Some(json!(HOME)));
		Ok(())
	}

	#[test]
	fn test_safe_redirect() {
		assert_eq!(safe_redirect("https://site/bye", HOME), "https://site/bye");
		assert_eq!(safe_redirect("/bye?x=1", HOME), "https://site/bye?x=1");
		assert_eq!(safe_redirect("bye", "https://site/blog/"), "https://site/blog/bye");
		assert_eq!(safe_redirect("//evil.example/", HOME), HOME);
		assert_eq!(safe_redirect("https://evil.example/", HOME), HOME);
		assert_eq!(safe_redirect("javascript:alert(1)", HOME), HOME);
	}

	#[test]
	fn test_safe_redirect_rejects_backslash_hosts() {
		assert_eq!(safe_redirect("/\\evil.example/", HOME), HOME);
		assert_eq!(safe_redirect("\\\\evil.example/", HOME), HOME);
		assert_eq!(safe_redirect("https://site.evil/", "https://site"), "https://site");
		assert_eq!(safe_redirect("https://site:8443/", HOME), HOME);
		assert_eq!(safe_redirect("http://site/", HOME), HOME);
	}
}

// vim: ts=4
