//! HTTP handlers for the admin page, menu rewriting, redirects and logout

use axum::{
	Json,
	body::Bytes,
	extract::{Path, Query, State},
	http::{HeaderMap, header},
	response::{Html, Redirect},
};
use serde::{Deserialize, Serialize};

use crate::menu::{self, LOGOUT_ACTION, MenuItem, MenuLinks};
use crate::prelude::*;
use crate::redirect::{login_redirect, safe_redirect};
use crate::settings::{LOGIN_PAGE_URL, LOGOUT_REDIRECT_URL, url_option};
use login_wrapper_core::form::FormData;
use login_wrapper_core::item::render::AJAX_BUTTON_ACTION;
use login_wrapper_core::middleware::bearer_token;
use login_wrapper_core::page::{PageView, SubmitOutcome, SubmitRequest, principal};
use login_wrapper_types::auth_adapter::AuthCtx;

/// Capability needed to list the placeholder links of the menu editor
const EDIT_MENUS: &str = "edit_theme_options";

// Admin page //
//************//
#[derive(Debug, Default, Deserialize)]
pub struct AdminPageQuery {
	pub message: Option<String>,
}

/// GET /admin/{page} - Load the page fields and render the page
pub async fn get_admin_page(
	State(app): State<App>,
	OptionalAuth(auth): OptionalAuth,
	Path(page_id): Path<String>,
	Query(query): Query<AdminPageQuery>,
) -> ClResult<Html<String>> {
	let page = app.admin.page(&page_id).ok_or(Error::NotFound)?;
	if !auth.as_ref().is_some_and(|a| a.can(&page.settings().capability)) {
		return Err(Error::PermissionDenied);
	}

	let nonce = app.nonce(page.id(), auth.as_ref())?;
	let ajax_nonce = app.nonce(AJAX_BUTTON_ACTION, auth.as_ref())?;
	let view = PageView { nonce: &nonce, ajax_nonce: &ajax_nonce, message: query.message.as_deref() };

	Ok(Html(app.admin.render_document(&page, &view).await?))
}

/// Url-encoded browser posts, or a JSON object of field values
fn parse_form(headers: &HeaderMap, body: &[u8]) -> ClResult<FormData> {
	let is_json = headers
		.get(header::CONTENT_TYPE)
		.and_then(|v| v.to_str().ok())
		.is_some_and(|ct| ct.starts_with("application/json"));
	if is_json {
		return FormData::from_json(body);
	}
	let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
		.map_err(|e| Error::ValidationError(format!("invalid form body: {}", e)))?;
	Ok(FormData::from_pairs(pairs))
}

/// POST /admin/{page} - Save or reset the page, then redirect back to it
pub async fn post_admin_page(
	State(app): State<App>,
	OptionalAuth(auth): OptionalAuth,
	Path(page_id): Path<String>,
	headers: HeaderMap,
	body: Bytes,
) -> ClResult<Redirect> {
	let page = app.admin.page(&page_id).ok_or(Error::NotFound)?;
	let form = parse_form(&headers, &body)?;

	let outcome = page
		.handle_submit(SubmitRequest {
			page: &page_id,
			auth: auth.as_ref(),
			nonces: &app.nonces,
			form: &form,
		})
		.await;
	if let SubmitOutcome::Denied(_) = outcome {
		return Err(Error::PermissionDenied);
	}

	let location = match outcome.message() {
		Some(message) => format!("/admin/{}?message={}", page.id(), message),
		None => format!("/admin/{}", page.id()),
	};
	Ok(Redirect::to(&location))
}

// Menu //
//******//
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRenderRequest {
	pub items: Vec<MenuItem>,
	/// Set while the menu editor itself renders the menu
	#[serde(default)]
	pub menu_editor: bool,
}

#[derive(Debug, Serialize)]
pub struct MenuRenderResponse {
	pub items: Vec<MenuItem>,
}

async fn menu_links(app: &App, auth: Option<&AuthCtx>) -> ClResult<MenuLinks> {
	let store = app.option_adapter.as_ref();
	let login_url = url_option(store, LOGIN_PAGE_URL, &app.opts.login_url).await?;
	let logout_redirect = url_option(store, LOGOUT_REDIRECT_URL, &app.opts.home_url).await?;

	let nonce = app.nonce(LOGOUT_ACTION, auth)?;
	let logout_url =
		menu::logout_url(&app.opts.home_url, &app.opts.logout_path, &logout_redirect, &nonce)?;
	Ok(MenuLinks { login_url, logout_url })
}

/// POST /api/menu/render - Resolve placeholder links for the caller
pub async fn post_menu_render(
	State(app): State<App>,
	OptionalAuth(auth): OptionalAuth,
	Json(req): Json<MenuRenderRequest>,
) -> ClResult<Json<MenuRenderResponse>> {
	let mut items = req.items;

	if req.menu_editor {
		items.iter_mut().for_each(menu::setup_type_label);
	} else if items.iter().any(MenuItem::is_placeholder) {
		let links = menu_links(&app, auth.as_ref()).await?;
		let logged_in = auth.is_some();
		for item in &mut items {
			menu::rewrite_item(item, &links, logged_in);
		}
	}

	Ok(Json(MenuRenderResponse { items }))
}

/// GET /api/menu/placeholders - Links offered by the menu editor
pub async fn get_menu_placeholders(Auth(auth): Auth) -> ClResult<Json<Vec<MenuItem>>> {
	if !auth.can(EDIT_MENUS) {
		return Err(Error::PermissionDenied);
	}
	Ok(Json(menu::placeholder_entries()))
}

// Redirects //
//***********//
#[derive(Debug, Default, Deserialize)]
pub struct LoginRedirectQuery {
	pub redirect_to: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRedirectResponse {
	pub redirect_to: String,
}

/// GET /api/login-redirect - Target after a login
pub async fn get_login_redirect(
	State(app): State<App>,
	OptionalAuth(auth): OptionalAuth,
	Query(query): Query<LoginRedirectQuery>,
) -> ClResult<Json<LoginRedirectResponse>> {
	let proposed = query
		.redirect_to
		.filter(|r| !r.is_empty())
		.unwrap_or_else(|| app.opts.home_url.to_string());
	let redirect_to =
		login_redirect(app.option_adapter.as_ref(), &app.opts.home_url, &proposed, auth.as_ref())
			.await?;

	Ok(Json(LoginRedirectResponse { redirect_to }))
}

#[derive(Debug, Default, Deserialize)]
pub struct LogoutQuery {
	pub redirect_to: Option<String>,
	#[serde(rename = "_wpnonce")]
	pub nonce: Option<String>,
}

/// GET /logout - End the session, then redirect to the logout target
pub async fn get_logout(
	State(app): State<App>,
	OptionalAuth(auth): OptionalAuth,
	headers: HeaderMap,
	Query(query): Query<LogoutQuery>,
) -> ClResult<Redirect> {
	let nonce = query.nonce.unwrap_or_default();
	if !app.nonces.verify(&nonce, LOGOUT_ACTION, principal(auth.as_ref())) {
		warn!("Logout refused: invalid token");
		return Err(Error::PermissionDenied);
	}

	if let Some(token) = bearer_token(&headers) {
		app.auth_adapter.end_session(token).await?;
	}
	if let Some(auth) = &auth {
		info!(user = %auth.id_tag, "Logged out");
	}

	let target = query.redirect_to.unwrap_or_default();
	let target = if target.is_empty() { app.opts.home_url.as_ref() } else { target.as_str() };
	Ok(Redirect::to(&safe_redirect(target, &app.opts.home_url)))
}


// vim: ts=4
