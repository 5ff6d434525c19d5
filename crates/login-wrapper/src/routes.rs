//! Router of the Login Wrapper server

use axum::{
	Router, middleware,
	routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::prelude::*;
use login_wrapper_core::middleware::{optional_auth, require_auth};
use login_wrapper_core::page::ASSET_BASE;

pub fn init(app: App) -> Router {
	let protected_router = Router::new()
		.route("/api/menu/placeholders", get(handler::get_menu_placeholders))
		.route_layer(middleware::from_fn_with_state(app.clone(), require_auth));

	let public_router = Router::new()
		.route("/admin/{page}", get(handler::get_admin_page).post(handler::post_admin_page))
		.route("/api/menu/render", post(handler::post_menu_render))
		.route("/api/login-redirect", get(handler::get_login_redirect))
		.route("/logout", get(handler::get_logout))
		.route_layer(middleware::from_fn_with_state(app.clone(), optional_auth));

	Router::new()
		.merge(public_router)
		.merge(protected_router)
		.nest_service(ASSET_BASE.trim_end_matches('/'), ServeDir::new(&app.opts.asset_dir))
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

// vim: ts=4
