//! Common test utilities and helpers
//!
//! Builds an app over an in-memory option store with two static sessions:
//! an administrator and a regular member.

#![allow(dead_code)]

use axum::{
	Router,
	body::Body,
	http::{Request, Response, header},
};
use http_body_util::BodyExt;
use std::sync::Arc;

use login_wrapper::auth_adapter::{AuthCtx, ROLE_ADMIN, StaticAuthAdapter};
use login_wrapper::option_adapter::MemoryOptionAdapter;
use login_wrapper::{App, AppBuilder, routes};

pub const HOME_URL: &str = "https://site/";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_TOKEN: &str = "user-token";

pub fn admin() -> AuthCtx {
	AuthCtx::new("admin", &[ROLE_ADMIN])
}

pub fn member() -> AuthCtx {
	AuthCtx::new("alice", &["USER"])
}

pub struct TestApp {
	pub app: App,
	pub store: Arc<MemoryOptionAdapter>,
	pub router: Router,
}

pub async fn test_app() -> TestApp {
	let store = Arc::new(MemoryOptionAdapter::new());
	let auth = StaticAuthAdapter::new()
		.with_session(ADMIN_TOKEN, admin())
		.with_session(USER_TOKEN, member());

	let mut builder = AppBuilder::new();
	builder
		.home_url("https://site")
		.secret("test-secret")
		.auth_adapter(Arc::new(auth))
		.option_adapter(store.clone());
	let app = builder.build().await.expect("Failed to build app");
	let router = routes::init(app.clone());

	TestApp { app, store, router }
}

fn with_token(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
	match token {
		Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
		None => builder,
	}
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
	with_token(Request::builder().uri(uri), token)
		.body(Body::empty())
		.expect("Failed to build request")
}

pub fn post_form(uri: &str, token: Option<&str>, pairs: &[(&str, &str)]) -> Request<Body> {
	let body = serde_urlencoded::to_string(pairs).expect("Failed to encode form");
	with_token(Request::builder().method("POST").uri(uri), token)
		.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
		.body(Body::from(body))
		.expect("Failed to build request")
}

pub fn post_json(uri: &str, token: Option<&str>, body: &serde_json::Value) -> Request<Body> {
	with_token(Request::builder().method("POST").uri(uri), token)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(body.to_string()))
		.expect("Failed to build request")
}

pub async fn body_text(response: Response<Body>) -> String {
	let bytes = response.into_body().collect().await.expect("Failed to read body").to_bytes();
	String::from_utf8_lossy(&bytes).into_owned()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
	let bytes = response.into_body().collect().await.expect("Failed to read body").to_bytes();
	serde_json::from_slice(&bytes).expect("Body is not JSON")
}

pub fn location(response: &Response<Body>) -> &str {
	response
		.headers()
		.get(header::LOCATION)
		.and_then(|v| v.to_str().ok())
		.unwrap_or_default()
}

// vim: ts=4
