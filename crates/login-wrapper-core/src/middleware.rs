//! Authentication middleware
//!
//! Sessions are presented as `Authorization: Bearer <token>` and resolved by
//! the configured [`AuthAdapter`](login_wrapper_types::auth_adapter::AuthAdapter).

use axum::{
	body::Body,
	extract::State,
	http::{HeaderMap, Request, header},
	middleware::Next,
	response::Response,
};

use crate::app::App;
use crate::extract::Auth;
use crate::prelude::*;

/// Session token of an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
	headers
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.map(str::trim)
		.filter(|t| !t.is_empty())
}

/// Reject requests without a valid session
pub async fn require_auth(
	State(state): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> ClResult<Response<Body>> {
	let token = bearer_token(req.headers()).ok_or(Error::PermissionDenied)?;
	let auth = state.auth_adapter.validate_session(token).await?;
	req.extensions_mut().insert(Auth(auth));

	Ok(next.run(req).await)
}

/// Attach the principal when a valid session is presented. Invalid tokens
/// are treated as anonymous.
pub async fn optional_auth(
	State(state): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> ClResult<Response<Body>> {
	if let Some(token) = bearer_token(req.headers()) {
		match state.auth_adapter.validate_session(token).await {
			Ok(auth) => {
				req.extensions_mut().insert(Auth(auth));
			}
			Err(err) => debug!("Ignoring session token: {}", err),
		}
	}

	Ok(next.run(req).await)
}


// vim: ts=4
