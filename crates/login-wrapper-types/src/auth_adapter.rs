//! Adapter that resolves session tokens into authenticated principals.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

use crate::prelude::*;

/// Site administrator role. Holds every capability.
pub const ROLE_ADMIN: &str = "SADM";

/// Capability names checked by admin pages and redirect rules
pub mod capability {
	/// Manage site options (admin pages, post-login redirect bypass)
	pub const MANAGE_OPTIONS: &str = "manage_options";
	/// Granted to every authenticated principal
	pub const READ: &str = "read";
}

/// Authenticated principal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthCtx {
	pub id_tag: Box<str>,
	pub roles: Box<[Box<str>]>,
}

impl AuthCtx {
	pub fn new(id_tag: impl Into<Box<str>>, roles: &[&str]) -> Self {
		AuthCtx { id_tag: id_tag.into(), roles: roles.iter().map(|r| Box::from(*r)).collect() }
	}

	pub fn is_admin(&self) -> bool {
		self.roles.iter().any(|r| r.as_ref() == ROLE_ADMIN)
	}

	/// Check whether this principal holds a capability
	pub fn can(&self, capability: &str) -> bool {
		self.is_admin() || capability == capability::READ
	}
}

#[async_trait]
pub trait AuthAdapter: Debug + Send + Sync {
	/// Resolve a session token. Unknown tokens yield `PermissionDenied`.
	async fn validate_session(&self, token: &str) -> ClResult<AuthCtx>;

	/// Invalidate a session on logout. Adapters with fixed tokens keep them.
	async fn end_session(&self, _token: &str) -> ClResult<()> {
		Ok(())
	}
}

/// Fixed token table, configured at startup
#[derive(Debug, Default)]
pub struct StaticAuthAdapter {
	sessions: RwLock<HashMap<Box<str>, AuthCtx>>,
}

impl StaticAuthAdapter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_session(self, token: impl Into<Box<str>>, auth: AuthCtx) -> Self {
		self.sessions.write().insert(token.into(), auth);
		self
	}
}

#[async_trait]
impl AuthAdapter for StaticAuthAdapter {
	async fn validate_session(&self, token: &str) -> ClResult<AuthCtx> {
		self.sessions.read().get(token).cloned().ok_or(Error::PermissionDenied)
	}

	async fn end_session(&self, token: &str) -> ClResult<()> {
		self.sessions.write().remove(token);
		Ok(())
	}
}


// vim: ts=4
