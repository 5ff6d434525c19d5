//! License key field
//!
//! The key is stored like any option field. Submitting it calls the license
//! store first; the outcome lands in two sibling options, the validity
//! (`<id>_validity` unless `validity_id` is set) and a status message
//! (`<id>_status`).

use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

use super::settings::LicenseSettings;
use super::{Field, ItemDeps};
use crate::form::FormData;
use crate::license::{
	ACTION_MARKER_PREFIX, LicenseAction, LicenseApi, LicenseCall, LicenseDefinition, LicenseRequest,
	STATUS_DEACTIVATED, STATUS_SUFFIX, activation_outcome, deactivation_outcome, validity_option,
};
use crate::prelude::*;
use crate::value::FieldValue;
use login_wrapper_types::option_adapter::OptionAdapter;

/// Validity and status as read by the last load
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LicenseState {
	pub validity: String,
	pub status: String,
}

#[derive(Debug)]
pub struct LicenseField {
	settings: LicenseSettings,
	api: Arc<dyn LicenseApi>,
	store: Arc<dyn OptionAdapter>,
	site_url: Box<str>,
	state: RwLock<LicenseState>,
}

fn option_text(value: Option<Value>) -> String {
	match value {
		Some(Value::String(s)) => s,
		Some(Value::Null) | None => String::new(),
		Some(other) => other.to_string(),
	}
}

impl LicenseField {
	pub(crate) fn new(settings: LicenseSettings, deps: &ItemDeps) -> Self {
		Self {
			settings,
			api: deps.license_api.clone(),
			store: deps.store.clone(),
			site_url: deps.site_url.clone(),
			state: RwLock::new(LicenseState::default()),
		}
	}

	pub fn settings(&self) -> &LicenseSettings {
		&self.settings
	}

	pub fn state(&self) -> LicenseState {
		self.state.read().clone()
	}

	pub fn validity_option(&self, id: &str) -> String {
		validity_option(id, &self.settings.validity_id)
	}

	pub fn definition(&self, id: &str) -> LicenseDefinition {
		LicenseDefinition {
			id: id.to_string(),
			validity_id: self.settings.validity_id.clone(),
			store_url: self.settings.store_url.clone(),
			download_id: self.settings.download_id.clone(),
			download_name: self.settings.download_name.clone(),
			plugin_file: self.settings.plugin_file.clone(),
			wp_override: self.settings.wp_override,
		}
	}

	/// Read validity and status for the next render
	///
	/// A "Deactivated" status is shown once, and so is any status of an empty
	/// key: the stored message is cleared as soon as it has been read.
	pub(crate) async fn refresh(&self, id: &str, key: &FieldValue) -> ClResult<()> {
		let status_option = format!("{}{}", id, STATUS_SUFFIX);
		let validity = option_text(self.store.read_option(&self.validity_option(id)).await?);
		let status = option_text(self.store.read_option(&status_option).await?);

		if !status.is_empty() && (status == STATUS_DEACTIVATED || key.as_text().is_empty()) {
			self.store.update_option(&status_option, Some(Value::String(String::new()))).await?;
		}
		*self.state.write() = LicenseState { validity, status };
		Ok(())
	}

	/// Activate or deactivate, then store the key
	///
	/// Needs a non-empty key and the hidden action marker; anything else is
	/// not a license submission and leaves the field untouched.
	pub(crate) async fn submit(&self, field: &Field, form: &FormData) -> ClResult<bool> {
		let id = field.cell().id();
		let Some(license) = form.text(id).filter(|key| !key.is_empty()) else {
			return Ok(false);
		};
		let Some(action) = form
			.text(&format!("{}{}", ACTION_MARKER_PREFIX, id))
			.and_then(|marker| LicenseAction::from_marker(&marker))
		else {
			return Ok(false);
		};

		let s = &self.settings;
		let request =
			LicenseRequest::new(action, &license, &s.download_id, &s.download_name, &self.site_url);
		let basic_auth = s
			.use_basic_authorization
			.then_some((s.basic_authorization_name.as_str(), s.basic_authorization_password.as_str()));
		let reply =
			self.api.post(LicenseCall { store_url: &s.store_url, request: &request, basic_auth }).await;

		let outcome = match action {
			LicenseAction::Activate => activation_outcome(reply, &s.download_name),
			LicenseAction::Deactivate => deactivation_outcome(reply),
		};
		info!(field = %id, validity = %outcome.validity, "License {}", action.marker());

		let validity_option = self.validity_option(id);
		self.store
			.update_option(&format!("{}{}", id, STATUS_SUFFIX), Some(Value::String(outcome.status.clone())))
			.await?;
		self.store
			.update_option(&validity_option, Some(Value::String(outcome.validity.to_string())))
			.await?;
		*self.state.write() =
			LicenseState { validity: outcome.validity.to_string(), status: outcome.status };

		let mut form = form.clone();
		if action == LicenseAction::Deactivate {
			form.set(id, FieldValue::empty_text());
		}
		field.handler().save(&form).await
	}
}


// vim: ts=4
