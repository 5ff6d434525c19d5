//! License activation against an EDD software-licensing store
//!
//! The store is called with a form-encoded POST. Failures never propagate:
//! they become a validity value (`invalid`, `failed`) plus a human readable
//! status message kept next to the license key.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::prelude::*;
use login_wrapper_types::option_adapter::OptionAdapter;

pub const LICENSES_OPTION: &str = "login_wrapper_licenses";
pub const STATUS_SUFFIX: &str = "_status";
pub const VALIDITY_SUFFIX: &str = "_validity";
pub const ACTION_MARKER_PREFIX: &str = "hidden_edd_licensing_";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub const STATUS_VALID: &str = "Valid";
pub const STATUS_DEACTIVATED: &str = "Deactivated";
const GENERIC_ERROR: &str = "An error occurred, please try again.";

pub const VALIDITY_VALID: &str = "valid";
pub const VALIDITY_INVALID: &str = "invalid";
pub const VALIDITY_DEACTIVATED: &str = "deactivated";
pub const VALIDITY_FAILED: &str = "failed";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LicenseAction {
	Activate,
	Deactivate,
}

impl LicenseAction {
	/// Value of the hidden action marker rendered with the field
	pub fn marker(self) -> &'static str {
		match self {
			LicenseAction::Activate => "edd_license_activate",
			LicenseAction::Deactivate => "edd_license_deactivate",
		}
	}

	pub fn from_marker(marker: &str) -> Option<Self> {
		match marker {
			"edd_license_activate" => Some(LicenseAction::Activate),
			"edd_license_deactivate" => Some(LicenseAction::Deactivate),
			_ => None,
		}
	}

	fn edd_action(self) -> &'static str {
		match self {
			LicenseAction::Activate => "activate_license",
			LicenseAction::Deactivate => "deactivate_license",
		}
	}
}

/// Form parameters of a store call
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LicenseRequest {
	pub edd_action: &'static str,
	pub license: String,
	pub item_id: String,
	pub item_name: String,
	pub url: String,
	pub environment: String,
}

impl LicenseRequest {
	pub fn new(action: LicenseAction, license: &str, item_id: &str, item_name: &str, url: &str) -> Self {
		Self {
			edd_action: action.edd_action(),
			license: license.to_string(),
			item_id: item_id.to_string(),
			item_name: item_name.to_string(),
			url: url.to_string(),
			environment: "production".to_string(),
		}
	}
}

#[derive(Clone, Debug)]
pub struct LicenseCall<'a> {
	pub store_url: &'a str,
	pub request: &'a LicenseRequest,
	pub basic_auth: Option<(&'a str, &'a str)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LicenseReply {
	pub status: u16,
	pub body: String,
}

#[async_trait]
pub trait LicenseApi: Debug + Send + Sync {
	/// POST to the store. Transport problems are `Error::NetworkError`.
	async fn post(&self, call: LicenseCall<'_>) -> ClResult<LicenseReply>;
}

// HyperLicenseApi //
//*****************//
#[derive(Debug)]
pub struct HyperLicenseApi {
	timeout: Duration,
}

impl HyperLicenseApi {
	pub fn new() -> Self {
		Self { timeout: REQUEST_TIMEOUT }
	}

	pub fn with_timeout(timeout: Duration) -> Self {
		Self { timeout }
	}
}

impl Default for HyperLicenseApi {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl LicenseApi for HyperLicenseApi {
	async fn post(&self, call: LicenseCall<'_>) -> ClResult<LicenseReply> {
		let connector = HttpsConnectorBuilder::new()
			.with_native_roots()
			.map_err(|e| Error::NetworkError(format!("TLS error: {}", e)))?
			.https_or_http()
			.enable_http1()
			.build();
		let client: Client<_, Full<Bytes>> = Client::builder(TokioExecutor::new()).build(connector);

		let body = serde_urlencoded::to_string(call.request)
			.map_err(|e| Error::Internal(format!("license request encoding: {}", e)))?;
		let mut builder = hyper::Request::builder()
			.method(hyper::Method::POST)
			.uri(call.store_url)
			.header("Content-Type", "application/x-www-form-urlencoded");
		if let Some((name, password)) = call.basic_auth {
			builder = builder.header(
				"Authorization",
				format!("Basic {}", STANDARD.encode(format!("{}:{}", name, password))),
			);
		}
		let request = builder
			.body(Full::new(Bytes::from(body)))
			.map_err(|e| Error::NetworkError(format!("Request build error: {}", e)))?;

		let response = tokio::time::timeout(self.timeout, client.request(request))
			.await
			.map_err(|_| Error::NetworkError("Operation timed out".into()))?
			.map_err(|e| Error::NetworkError(e.to_string()))?;
		let status = response.status().as_u16();
		let body = response
			.into_body()
			.collect()
			.await
			.map_err(|e| Error::NetworkError(e.to_string()))?
			.to_bytes();

		Ok(LicenseReply { status, body: String::from_utf8_lossy(&body).into_owned() })
	}
}

// Outcomes //
//**********//
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LicenseData {
	success: bool,
	license: String,
	error: String,
	expires: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LicenseOutcome {
	pub validity: &'static str,
	pub status: String,
}

impl LicenseOutcome {
	fn new(validity: &'static str, status: impl Into<String>) -> Self {
		Self { validity, status: status.into() }
	}
}

fn transport_message(err: &Error) -> String {
	match err {
		Error::NetworkError(msg) => msg.clone(),
		other => other.to_string(),
	}
}

pub fn activation_outcome(reply: ClResult<LicenseReply>, download_name: &str) -> LicenseOutcome {
	let reply = match reply {
		Ok(reply) if reply.status == 200 => reply,
		Ok(_) => return LicenseOutcome::new(VALIDITY_INVALID, GENERIC_ERROR),
		Err(err) => return LicenseOutcome::new(VALIDITY_INVALID, transport_message(&err)),
	};
	let Ok(data) = serde_json::from_str::<LicenseData>(&reply.body) else {
		return LicenseOutcome::new(VALIDITY_INVALID, GENERIC_ERROR);
	};
	if !data.success {
		return LicenseOutcome::new(VALIDITY_INVALID, activation_error(&data, download_name));
	}
	if data.license == VALIDITY_INVALID {
		LicenseOutcome::new(VALIDITY_INVALID, STATUS_VALID)
	} else {
		LicenseOutcome::new(VALIDITY_VALID, STATUS_VALID)
	}
}

pub fn deactivation_outcome(reply: ClResult<LicenseReply>) -> LicenseOutcome {
	let reply = match reply {
		Ok(reply) if reply.status == 200 => reply,
		Ok(_) => return LicenseOutcome::new(VALIDITY_FAILED, GENERIC_ERROR),
		Err(err) => return LicenseOutcome::new(VALIDITY_FAILED, transport_message(&err)),
	};
	let data = serde_json::from_str::<LicenseData>(&reply.body).unwrap_or_default();
	if data.license == VALIDITY_FAILED {
		LicenseOutcome::new(VALIDITY_FAILED, STATUS_DEACTIVATED)
	} else {
		LicenseOutcome::new(VALIDITY_DEACTIVATED, STATUS_DEACTIVATED)
	}
}

fn activation_error(data: &LicenseData, download_name: &str) -> String {
	match data.error.as_str() {
		"expired" => format!("Your license key expired on {}.", format_expiry(&data.expires)),
		"disabled" | "revoked" => "Your license key has been disabled.".into(),
		"missing" => "Invalid license.".into(),
		"invalid" | "site_inactive" => "Your license is not active for this URL.".into(),
		"item_name_mismatch" => {
			format!("This appears to be an invalid license key for {}.", download_name)
		}
		"no_activations_left" => "Your license key has reached its activation limit.".into(),
		_ => GENERIC_ERROR.into(),
	}
}

/// `2025-01-15 23:59:59` -> `January 15, 2025`
fn format_expiry(expires: &str) -> String {
	use chrono::{NaiveDate, NaiveDateTime};

	NaiveDateTime::parse_from_str(expires, "%Y-%m-%d %H:%M:%S")
		.map(|dt| dt.date())
		.or_else(|_| NaiveDate::parse_from_str(expires, "%Y-%m-%d"))
		.map_or_else(|_| expires.to_string(), |date| date.format("%B %-d, %Y").to_string())
}

// LicenseManager //
//****************//
/// License field registration as remembered across restarts
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseDefinition {
	pub id: String,
	pub validity_id: String,
	pub store_url: String,
	pub download_id: String,
	pub download_name: String,
	pub plugin_file: String,
	pub wp_override: bool,
}

impl LicenseDefinition {
	pub fn validity_option(&self) -> String {
		validity_option(&self.id, &self.validity_id)
	}
}

/// Option holding the validity of a license field
pub fn validity_option(id: &str, validity_id: &str) -> String {
	if validity_id.is_empty() { format!("{}{}", id, VALIDITY_SUFFIX) } else { validity_id.to_string() }
}

#[derive(Debug, Clone)]
pub struct LicenseManager {
	store: Arc<dyn OptionAdapter>,
}

impl LicenseManager {
	pub fn new(store: Arc<dyn OptionAdapter>) -> Self {
		Self { store }
	}

	pub async fn licenses(&self) -> ClResult<Vec<LicenseDefinition>> {
		let Some(serde_json::Value::Object(map)) = self.store.read_option(LICENSES_OPTION).await?
		else {
			return Ok(Vec::new());
		};
		Ok(map
			.into_iter()
			.filter_map(|(id, def)| match serde_json::from_value::<LicenseDefinition>(def) {
				Ok(def) => Some(def),
				Err(err) => {
					warn!(license = %id, "Skipping malformed license definition: {}", err);
					None
				}
			})
			.collect())
	}

	pub async fn count(&self) -> ClResult<usize> {
		let count = self.licenses().await?.len();
		debug!(count, "License count");
		Ok(count)
	}

	/// Add or replace the definition registered under `def.id`
	pub async fn register(&self, def: LicenseDefinition) -> ClResult<()> {
		let mut licenses = self.licenses().await?;
		match licenses.iter_mut().find(|l| l.id == def.id) {
			Some(slot) => *slot = def,
			None => licenses.push(def),
		}
		self.write(&licenses).await
	}

	/// Drop every license of a plugin together with its key and validity
	pub async fn unregister(&self, plugin_file: &str) -> ClResult<()> {
		let (removed, kept): (Vec<_>, Vec<_>) =
			self.licenses().await?.into_iter().partition(|l| l.plugin_file.contains(plugin_file));
		for license in &removed {
			self.store.update_option(&license.validity_option(), None).await?;
			self.store.update_option(&license.id, None).await?;
			info!(license = %license.id, "License unregistered");
		}
		self.write(&kept).await
	}

	/// True unless a license registered for the plugin is not `valid`
	pub async fn check_validity(&self, plugin_file: &str) -> ClResult<bool> {
		let licenses = self.licenses().await?;
		let Some(license) = licenses.iter().find(|l| l.plugin_file.contains(plugin_file)) else {
			return Ok(true);
		};
		let validity = self.store.read_option(&license.validity_option()).await?;
		Ok(validity.as_ref().and_then(serde_json::Value::as_str) == Some(VALIDITY_VALID))
	}

	async fn write(&self, licenses: &[LicenseDefinition]) -> ClResult<()> {
		let mut map = serde_json::Map::new();
		for license in licenses {
			map.insert(license.id.clone(), serde_json::to_value(license)?);
		}
		self.store.update_option(LICENSES_OPTION, Some(serde_json::Value::Object(map))).await
	}
}


// vim: ts=4
