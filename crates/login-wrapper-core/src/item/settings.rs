//! Typed item configuration
//!
//! Every variant declares the keys it accepts. A configuration is checked
//! against that list before it is deserialized; anything else is dropped
//! and reported.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::item_type::{ItemType, Variant};

/// Keys shared by every item
pub const ITEM_KEYS: &[&str] = &[
	"type",
	"id",
	"name",
	"desc",
	"class",
	"enqueue_once",
	"need_form",
	"global_form_independent",
	"use_reset",
	"save",
	"reset",
	"reset_question",
];

/// Keys shared by every field
pub const FIELD_KEYS: &[&str] = &["handler_type", "default", "hidden", "example"];

pub const CHOICE_KEYS: &[&str] = &["options"];

/// Accepted but ignored
const SILENT_KEYS: &[&str] = &["sukellos_rule_exception", "mandatory"];

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ItemSettings {
	pub id: String,
	pub name: String,
	pub desc: String,
	pub class: String,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub enqueue_once: bool,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub need_form: bool,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub global_form_independent: bool,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub use_reset: bool,
	pub save: String,
	pub reset: String,
	pub reset_question: String,
}

impl Default for ItemSettings {
	fn default() -> Self {
		Self {
			id: String::new(),
			name: String::new(),
			desc: String::new(),
			class: String::new(),
			enqueue_once: true,
			need_form: false,
			global_form_independent: false,
			use_reset: true,
			save: "Save".into(),
			reset: "Reset".into(),
			reset_question: "Do you really want to reset form?".into(),
		}
	}
}

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
	pub handler_type: String,
	pub default: Value,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub hidden: bool,
	pub example: String,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TextSettings {
	pub css: String,
	pub placeholder: String,
	pub size: String,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub is_password: bool,
	#[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
	pub maxlength: Option<i64>,
	pub unit: String,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub min: i64,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub max: i64,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub step: i64,
}

impl TextSettings {
	const KEYS: &'static [&'static str] =
		&["css", "placeholder", "size", "is_password", "maxlength", "unit", "min", "max", "step"];
}

impl Default for TextSettings {
	fn default() -> Self {
		Self {
			css: String::new(),
			placeholder: String::new(),
			size: "regular".into(),
			is_password: false,
			maxlength: None,
			unit: String::new(),
			min: 0,
			max: 1000,
			step: 1,
		}
	}
}

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TextareaSettings {
	pub placeholder: String,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub is_code: bool,
}

impl TextareaSettings {
	const KEYS: &'static [&'static str] = &["placeholder", "is_code"];
}

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SelectSettings {
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub multiple: bool,
}

impl SelectSettings {
	const KEYS: &'static [&'static str] = &["multiple"];
}

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RadioSettings {
	pub css: String,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub inline: bool,
}

impl RadioSettings {
	const KEYS: &'static [&'static str] = &["css", "inline"];
}

/// `select_all` accepts a flag or a custom label
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SelectAll {
	Flag(bool),
	Label(String),
}

impl SelectAll {
	pub fn label(&self) -> Option<&str> {
		match self {
			SelectAll::Flag(true) => Some("Select All"),
			SelectAll::Flag(false) => None,
			SelectAll::Label(label) if label.is_empty() => None,
			SelectAll::Label(label) => Some(label),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MulticheckSettings {
	pub select_all: SelectAll,
}

impl MulticheckSettings {
	const KEYS: &'static [&'static str] = &["select_all"];
}

impl Default for MulticheckSettings {
	fn default() -> Self {
		Self { select_all: SelectAll::Flag(false) }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
	pub css: String,
	pub placeholder: String,
	pub size: String,
}

impl UploadSettings {
	const KEYS: &'static [&'static str] = &["css", "placeholder", "size"];
}

impl Default for UploadSettings {
	fn default() -> Self {
		Self { css: String::new(), placeholder: String::new(), size: "full".into() }
	}
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LicenseSettings {
	pub validity_id: String,
	pub store_url: String,
	#[serde(deserialize_with = "text_or_number")]
	pub download_id: String,
	pub download_name: String,
	pub plugin_file: String,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub wp_override: bool,
	pub activate: String,
	pub deactivate: String,
	#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
	pub use_basic_authorization: bool,
	pub basic_authorization_name: String,
	pub basic_authorization_password: String,
}

impl LicenseSettings {
	const KEYS: &'static [&'static str] = &[
		"validity_id",
		"store_url",
		"download_id",
		"download_name",
		"plugin_file",
		"wp_override",
		"activate",
		"deactivate",
		"use_basic_authorization",
		"basic_authorization_name",
		"basic_authorization_password",
	];
}

impl Default for LicenseSettings {
	fn default() -> Self {
		Self {
			validity_id: String::new(),
			store_url: String::new(),
			download_id: String::new(),
			download_name: String::new(),
			plugin_file: String::new(),
			wp_override: true,
			activate: "Activate License".into(),
			deactivate: "Deactivate License".into(),
			use_basic_authorization: false,
			basic_authorization_name: String::new(),
			basic_authorization_password: String::new(),
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
	pub content: String,
}

impl ContentSettings {
	const KEYS: &'static [&'static str] = &["content"];
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NoteSettings {
	pub color: String,
}

impl NoteSettings {
	const KEYS: &'static [&'static str] = &["color"];
}

impl Default for NoteSettings {
	fn default() -> Self {
		Self { color: "#198fd9".into() }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ButtonSettings {
	pub action: String,
	pub label: String,
	pub button_class: String,
	pub wait_label: String,
	pub success_label: String,
	pub error_label: String,
	pub success_callback: String,
	pub error_callback: String,
	pub data_filter_callback: String,
	pub ajax_result_container: String,
}

impl ButtonSettings {
	const KEYS: &'static [&'static str] = &[
		"action",
		"label",
		"button_class",
		"wait_label",
		"success_label",
		"error_label",
		"success_callback",
		"error_callback",
		"data_filter_callback",
		"ajax_result_container",
	];
}

impl Default for ButtonSettings {
	fn default() -> Self {
		Self {
			action: "custom_action".into(),
			label: "Click me".into(),
			button_class: "button-primary".into(),
			wait_label: "Please wait...".into(),
			success_label: "Success".into(),
			error_label: "Error".into(),
			success_callback: String::new(),
			error_callback: String::new(),
			data_filter_callback: String::new(),
			ajax_result_container: "ajax_result_container".into(),
		}
	}
}

/// Product ids are given as numbers or strings
fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	Ok(match Value::deserialize(deserializer)? {
		Value::String(s) => s,
		Value::Null => String::new(),
		other => other.to_string(),
	})
}

/// Keys specific to a variant
pub fn variant_keys(variant: Variant) -> &'static [&'static str] {
	match variant {
		Variant::Text => TextSettings::KEYS,
		Variant::Textarea => TextareaSettings::KEYS,
		Variant::Select => SelectSettings::KEYS,
		Variant::Radio => RadioSettings::KEYS,
		Variant::Multicheck => MulticheckSettings::KEYS,
		Variant::Upload => UploadSettings::KEYS,
		Variant::License => LicenseSettings::KEYS,
		Variant::Content => ContentSettings::KEYS,
		Variant::Note => NoteSettings::KEYS,
		Variant::Button => ButtonSettings::KEYS,
		Variant::Checkbox | Variant::Header => &[],
	}
}

/// True if the variant renders a `css` setting
pub fn has_css_setting(variant: Variant) -> bool {
	variant_keys(variant).contains(&"css")
}

fn is_choice(variant: Variant) -> bool {
	matches!(variant, Variant::Select | Variant::Radio | Variant::Multicheck)
}

/// Split a configuration into accepted members and rejected key names
pub fn filter_keys(config: &Map<String, Value>, item_type: ItemType) -> (Map<String, Value>, Vec<String>) {
	let variant = item_type.variant();
	let mut accepted = Map::new();
	let mut rejected = Vec::new();
	for (key, value) in config {
		let key_str = key.as_str();
		let allowed = ITEM_KEYS.contains(&key_str)
			|| (variant.is_field() && FIELD_KEYS.contains(&key_str))
			|| (is_choice(variant) && CHOICE_KEYS.contains(&key_str))
			|| variant_keys(variant).contains(&key_str);
		if allowed {
			accepted.insert(key.clone(), value.clone());
		} else if !SILENT_KEYS.contains(&key_str) {
			rejected.push(key.clone());
		}
	}
	(accepted, rejected)
}

/// Variant defaults that differ from the shared item defaults. Forced
/// entries override the configuration.
pub fn apply_variant_defaults(config: &mut Map<String, Value>, variant: Variant) {
	let (defaults, forced): (&[(&str, bool)], &[(&str, bool)]) = match variant {
		Variant::License => (&[], &[("need_form", true), ("global_form_independent", true)]),
		Variant::Button => (&[("need_form", false), ("global_form_independent", true)], &[]),
		v if v.is_field() => (&[("need_form", true)], &[]),
		_ => (&[], &[]),
	};
	for (key, value) in defaults {
		config.entry(*key).or_insert(Value::Bool(*value));
	}
	for (key, value) in forced {
		config.insert((*key).to_string(), Value::Bool(*value));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn object(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			_ => Map::new(),
		}
	}

	#[test]
	fn test_filter_keys_reports_unknown() {
		let config = object(json!({
			"type": "text", "id": "a", "placeholder": "p", "bogus": 1, "mandatory": true, "options": {}
		}));
		let (accepted, rejected) = filter_keys(&config, ItemType::Text);
		assert!(accepted.contains_key("placeholder"));
		assert!(!accepted.contains_key("mandatory"));
		assert_eq!(rejected, vec!["bogus".to_string(), "options".to_string()]);
	}

	#[test]
	fn test_variant_defaults() {
		let mut field = object(json!({"id": "a"}));
		apply_variant_defaults(&mut field, Variant::Text);
		assert_eq!(field.get("need_form"), Some(&json!(true)));

		let mut license = object(json!({"need_form": false}));
		apply_variant_defaults(&mut license, Variant::License);
		assert_eq!(license.get("need_form"), Some(&json!(true)));
		assert_eq!(license.get("global_form_independent"), Some(&json!(true)));

		let mut button = object(json!({"global_form_independent": false}));
		apply_variant_defaults(&mut button, Variant::Button);
		assert_eq!(button.get("global_form_independent"), Some(&json!(false)));
	}

	#[test]
	fn test_loose_scalars() -> Result<(), serde_json::Error> {
		let text: TextSettings = serde_json::from_value(json!({"maxlength": "12", "max": 50, "is_password": "true"}))?;
		assert_eq!(text.maxlength, Some(12));
		assert_eq!(text.max, 50);
		assert!(text.is_password);
		assert_eq!(text.size, "regular");

		let license: LicenseSettings = serde_json::from_value(json!({"download_id": 42}))?;
		assert_eq!(license.download_id, "42");
		assert!(license.wp_override);
		Ok(())
	}

	#[test]
	fn test_select_all_forms() -> Result<(), serde_json::Error> {
		let flag: MulticheckSettings = serde_json::from_value(json!({"select_all": true}))?;
		assert_eq!(flag.select_all.label(), Some("Select All"));
		let label: MulticheckSettings = serde_json::from_value(json!({"select_all": "All of them"}))?;
		assert_eq!(label.select_all.label(), Some("All of them"));
		assert_eq!(MulticheckSettings::default().select_all.label(), None);
		assert!(has_css_setting(Variant::Radio));
		assert!(!has_css_setting(Variant::Checkbox));
		Ok(())
	}
}

// vim: ts=4
