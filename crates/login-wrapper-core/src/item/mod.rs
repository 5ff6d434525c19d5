//! Items: declarative page entries
//!
//! An item is built from an [`ItemConfig`]. Fields are the items that carry a
//! value: they own a [`FieldHandler`] and expose load/save/reset. The other
//! items (content, header, note, ajax button) only render.

pub mod license_field;
pub mod render;
pub mod settings;

use serde_json::{Map, Value};
use std::{fmt, sync::Arc};

use crate::choices::{ChoiceEntry, ChoiceStrategy, CustomChoices};
use crate::form::FormData;
use crate::handler::{FieldHandler, HandlerKind, ValueCell, create_handler};
use crate::hooks::{FieldCallback, FieldEvent, ValueFilter};
use crate::item_type::{ItemType, Variant};
use crate::license::LicenseApi;
use crate::prelude::*;
use crate::value::FieldValue;
use login_wrapper_types::option_adapter::OptionAdapter;

pub use license_field::{LicenseField, LicenseState};
pub use render::RenderCtx;
use settings::{
	ButtonSettings, ContentSettings, FieldSettings, ItemSettings, MulticheckSettings,
	NoteSettings, RadioSettings, SelectSettings, TextSettings, TextareaSettings, UploadSettings,
};

// ItemConfig //
//************//
/// Raw item configuration, as passed to the factory
#[derive(Clone, Default)]
pub struct ItemConfig {
	values: Map<String, Value>,
	choices: Option<Arc<dyn ChoiceStrategy>>,
}

impl ItemConfig {
	pub fn new(item_type: &str, id: &str) -> Self {
		Self::default().with("type", item_type).with("id", id)
	}

	/// Configuration from a JSON object
	pub fn from_json(value: Value) -> ClResult<Self> {
		match value {
			Value::Object(values) => Ok(Self { values, choices: None }),
			_ => Err(Error::ValidationError("item configuration must be an object".into())),
		}
	}

	pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
		self.values.insert(key.to_string(), value.into());
		self
	}

	/// Use a custom choice source instead of the `options` setting
	pub fn with_choices(mut self, strategy: Arc<dyn ChoiceStrategy>) -> Self {
		self.choices = Some(strategy);
		self
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.values.get(key)
	}

	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.values.get(key).and_then(Value::as_str)
	}

	pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
		self.values.insert(key.to_string(), value.into());
	}

	pub(crate) fn into_parts(self) -> (Map<String, Value>, Option<Arc<dyn ChoiceStrategy>>) {
		(self.values, self.choices)
	}
}

impl fmt::Debug for ItemConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ItemConfig")
			.field("values", &self.values)
			.field("choices", &self.choices.is_some())
			.finish()
	}
}

/// Services an item may need at runtime
#[derive(Debug, Clone)]
pub struct ItemDeps {
	pub store: Arc<dyn OptionAdapter>,
	pub license_api: Arc<dyn LicenseApi>,
	pub site_url: Box<str>,
}

// Assets //
//********//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
	Style,
	Script,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Asset {
	pub handle: &'static str,
	pub kind: AssetKind,
	pub path: &'static str,
}

const fn style(handle: &'static str, path: &'static str) -> Asset {
	Asset { handle, kind: AssetKind::Style, path }
}

const fn script(handle: &'static str, path: &'static str) -> Asset {
	Asset { handle, kind: AssetKind::Script, path }
}

/// Assets every admin page loads
pub const PAGE_ASSETS: &[Asset] = &[
	script("sk-admin-builder-serialize", "js/min/serialize-min.js"),
	script("sk-admin-builder-styling", "js/min/admin-styling-min.js"),
	style("sk-admin-builder-admin-styles", "css/sk-admin-builder.css"),
];

const TEXT_ASSETS: &[Asset] = &[style("sk-admin-builder-text-field-style", "css/sk-field-text.css")];
const TEXTAREA_ASSETS: &[Asset] =
	&[style("sk-admin-builder-textarea-field-style", "css/sk-field-textarea.css")];
const CHECKBOX_ASSETS: &[Asset] =
	&[style("sk-admin-builder-checkbox-field-style", "css/sk-field-checkbox.css")];
const SELECT_ASSETS: &[Asset] = &[
	script("sk-admin-builder-select2", "js/select2/select2.min.js"),
	style("sk-admin-builder-select2-style", "css/select2/select2.min.css"),
	style("sk-admin-builder-select-field-style", "css/sk-field-select.css"),
];
const RADIO_ASSETS: &[Asset] =
	&[style("sk-admin-builder-radio-field-style", "css/sk-field-radio.css")];
const MULTICHECK_ASSETS: &[Asset] = &[
	style("sk-admin-builder-multicheck-field-style", "css/sk-field-multicheck.css"),
	script("sk-admin-builder-multicheck-select-all", "js/multicheck-select-all.js"),
];
const UPLOAD_ASSETS: &[Asset] =
	&[style("sk-admin-builder-upload-field-style", "css/sk-field-upload.css")];
const LICENSE_ASSETS: &[Asset] =
	&[style("sk-admin-builder-edd-licensing-field-style", "css/sk-field-edd-licensing.css")];
const CONTENT_ASSETS: &[Asset] =
	&[style("sk-admin-builder-content-item-style", "css/sk-item-content.css")];
const HEADER_ASSETS: &[Asset] =
	&[style("sk-admin-builder-header-item-style", "css/sk-item-header.css")];
const NOTE_ASSETS: &[Asset] = &[style("sk-admin-builder-note-item-style", "css/sk-item-note.css")];

pub fn variant_assets(variant: Variant) -> &'static [Asset] {
	match variant {
		Variant::Text => TEXT_ASSETS,
		Variant::Textarea => TEXTAREA_ASSETS,
		Variant::Checkbox => CHECKBOX_ASSETS,
		Variant::Select => SELECT_ASSETS,
		Variant::Radio => RADIO_ASSETS,
		Variant::Multicheck => MULTICHECK_ASSETS,
		Variant::Upload => UPLOAD_ASSETS,
		Variant::License => LICENSE_ASSETS,
		Variant::Content => CONTENT_ASSETS,
		Variant::Header => HEADER_ASSETS,
		Variant::Note => NOTE_ASSETS,
		Variant::Button => &[],
	}
}

// Field //
//*******//
#[derive(Debug)]
pub struct Field {
	settings: FieldSettings,
	handler: Box<dyn FieldHandler>,
	choices: Option<Arc<dyn ChoiceStrategy>>,
}

impl Field {
	pub fn settings(&self) -> &FieldSettings {
		&self.settings
	}

	pub fn handler_kind(&self) -> HandlerKind {
		self.handler.kind()
	}

	pub fn handler(&self) -> &dyn FieldHandler {
		self.handler.as_ref()
	}

	pub fn cell(&self) -> &ValueCell {
		self.handler.cell()
	}

	/// Current value, cleaned for the field type
	pub fn value(&self) -> FieldValue {
		self.cell().get()
	}

	pub fn set_value(&self, value: FieldValue) {
		self.cell().set(value);
	}

	pub fn choices(&self) -> Vec<ChoiceEntry> {
		self.choices.as_ref().map(|c| c.choices()).unwrap_or_default()
	}

	pub fn add_set_filter(&self, filter: ValueFilter) {
		self.cell().update_hooks(|h| h.add_set_filter(filter));
	}

	pub fn add_get_filter(&self, filter: ValueFilter) {
		self.cell().update_hooks(|h| h.add_get_filter(filter));
	}

	pub fn on(&self, event: FieldEvent, callback: FieldCallback) {
		self.cell().update_hooks(|h| h.add_callback(event, callback));
	}
}

// Item //
//******//
#[derive(Debug)]
pub enum ItemKind {
	Text(TextSettings),
	Textarea(TextareaSettings),
	Checkbox,
	Select(SelectSettings),
	Radio(RadioSettings),
	Multicheck(MulticheckSettings),
	Upload(UploadSettings),
	License(Box<LicenseField>),
	Content(ContentSettings),
	Header,
	Note(NoteSettings),
	Button(ButtonSettings),
}

#[derive(Debug)]
pub struct Item {
	item_type: ItemType,
	settings: ItemSettings,
	kind: ItemKind,
	field: Option<Field>,
}

fn parse<T: serde::de::DeserializeOwned>(values: &Map<String, Value>, what: &str) -> ClResult<T> {
	serde_json::from_value(Value::Object(values.clone()))
		.map_err(|e| Error::ValidationError(format!("invalid {} settings: {}", what, e)))
}

impl Item {
	/// Build an item from validated settings. `handler` is required for fields.
	pub(crate) fn build(
		item_type: ItemType,
		values: &Map<String, Value>,
		choices: Option<Arc<dyn ChoiceStrategy>>,
		handler: Option<HandlerKind>,
		deps: &ItemDeps,
	) -> ClResult<Item> {
		let variant = item_type.variant();
		let settings: ItemSettings = parse(values, item_type.as_str())?;

		let kind = match variant {
			Variant::Text => ItemKind::Text(parse(values, "text")?),
			Variant::Textarea => ItemKind::Textarea(parse(values, "textarea")?),
			Variant::Checkbox => ItemKind::Checkbox,
			Variant::Select => ItemKind::Select(parse(values, "select")?),
			Variant::Radio => ItemKind::Radio(parse(values, "radio")?),
			Variant::Multicheck => ItemKind::Multicheck(parse(values, "multicheck")?),
			Variant::Upload => ItemKind::Upload(parse(values, "upload")?),
			Variant::License => ItemKind::License(Box::new(LicenseField::new(
				parse(values, "license")?,
				deps,
			))),
			Variant::Content => ItemKind::Content(parse(values, "content")?),
			Variant::Header => ItemKind::Header,
			Variant::Note => ItemKind::Note(parse(values, "note")?),
			Variant::Button => ItemKind::Button(parse(values, "button")?),
		};

		let field = if variant.is_field() {
			let handler = handler
				.ok_or_else(|| Error::ValidationError("field needs a handler type".into()))?;
			let field_settings: FieldSettings = parse(values, "field")?;
			let choices = match (variant, choices) {
				(Variant::Select | Variant::Radio | Variant::Multicheck, Some(strategy)) => {
					Some(strategy)
				}
				(Variant::Select | Variant::Radio | Variant::Multicheck, None) => {
					let options = values.get("options").cloned().unwrap_or(Value::Null);
					Some(Arc::new(CustomChoices::from_json(&options)?) as Arc<dyn ChoiceStrategy>)
				}
				_ => None,
			};
			let default = FieldValue::from_json(field_settings.default.clone()).unwrap_or_default();
			let cell = ValueCell::new(&settings.id, item_type, default);
			Some(Field {
				settings: field_settings,
				handler: create_handler(handler, cell, &deps.store),
				choices,
			})
		} else {
			None
		};

		Ok(Item { item_type, settings, kind, field })
	}

	pub fn id(&self) -> &str {
		&self.settings.id
	}

	pub fn item_type(&self) -> ItemType {
		self.item_type
	}

	pub fn variant(&self) -> Variant {
		self.item_type.variant()
	}

	pub fn settings(&self) -> &ItemSettings {
		&self.settings
	}

	pub fn kind(&self) -> &ItemKind {
		&self.kind
	}

	pub fn field(&self) -> Option<&Field> {
		self.field.as_ref()
	}

	pub fn license(&self) -> Option<&LicenseField> {
		match &self.kind {
			ItemKind::License(license) => Some(license),
			_ => None,
		}
	}

	pub fn needs_form(&self) -> bool {
		self.settings.need_form
	}

	/// Rendered outside the shared page form
	pub fn is_form_independent(&self) -> bool {
		self.settings.global_form_independent
	}

	pub fn has_css_setting(&self) -> bool {
		settings::has_css_setting(self.variant())
	}

	pub fn assets(&self) -> &'static [Asset] {
		variant_assets(self.variant())
	}

	pub async fn load(&self) -> ClResult<()> {
		let Some(field) = &self.field else {
			return Ok(());
		};
		field.handler.load().await?;
		if let Some(license) = self.license() {
			license.refresh(self.id(), &field.value()).await?;
		}
		field.cell().notify(FieldEvent::Loaded);
		Ok(())
	}

	/// Apply a submission. Returns `true` if the field took a value.
	pub async fn save(&self, form: &FormData) -> ClResult<bool> {
		let Some(field) = &self.field else {
			return Ok(false);
		};
		let saved = match self.license() {
			Some(license) => license.submit(field, form).await?,
			None => field.handler.save(form).await?,
		};
		if saved {
			debug!(field = %self.id(), "Field saved");
			field.cell().notify(FieldEvent::Saved);
		}
		Ok(saved)
	}

	pub async fn reset(&self, form: &FormData) -> ClResult<bool> {
		let Some(field) = &self.field else {
			return Ok(false);
		};
		let reset = field.handler.reset(form).await?;
		if reset {
			debug!(field = %self.id(), "Field reset");
			field.cell().notify(FieldEvent::Reset);
		}
		Ok(reset)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::license::{LicenseCall, LicenseReply};
	use async_trait::async_trait;
	use login_wrapper_types::option_adapter::MemoryOptionAdapter;
	use serde_json::json;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[derive(Debug)]
	struct NoLicenseApi;

	#[async_trait]
	impl LicenseApi for NoLicenseApi {
		async fn post(&self, _call: LicenseCall<'_>) -> ClResult<LicenseReply> {
			Err(Error::NetworkError("offline".into()))
		}
	}

	fn deps() -> ItemDeps {
		ItemDeps {
			store: Arc::new(MemoryOptionAdapter::new()),
			license_api: Arc::new(NoLicenseApi),
			site_url: "https://site/".into(),
		}
	}

	fn build(config: &Value, handler: Option<HandlerKind>, deps: &ItemDeps) -> ClResult<Item> {
		let mut values = match config {
			Value::Object(map) => map.clone(),
			_ => Map::new(),
		};
		let item_type: ItemType = values
			.get("type")
			.and_then(Value::as_str)
			.and_then(|t| t.parse().ok())
			.ok_or(Error::Parse)?;
		settings::apply_variant_defaults(&mut values, item_type.variant());
		Item::build(item_type, &values, None, handler, deps)
	}

	#[tokio::test]
	async fn test_field_lifecycle_and_callbacks() -> ClResult<()> {
		let deps = deps();
		let item = build(
			&json!({"type": "multicheck", "id": "roles", "options": {"a": "A", "b": "B"}}),
			Some(HandlerKind::Option),
			&deps,
		)?;
		let saved = Arc::new(AtomicUsize::new(0));
		let counter = saved.clone();
		if let Some(field) = item.field() {
			field.on(
				FieldEvent::Saved,
				Arc::new(move |_, _| {
					counter.fetch_add(1, Ordering::SeqCst);
				}),
			);
		}

		item.load().await?;
		assert!(item.needs_form());
		assert!(item.save(&FormData::from_pairs([("roles[]", "b")])).await?);
		assert!(!item.save(&FormData::from_pairs([("other", "x")])).await?);
		assert_eq!(saved.load(Ordering::SeqCst), 1);
		assert_eq!(
			item.field().map(Field::value),
			Some(FieldValue::List(vec!["b".into()]))
		);
		assert_eq!(deps.store.read_option("roles").await?, Some(json!(["b"])));
		Ok(())
	}

	#[test]
	fn test_non_field_items_have_no_value() -> ClResult<()> {
		let deps = deps();
		let note = build(&json!({"type": "note", "id": "n", "desc": "Hi"}), None, &deps)?;
		assert!(note.field().is_none());
		assert!(!note.needs_form());

		let button = build(&json!({"type": "ajax-button", "id": "b"}), None, &deps)?;
		assert!(button.is_form_independent());
		Ok(())
	}

	#[test]
	fn test_field_without_handler_is_rejected() {
		let deps = deps();
		assert!(build(&json!({"type": "text", "id": "t"}), None, &deps).is_err());
	}

	#[test]
	fn test_invalid_options_are_rejected() {
		let deps = deps();
		let result =
			build(&json!({"type": "select", "id": "s", "options": 12}), Some(HandlerKind::Option), &deps);
		assert!(result.is_err());
	}
}

// vim: ts=4
