//! Field value handlers
//!
//! A handler owns the value of exactly one field and decides where it lives.
//! [`OptionHandler`] persists through the option store under the field id,
//! [`FormFieldHandler`] keeps the submitted value until the next load, which
//! starts every request over from the default.
//!
//! Values go through two cleaners. On write the variant's set rule
//! ([`normalize_on_set`]) runs, then the field's set filters. On read the
//! type's sanitizer runs, then the get filters. A field that was never set
//! reads back its raw declared default.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{fmt, fmt::Debug, str::FromStr, sync::Arc};

use crate::form::FormData;
use crate::hooks::{FieldEvent, FieldHooks};
use crate::item_type::ItemType;
use crate::prelude::*;
use crate::sanitize::{normalize_on_set, sanitize};
use crate::value::FieldValue;
use login_wrapper_types::option_adapter::OptionAdapter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
	Option,
	FormField,
}

impl HandlerKind {
	pub fn as_str(self) -> &'static str {
		match self {
			HandlerKind::Option => "option",
			HandlerKind::FormField => "form_field",
		}
	}
}

impl FromStr for HandlerKind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"option" => Ok(HandlerKind::Option),
			"form_field" => Ok(HandlerKind::FormField),
			_ => Err(Error::ValidationError(format!("unknown handler type: {}", s))),
		}
	}
}

impl fmt::Display for HandlerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// ValueCell //
//***********//
#[derive(Debug)]
pub struct ValueCell {
	id: Box<str>,
	item_type: ItemType,
	default: FieldValue,
	value: RwLock<Option<FieldValue>>,
	hooks: RwLock<FieldHooks>,
}

impl ValueCell {
	pub fn new(id: &str, item_type: ItemType, default: FieldValue) -> Self {
		Self {
			id: id.into(),
			item_type,
			default,
			value: RwLock::new(None),
			hooks: RwLock::new(FieldHooks::default()),
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn item_type(&self) -> ItemType {
		self.item_type
	}

	pub fn default_value(&self) -> &FieldValue {
		&self.default
	}

	/// Current value through the read path
	pub fn get(&self) -> FieldValue {
		let raw = self.value.read().clone();
		match raw {
			None => self.default.clone(),
			Some(value) => self.hooks.read().apply_get(sanitize(value, self.item_type)),
		}
	}

	/// Stored representation, without read-side cleaning
	pub fn raw(&self) -> Option<FieldValue> {
		self.value.read().clone()
	}

	pub fn set(&self, value: FieldValue) {
		let value = normalize_on_set(value, self.item_type.variant());
		let value = self.hooks.read().apply_set(value);
		*self.value.write() = Some(value);
	}

	/// Adopt a value read back from storage without running the write path
	pub fn restore(&self, value: FieldValue) {
		*self.value.write() = Some(value);
	}

	pub fn reset_to_default(&self) {
		self.set(self.default.clone());
	}

	pub fn update_hooks(&self, f: impl FnOnce(&mut FieldHooks)) {
		f(&mut self.hooks.write());
	}

	pub fn notify(&self, event: FieldEvent) {
		let value = self.get();
		let hooks = self.hooks.read().clone();
		hooks.notify(event, &self.id, &value);
	}

	/// Take this field's value from a submission
	///
	/// An absent field is only written when its presence marker was posted:
	/// a checkbox marker stores `false`, a multicheck marker an empty list.
	/// Returns `false` when the payload does not concern this field.
	pub fn apply_submission(&self, form: &FormData) -> bool {
		if let Some(value) = form.value(&self.id) {
			self.set(value.clone());
		} else if form.has_checkbox_marker(&self.id) {
			self.set(FieldValue::Bool(false));
		} else if form.has_multicheck_marker(&self.id) {
			self.set(FieldValue::List(Vec::new()));
		} else {
			return false;
		}
		true
	}
}

// FieldHandler //
//**************//
#[async_trait]
pub trait FieldHandler: Debug + Send + Sync {
	fn kind(&self) -> HandlerKind;

	fn cell(&self) -> &ValueCell;

	/// Read the value from the backing store, adopting the default if absent
	async fn load(&self) -> ClResult<()>;

	/// Apply a submission. Returns `false` if nothing was submitted for the field.
	async fn save(&self, form: &FormData) -> ClResult<bool>;

	/// Restore the default. Only acts when the payload targets the field.
	async fn reset(&self, form: &FormData) -> ClResult<bool>;

	/// Write the current value to the backing store
	async fn persist(&self) -> ClResult<()>;
}

pub fn create_handler(
	kind: HandlerKind,
	cell: ValueCell,
	store: &Arc<dyn OptionAdapter>,
) -> Box<dyn FieldHandler> {
	match kind {
		HandlerKind::Option => Box::new(OptionHandler { cell, store: store.clone() }),
		HandlerKind::FormField => Box::new(FormFieldHandler { cell }),
	}
}

// OptionHandler //
//***************//
#[derive(Debug)]
pub struct OptionHandler {
	cell: ValueCell,
	store: Arc<dyn OptionAdapter>,
}

impl OptionHandler {
	pub fn new(cell: ValueCell, store: Arc<dyn OptionAdapter>) -> Self {
		Self { cell, store }
	}
}

#[async_trait]
impl FieldHandler for OptionHandler {
	fn kind(&self) -> HandlerKind {
		HandlerKind::Option
	}

	fn cell(&self) -> &ValueCell {
		&self.cell
	}

	async fn load(&self) -> ClResult<()> {
		match self.store.read_option(self.cell.id()).await?.and_then(FieldValue::from_json) {
			Some(value) => self.cell.restore(value),
			None => self.cell.reset_to_default(),
		}
		Ok(())
	}

	async fn save(&self, form: &FormData) -> ClResult<bool> {
		if !self.cell.apply_submission(form) {
			return Ok(false);
		}
		self.persist().await?;
		Ok(true)
	}

	async fn reset(&self, form: &FormData) -> ClResult<bool> {
		if !form.targets(self.cell.id()) {
			return Ok(false);
		}
		self.cell.reset_to_default();
		self.persist().await?;
		Ok(true)
	}

	async fn persist(&self) -> ClResult<()> {
		let value = self.cell.raw().map(|v| v.to_json());
		self.store.update_option(self.cell.id(), value).await
	}
}

// FormFieldHandler //
//******************//
#[derive(Debug)]
pub struct FormFieldHandler {
	cell: ValueCell,
}

impl FormFieldHandler {
	pub fn new(cell: ValueCell) -> Self {
		Self { cell }
	}
}

#[async_trait]
impl FieldHandler for FormFieldHandler {
	fn kind(&self) -> HandlerKind {
		HandlerKind::FormField
	}

	fn cell(&self) -> &ValueCell {
		&self.cell
	}

	/// Every request starts from the default
	async fn load(&self) -> ClResult<()> {
		self.cell.reset_to_default();
		Ok(())
	}

	async fn save(&self, form: &FormData) -> ClResult<bool> {
		Ok(self.cell.apply_submission(form))
	}

	async fn reset(&self, form: &FormData) -> ClResult<bool> {
		if !form.targets(self.cell.id()) {
			return Ok(false);
		}
		self.cell.reset_to_default();
		Ok(true)
	}

	async fn persist(&self) -> ClResult<()> {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use login_wrapper_types::option_adapter::MemoryOptionAdapter;
	use serde_json::json;

	fn option_handler(
		id: &str,
		item_type: ItemType,
		default: FieldValue,
	) -> (Arc<MemoryOptionAdapter>, OptionHandler) {
		let store = Arc::new(MemoryOptionAdapter::new());
		let handler = OptionHandler::new(ValueCell::new(id, item_type, default), store.clone());
		(store, handler)
	}

	#[tokio::test]
	async fn test_load_absent_adopts_default() -> ClResult<()> {
		let (store, handler) = option_handler("url", ItemType::Text, "https://site/".into());
		handler.load().await?;
		assert_eq!(handler.cell().get(), FieldValue::from("https://site/"));
		// Loading does not write the default back
		assert!(store.snapshot().is_empty());
		Ok(())
	}

	#[tokio::test]
	async fn test_default_matches_explicit_set() -> ClResult<()> {
		let (_, defaulted) = option_handler("flag", ItemType::Checkbox, FieldValue::Bool(true));
		defaulted.load().await?;

		let (_, explicit) = option_handler("flag", ItemType::Checkbox, FieldValue::Bool(false));
		explicit.cell().set(FieldValue::Bool(true));

		assert_eq!(defaulted.cell().get(), explicit.cell().get());
		assert_eq!(defaulted.cell().get(), FieldValue::Bool(true));
		Ok(())
	}

	#[tokio::test]
	async fn test_save_then_load_is_stable() -> ClResult<()> {
		let (store, handler) = option_handler("list", ItemType::Multicheck, FieldValue::default());
		let form = FormData::from_pairs([("list[]", "a"), ("list[]", "b")]);
		assert!(handler.save(&form).await?);
		assert_eq!(store.snapshot().get("list"), Some(&json!(["a", "b"])));

		handler.load().await?;
		let first = handler.cell().get();
		handler.load().await?;
		assert_eq!(handler.cell().get(), first);
		assert_eq!(first, FieldValue::List(vec!["a".into(), "b".into()]));
		Ok(())
	}

	#[tokio::test]
	async fn test_multicheck_reads_csv_storage() -> ClResult<()> {
		let (store, handler) = option_handler("list", ItemType::Multicheck, FieldValue::default());
		store.update_option("list", Some(json!("a,b"))).await?;
		handler.load().await?;
		assert_eq!(handler.cell().get(), FieldValue::List(vec!["a".into(), "b".into()]));
		Ok(())
	}

	#[tokio::test]
	async fn test_checkbox_marker_stores_false() -> ClResult<()> {
		let (store, handler) = option_handler("flag", ItemType::Checkbox, FieldValue::Bool(true));
		store.update_option("flag", Some(json!("1"))).await?;
		handler.load().await?;

		let form = FormData::from_pairs([("hidden_checkbox_flag", "1")]);
		assert!(handler.save(&form).await?);
		assert_eq!(store.snapshot().get("flag"), Some(&json!("0")));
		assert_eq!(handler.cell().get(), FieldValue::Bool(false));
		Ok(())
	}

	#[tokio::test]
	async fn test_absent_without_marker_is_noop() -> ClResult<()> {
		let (store, handler) = option_handler("flag", ItemType::Checkbox, FieldValue::Bool(true));
		store.update_option("flag", Some(json!("1"))).await?;
		let form = FormData::from_pairs([("other", "x")]);
		assert!(!handler.save(&form).await?);
		assert_eq!(store.snapshot().get("flag"), Some(&json!("1")));
		Ok(())
	}

	#[tokio::test]
	async fn test_reset_requires_target() -> ClResult<()> {
		let (store, handler) = option_handler("name", ItemType::Text, "def".into());
		store.update_option("name", Some(json!("custom"))).await?;
		handler.load().await?;

		assert!(!handler.reset(&FormData::from_pairs([("other", "")])).await?);
		assert_eq!(handler.cell().get(), FieldValue::from("custom"));

		assert!(handler.reset(&FormData::from_pairs([("name", "")])).await?);
		assert_eq!(store.snapshot().get("name"), Some(&json!("def")));
		Ok(())
	}

	#[tokio::test]
	async fn test_form_field_handler_stays_in_memory() -> ClResult<()> {
		let store: Arc<dyn OptionAdapter> = Arc::new(MemoryOptionAdapter::new());
		let cell = ValueCell::new("tmp", ItemType::Text, "a".into());
		let handler = create_handler(HandlerKind::FormField, cell, &store);
		handler.load().await?;
		assert!(handler.save(&FormData::from_pairs([("tmp", "b")])).await?);
		assert_eq!(handler.cell().get(), FieldValue::from("b"));
		assert!(store.list_options(None).await?.is_empty());
		Ok(())
	}

	#[tokio::test]
	async fn test_form_field_value_does_not_outlive_request() -> ClResult<()> {
		let store: Arc<dyn OptionAdapter> = Arc::new(MemoryOptionAdapter::new());
		let cell = ValueCell::new("tmp", ItemType::Text, "a".into());
		let handler = create_handler(HandlerKind::FormField, cell, &store);
		handler.load().await?;
		assert!(handler.save(&FormData::from_pairs([("tmp", "alice-secret")])).await?);

		handler.load().await?;
		assert_eq!(handler.cell().get(), FieldValue::from("a"));
		Ok(())
	}

	#[test]
	fn test_get_filters_follow_sanitizer() {
		let cell = ValueCell::new("n", ItemType::Number, FieldValue::default());
		cell.update_hooks(|h| {
			h.add_get_filter(Arc::new(|v| match v {
				FieldValue::Int(i) => FieldValue::Int(i + 1),
				other => other,
			}));
		});
		cell.set("".into());
		assert_eq!(cell.get(), FieldValue::Int(1));
	}

	#[test]
	fn test_handler_kind_parse() {
		assert_eq!("option".parse::<HandlerKind>().ok(), Some(HandlerKind::Option));
		assert_eq!("form_field".parse::<HandlerKind>().ok(), Some(HandlerKind::FormField));
		assert!("db".parse::<HandlerKind>().is_err());
	}
}

// vim: ts=4
