//! Item factory
//!
//! Turns [`ItemConfig`]s into items and keeps the registry of every item
//! built so far, keyed by id. A broken configuration never fails the caller:
//! the problem is recorded as an admin notice and `create` returns `None`.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::handler::HandlerKind;
use crate::html::code;
use crate::item::{Asset, Item, ItemConfig, ItemDeps, settings};
use crate::item_type::{ItemType, TypeRejection};
use crate::notices::{NoticeKind, Notices};
use crate::prelude::*;

const CREATE_SLUG: &str = "create_item";
const VALIDATE_SLUG: &str = "validate_settings";

/// An asset requested by an item, in registration order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredAsset {
	/// Id of the item that registered it
	pub owner: Box<str>,
	pub asset: Asset,
}

#[derive(Debug)]
pub struct ItemFactory {
	deps: ItemDeps,
	notices: Arc<Notices>,
	items: Vec<Arc<Item>>,
	by_id: HashMap<String, Arc<Item>>,
	enqueued: HashSet<ItemType>,
	assets: Vec<RegisteredAsset>,
}

impl ItemFactory {
	pub fn new(deps: ItemDeps, notices: Arc<Notices>) -> Self {
		Self {
			deps,
			notices,
			items: Vec::new(),
			by_id: HashMap::new(),
			enqueued: HashSet::new(),
			assets: Vec::new(),
		}
	}

	pub fn notices(&self) -> &Arc<Notices> {
		&self.notices
	}

	fn reject(&self, message: String) -> Option<Arc<Item>> {
		self.notices.add(CREATE_SLUG, NoticeKind::Error, message);
		None
	}

	/// Build and register an item
	pub fn create(&mut self, config: ItemConfig) -> Option<Arc<Item>> {
		let (values, choices) = config.into_parts();

		let Some(tag) = values.get("type").and_then(Value::as_str).map(str::to_string) else {
			return self.reject("Item type must be specified.".into());
		};
		let id = match values.get("id") {
			Some(Value::String(id)) if !id.is_empty() => id.clone(),
			Some(Value::Number(id)) => id.to_string(),
			_ => {
				return self.reject(format!("{} needs a {} parameter.", code(CREATE_SLUG), code("id")));
			}
		};
		if self.by_id.contains_key(&id) {
			return self.reject(format!(
				"All item IDs must be unique. The id {} has been used multiple times.",
				code(&id)
			));
		}

		let item_type = match tag.parse::<ItemType>() {
			Ok(item_type) => item_type,
			Err(TypeRejection::Unsupported) => {
				return self.reject(format!(
					"Item type or extended class {} not supported in basic version.",
					code(&tag)
				));
			}
			Err(TypeRejection::Unknown) => {
				return self
					.reject(format!("Item type or extended class {} does not exist.", code(&tag)));
			}
		};

		let handler = if item_type.is_field() {
			let kind = values
				.get("handler_type")
				.and_then(Value::as_str)
				.and_then(|h| h.parse::<HandlerKind>().ok());
			match kind {
				Some(kind) => Some(kind),
				None => {
					return self.reject(format!(
						"Field must be {} or {}.",
						code(HandlerKind::Option.as_str()),
						code(HandlerKind::FormField.as_str())
					));
				}
			}
		} else {
			None
		};

		let (mut accepted, rejected) = settings::filter_keys(&values, item_type);
		for key in rejected {
			self.notices.add(
				VALIDATE_SLUG,
				NoticeKind::Notice,
				format!("Setting {} not supported for field {}", code(&key), code(&tag)),
			);
		}
		settings::apply_variant_defaults(&mut accepted, item_type.variant());

		let item = match Item::build(item_type, &accepted, choices, handler, &self.deps) {
			Ok(item) => Arc::new(item),
			Err(err) => {
				return self.reject(format!("Item {} could not be created: {}", code(&id), err));
			}
		};
		debug!(item = %id, item_type = %item_type, "Item created");

		self.register_assets(&item);
		self.by_id.insert(id, item.clone());
		self.items.push(item.clone());
		Some(item)
	}

	/// Shared assets register once per type; with `enqueue_once` unset they
	/// register for every instance
	fn register_assets(&mut self, item: &Item) {
		let per_instance = !item.settings().enqueue_once;
		if per_instance || self.enqueued.insert(item.item_type()) {
			self.assets.extend(
				item.assets()
					.iter()
					.map(|asset| RegisteredAsset { owner: item.id().into(), asset: *asset }),
			);
		}
	}

	pub fn get(&self, id: &str) -> Option<Arc<Item>> {
		self.by_id.get(id).cloned()
	}

	/// All items in registration order
	pub fn items(&self) -> &[Arc<Item>] {
		&self.items
	}

	pub fn assets(&self) -> &[RegisteredAsset] {
		&self.assets
	}

	/// Fields bound to a handler kind (option fields when `None`), optionally
	/// narrowed to one declared type and to variants with a `css` setting
	pub fn list_by_type_and_filter(
		&self,
		handler: Option<HandlerKind>,
		field_type: Option<ItemType>,
		only_css: bool,
	) -> Vec<Arc<Item>> {
		let handler = handler.unwrap_or(HandlerKind::Option);
		self.items
			.iter()
			.filter(|item| item.field().is_some_and(|f| f.handler_kind() == handler))
			.filter(|item| field_type.is_none_or(|t| item.item_type() == t))
			.filter(|item| !only_css || item.has_css_setting())
			.cloned()
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::license::{LicenseApi, LicenseCall, LicenseReply};
	use async_trait::async_trait;
	use login_wrapper_types::option_adapter::MemoryOptionAdapter;
	use serde_json::json;

	#[derive(Debug)]
	struct Offline;

	#[async_trait]
	impl LicenseApi for Offline {
		async fn post(&self, _call: LicenseCall<'_>) -> ClResult<LicenseReply> {
			Err(Error::NetworkError("offline".into()))
		}
	}

	fn factory() -> ItemFactory {
		let deps = ItemDeps {
			store: Arc::new(MemoryOptionAdapter::new()),
			license_api: Arc::new(Offline),
			site_url: "https://site/".into(),
		};
		ItemFactory::new(deps, Arc::new(Notices::new()))
	}

	fn option(item_type: &str, id: &str) -> ItemConfig {
		ItemConfig::new(item_type, id).with("handler_type", "option")
	}

	#[test]
	fn test_duplicate_id_is_rejected() {
		let mut factory = factory();
		assert!(factory.create(option("text", "x")).is_some());
		assert!(factory.create(option("text", "x")).is_none());

		let notices = factory.notices().list();
		assert_eq!(notices.len(), 1);
		assert_eq!(notices[0].kind, NoticeKind::Error);
		assert!(notices[0].message.contains("<code>x</code> has been used multiple times"));
		assert_eq!(factory.items().len(), 1);
	}

	#[test]
	fn test_missing_type_or_id() {
		let mut factory = factory();
		assert!(factory.create(ItemConfig::default().with("id", "a")).is_none());
		assert!(factory.create(ItemConfig::default().with("type", "text")).is_none());

		let messages: Vec<String> = factory.notices().list().into_iter().map(|n| n.message).collect();
		assert_eq!(messages[0], "Item type must be specified.");
		assert_eq!(messages[1], "<code>create_item</code> needs a <code>id</code> parameter.");
	}

	#[test]
	fn test_type_rejections() {
		let mut factory = factory();
		assert!(factory.create(option("gallery", "g")).is_none());
		assert!(factory.create(option("spinner", "s")).is_none());
		assert!(factory.create(ItemConfig::new("text", "t")).is_none());

		let messages: Vec<String> = factory.notices().list().into_iter().map(|n| n.message).collect();
		assert!(messages[0].ends_with("not supported in basic version."));
		assert!(messages[1].ends_with("does not exist."));
		assert_eq!(messages[2], "Field must be <code>option</code> or <code>form_field</code>.");
	}

	#[test]
	fn test_unknown_keys_warn_but_register() {
		let mut factory = factory();
		let item = factory.create(option("checkbox", "c").with("placeholder", "p"));
		assert!(item.is_some());

		let notices = factory.notices().list();
		assert_eq!(notices.len(), 1);
		assert_eq!(notices[0].kind, NoticeKind::Notice);
		assert_eq!(
			notices[0].message,
			"Setting <code>placeholder</code> not supported for field <code>checkbox</code>"
		);
	}

	#[test]
	fn test_assets_once_per_type() {
		let mut factory = factory();
		factory.create(option("text", "a"));
		factory.create(option("text", "b"));
		factory.create(option("text", "c").with("enqueue_once", false));
		factory.create(ItemConfig::new("header", "h"));

		let owners: Vec<&str> = factory.assets().iter().map(|a| a.owner.as_ref()).collect();
		assert_eq!(owners, vec!["a", "c", "h"]);
	}

	#[test]
	fn test_list_by_type_and_filter() {
		let mut factory = factory();
		factory.create(option("text", "a"));
		factory.create(option("radio", "r").with("options", json!({"x": "X"})));
		factory.create(ItemConfig::new("text", "f").with("handler_type", "form_field"));
		factory.create(ItemConfig::new("content", "c"));

		let ids = |items: Vec<Arc<Item>>| items.iter().map(|i| i.id().to_string()).collect::<Vec<_>>();
		assert_eq!(ids(factory.list_by_type_and_filter(None, None, false)), vec!["a", "r"]);
		assert_eq!(ids(factory.list_by_type_and_filter(None, Some(ItemType::Radio), false)), vec!["r"]);
		assert_eq!(
			ids(factory.list_by_type_and_filter(Some(HandlerKind::FormField), None, false)),
			vec!["f"]
		);
		assert_eq!(ids(factory.list_by_type_and_filter(None, None, true)), vec!["a", "r"]);
		assert!(factory.get("c").is_some());
		assert!(factory.get("missing").is_none());
	}
}

// vim: ts=4
