//! Submitted form payload
//!
//! Browsers omit unchecked checkboxes and empty multi-selects from a form
//! post. Those fields render a companion presence marker
//! (`hidden_checkbox_<id>` / `hidden_multicheck_<id>`) so a handler can tell
//! "not submitted" from "submitted as empty". JSON bodies do not need the
//! markers: an explicit `false` or `[]` is kept as a value.

use crate::prelude::*;
use crate::value::FieldValue;

pub const CHECKBOX_MARKER_PREFIX: &str = "hidden_checkbox_";
pub const MULTICHECK_MARKER_PREFIX: &str = "hidden_multicheck_";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData {
	entries: Vec<(String, FieldValue)>,
}

impl FormData {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build from url-encoded pairs. `name[]` keys are collected into a list.
	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut form = FormData::new();
		for (key, value) in pairs {
			let key: String = key.into();
			let value: String = value.into();
			if let Some(name) = key.strip_suffix("[]") {
				match form.entry_mut(name) {
					Some(FieldValue::List(items)) => items.push(value),
					Some(other) => *other = FieldValue::List(vec![value]),
					None => form.entries.push((name.to_string(), FieldValue::List(vec![value]))),
				}
			} else {
				form.set(key, FieldValue::Text(value));
			}
		}
		form
	}

	/// Build from a JSON object body. `null` members count as absent.
	pub fn from_json(body: &[u8]) -> ClResult<Self> {
		let map: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)?;
		let mut form = FormData::new();
		for (key, value) in map {
			if let Some(value) = FieldValue::from_json(value) {
				form.entries.push((key, value));
			}
		}
		Ok(form)
	}

	fn entry_mut(&mut self, key: &str) -> Option<&mut FieldValue> {
		self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.entries.iter().any(|(k, _)| k == key)
	}

	pub fn value(&self, key: &str) -> Option<&FieldValue> {
		self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	/// Text of a scalar entry
	pub fn text(&self, key: &str) -> Option<String> {
		self.value(key).map(FieldValue::as_text)
	}

	pub fn set(&mut self, key: impl Into<String>, value: FieldValue) {
		let key = key.into();
		match self.entry_mut(&key) {
			Some(slot) => *slot = value,
			None => self.entries.push((key, value)),
		}
	}

	pub fn has_checkbox_marker(&self, id: &str) -> bool {
		self.contains(&format!("{}{}", CHECKBOX_MARKER_PREFIX, id))
	}

	pub fn has_multicheck_marker(&self, id: &str) -> bool {
		self.contains(&format!("{}{}", MULTICHECK_MARKER_PREFIX, id))
	}

	/// True if the payload carries the field itself or one of its markers
	pub fn targets(&self, id: &str) -> bool {
		self.contains(id) || self.has_checkbox_marker(id) || self.has_multicheck_marker(id)
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}


// vim: ts=4
