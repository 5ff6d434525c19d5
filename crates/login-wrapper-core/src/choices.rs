//! Choice sources for select, radio and multicheck fields

use serde_json::Value;
use std::{fmt, sync::Arc};

use crate::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChoiceEntry {
	Option { value: String, label: String },
	/// Options rendered under a group label (`<optgroup>` in a select)
	Group { label: String, options: Vec<(String, String)> },
}

impl ChoiceEntry {
	pub fn option(value: impl Into<String>, label: impl Into<String>) -> Self {
		ChoiceEntry::Option { value: value.into(), label: label.into() }
	}

	/// Flattened `(value, label)` pairs
	pub fn pairs(&self) -> Vec<(&str, &str)> {
		match self {
			ChoiceEntry::Option { value, label } => vec![(value.as_str(), label.as_str())],
			ChoiceEntry::Group { options, .. } => {
				options.iter().map(|(v, l)| (v.as_str(), l.as_str())).collect()
			}
		}
	}
}

pub trait ChoiceStrategy: fmt::Debug + Send + Sync {
	fn choices(&self) -> Vec<ChoiceEntry>;
}

/// Static list declared in the item configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomChoices {
	entries: Vec<ChoiceEntry>,
}

impl CustomChoices {
	pub fn new(entries: Vec<ChoiceEntry>) -> Self {
		Self { entries }
	}

	/// Parse the `options` setting
	///
	/// An object maps values to labels, a nested object becomes a group.
	/// An array uses the element position as value.
	pub fn from_json(options: &Value) -> ClResult<Self> {
		let entries = match options {
			Value::Null => Vec::new(),
			Value::Object(map) => map
				.iter()
				.map(|(key, value)| match value {
					Value::Object(group) => ChoiceEntry::Group {
						label: key.clone(),
						options: group.iter().map(|(v, l)| (v.clone(), label_text(l))).collect(),
					},
					label => ChoiceEntry::option(key.clone(), label_text(label)),
				})
				.collect(),
			Value::Array(items) => items
				.iter()
				.enumerate()
				.map(|(idx, label)| ChoiceEntry::option(idx.to_string(), label_text(label)))
				.collect(),
			_ => return Err(Error::ValidationError("options must be an object or an array".into())),
		};
		Ok(Self { entries })
	}
}

impl ChoiceStrategy for CustomChoices {
	fn choices(&self) -> Vec<ChoiceEntry> {
		self.entries.clone()
	}
}

/// Choices computed on every render
#[derive(Clone)]
pub struct DynamicChoices {
	source: Arc<dyn Fn() -> Vec<ChoiceEntry> + Send + Sync>,
}

impl DynamicChoices {
	pub fn new(source: impl Fn() -> Vec<ChoiceEntry> + Send + Sync + 'static) -> Self {
		Self { source: Arc::new(source) }
	}
}

impl fmt::Debug for DynamicChoices {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("DynamicChoices")
	}
}

impl ChoiceStrategy for DynamicChoices {
	fn choices(&self) -> Vec<ChoiceEntry> {
		(self.source)()
	}
}

fn label_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}


// vim: ts=4
