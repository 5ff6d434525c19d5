//! Setting values
//!
//! Values keep the loose representation of the submitted form: a checkbox is
//! stored as `"1"`/`"0"` text and only becomes a `Bool` when read back through
//! the sanitizer. Multi-valued settings are ordered string lists.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
	Bool(bool),
	Int(i64),
	Text(String),
	List(Vec<String>),
}

impl FieldValue {
	pub fn empty_text() -> Self {
		FieldValue::Text(String::new())
	}

	/// Convert a stored JSON value. `null` means "no value".
	pub fn from_json(value: serde_json::Value) -> Option<Self> {
		use serde_json::Value;

		match value {
			Value::Null => None,
			Value::Bool(b) => Some(FieldValue::Bool(b)),
			Value::Number(n) => Some(match n.as_i64() {
				Some(i) => FieldValue::Int(i),
				None => FieldValue::Text(n.to_string()),
			}),
			Value::String(s) => Some(FieldValue::Text(s)),
			Value::Array(items) => Some(FieldValue::List(
				items
					.into_iter()
					.map(|item| match item {
						Value::String(s) => s,
						other => other.to_string(),
					})
					.collect(),
			)),
			Value::Object(_) => Some(FieldValue::Text(value.to_string())),
		}
	}

	pub fn to_json(&self) -> serde_json::Value {
		match self {
			FieldValue::Bool(b) => serde_json::Value::Bool(*b),
			FieldValue::Int(i) => serde_json::Value::from(*i),
			FieldValue::Text(s) => serde_json::Value::String(s.clone()),
			FieldValue::List(items) => {
				serde_json::Value::Array(items.iter().cloned().map(serde_json::Value::String).collect())
			}
		}
	}

	/// Loose truthiness: `false`, `0`, `""`, `"0"` and `[]` are false
	pub fn is_truthy(&self) -> bool {
		match self {
			FieldValue::Bool(b) => *b,
			FieldValue::Int(i) => *i != 0,
			FieldValue::Text(s) => !(s.is_empty() || s == "0"),
			FieldValue::List(items) => !items.is_empty(),
		}
	}

	pub fn is_empty(&self) -> bool {
		!self.is_truthy()
	}

	/// Text form used when the value is printed into markup
	pub fn as_text(&self) -> String {
		match self {
			FieldValue::Bool(true) => "1".to_string(),
			FieldValue::Bool(false) => String::new(),
			FieldValue::Int(i) => i.to_string(),
			FieldValue::Text(s) => s.clone(),
			FieldValue::List(items) => items.join(","),
		}
	}

	/// List view. Scalars that are empty give an empty list.
	pub fn as_list(&self) -> Vec<String> {
		match self {
			FieldValue::List(items) => items.clone(),
			other if other.is_empty() => Vec::new(),
			other => vec![other.as_text()],
		}
	}

	pub fn contains(&self, needle: &str) -> bool {
		match self {
			FieldValue::List(items) => items.iter().any(|i| i == needle),
			other => other.as_text() == needle,
		}
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		FieldValue::Text(value.to_string())
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		FieldValue::Text(value)
	}
}

impl From<bool> for FieldValue {
	fn from(value: bool) -> Self {
		FieldValue::Bool(value)
	}
}

impl From<i64> for FieldValue {
	fn from(value: i64) -> Self {
		FieldValue::Int(value)
	}
}

impl From<Vec<String>> for FieldValue {
	fn from(value: Vec<String>) -> Self {
		FieldValue::List(value)
	}
}

impl Default for FieldValue {
	fn default() -> Self {
		FieldValue::empty_text()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_from_json() {
		assert_eq!(FieldValue::from_json(json!(null)), None);
		assert_eq!(FieldValue::from_json(json!(3)), Some(FieldValue::Int(3)));
		assert_eq!(FieldValue::from_json(json!(1.5)), Some(FieldValue::Text("1.5".into())));
		assert_eq!(
			FieldValue::from_json(json!(["a", 2])),
			Some(FieldValue::List(vec!["a".into(), "2".into()]))
		);
	}

	#[test]
	fn test_truthiness() {
		assert!(!FieldValue::from("0").is_truthy());
		assert!(!FieldValue::from("").is_truthy());
		assert!(FieldValue::from("no").is_truthy());
		assert!(!FieldValue::List(vec![]).is_truthy());
		assert!(!FieldValue::Int(0).is_truthy());
	}

	#[test]
	fn test_text_and_list_views() {
		assert_eq!(FieldValue::Bool(true).as_text(), "1");
		assert_eq!(FieldValue::Bool(false).as_text(), "");
		assert_eq!(FieldValue::from("x").as_list(), vec!["x".to_string()]);
		assert!(FieldValue::from("").as_list().is_empty());
		assert!(FieldValue::List(vec!["a".into()]).contains("a"));
	}
}

// vim: ts=4
