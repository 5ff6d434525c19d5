//! Type-driven value normalization
//!
//! [`sanitize`] runs on every read of a field value, [`normalize_on_set`] on
//! every write. Both are total: a type without a rule returns its input.

use crate::item_type::{ItemType, Variant};
use crate::value::FieldValue;

/// Normalize a raw stored or submitted value for its declared type
pub fn sanitize(value: FieldValue, item_type: ItemType) -> FieldValue {
	match item_type {
		ItemType::Text | ItemType::Textarea | ItemType::Color | ItemType::Radio => value,

		ItemType::Checkbox | ItemType::Enable => match value {
			FieldValue::Bool(_) => value,
			FieldValue::Text(ref s) if s == "1" => FieldValue::Bool(true),
			_ => FieldValue::Bool(false),
		},

		ItemType::Number => match value {
			FieldValue::Text(ref s) if s.is_empty() => FieldValue::Int(0),
			FieldValue::Bool(false) => FieldValue::Int(0),
			_ => value,
		},

		ItemType::Date => match value {
			FieldValue::Int(0) | FieldValue::Bool(false) => FieldValue::empty_text(),
			FieldValue::Text(ref s) if s == "0" => FieldValue::empty_text(),
			_ => value,
		},

		ItemType::WysiwygEditor => FieldValue::Text(strip_slashes(&value.as_text())),

		ItemType::EddLicensing => FieldValue::Text(sanitize_text_field(&value.as_text())),

		ItemType::Select => match value {
			FieldValue::List(_) => value,
			other => FieldValue::List(vec![other.as_text()]),
		},

		ItemType::Multicheck => FieldValue::List(to_list(value)),

		ItemType::Upload => match value {
			FieldValue::List(items) => {
				FieldValue::Text(items.into_iter().next().unwrap_or_default())
			}
			other => other,
		},

		ItemType::Content | ItemType::Header | ItemType::Note | ItemType::AjaxButton => value,
	}
}

/// Normalize a value before it is stored by a handler
pub fn normalize_on_set(value: FieldValue, variant: Variant) -> FieldValue {
	match variant {
		Variant::Checkbox => FieldValue::from(if value.is_truthy() { "1" } else { "0" }),
		Variant::Multicheck => FieldValue::List(to_list(value)),
		_ => value,
	}
}

/// Multi-valued normalization: empty, list, serialized list or CSV text
fn to_list(value: FieldValue) -> Vec<String> {
	if value.is_empty() {
		return Vec::new();
	}
	match value {
		FieldValue::List(items) => items,
		FieldValue::Text(s) => {
			if s.trim_start().starts_with('[') {
				if let Ok(items) = serde_json::from_str::<Vec<String>>(&s) {
					return items;
				}
			}
			s.split(',').map(str::to_string).collect()
		}
		other => vec![other.as_text()],
	}
}

/// Remove backslash escapes (`\'` -> `'`, `\\` -> `\`)
pub fn strip_slashes(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut chars = input.chars();
	while let Some(c) = chars.next() {
		if c == '\\' {
			if let Some(next) = chars.next() {
				out.push(next);
			}
		} else {
			out.push(c);
		}
	}
	out
}

/// Single-line text cleanup: strips tags and percent-encoded octets,
/// collapses whitespace and trims
pub fn sanitize_text_field(input: &str) -> String {
	let mut stripped = String::with_capacity(input.len());
	let mut in_tag = false;
	for c in input.chars() {
		match c {
			'<' => in_tag = true,
			'>' if in_tag => in_tag = false,
			_ if !in_tag => stripped.push(c),
			_ => {}
		}
	}

	let mut no_octets = String::with_capacity(stripped.len());
	let bytes = stripped.as_bytes();
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%'
			&& i + 2 < bytes.len()
			&& bytes[i + 1].is_ascii_hexdigit()
			&& bytes[i + 2].is_ascii_hexdigit()
		{
			i += 3;
			continue;
		}
		let ch_len = utf8_len(bytes[i]);
		no_octets.push_str(&stripped[i..i + ch_len]);
		i += ch_len;
	}

	no_octets.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn utf8_len(first: u8) -> usize {
	match first {
		0x00..=0x7f => 1,
		0xc0..=0xdf => 2,
		0xe0..=0xef => 3,
		_ => 4,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_checkbox_rules() {
		assert_eq!(sanitize("1".into(), ItemType::Checkbox), FieldValue::Bool(true));
		assert_eq!(sanitize("0".into(), ItemType::Checkbox), FieldValue::Bool(false));
		assert_eq!(sanitize("yes".into(), ItemType::Enable), FieldValue::Bool(false));
		assert_eq!(sanitize(FieldValue::Bool(true), ItemType::Checkbox), FieldValue::Bool(true));
	}

	#[test]
	fn test_number_and_date() {
		assert_eq!(sanitize("".into(), ItemType::Number), FieldValue::Int(0));
		assert_eq!(sanitize("12".into(), ItemType::Number), FieldValue::from("12"));
		assert_eq!(sanitize(FieldValue::Int(0), ItemType::Date), FieldValue::empty_text());
		assert_eq!(sanitize("2024-01-01".into(), ItemType::Date), FieldValue::from("2024-01-01"));
	}

	#[test]
	fn test_multicheck_representations() {
		let expected = FieldValue::List(vec!["a".into(), "b".into()]);
		assert_eq!(sanitize("a,b".into(), ItemType::Multicheck), expected);
		assert_eq!(sanitize(r#"["a","b"]"#.into(), ItemType::Multicheck), expected);
		assert_eq!(sanitize(expected.clone(), ItemType::Multicheck), expected);
		assert_eq!(sanitize("".into(), ItemType::Multicheck), FieldValue::List(vec![]));
	}

	#[test]
	fn test_select_and_upload() {
		assert_eq!(sanitize("x".into(), ItemType::Select), FieldValue::List(vec!["x".into()]));
		assert_eq!(
			sanitize(FieldValue::List(vec!["12".into(), "13".into()]), ItemType::Upload),
			FieldValue::from("12")
		);
	}

	#[test]
	fn test_text_cleanups() {
		assert_eq!(strip_slashes(r"It\'s a \\ path"), r"It's a \ path");
		assert_eq!(sanitize_text_field("  <b>KEY</b>-12%20\n 34 "), "KEY-12 34");
	}

	#[test]
	fn test_set_normalization() {
		assert_eq!(normalize_on_set(FieldValue::Bool(false), Variant::Checkbox), FieldValue::from("0"));
		assert_eq!(normalize_on_set("1".into(), Variant::Checkbox), FieldValue::from("1"));
		assert_eq!(
			normalize_on_set("a,b".into(), Variant::Multicheck),
			FieldValue::List(vec!["a".into(), "b".into()])
		);
		assert_eq!(normalize_on_set("x".into(), Variant::Text), FieldValue::from("x"));
	}
}

// vim: ts=4
