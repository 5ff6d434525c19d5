//! Closed table of item type tags

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Type tag declared in an item configuration
///
/// Several tags are aliases implemented by a shared [`Variant`]. The tag is
/// kept on the item because the sanitizer normalizes by tag, not by variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
	Text,
	Textarea,
	WysiwygEditor,
	Checkbox,
	Enable,
	Color,
	Date,
	Number,
	Select,
	Radio,
	Multicheck,
	Upload,
	EddLicensing,
	Content,
	Header,
	Note,
	AjaxButton,
}

/// Implementation shared by one or more type tags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
	Text,
	Textarea,
	Checkbox,
	Select,
	Radio,
	Multicheck,
	Upload,
	License,
	Content,
	Header,
	Note,
	Button,
}

/// Why a tag was not accepted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeRejection {
	/// Known tag without an implementation in this edition
	Unsupported,
	/// Not a tag at all
	Unknown,
}

const UNSUPPORTED_TAGS: &[&str] = &[
	"file",
	"gallery",
	"sortable",
	"code",
	"select-posts",
	"select-terms",
	"select-users",
	"select-websafe-font-family",
	"select-google-font-family",
	"multicheck-posts",
	"multicheck-terms",
	"multicheck-users",
	"radio-image",
	"radio-font-icon",
	"radio-palette",
	"admin-item-group",
	"admin-item-form",
];

impl ItemType {
	pub const ALL: [ItemType; 17] = [
		ItemType::Text,
		ItemType::Textarea,
		ItemType::WysiwygEditor,
		ItemType::Checkbox,
		ItemType::Enable,
		ItemType::Color,
		ItemType::Date,
		ItemType::Number,
		ItemType::Select,
		ItemType::Radio,
		ItemType::Multicheck,
		ItemType::Upload,
		ItemType::EddLicensing,
		ItemType::Content,
		ItemType::Header,
		ItemType::Note,
		ItemType::AjaxButton,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			ItemType::Text => "text",
			ItemType::Textarea => "textarea",
			ItemType::WysiwygEditor => "wysiwyg-editor",
			ItemType::Checkbox => "checkbox",
			ItemType::Enable => "enable",
			ItemType::Color => "color",
			ItemType::Date => "date",
			ItemType::Number => "number",
			ItemType::Select => "select",
			ItemType::Radio => "radio",
			ItemType::Multicheck => "multicheck",
			ItemType::Upload => "upload",
			ItemType::EddLicensing => "edd-licensing",
			ItemType::Content => "content",
			ItemType::Header => "header",
			ItemType::Note => "note",
			ItemType::AjaxButton => "ajax-button",
		}
	}

	pub fn variant(self) -> Variant {
		match self {
			ItemType::Text | ItemType::Color | ItemType::Date | ItemType::Number => Variant::Text,
			ItemType::Textarea | ItemType::WysiwygEditor => Variant::Textarea,
			ItemType::Checkbox | ItemType::Enable => Variant::Checkbox,
			ItemType::Select => Variant::Select,
			ItemType::Radio => Variant::Radio,
			ItemType::Multicheck => Variant::Multicheck,
			ItemType::Upload => Variant::Upload,
			ItemType::EddLicensing => Variant::License,
			ItemType::Content => Variant::Content,
			ItemType::Header => Variant::Header,
			ItemType::Note => Variant::Note,
			ItemType::AjaxButton => Variant::Button,
		}
	}

	/// Fields carry a value and a handler, other items only render
	pub fn is_field(self) -> bool {
		self.variant().is_field()
	}
}

impl Variant {
	pub fn as_str(self) -> &'static str {
		match self {
			Variant::Text => "text",
			Variant::Textarea => "textarea",
			Variant::Checkbox => "checkbox",
			Variant::Select => "select",
			Variant::Radio => "radio",
			Variant::Multicheck => "multicheck",
			Variant::Upload => "upload",
			Variant::License => "edd-licensing",
			Variant::Content => "content",
			Variant::Header => "header",
			Variant::Note => "note",
			Variant::Button => "ajax-button",
		}
	}

	pub fn is_field(self) -> bool {
		!matches!(self, Variant::Content | Variant::Header | Variant::Note | Variant::Button)
	}
}

impl FromStr for ItemType {
	type Err = TypeRejection;

	fn from_str(tag: &str) -> Result<Self, Self::Err> {
		if let Some(item_type) = ItemType::ALL.into_iter().find(|t| t.as_str() == tag) {
			Ok(item_type)
		} else if UNSUPPORTED_TAGS.contains(&tag) {
			Err(TypeRejection::Unsupported)
		} else {
			Err(TypeRejection::Unknown)
		}
	}
}

impl fmt::Display for ItemType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_roundtrips_every_tag() {
		for t in ItemType::ALL {
			assert_eq!(t.as_str().parse::<ItemType>(), Ok(t));
		}
	}

	#[test]
	fn test_aliases_share_variants() {
		assert_eq!(ItemType::WysiwygEditor.variant(), Variant::Textarea);
		assert_eq!(ItemType::Number.variant(), Variant::Text);
		assert_eq!(ItemType::Enable.variant(), Variant::Checkbox);
		assert!(ItemType::EddLicensing.is_field());
		assert!(!ItemType::AjaxButton.is_field());
	}

	#[test]
	fn test_rejections() {
		assert_eq!("gallery".parse::<ItemType>(), Err(TypeRejection::Unsupported));
		assert_eq!("radio-image".parse::<ItemType>(), Err(TypeRejection::Unsupported));
		assert_eq!("spinner".parse::<ItemType>(), Err(TypeRejection::Unknown));
	}
}

// vim: ts=4
