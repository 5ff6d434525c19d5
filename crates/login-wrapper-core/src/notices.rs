//! Admin-visible notices
//!
//! Registration problems are not errors: they are collected here and shown at
//! the top of every admin page, while the rest of the page keeps working.

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;
use std::fmt;

use crate::prelude::*;
use crate::template::TemplateEngine;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
	Error,
	Notice,
	Updated,
	Saved,
	Reset,
}

impl NoticeKind {
	pub fn as_str(self) -> &'static str {
		match self {
			NoticeKind::Error => "error",
			NoticeKind::Notice => "notice",
			NoticeKind::Updated => "updated",
			NoticeKind::Saved => "saved",
			NoticeKind::Reset => "reset",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"error" => Some(NoticeKind::Error),
			"notice" => Some(NoticeKind::Notice),
			"updated" => Some(NoticeKind::Updated),
			"saved" => Some(NoticeKind::Saved),
			"reset" => Some(NoticeKind::Reset),
			_ => None,
		}
	}
}

impl fmt::Display for NoticeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
	pub slug: Box<str>,
	pub kind: NoticeKind,
	/// Markup; interpolated identifiers are already escaped
	pub message: String,
}

#[derive(Debug, Default)]
pub struct Notices {
	notices: Mutex<Vec<Notice>>,
}

impl Notices {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&self, slug: &str, kind: NoticeKind, message: impl Into<String>) {
		let message = message.into();
		warn!(slug = %slug, kind = %kind, "{}", message);
		self.notices.lock().push(Notice { slug: slug.into(), kind, message });
	}

	pub fn list(&self) -> Vec<Notice> {
		self.notices.lock().clone()
	}

	pub fn len(&self) -> usize {
		self.notices.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.notices.lock().is_empty()
	}

	pub fn render(&self, engine: &TemplateEngine) -> ClResult<String> {
		let notices = self.notices.lock();
		engine.render("notices", &json!({ "notices": *notices }))
	}
}

/// Status line shown at the top of a page. Saved and reset messages are
/// emphasized and shown with the `updated` style.
pub fn format_notice(engine: &TemplateEngine, message: &str, kind: NoticeKind) -> ClResult<String> {
	let (kind, strong) = match kind {
		NoticeKind::Saved | NoticeKind::Reset => (NoticeKind::Updated, true),
		kind => (kind, false),
	};
	engine.render("status", &json!({ "kind": kind, "strong": strong, "message": message }))
}


// vim: ts=4
