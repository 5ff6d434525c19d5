//! Extension points attached to fields and pages
//!
//! Filters transform a value or a piece of markup, callbacks observe a field
//! after a lifecycle step completed.

use std::fmt;
use std::sync::Arc;

use crate::value::FieldValue;

pub type ValueFilter = Arc<dyn Fn(FieldValue) -> FieldValue + Send + Sync>;
pub type FieldCallback = Arc<dyn Fn(&str, &FieldValue) + Send + Sync>;
pub type MarkupFilter = Arc<dyn Fn(String, &str) -> String + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldEvent {
	Saved,
	Loaded,
	Reset,
}

/// Per-field filters and lifecycle callbacks
#[derive(Clone, Default)]
pub struct FieldHooks {
	set_filters: Vec<ValueFilter>,
	get_filters: Vec<ValueFilter>,
	saved: Vec<FieldCallback>,
	loaded: Vec<FieldCallback>,
	reset: Vec<FieldCallback>,
}

impl FieldHooks {
	pub fn add_set_filter(&mut self, filter: ValueFilter) {
		self.set_filters.push(filter);
	}

	pub fn add_get_filter(&mut self, filter: ValueFilter) {
		self.get_filters.push(filter);
	}

	pub fn add_callback(&mut self, event: FieldEvent, callback: FieldCallback) {
		match event {
			FieldEvent::Saved => self.saved.push(callback),
			FieldEvent::Loaded => self.loaded.push(callback),
			FieldEvent::Reset => self.reset.push(callback),
		}
	}

	pub fn apply_set(&self, value: FieldValue) -> FieldValue {
		self.set_filters.iter().fold(value, |v, f| f(v))
	}

	pub fn apply_get(&self, value: FieldValue) -> FieldValue {
		self.get_filters.iter().fold(value, |v, f| f(v))
	}

	pub fn notify(&self, event: FieldEvent, id: &str, value: &FieldValue) {
		let callbacks = match event {
			FieldEvent::Saved => &self.saved,
			FieldEvent::Loaded => &self.loaded,
			FieldEvent::Reset => &self.reset,
		};
		for callback in callbacks {
			callback(id, value);
		}
	}
}

impl fmt::Debug for FieldHooks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldHooks")
			.field("set_filters", &self.set_filters.len())
			.field("get_filters", &self.get_filters.len())
			.field("saved", &self.saved.len())
			.field("loaded", &self.loaded.len())
			.field("reset", &self.reset.len())
			.finish()
	}
}

/// Header and footer filters applied to every field a page renders.
/// Filters receive the markup and the item id.
#[derive(Clone, Default)]
pub struct RenderFilters {
	header: Vec<MarkupFilter>,
	footer: Vec<MarkupFilter>,
}

impl RenderFilters {
	pub fn add_header(&mut self, filter: MarkupFilter) {
		self.header.push(filter);
	}

	pub fn add_footer(&mut self, filter: MarkupFilter) {
		self.footer.push(filter);
	}

	pub fn header(&self, markup: String, id: &str) -> String {
		self.header.iter().fold(markup, |m, f| f(m, id))
	}

	pub fn footer(&self, markup: String, id: &str) -> String {
		self.footer.iter().fold(markup, |m, f| f(m, id))
	}
}

impl fmt::Debug for RenderFilters {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RenderFilters")
			.field("header", &self.header.len())
			.field("footer", &self.footer.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[test]
	fn test_filters_run_in_order() {
		let mut hooks = FieldHooks::default();
		hooks.add_set_filter(Arc::new(|v| FieldValue::Text(format!("{}a", v.as_text()))));
		hooks.add_set_filter(Arc::new(|v| FieldValue::Text(format!("{}b", v.as_text()))));
		assert_eq!(hooks.apply_set(FieldValue::from("x")), FieldValue::from("xab"));
		assert_eq!(hooks.apply_get(FieldValue::from("x")), FieldValue::from("x"));
	}

	#[test]
	fn test_callbacks_by_event() {
		let count = Arc::new(AtomicUsize::new(0));
		let mut hooks = FieldHooks::default();
		let c = count.clone();
		hooks.add_callback(
			FieldEvent::Saved,
			Arc::new(move |_, _| {
				c.fetch_add(1, Ordering::SeqCst);
			}),
		);
		hooks.notify(FieldEvent::Loaded, "f", &FieldValue::default());
		hooks.notify(FieldEvent::Saved, "f", &FieldValue::default());
		assert_eq!(count.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_markup_filters() {
		let mut filters = RenderFilters::default();
		filters.add_header(Arc::new(|m, id| format!("<!-- {} -->{}", id, m)));
		assert_eq!(filters.header("<div>".into(), "f"), "<!-- f --><div>");
		assert_eq!(filters.footer("</div>".into(), "f"), "</div>");
	}
}

// vim: ts=4
