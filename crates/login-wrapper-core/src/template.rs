//! Admin markup templates
//!
//! Every piece of admin markup is a handlebars template compiled into the
//! binary. `{{value}}` is HTML-escaped; settings that carry markup by
//! contract (names, descriptions, content blocks, choice labels) and
//! pre-rendered fragments use `{{{value}}}`.

use handlebars::Handlebars;
use serde::Serialize;
use std::fmt;

use crate::prelude::*;

macro_rules! templates {
	($($name:literal),* $(,)?) => {
		&[$(($name, include_str!(concat!("../templates/", $name, ".html.hbs")))),*]
	};
}

const TEMPLATES: &[(&str, &str)] = templates![
	"field_head",
	"field_foot",
	"text",
	"textarea",
	"checkbox",
	"select_option",
	"select",
	"radio",
	"multicheck",
	"upload",
	"license",
	"license_buttons",
	"buttons",
	"ajax_button",
	"header",
	"note",
	"content",
	"form_start",
	"page",
	"notices",
	"status",
	"document",
];

pub struct TemplateEngine {
	handlebars: Handlebars<'static>,
}

impl fmt::Debug for TemplateEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TemplateEngine").field("templates", &TEMPLATES.len()).finish()
	}
}

impl TemplateEngine {
	pub fn new() -> ClResult<Self> {
		let mut handlebars = Handlebars::new();

		// Undefined variables are template bugs
		handlebars.set_strict_mode(true);

		for (name, source) in TEMPLATES {
			handlebars
				.register_template_string(name, source.trim_end_matches('\n'))
				.map_err(|e| Error::ConfigError(format!("Invalid template '{}': {}", name, e)))?;
		}
		debug!(templates = TEMPLATES.len(), "Admin templates registered");

		Ok(Self { handlebars })
	}

	pub fn render<T: Serialize>(&self, name: &str, data: &T) -> ClResult<String> {
		self.handlebars
			.render(name, data)
			.map_err(|e| Error::Internal(format!("Failed to render template '{}': {}", name, e)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_all_templates_compile() -> ClResult<()> {
		let engine = TemplateEngine::new()?;
		for (name, _) in TEMPLATES {
			assert!(engine.handlebars.has_template(name), "{}", name);
		}
		Ok(())
	}

	#[test]
	fn test_values_are_escaped() -> ClResult<()> {
		let engine = TemplateEngine::new()?;
		let html = engine.render(
			"header",
			&json!({"id": "h\"><script>", "class": "", "anchor": "a", "name": "<em>Name</em>", "desc": ""}),
		)?;
		assert!(html.starts_with(r#"<div id="h&quot;&gt;&lt;script&gt;""#));
		assert!(html.contains("<h3 id=\"a\"><em>Name</em></h3>"));
		Ok(())
	}

	#[test]
	fn test_missing_variable_is_an_error() -> ClResult<()> {
		let engine = TemplateEngine::new()?;
		assert!(engine.render("form_start", &json!({"field": "sukellos_nonce"})).is_err());
		Ok(())
	}
}

// vim: ts=4
