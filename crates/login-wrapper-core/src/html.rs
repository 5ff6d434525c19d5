//! Markup helpers for text assembled outside the templates

/// Escape text for use in HTML content and quoted attributes, the same way
/// template values are escaped
pub fn escape(input: &str) -> String {
	handlebars::html_escape(input)
}

/// `<code>` wrapped, escaped identifier for notices
pub fn code(input: &str) -> String {
	format!("<code>{}</code>", escape(input))
}


// vim: ts=4
