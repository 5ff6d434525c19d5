//! Item markup
//!
//! Fields render as header, type specific body and footer, each from its own
//! template. The page's render filters see the rendered header and footer of
//! every field.

use serde_json::{Value, json};

use super::settings::{MulticheckSettings, RadioSettings, SelectSettings, TextSettings, TextareaSettings, UploadSettings};
use super::{Field, Item, ItemKind, LicenseField};
use crate::choices::ChoiceEntry;
use crate::form::{CHECKBOX_MARKER_PREFIX, MULTICHECK_MARKER_PREFIX};
use crate::hooks::RenderFilters;
use crate::item_type::ItemType;
use crate::license::{ACTION_MARKER_PREFIX, LicenseAction, STATUS_VALID, VALIDITY_VALID};
use crate::page::{ACTION_SAVE, SubmitButtons};
use crate::prelude::*;
use crate::sanitize::strip_slashes;
use crate::template::TemplateEngine;
use crate::value::FieldValue;

/// Nonce action of ajax buttons
pub const AJAX_BUTTON_ACTION: &str = "sk-admin-builder-ajax-button";

pub struct RenderCtx<'a> {
	pub engine: &'a TemplateEngine,
	pub filters: &'a RenderFilters,
	/// Token for [`AJAX_BUTTON_ACTION`], bound to the viewer
	pub ajax_nonce: &'a str,
}

impl Item {
	pub fn render(&self, ctx: &RenderCtx<'_>) -> ClResult<String> {
		let engine = ctx.engine;
		match (&self.kind, &self.field) {
			(ItemKind::Header, _) => self.render_header_item(engine),
			(ItemKind::Note(note), _) => self.render_note(engine, &note.color),
			(ItemKind::Content(content), _) => self.render_content(engine, &content.content),
			(ItemKind::Button(_), _) => {
				let mut html = self.render_head(ctx, false, "")?;
				html.push_str(&self.render_button_body(ctx)?);
				html.push_str(&self.render_foot(ctx, "")?);
				Ok(html)
			}
			(_, Some(field)) => {
				let mut html = self.render_head(ctx, field.settings.hidden, self.alias_class())?;
				html.push_str(&self.render_body(engine, field)?);
				html.push_str(&self.render_foot(ctx, &field.settings.example)?);
				Ok(html)
			}
			(_, None) => Ok(String::new()),
		}
	}

	/// Save/Reset controls, or the license action button
	pub fn render_buttons(&self, engine: &TemplateEngine) -> ClResult<String> {
		if let ItemKind::License(license) = &self.kind {
			return self.render_license_buttons(engine, license);
		}
		let s = &self.settings;
		SubmitButtons {
			save: &s.save,
			reset: &s.reset,
			reset_question: &s.reset_question,
			use_reset: s.use_reset,
		}
		.render(engine)
	}

	/// Extra class for tags rendered by a shared variant (`color` as text)
	fn alias_class(&self) -> &'static str {
		let variant = self.variant().as_str();
		if variant == self.item_type.as_str() { "" } else { variant }
	}

	fn render_head(&self, ctx: &RenderCtx<'_>, hidden: bool, alias: &str) -> ClResult<String> {
		let s = &self.settings;
		let html = ctx.engine.render(
			"field_head",
			&json!({
				"id": s.id,
				"class": s.class,
				"hidden": hidden,
				"name": s.name,
				"desc": s.desc,
				"alias": alias,
				"item_type": self.item_type.as_str(),
			}),
		)?;
		Ok(ctx.filters.header(html, &s.id))
	}

	fn render_foot(&self, ctx: &RenderCtx<'_>, example: &str) -> ClResult<String> {
		let buttons = if self.settings.global_form_independent {
			self.render_buttons(ctx.engine)?
		} else {
			String::new()
		};
		let html = ctx.engine.render("field_foot", &json!({ "example": example, "buttons": buttons }))?;
		Ok(ctx.filters.footer(html, &self.settings.id))
	}

	fn render_body(&self, engine: &TemplateEngine, field: &Field) -> ClResult<String> {
		let value = field.value();
		match &self.kind {
			ItemKind::Text(text) => self.render_text(engine, text, field, &value),
			ItemKind::Textarea(textarea) => self.render_textarea(engine, textarea, &value),
			ItemKind::Checkbox => engine.render(
				"checkbox",
				&json!({ "id": self.id(), "checked": value.is_truthy(), "marker": CHECKBOX_MARKER_PREFIX }),
			),
			ItemKind::Select(select) => self.render_select(engine, select, field, &value),
			ItemKind::Radio(radio) => self.render_radio(engine, radio, field, &value),
			ItemKind::Multicheck(multicheck) => self.render_multicheck(engine, multicheck, field, &value),
			ItemKind::Upload(upload) => self.render_upload(engine, upload, &value),
			ItemKind::License(license) => self.render_license(engine, license, field, &value),
			_ => Ok(String::new()),
		}
	}

	fn render_text(
		&self,
		engine: &TemplateEngine,
		text: &TextSettings,
		field: &Field,
		value: &FieldValue,
	) -> ClResult<String> {
		let hidden = field.settings.hidden;
		let is_number = self.item_type == ItemType::Number;
		let input_type = if hidden {
			"hidden"
		} else if is_number {
			"number"
		} else if text.is_password {
			"password"
		} else {
			"text"
		};
		let size = if text.size.is_empty() { "regular" } else { text.size.as_str() };
		let unit = if hidden { "" } else { text.unit.as_str() };
		engine.render(
			"text",
			&json!({
				"id": self.id(),
				"size": size,
				"placeholder": text.placeholder,
				"maxlength": text.maxlength.map(|m| m.to_string()).unwrap_or_default(),
				"input_type": input_type,
				"value": value.as_text(),
				"range": is_number && !hidden,
				"min": text.min,
				"max": text.max,
				"step": text.step,
				"unit": unit,
			}),
		)
	}

	fn render_textarea(
		&self,
		engine: &TemplateEngine,
		textarea: &TextareaSettings,
		value: &FieldValue,
	) -> ClResult<String> {
		engine.render(
			"textarea",
			&json!({
				"id": self.id(),
				"code": textarea.is_code,
				"placeholder": textarea.placeholder,
				"value": strip_slashes(&value.as_text()),
			}),
		)
	}

	fn render_select(
		&self,
		engine: &TemplateEngine,
		select: &SelectSettings,
		field: &Field,
		value: &FieldValue,
	) -> ClResult<String> {
		let option = |v: &str, label: &str| {
			json!({
				"group": false,
				"value": v,
				"label": label,
				"selected": value.contains(v),
				"disabled": v.starts_with('!'),
			})
		};
		let entries: Vec<Value> = field
			.choices()
			.iter()
			.map(|entry| match entry {
				ChoiceEntry::Option { value, label } => option(value, label),
				ChoiceEntry::Group { label, options } => json!({
					"group": true,
					"label": label,
					"options": options.iter().map(|(v, l)| option(v, l)).collect::<Vec<_>>(),
				}),
			})
			.collect();
		let id = self.id();
		let name = if select.multiple { format!("{}[]", id) } else { id.to_string() };
		engine.render(
			"select",
			&json!({ "name": name, "id": id, "multiple": select.multiple, "entries": entries }),
		)
	}

	fn checked_options(field: &Field, checked: impl Fn(&str) -> bool) -> Vec<Value> {
		field
			.choices()
			.iter()
			.flat_map(|entry| {
				entry
					.pairs()
					.into_iter()
					.map(|(v, label)| json!({ "value": v, "label": label, "checked": checked(v) }))
					.collect::<Vec<_>>()
			})
			.collect()
	}

	fn render_radio(
		&self,
		engine: &TemplateEngine,
		radio: &RadioSettings,
		field: &Field,
		value: &FieldValue,
	) -> ClResult<String> {
		let current = value.as_text();
		engine.render(
			"radio",
			&json!({
				"id": self.id(),
				"inline": radio.inline,
				"options": Self::checked_options(field, |v| current == v),
			}),
		)
	}

	fn render_multicheck(
		&self,
		engine: &TemplateEngine,
		multicheck: &MulticheckSettings,
		field: &Field,
		value: &FieldValue,
	) -> ClResult<String> {
		engine.render(
			"multicheck",
			&json!({
				"id": self.id(),
				"select_all": multicheck.select_all.label().unwrap_or_default(),
				"options": Self::checked_options(field, |v| value.contains(v)),
				"marker": MULTICHECK_MARKER_PREFIX,
				"checkbox_marker": CHECKBOX_MARKER_PREFIX,
			}),
		)
	}

	fn render_upload(&self, engine: &TemplateEngine, upload: &UploadSettings, value: &FieldValue) -> ClResult<String> {
		let url = value.as_text();
		let preview = url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/');
		engine.render(
			"upload",
			&json!({ "id": self.id(), "placeholder": upload.placeholder, "value": url, "preview": preview }),
		)
	}

	fn render_license(
		&self,
		engine: &TemplateEngine,
		license: &LicenseField,
		field: &Field,
		value: &FieldValue,
	) -> ClResult<String> {
		let status = license.state().status;
		let status_class = if status == STATUS_VALID { "status-valid" } else { "status-invalid" };
		let input_type = if field.settings.hidden { "hidden" } else { "text" };
		engine.render(
			"license",
			&json!({
				"id": self.id(),
				"input_type": input_type,
				"value": value.as_text(),
				"status": status,
				"status_class": status_class,
			}),
		)
	}

	fn render_license_buttons(&self, engine: &TemplateEngine, license: &LicenseField) -> ClResult<String> {
		let (action, label) = if license.state().validity == VALIDITY_VALID {
			(LicenseAction::Deactivate, &license.settings().deactivate)
		} else {
			(LicenseAction::Activate, &license.settings().activate)
		};
		engine.render(
			"license_buttons",
			&json!({
				"prefix": ACTION_MARKER_PREFIX,
				"id": self.id(),
				"marker": action.marker(),
				"save_action": ACTION_SAVE,
				"label": label,
			}),
		)
	}

	fn render_button_body(&self, ctx: &RenderCtx<'_>) -> ClResult<String> {
		let ItemKind::Button(b) = &self.kind else {
			return Ok(String::new());
		};
		ctx.engine.render(
			"ajax_button",
			&json!({
				"button_class": b.button_class,
				"action": b.action,
				"label": b.label,
				"wait_label": b.wait_label,
				"error_label": b.error_label,
				"success_label": b.success_label,
				"nonce": ctx.ajax_nonce,
				"success_callback": b.success_callback,
				"error_callback": b.error_callback,
				"data_filter_callback": b.data_filter_callback,
				"container": b.ajax_result_container,
			}),
		)
	}

	fn render_header_item(&self, engine: &TemplateEngine) -> ClResult<String> {
		let s = &self.settings;
		engine.render(
			"header",
			&json!({
				"id": s.id,
				"class": s.class,
				"anchor": s.name.to_lowercase().replace(' ', "-"),
				"name": s.name,
				"desc": s.desc,
			}),
		)
	}

	fn render_note(&self, engine: &TemplateEngine, color: &str) -> ClResult<String> {
		let s = &self.settings;
		engine.render(
			"note",
			&json!({ "id": s.id, "class": s.class, "color": color, "name": s.name, "desc": s.desc }),
		)
	}

	fn render_content(&self, engine: &TemplateEngine, content: &str) -> ClResult<String> {
		let s = &self.settings;
		engine.render(
			"content",
			&json!({ "id": s.id, "class": s.class, "content": content, "desc": s.desc }),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handler::HandlerKind;
	use crate::item::{ItemDeps, settings};
	use crate::license::{LicenseApi, LicenseCall, LicenseReply};
	use crate::prelude::*;
	use async_trait::async_trait;
	use login_wrapper_types::option_adapter::MemoryOptionAdapter;
	use serde_json::{Map, Value, json};
	use std::sync::Arc;

	#[derive(Debug)]
	struct Offline;

	#[async_trait]
	impl LicenseApi for Offline {
		async fn post(&self, _call: LicenseCall<'_>) -> ClResult<LicenseReply> {
			Err(Error::NetworkError("offline".into()))
		}
	}

	fn item(config: Value) -> ClResult<Item> {
		let deps = ItemDeps {
			store: Arc::new(MemoryOptionAdapter::new()),
			license_api: Arc::new(Offline),
			site_url: "https://site/".into(),
		};
		let mut values = match config {
			Value::Object(map) => map,
			_ => Map::new(),
		};
		let item_type: ItemType = values
			.get("type")
			.and_then(Value::as_str)
			.and_then(|t| t.parse().ok())
			.ok_or(Error::Parse)?;
		settings::apply_variant_defaults(&mut values, item_type.variant());
		let handler = item_type.is_field().then_some(HandlerKind::FormField);
		Item::build(item_type, &values, None, handler, &deps)
	}

	fn render(item: &Item) -> ClResult<String> {
		let engine = TemplateEngine::new()?;
		let filters = RenderFilters::default();
		item.render(&RenderCtx { engine: &engine, filters: &filters, ajax_nonce: "NONCE" })
	}

	#[test]
	fn test_text_field_markup() -> ClResult<()> {
		let text = item(json!({
			"type": "text", "id": "login_page_url", "name": "Login page URL",
			"desc": "Page containing the login form", "default": "https://site/wp-login.php"
		}))?;
		let html = render(&text)?;
		assert!(html.starts_with(r#"<div id="login_page_url" class="sk-admin-builder-grid-item ">"#));
		assert!(html.contains(r#"<label for="login_page_url">Login page URL</label><p class="description">Page containing the login form</p>"#));
		assert!(html.contains(r#"<div class="sk-admin-builder-item-content sk-admin-builder-text">"#));
		assert!(html.contains(r#"type="text" value="https://site/wp-login.php" />"#));
		assert!(html.ends_with("</div></div>"));
		Ok(())
	}

	#[test]
	fn test_number_and_alias_class() -> ClResult<()> {
		let number = item(json!({"type": "number", "id": "n", "max": 10}))?;
		let html = render(&number)?;
		assert!(html.contains("sk-admin-builder-item-content sk-admin-builder-text sk-admin-builder-number"));
		assert!(html.contains(r#"type="number" value="" min="0" max="10" step="1""#));
		Ok(())
	}

	#[test]
	fn test_checkbox_carries_marker() -> ClResult<()> {
		let checkbox = item(json!({"type": "checkbox", "id": "on", "default": true}))?;
		let html = render(&checkbox)?;
		assert!(html.contains(r#"<input type="checkbox" name="on" id="on" checked='checked' value="1">"#));
		assert!(html.contains(r#"name="hidden_checkbox_on""#));
		Ok(())
	}

	#[test]
	fn test_choice_markup() -> ClResult<()> {
		let select = item(json!({
			"type": "select", "id": "s", "multiple": true, "default": ["b"],
			"options": {"a": "A", "Group": {"b": "B", "!c": "C"}}
		}))?;
		let html = render(&select)?;
		assert!(html.contains(r#"<select name="s[]" id="s" multiple>"#));
		assert!(html.contains(r#"<optgroup label="Group"><option value="b" selected="selected">B</option><option value="!c" disabled='disabled'>C</option></optgroup>"#));

		let multicheck = item(json!({
			"type": "multicheck", "id": "m", "select_all": true, "options": {"x": "X"}
		}))?;
		let html = render(&multicheck)?;
		assert!(html.contains("sk_admin_builder_checkbox_selectall"));
		assert!(html.contains(r#"name="m[]" value="x"/>"#));
		assert!(html.contains(r#"<input type="hidden" name="hidden_multicheck_m" id="hidden_checkbox_m" value="1">"#));

		let radio = item(json!({"type": "radio", "id": "r", "inline": true, "default": "y", "options": {"y": "Y"}}))?;
		let html = render(&radio)?;
		assert!(!html.contains("<fieldset>"));
		assert!(html.contains(r#"value="y" checked='checked'/> Y</label>"#));
		Ok(())
	}

	#[test]
	fn test_layout_items() -> ClResult<()> {
		let header = item(json!({"type": "header", "id": "h", "name": "Login Wrapper"}))?;
		assert_eq!(
			render(&header)?,
			r#"<div id="h" class="sk-admin-builder-item-header "><h3 id="login-wrapper">Login Wrapper</h3></div>"#
		);

		let note = item(json!({"type": "note", "id": "n", "name": "Note", "desc": "text"}))?;
		assert!(render(&note)?.contains("background-color: #198fd933"));

		let button = item(json!({"type": "ajax-button", "id": "b", "action": "flush"}))?;
		let html = render(&button)?;
		assert!(html.contains(r#"data-action="flush""#));
		assert!(html.contains(r#"data-nonce="NONCE""#));
		assert!(html.contains(r#"<div id="ajax_result_container" class="content-container""#));
		assert!(html.contains("save_fields"));
		Ok(())
	}

	#[test]
	fn test_buttons_honour_use_reset() -> ClResult<()> {
		let text = item(json!({"type": "text", "id": "t", "use_reset": false, "save": "Go"}))?;
		let html = text.render_buttons(&TemplateEngine::new()?)?;
		assert!(html.contains(">Go</button>"));
		assert!(!html.contains("reset_fields"));
		Ok(())
	}

	#[test]
	fn test_values_are_escaped() -> ClResult<()> {
		let text = item(json!({
			"type": "text", "id": "t", "name": "<b>Name</b>", "default": "\"><script>x</script>"
		}))?;
		let html = render(&text)?;
		assert!(html.contains(r#"value="&quot;&gt;&lt;script&gt;x&lt;/script&gt;" />"#));
		assert!(!html.contains("<script>"));
		assert!(html.contains("<label for=\"t\"><b>Name</b></label>"));
		Ok(())
	}

	#[test]
	fn test_filters_see_rendered_head_and_foot() -> ClResult<()> {
		let engine = TemplateEngine::new()?;
		let mut filters = RenderFilters::default();
		filters.add_header(Arc::new(|markup: String, id: &str| format!("<!-- {} -->{}", id, markup)));
		filters.add_footer(Arc::new(|markup: String, _id: &str| markup.replace("</div></div>", "</div></div><hr>")));
		let text = item(json!({"type": "text", "id": "t"}))?;
		let html = text.render(&RenderCtx { engine: &engine, filters: &filters, ajax_nonce: "" })?;
		assert!(html.starts_with("<!-- t --><div id=\"t\""));
		assert!(html.ends_with("</div></div><hr>"));
		Ok(())
	}

	#[test]
	fn test_license_markup() -> ClResult<()> {
		let license = item(json!({"type": "edd-licensing", "id": "k"}))?;
		let html = render(&license)?;
		assert!(html.contains(r#"<input class="regular-text" name="k" id="k" type="text" value="" />"#));
		assert!(html.contains(r#"value="edd_license_activate""#));
		assert!(html.contains("Activate License"));
		Ok(())
	}
}

// vim: ts=4
