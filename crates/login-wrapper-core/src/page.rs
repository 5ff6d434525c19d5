//! Admin pages
//!
//! A page is an ordered list of items sharing one identity. The id scopes
//! submissions (a post for another page is ignored) and binds the
//! anti-forgery token. Pages are declared on an [`AdminRegistry`] at startup
//! and served from the [`FrozenAdminRegistry`] it turns into.

use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

use crate::factory::{ItemFactory, RegisteredAsset};
use crate::form::FormData;
use crate::handler::HandlerKind;
use crate::hooks::{MarkupFilter, RenderFilters};
use crate::item::{AssetKind, Item, ItemConfig, ItemDeps, PAGE_ASSETS, RenderCtx};
use crate::item_type::ItemType;
use crate::license::LicenseManager;
use crate::nonce::NonceService;
use crate::notices::{NoticeKind, Notices, format_notice};
use crate::prelude::*;
use crate::template::TemplateEngine;
use login_wrapper_types::auth_adapter::{AuthCtx, capability};

/// Form member carrying the page token
pub const NONCE_FIELD: &str = "sukellos_nonce";
pub const ACTION_FIELD: &str = "action";
pub const ACTION_SAVE: &str = "save_fields";
pub const ACTION_RESET: &str = "reset_fields";

pub const MESSAGE_SAVED: &str = "saved";
pub const MESSAGE_RESET: &str = "reset";

/// Prefix of asset URLs in rendered documents
pub const ASSET_BASE: &str = "/assets/";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PageSettings {
	pub id: String,
	/// Menu label
	pub name: String,
	pub title: String,
	pub desc: String,
	pub capability: String,
	/// Parent menu for sub pages (`tools`, `options-general`, ...)
	pub parent_id: Option<String>,
	pub use_reset: bool,
	pub save: String,
	pub reset: String,
	pub reset_question: String,
}

impl Default for PageSettings {
	fn default() -> Self {
		Self {
			id: String::new(),
			name: String::new(),
			title: String::new(),
			desc: String::new(),
			capability: capability::MANAGE_OPTIONS.into(),
			parent_id: None,
			use_reset: true,
			save: "Save".into(),
			reset: "Reset".into(),
			reset_question: "Do you really want to reset form?".into(),
		}
	}
}

impl PageSettings {
	pub fn new(id: &str, title: &str) -> Self {
		Self { id: id.into(), name: title.into(), title: title.into(), ..Self::default() }
	}

	pub fn desc(mut self, desc: &str) -> Self {
		self.desc = desc.into();
		self
	}

	pub fn parent(mut self, parent_id: &str) -> Self {
		self.parent_id = Some(parent_id.into());
		self
	}
}

/// Why a submission was refused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
	Capability,
	Token,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
	Saved,
	Reset,
	/// Not addressed to this page, or not a save/reset action
	Ignored,
	Denied(DenyReason),
}

impl SubmitOutcome {
	/// Status token carried by the post-submit redirect
	pub fn message(self) -> Option<&'static str> {
		match self {
			SubmitOutcome::Saved => Some(MESSAGE_SAVED),
			SubmitOutcome::Reset => Some(MESSAGE_RESET),
			SubmitOutcome::Ignored | SubmitOutcome::Denied(_) => None,
		}
	}
}

pub struct SubmitRequest<'a> {
	/// Page id the request was addressed to
	pub page: &'a str,
	pub auth: Option<&'a AuthCtx>,
	pub nonces: &'a NonceService,
	pub form: &'a FormData,
}

/// Per-request rendering inputs
#[derive(Debug, Default)]
pub struct PageView<'a> {
	/// Token for this page and viewer
	pub nonce: &'a str,
	pub ajax_nonce: &'a str,
	/// `message` query parameter of the redirect
	pub message: Option<&'a str>,
}

/// Save/Reset controls closing a form
#[derive(Clone, Copy, Debug)]
pub struct SubmitButtons<'a> {
	pub save: &'a str,
	pub reset: &'a str,
	pub reset_question: &'a str,
	pub use_reset: bool,
}

impl SubmitButtons<'_> {
	pub fn render(&self, engine: &TemplateEngine) -> ClResult<String> {
		engine.render(
			"buttons",
			&json!({
				"save_action": ACTION_SAVE,
				"reset_action": ACTION_RESET,
				"save": self.save,
				"reset": self.reset,
				"reset_question": self.reset_question,
				"use_reset": self.use_reset,
			}),
		)
	}
}

/// Principal identity tokens are bound to. Anonymous viewers share one.
pub fn principal(auth: Option<&AuthCtx>) -> &str {
	auth.map_or("", |a| a.id_tag.as_ref())
}

// AdminPage //
//***********//
#[derive(Debug)]
pub struct AdminPage {
	settings: PageSettings,
	items: Vec<Arc<Item>>,
	filters: RenderFilters,
	engine: Arc<TemplateEngine>,
	// Serializes view and submit lifecycles of this page
	lifecycle: tokio::sync::Mutex<()>,
}

impl AdminPage {
	fn new(settings: PageSettings, engine: Arc<TemplateEngine>) -> Self {
		Self {
			settings,
			items: Vec::new(),
			filters: RenderFilters::default(),
			engine,
			lifecycle: tokio::sync::Mutex::new(()),
		}
	}

	pub fn id(&self) -> &str {
		&self.settings.id
	}

	pub fn settings(&self) -> &PageSettings {
		&self.settings
	}

	pub fn items(&self) -> &[Arc<Item>] {
		&self.items
	}

	/// True if at least one item renders inside a form
	pub fn needs_form(&self) -> bool {
		self.items.iter().any(|i| i.needs_form())
	}

	/// Load every item in registration order
	pub async fn handle_view(&self) {
		let _guard = self.lifecycle.lock().await;
		self.load_items().await;
	}

	/// Load and render under one lifecycle lock
	pub async fn view(&self, view: &PageView<'_>) -> ClResult<String> {
		let _guard = self.lifecycle.lock().await;
		self.load_items().await;
		self.render(view)
	}

	async fn load_items(&self) {
		for item in &self.items {
			if let Err(err) = item.load().await {
				warn!(page = %self.id(), field = %item.id(), "Load failed: {}", err);
			}
		}
		debug!(page = %self.id(), "Fields loaded");
	}

	fn verify(&self, req: &SubmitRequest<'_>) -> Result<(), DenyReason> {
		if !req.auth.is_some_and(|auth| auth.can(&self.settings.capability)) {
			return Err(DenyReason::Capability);
		}
		let token = req.form.text(NONCE_FIELD).unwrap_or_default();
		if !req.nonces.verify(&token, self.id(), principal(req.auth)) {
			return Err(DenyReason::Token);
		}
		Ok(())
	}

	/// Save or reset every item, once the request proved it targets this
	/// page with a valid token and a capable principal
	pub async fn handle_submit(&self, req: SubmitRequest<'_>) -> SubmitOutcome {
		if req.page != self.id() {
			debug!(page = %self.id(), target = %req.page, "Submission for another page");
			return SubmitOutcome::Ignored;
		}
		let action = req.form.text(ACTION_FIELD).unwrap_or_default();
		let saving = match action.as_str() {
			ACTION_SAVE => true,
			ACTION_RESET => false,
			_ => return SubmitOutcome::Ignored,
		};
		if let Err(reason) = self.verify(&req) {
			warn!(page = %self.id(), ?reason, "Submission denied");
			return SubmitOutcome::Denied(reason);
		}

		let _guard = self.lifecycle.lock().await;
		let mut changed = 0usize;
		for item in &self.items {
			let result =
				if saving { item.save(req.form).await } else { item.reset(req.form).await };
			match result {
				Ok(true) => changed += 1,
				Ok(false) => {}
				Err(err) => warn!(page = %self.id(), field = %item.id(), "Submit failed: {}", err),
			}
		}
		if saving {
			info!(page = %self.id(), changed, "Fields saved");
			SubmitOutcome::Saved
		} else {
			info!(page = %self.id(), changed, "Fields reset");
			SubmitOutcome::Reset
		}
	}

	pub fn render(&self, view: &PageView<'_>) -> ClResult<String> {
		let s = &self.settings;
		let message = match view.message.filter(|m| !m.is_empty()) {
			Some(message) => render_message(&self.engine, message)?,
			None => String::new(),
		};
		self.engine.render(
			"page",
			&json!({
				"id": s.id,
				"title": s.title,
				"desc": s.desc,
				"message": message,
				"items": self.render_items(view)?,
			}),
		)
	}

	/// Items grouped into forms. Form-independent items close the shared form
	/// and get their own; the page buttons follow a form left open at the end.
	pub fn render_items(&self, view: &PageView<'_>) -> ClResult<String> {
		let engine = self.engine.as_ref();
		let ctx = RenderCtx { engine, filters: &self.filters, ajax_nonce: view.ajax_nonce };
		let form_start = engine.render("form_start", &json!({ "field": NONCE_FIELD, "nonce": view.nonce }))?;
		let mut html = String::new();
		let mut in_form = false;
		for item in &self.items {
			if item.is_form_independent() {
				if in_form {
					html.push_str(FORM_END);
				}
				in_form = item.needs_form();
				if in_form {
					html.push_str(&form_start);
				}
				html.push_str(&item.render(&ctx)?);
				if in_form {
					html.push_str(FORM_END);
					in_form = false;
				}
			} else {
				if item.needs_form() && !in_form {
					html.push_str(&form_start);
					in_form = true;
				}
				html.push_str(&item.render(&ctx)?);
			}
		}
		if in_form {
			let s = &self.settings;
			let buttons = SubmitButtons {
				save: &s.save,
				reset: &s.reset,
				reset_question: &s.reset_question,
				use_reset: s.use_reset,
			};
			html.push_str(&buttons.render(engine)?);
			html.push_str(FORM_END);
		}
		Ok(html)
	}
}

const FORM_END: &str = "</form>";

/// Status line for the `message` query parameter: `saved`, `reset` or a
/// free text, optionally typed with a `!!<kind>` suffix
pub fn render_message(engine: &TemplateEngine, message: &str) -> ClResult<String> {
	match message {
		MESSAGE_SAVED => format_notice(engine, "Settings saved.", NoticeKind::Saved),
		MESSAGE_RESET => format_notice(engine, "Settings reset to default.", NoticeKind::Reset),
		_ => match message.split_once("!!") {
			Some((text, kind)) => {
				let kind = NoticeKind::parse(kind).unwrap_or(NoticeKind::Saved);
				format_notice(engine, text, kind)
			}
			None => format_notice(engine, message, NoticeKind::Saved),
		},
	}
}

// AdminRegistry //
//***************//
/// Page and item registration, before the server starts
#[derive(Debug)]
pub struct AdminRegistry {
	factory: ItemFactory,
	engine: Arc<TemplateEngine>,
	pages: Vec<AdminPage>,
}

impl AdminRegistry {
	pub fn new(deps: ItemDeps, notices: Arc<Notices>) -> ClResult<Self> {
		Ok(Self {
			factory: ItemFactory::new(deps, notices),
			engine: Arc::new(TemplateEngine::new()?),
			pages: Vec::new(),
		})
	}

	/// Start declaring a page. Nothing is registered until
	/// [`PageBuilder::finish`] is called.
	pub fn page(&mut self, settings: PageSettings) -> PageBuilder<'_> {
		let page = AdminPage::new(settings, self.engine.clone());
		PageBuilder { registry: self, page }
	}

	pub fn factory(&self) -> &ItemFactory {
		&self.factory
	}

	pub fn freeze(self) -> FrozenAdminRegistry {
		FrozenAdminRegistry {
			factory: self.factory,
			engine: self.engine,
			pages: self.pages.into_iter().map(Arc::new).collect(),
		}
	}
}

#[must_use]
pub struct PageBuilder<'a> {
	registry: &'a mut AdminRegistry,
	page: AdminPage,
}

impl PageBuilder<'_> {
	/// Create an item through the factory and append it to the page
	pub fn create_item(&mut self, config: ItemConfig) -> Option<Arc<Item>> {
		let item = self.registry.factory.create(config)?;
		self.page.items.push(item.clone());
		Some(item)
	}

	/// Field persisted in the option store
	pub fn create_option(&mut self, mut config: ItemConfig) -> Option<Arc<Item>> {
		config.insert("handler_type", HandlerKind::Option.as_str());
		self.create_item(config)
	}

	/// Field that only lives for the request
	pub fn create_form_field(&mut self, mut config: ItemConfig) -> Option<Arc<Item>> {
		config.insert("handler_type", HandlerKind::FormField.as_str());
		self.create_item(config)
	}

	pub fn create_header(&mut self, config: ItemConfig) -> Option<Arc<Item>> {
		self.create_typed(ItemType::Header, config)
	}

	pub fn create_note(&mut self, config: ItemConfig) -> Option<Arc<Item>> {
		self.create_typed(ItemType::Note, config)
	}

	pub fn create_content(&mut self, config: ItemConfig) -> Option<Arc<Item>> {
		self.create_typed(ItemType::Content, config)
	}

	pub fn create_ajax_button(&mut self, config: ItemConfig) -> Option<Arc<Item>> {
		self.create_typed(ItemType::AjaxButton, config)
	}

	fn create_typed(&mut self, item_type: ItemType, mut config: ItemConfig) -> Option<Arc<Item>> {
		config.insert("type", item_type.as_str());
		self.create_item(config)
	}

	pub fn add_header_filter(&mut self, filter: MarkupFilter) {
		self.page.filters.add_header(filter);
	}

	pub fn add_footer_filter(&mut self, filter: MarkupFilter) {
		self.page.filters.add_footer(filter);
	}

	/// Register the page. A page id can only be used once.
	pub fn finish(self) -> ClResult<()> {
		let id = self.page.id().to_string();
		if id.is_empty() || self.registry.pages.iter().any(|p| p.id() == id) {
			return Err(Error::ConfigError(format!("page id '{}' is empty or already used", id)));
		}
		debug!(page = %id, items = self.page.items.len(), "Admin page registered");
		self.registry.pages.push(self.page);
		Ok(())
	}
}

/// Read-only registry shared by request handlers
#[derive(Debug)]
pub struct FrozenAdminRegistry {
	factory: ItemFactory,
	engine: Arc<TemplateEngine>,
	pages: Vec<Arc<AdminPage>>,
}

impl FrozenAdminRegistry {
	pub fn page(&self, id: &str) -> Option<Arc<AdminPage>> {
		self.pages.iter().find(|p| p.id() == id).cloned()
	}

	pub fn pages(&self) -> &[Arc<AdminPage>] {
		&self.pages
	}

	pub fn item(&self, id: &str) -> Option<Arc<Item>> {
		self.factory.get(id)
	}

	pub fn fields(
		&self,
		handler: Option<HandlerKind>,
		field_type: Option<ItemType>,
		only_css: bool,
	) -> Vec<Arc<Item>> {
		self.factory.list_by_type_and_filter(handler, field_type, only_css)
	}

	pub fn notices(&self) -> &Notices {
		self.factory.notices()
	}

	pub fn assets(&self) -> &[RegisteredAsset] {
		self.factory.assets()
	}

	/// Full HTML document: page assets, item assets, notices and the page.
	/// Items are loaded for this view before the page renders.
	pub async fn render_document(&self, page: &AdminPage, view: &PageView<'_>) -> ClResult<String> {
		let assets = PAGE_ASSETS.iter().chain(self.assets().iter().map(|a| &a.asset));
		let mut seen = HashSet::new();
		let mut styles = Vec::new();
		let mut scripts = Vec::new();
		for asset in assets {
			if !seen.insert(asset.handle) {
				continue;
			}
			let link = json!({ "handle": asset.handle, "href": format!("{}{}", ASSET_BASE, asset.path) });
			match asset.kind {
				AssetKind::Style => styles.push(link),
				AssetKind::Script => scripts.push(link),
			}
		}
		let body = page.view(view).await?;
		self.engine.render(
			"document",
			&json!({
				"title": page.settings.name,
				"styles": styles,
				"scripts": scripts,
				"notices": self.notices().render(&self.engine)?,
				"page": body,
			}),
		)
	}

	/// Record every license field in the license manager
	pub async fn sync_licenses(&self, manager: &LicenseManager) -> ClResult<usize> {
		let mut count = 0;
		for item in self.factory.items() {
			if let Some(license) = item.license() {
				manager.register(license.definition(item.id())).await?;
				count += 1;
			}
		}
		Ok(count)
	}
}


// vim: ts=4
