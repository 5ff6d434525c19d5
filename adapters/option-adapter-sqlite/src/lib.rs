//! SQLite-backed option store
//!
//! One `options` table in `<dir>/options.db`, opened in WAL mode.

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::collections::HashMap;
use std::path::Path;

use login_wrapper_types::option_adapter::OptionAdapter;

mod option;
mod schema;

mod prelude {
	pub use login_wrapper_types::prelude::*;
}

use crate::prelude::*;

pub const DB_FILE: &str = "options.db";

#[derive(Debug)]
pub struct OptionAdapterSqlite {
	db: SqlitePool,
}

impl OptionAdapterSqlite {
	/// Open (or create) the database in directory `path`
	pub async fn new(path: impl AsRef<Path>) -> ClResult<Self> {
		tokio::fs::create_dir_all(path.as_ref()).await?;
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref().join(DB_FILE))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;
		debug!("Option store opened at {}", path.as_ref().display());

		Ok(Self { db })
	}
}

#[async_trait]
impl OptionAdapter for OptionAdapterSqlite {
	async fn read_option(&self, name: &str) -> ClResult<Option<serde_json::Value>> {
		option::read(&self.db, name).await
	}

	async fn update_option(&self, name: &str, value: Option<serde_json::Value>) -> ClResult<()> {
		option::update(&self.db, name, value).await
	}

	async fn list_options(
		&self,
		prefix: Option<&str>,
	) -> ClResult<HashMap<String, serde_json::Value>> {
		option::list(&self.db, prefix).await
	}
}

// vim: ts=4
