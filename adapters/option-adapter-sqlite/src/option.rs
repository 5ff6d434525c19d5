//! Option key-value store
//!
//! Values are stored as JSON text. A row whose text does not parse reads
//! back as JSON `null`.

use std::collections::HashMap;

use sqlx::{Row, SqlitePool};

use crate::prelude::*;

/// Escape `%`, `_` and the escape character itself for a LIKE pattern
fn like_prefix(prefix: &str) -> String {
	let mut pattern = String::with_capacity(prefix.len() + 1);
	for c in prefix.chars() {
		if matches!(c, '%' | '_' | '\\') {
			pattern.push('\\');
		}
		pattern.push(c);
	}
	pattern.push('%');
	pattern
}

fn parse_value(value: Option<String>) -> serde_json::Value {
	value.and_then(|v| serde_json::from_str(&v).ok()).unwrap_or(serde_json::Value::Null)
}

/// List all options, or the ones whose name starts with `prefix`
pub(crate) async fn list(
	db: &SqlitePool,
	prefix: Option<&str>,
) -> ClResult<HashMap<String, serde_json::Value>> {
	let rows = if let Some(prefix) = prefix {
		sqlx::query("SELECT name, value FROM options WHERE name LIKE ? ESCAPE '\\'")
			.bind(like_prefix(prefix))
			.fetch_all(db)
			.await
	} else {
		sqlx::query("SELECT name, value FROM options").fetch_all(db).await
	}
	.inspect_err(|err| warn!("DB: {:#?}", err))
	.map_err(|_| Error::DbError)?;

	let mut options = HashMap::new();
	for row in rows {
		let name: String = row.get("name");
		let value: Option<String> = row.get("value");
		options.insert(name, parse_value(value));
	}

	Ok(options)
}

/// Read a single option by name
pub(crate) async fn read(db: &SqlitePool, name: &str) -> ClResult<Option<serde_json::Value>> {
	let row = sqlx::query("SELECT value FROM options WHERE name = ?")
		.bind(name)
		.fetch_optional(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;

	Ok(row.map(|r| parse_value(r.get("value"))))
}

/// Create, overwrite or delete (`None`) an option
pub(crate) async fn update(
	db: &SqlitePool,
	name: &str,
	value: Option<serde_json::Value>,
) -> ClResult<()> {
	if let Some(val) = value {
		sqlx::query(
			"INSERT INTO options (name, value) VALUES (?, ?)
			ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = unixepoch()",
		)
		.bind(name)
		.bind(val.to_string())
		.execute(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;
	} else {
		sqlx::query("DELETE FROM options WHERE name = ?")
			.bind(name)
			.execute(db)
			.await
			.inspect_err(|err| warn!("DB: {:#?}", err))
			.map_err(|_| Error::DbError)?;
	}

	Ok(())
}


// vim: ts=4
