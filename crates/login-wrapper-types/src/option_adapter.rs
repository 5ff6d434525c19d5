//! Adapter that stores named site options as JSON values.
//!
//! Every setting value is persisted under its own option name. The presence
//! or absence of a name is significant: an absent option makes the owning
//! field adopt its declared default.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait OptionAdapter: Debug + Send + Sync {
	/// Read an option. Returns `None` if it was never stored.
	async fn read_option(&self, name: &str) -> ClResult<Option<serde_json::Value>>;

	/// Create or overwrite an option. `None` deletes it.
	async fn update_option(&self, name: &str, value: Option<serde_json::Value>) -> ClResult<()>;

	/// List options whose name starts with `prefix` (all options if `None`)
	async fn list_options(
		&self,
		prefix: Option<&str>,
	) -> ClResult<HashMap<String, serde_json::Value>>;
}

/// Process-local option store
///
/// Used by tests and by deployments that do not need values to survive a
/// restart.
#[derive(Debug, Default)]
pub struct MemoryOptionAdapter {
	options: RwLock<BTreeMap<String, serde_json::Value>>,
}

impl MemoryOptionAdapter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of every stored option
	pub fn snapshot(&self) -> BTreeMap<String, serde_json::Value> {
		self.options.read().clone()
	}
}

#[async_trait]
impl OptionAdapter for MemoryOptionAdapter {
	async fn read_option(&self, name: &str) -> ClResult<Option<serde_json::Value>> {
		Ok(self.options.read().get(name).cloned())
	}

	async fn update_option(&self, name: &str, value: Option<serde_json::Value>) -> ClResult<()> {
		let mut options = self.options.write();
		match value {
			Some(value) => {
				options.insert(name.to_string(), value);
			}
			None => {
				options.remove(name);
			}
		}
		Ok(())
	}

	async fn list_options(
		&self,
		prefix: Option<&str>,
	) -> ClResult<HashMap<String, serde_json::Value>> {
		let options = self.options.read();
		Ok(options
			.iter()
			.filter(|(name, _)| prefix.is_none_or(|p| name.starts_with(p)))
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[tokio::test]
	async fn test_read_update_delete() -> ClResult<()> {
		let store = MemoryOptionAdapter::new();
		assert_eq!(store.read_option("a").await?, None);

		store.update_option("a", Some(json!("x"))).await?;
		assert_eq!(store.read_option("a").await?, Some(json!("x")));

		store.update_option("a", None).await?;
		assert_eq!(store.read_option("a").await?, None);
		Ok(())
	}

	#[tokio::test]
	async fn test_list_by_prefix() -> ClResult<()> {
		let store = MemoryOptionAdapter::new();
		store.update_option("lw_one", Some(json!(1))).await?;
		store.update_option("lw_two", Some(json!(2))).await?;
		store.update_option("other", Some(json!(3))).await?;

		assert_eq!(store.list_options(Some("lw_")).await?.len(), 2);
		assert_eq!(store.list_options(None).await?.len(), 3);
		Ok(())
	}
}

// vim: ts=4
