use async_trait::async_trait;
use anyhow::Result;
use crate::models::{ItemKey, SeenRecord};

mod sqlite;
pub use sqlite::SqliteStorage;

/// Append-only record of delivered keys, one logical collection per source.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn migrate(&self) -> Result<()>;
    async fn has_seen(&self, collection: &str, key: &ItemKey) -> Result<bool>;
    async fn mark_seen(&self, collection: &str, record: &SeenRecord) -> Result<()>;
}
