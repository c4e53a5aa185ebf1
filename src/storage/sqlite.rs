use async_trait::async_trait;
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::models::{ItemKey, SeenRecord};
use crate::storage::Storage;

pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open the store named by `DATABASE_URL`. A `sqlite://` prefix is accepted.
    pub async fn new(database_url: &str) -> Result<Self> {
        let path = database_url
            .strip_prefix("sqlite://")
            .unwrap_or(database_url);
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database at {}", path))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection mutex poisoned"))
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS seen_records (
                collection TEXT NOT NULL,
                unique_key TEXT NOT NULL,
                source TEXT NOT NULL,
                first_seen DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (collection, unique_key)
            )",
            [],
        )
        .context("Failed to create seen_records table")?;

        info!("Database migration completed");
        Ok(())
    }

    async fn has_seen(&self, collection: &str, key: &ItemKey) -> Result<bool> {
        let conn = self.lock()?;

        let found: Option<i32> = conn
            .query_row(
                "SELECT 1 FROM seen_records WHERE collection = ?1 AND unique_key = ?2",
                params![collection, key.as_str()],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to look up {} in {}", key, collection))?;

        Ok(found.is_some())
    }

    async fn mark_seen(&self, collection: &str, record: &SeenRecord) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR IGNORE INTO seen_records (collection, unique_key, source) VALUES (?1, ?2, ?3)",
            params![collection, record.unique_key.as_str(), &record.source],
        )
        .with_context(|| format!("Failed to record {} in {}", record.unique_key, collection))?;

        debug!("Recorded {} as seen in {}", record.unique_key, collection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    fn storage() -> SqliteStorage {
        let storage = SqliteStorage::in_memory().unwrap();
        block_on(storage.migrate()).unwrap();
        storage
    }

    #[test]
    fn unseen_until_marked() {
        let storage = storage();
        let key = ItemKey::from("CVE-2024-0001");

        assert!(!block_on(storage.has_seen("cve_ids", &key)).unwrap());
        block_on(storage.mark_seen("cve_ids", &SeenRecord::new(key.clone(), "NVD"))).unwrap();
        assert!(block_on(storage.has_seen("cve_ids", &key)).unwrap());
        assert!(!block_on(storage.has_seen("cve_ids", &ItemKey::from("CVE-2024-0002"))).unwrap());
    }

    #[test]
    fn collections_are_independent() {
        let storage = storage();
        let key = ItemKey::from("https://as.com/a.html");

        block_on(storage.mark_seen("as", &SeenRecord::new(key.clone(), "AS"))).unwrap();
        assert!(block_on(storage.has_seen("as", &key)).unwrap());
        assert!(!block_on(storage.has_seen("marca", &key)).unwrap());
    }

    #[test]
    fn marking_twice_is_harmless() {
        let storage = storage();
        let record = SeenRecord::new(ItemKey::from("k"), "src");

        block_on(storage.mark_seen("c", &record)).unwrap();
        block_on(storage.mark_seen("c", &record)).unwrap();
        assert!(block_on(storage.has_seen("c", &record.unique_key)).unwrap());
    }

    #[test]
    fn migrate_is_idempotent() {
        let storage = storage();
        block_on(storage.migrate()).unwrap();
    }

    #[test]
    fn unmigrated_store_reports_errors() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert!(block_on(storage.has_seen("c", &ItemKey::from("k"))).is_err());
    }
}
