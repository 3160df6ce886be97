//! SQLite-backed record of completed transfers.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::Result;
use crate::models::TransferRecord;

/// Persists which titles were already transferred and their share links.
///
/// Lookups go by file name while rows are keyed by the saved file id, so two
/// remote files with the same title share one lookup result.
#[derive(Clone)]
pub struct RecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl RecordStore {
    /// Open (or create) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS transfer_records (
                file_id    TEXT PRIMARY KEY,
                file_name  TEXT,
                file_type  INTEGER,
                share_link TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Find the share link recorded for a file name.
    pub fn find_share_link(&self, file_name: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let link = conn
            .query_row(
                "SELECT share_link FROM transfer_records WHERE file_name = ?1",
                params![file_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(link)
    }

    /// Insert a record, replacing any row with the same file id.
    pub fn upsert(&self, record: &TransferRecord) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO transfer_records (file_id, file_name, file_type, share_link)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.file_id,
                record.file_name,
                record.file_type,
                record.share_link
            ],
        )?;
        tx.commit()?;
        debug!(file_name = %record.file_name, "transfer record saved");
        Ok(())
    }

    /// Get a record by saved file id.
    pub fn get(&self, file_id: &str) -> Result<Option<TransferRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                "SELECT file_id, file_name, file_type, share_link, created_at
                 FROM transfer_records WHERE file_id = ?1",
                params![file_id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// List records, newest first.
    pub fn list(&self, limit: usize) -> Result<Vec<TransferRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT file_id, file_name, file_type, share_link, created_at
             FROM transfer_records ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], row_to_record)?;
        let records = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transfer_records", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<TransferRecord> {
    Ok(TransferRecord {
        file_id: row.get(0)?,
        file_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        file_type: row.get::<_, Option<i64>>(2)?.unwrap_or_default(),
        share_link: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_missing_name() {
        let store = RecordStore::open_in_memory().unwrap();
        assert_eq!(store.find_share_link("Demo.S01").unwrap(), None);
    }

    #[test]
    fn test_upsert_and_find() {
        let store = RecordStore::open_in_memory().unwrap();
        let record = TransferRecord::new("fid1", "Demo.S01", 0, "https://pan.quark.cn/s/aaa");
        store.upsert(&record).unwrap();

        assert_eq!(
            store.find_share_link("Demo.S01").unwrap().as_deref(),
            Some("https://pan.quark.cn/s/aaa")
        );
        let stored = store.get("fid1").unwrap().unwrap();
        assert_eq!(stored.file_name, "Demo.S01");
        assert!(stored.created_at.is_some());
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = RecordStore::open_in_memory().unwrap();
        let record = TransferRecord::new("fid1", "Demo.S01", 0, "https://pan.quark.cn/s/aaa");
        store.upsert(&record).unwrap();
        store.upsert(&record).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_upsert_replaces_by_file_id() {
        let store = RecordStore::open_in_memory().unwrap();
        store
            .upsert(&TransferRecord::new("fid1", "Old", 1, "https://pan.quark.cn/s/old"))
            .unwrap();
        store
            .upsert(&TransferRecord::new("fid1", "New", 1, "https://pan.quark.cn/s/new"))
            .unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.find_share_link("Old").unwrap(), None);
        assert!(store.find_share_link("New").unwrap().is_some());
    }
}
