// src/storage/file_map.rs
//! Durable [`OrderedMap`] stored in an SQLite database file.
//!
//! Each table file holds a single `entries` table keyed by the map key:
//! - `insert` is one `INSERT OR REPLACE`, `remove` one `DELETE`
//! - reads go to the database, never to a cached copy
//! - `keys`/`values` scan with `ORDER BY key`
//!
//! The connection runs with `synchronous = FULL`, so a write has reached disk
//! when the call returns. A failed statement changes nothing.

use crate::error::StorageError;
use crate::storage::ordered_map::{MapLimits, OrderedMap};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// SQLite-backed ordered table with string keys.
///
/// Keys use SQLite's binary collation, which orders UTF-8 text the same way
/// `String` does.
pub struct FileMap<V> {
    path: PathBuf,
    conn: Connection,
    limits: MapLimits,
    /// Sum of the `size` column, kept in step with every committed write
    used_bytes: usize,
    len: usize,
    _value: PhantomData<fn() -> V>,
}

fn decode<V: DeserializeOwned>(blob: &[u8]) -> Result<V, StorageError> {
    Ok(serde_json::from_slice(blob)?)
}

impl<V> FileMap<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Opens (or creates) the table file at `path`.
    ///
    /// Existing entries are checked against `limits` while loading.
    ///
    /// # Arguments
    /// * `path` - Database file; its parent directory must exist
    /// * `limits` - Ceilings applied to stored and future entries
    ///
    /// # Errors
    /// - `StorageError::Database` if the file is not a usable database
    /// - `StorageError::Encoding` if a stored value does not decode
    /// - a size error if the stored entries no longer fit `limits`
    pub fn open(path: impl Into<PathBuf>, limits: MapLimits) -> Result<Self, StorageError> {
        let path = path.into();
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS entries (
                key     TEXT PRIMARY KEY NOT NULL,
                value   BLOB NOT NULL,
                size    INTEGER NOT NULL
            );
            ",
        )?;

        let mut map = FileMap {
            path,
            conn,
            limits,
            used_bytes: 0,
            len: 0,
            _value: PhantomData,
        };
        map.load_accounting()?;

        debug!(
            "opened table {} with {} entries ({} bytes)",
            map.path.display(),
            map.len,
            map.used_bytes
        );
        Ok(map)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-measures every stored entry so the budget reflects the current limits.
    fn load_accounting(&mut self) -> Result<(), StorageError> {
        let rows = self.rows("SELECT key, value FROM entries ORDER BY key")?;
        for (key, blob) in rows {
            let value: V = decode(&blob)?;
            let size = self.limits.measure(&key, &value)?;
            self.used_bytes = self.limits.admit(self.used_bytes, 0, size)?;
            self.len += 1;
        }
        Ok(())
    }

    fn rows(&self, sql: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(String, Vec<u8>)>, _>>()?;
        Ok(rows)
    }

    /// Stored value and its charged size.
    fn fetch(&self, key: &str) -> Result<Option<(V, usize)>, StorageError> {
        let row: Option<(Vec<u8>, i64)> = self
            .conn
            .query_row(
                "SELECT value, size FROM entries WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((blob, size)) => Ok(Some((decode(&blob)?, size as usize))),
            None => Ok(None),
        }
    }
}

impl<V> OrderedMap<String, V> for FileMap<V>
where
    V: Serialize + DeserializeOwned,
{
    fn get(&self, key: &String) -> Result<Option<V>, StorageError> {
        Ok(self.fetch(key)?.map(|(value, _)| value))
    }

    fn contains_key(&self, key: &String) -> Result<bool, StorageError> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM entries WHERE key = ?1)",
            params![key],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn insert(&mut self, key: String, value: V) -> Result<Option<V>, StorageError> {
        let requested = self.limits.measure(&key, &value)?;
        let previous = self.fetch(&key)?;
        let freed = previous.as_ref().map_or(0, |(_, size)| *size);
        let used_bytes = self.limits.admit(self.used_bytes, freed, requested)?;

        let blob = serde_json::to_vec(&value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO entries (key, value, size) VALUES (?1, ?2, ?3)",
            params![key, blob, requested as i64],
        )?;

        self.used_bytes = used_bytes;
        if previous.is_none() {
            self.len += 1;
        }
        Ok(previous.map(|(value, _)| value))
    }

    fn remove(&mut self, key: &String) -> Result<Option<V>, StorageError> {
        let (value, size) = match self.fetch(key)? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        self.conn
            .execute("DELETE FROM entries WHERE key = ?1", params![key])?;

        self.used_bytes -= size;
        self.len -= 1;
        Ok(Some(value))
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT key FROM entries ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn values(&self) -> Result<Vec<V>, StorageError> {
        self.rows("SELECT key, value FROM entries ORDER BY key")?
            .iter()
            .map(|(_, blob)| decode(blob))
            .collect()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn used_bytes(&self) -> usize {
        self.used_bytes
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn open(dir: &Path) -> FileMap<String> {
        FileMap::open(dir.join("table.sqlite3"), MapLimits::unbounded()).unwrap()
    }

    #[test]
    fn test_new_table_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = open(dir.path());

        assert!(table.is_empty());
        assert!(table.keys().unwrap().is_empty());
        assert_eq!(table.get(&"a".to_string()).unwrap(), None);
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut table = open(dir.path());
            table.insert("b".to_string(), "two".to_string()).unwrap();
            table.insert("a".to_string(), "one".to_string()).unwrap();
            table.insert("c".to_string(), "three".to_string()).unwrap();
            table.remove(&"c".to_string()).unwrap();
        }

        let reopened = open(dir.path());
        assert_eq!(reopened.keys().unwrap(), vec!["a", "b"]);
        assert_eq!(reopened.values().unwrap(), vec!["one", "two"]);
        assert_eq!(reopened.get(&"b".to_string()).unwrap().as_deref(), Some("two"));
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn test_accounting_matches_memory_map() {
        let dir = tempfile::tempdir().unwrap();
        // "\"k\"" = 3 bytes, "\"abcde\"" = 7 bytes
        let mut table: FileMap<String> = FileMap::open(
            dir.path().join("table.sqlite3"),
            MapLimits::new(100, 100, 12),
        )
        .unwrap();

        table.insert("k".to_string(), "abcde".to_string()).unwrap();
        assert_eq!(table.used_bytes(), 10);

        let previous = table.insert("k".to_string(), "vwxyz".to_string()).unwrap();
        assert_eq!(previous.as_deref(), Some("abcde"));
        assert_eq!(table.used_bytes(), 10);
        assert_eq!(table.len(), 1);

        let err = table.insert("j".to_string(), "x".to_string()).unwrap_err();
        assert!(matches!(err, StorageError::CapacityExceeded { .. }));
        assert_eq!(table.keys().unwrap(), vec!["k"]);

        drop(table);
        let reopened: FileMap<String> =
            FileMap::open(dir.path().join("table.sqlite3"), MapLimits::new(100, 100, 12)).unwrap();
        assert_eq!(reopened.used_bytes(), 10);
    }

    #[test]
    fn test_rejected_write_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = open(dir.path());
        table.insert("kept".to_string(), "v".to_string()).unwrap();
        let used = table.used_bytes();

        table.conn.pragma_update(None, "query_only", true).unwrap();

        let err = table.insert("new".to_string(), "v".to_string()).unwrap_err();
        assert!(matches!(err, StorageError::Database(_)));
        let err = table.remove(&"kept".to_string()).unwrap_err();
        assert!(matches!(err, StorageError::Database(_)));

        assert_eq!(table.keys().unwrap(), vec!["kept"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.used_bytes(), used);
    }

    #[test]
    fn test_writes_leave_no_side_files() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut table = open(dir.path());
            for key in ["a", "b", "c"] {
                table.insert(key.to_string(), "v".to_string()).unwrap();
            }
            table.remove(&"b".to_string()).unwrap();
        }

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["table.sqlite3"]);
    }

    #[test]
    fn test_non_database_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("table.sqlite3"), vec![b'x'; 4096]).unwrap();

        let result: Result<FileMap<String>, _> =
            FileMap::open(dir.path().join("table.sqlite3"), MapLimits::unbounded());
        assert!(matches!(result, Err(StorageError::Database(_))));
    }

    #[test]
    fn test_reopen_enforces_limits() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut table = open(dir.path());
            table.insert("key".to_string(), "a long stored value".to_string()).unwrap();
        }

        let result: Result<FileMap<String>, _> =
            FileMap::open(dir.path().join("table.sqlite3"), MapLimits::new(100, 4, 1000));
        assert!(matches!(result, Err(StorageError::ValueTooLarge { .. })));
    }
}
