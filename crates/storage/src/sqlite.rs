use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::error::StorageError;
use crate::traits::Storage;

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path.as_ref())?;
        crate::schema::init_schema(&conn)?;
        log::debug!("opened sqlite storage at {}", path.as_ref().display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn schema_version(&self) -> Result<i32, StorageError> {
        let version = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
        Ok(version)
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value],
        )?;
        log::trace!("stored {key} ({} bytes)", value.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        let removed = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use gridbook_core::{Customer, Databases, GridRow, RowId};

    use super::*;
    use crate::traits::{DATABASES_KEY, GRID_KEY};

    fn sample_databases() -> Databases {
        Databases {
            customers: vec![Customer {
                id: "C001".into(),
                name: "John Smith".into(),
                email: "john@example.com".into(),
                city: "New York".into(),
                country: "USA".into(),
            }],
            ..Databases::default()
        }
    }

    #[test]
    fn put_get_remove() -> Result<(), StorageError> {
        let mut storage = SqliteStorage::open_in_memory()?;
        assert_eq!(storage.get("missing")?, None);

        storage.put("k", "v1")?;
        storage.put("k", "v2")?;
        assert_eq!(storage.get("k")?.as_deref(), Some("v2"));

        assert!(storage.remove("k")?);
        assert!(!storage.remove("k")?);
        assert_eq!(storage.get("k")?, None);
        Ok(())
    }

    #[test]
    fn documents_round_trip() -> Result<(), StorageError> {
        let mut storage = SqliteStorage::open_in_memory()?;
        assert!(storage.load_databases()?.is_none());
        assert!(storage.load_grid()?.is_none());

        let databases = sample_databases();
        storage.save_databases(&databases)?;
        assert_eq!(storage.load_databases()?, Some(databases));

        let mut row = GridRow::empty(RowId::from("row_0"));
        row.notes = "first".into();
        storage.save_grid(std::slice::from_ref(&row))?;
        assert_eq!(storage.load_grid()?, Some(vec![row]));
        Ok(())
    }

    #[test]
    fn persisted_layout_is_plain_json() -> Result<(), StorageError> {
        let mut storage = SqliteStorage::open_in_memory()?;
        storage.save_databases(&sample_databases())?;
        storage.save_grid(&[GridRow::empty(RowId::from("row_0"))])?;

        let raw = storage.get(DATABASES_KEY)?.unwrap();
        assert!(raw.starts_with(r#"{"products":[],"customers":[{"id":"C001""#));

        let raw = storage.get(GRID_KEY)?.unwrap();
        assert!(raw.starts_with(r#"[{"id":"row_0","productId":"""#));
        Ok(())
    }

    #[test]
    fn corrupt_document_is_reported() -> Result<(), StorageError> {
        let mut storage = SqliteStorage::open_in_memory()?;
        storage.put(GRID_KEY, "{not json")?;
        let err = storage.load_grid().unwrap_err();
        assert!(matches!(err, StorageError::Serialization { ref key, .. } if key == GRID_KEY));
        Ok(())
    }

    #[test]
    fn duplicate_record_ids_are_rejected_on_load() -> Result<(), StorageError> {
        let mut storage = SqliteStorage::open_in_memory()?;
        let mut databases = sample_databases();
        databases.customers.push(databases.customers[0].clone());
        storage.save_databases(&databases)?;
        assert!(matches!(storage.load_databases(), Err(StorageError::Core(_))));
        Ok(())
    }

    #[test]
    fn file_storage_survives_reopen() -> Result<(), StorageError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gridbook.db");
        {
            let mut storage = SqliteStorage::open(&path)?;
            storage.put("k", "persisted")?;
        }
        let storage = SqliteStorage::open(&path)?;
        assert_eq!(storage.get("k")?.as_deref(), Some("persisted"));
        assert_eq!(storage.schema_version()?, crate::schema::SCHEMA_VERSION);
        Ok(())
    }
}
