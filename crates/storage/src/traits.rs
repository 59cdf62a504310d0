use serde::Serialize;
use serde::de::DeserializeOwned;

use gridbook_core::{Databases, GridRow};

use crate::error::StorageError;

/// Key holding the reference tables document.
pub const DATABASES_KEY: &str = "databases";

/// Key holding the committed grid rows.
pub const GRID_KEY: &str = "gridData";

/// A string-keyed store of JSON documents.
///
/// Values are always written whole; there are no partial updates.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Returns whether a value was present.
    fn remove(&mut self, key: &str) -> Result<bool, StorageError>;

    fn load_databases(&self) -> Result<Option<Databases>, StorageError> {
        let Some(databases) = load_json::<_, Databases>(self, DATABASES_KEY)? else {
            return Ok(None);
        };
        databases.validate()?;
        Ok(Some(databases))
    }

    fn save_databases(&mut self, databases: &Databases) -> Result<(), StorageError> {
        save_json(self, DATABASES_KEY, databases)
    }

    fn load_grid(&self) -> Result<Option<Vec<GridRow>>, StorageError> {
        load_json(self, GRID_KEY)
    }

    fn save_grid(&mut self, rows: &[GridRow]) -> Result<(), StorageError> {
        save_json(self, GRID_KEY, rows)
    }
}

pub fn load_json<S, T>(storage: &S, key: &str) -> Result<Option<T>, StorageError>
where
    S: Storage + ?Sized,
    T: DeserializeOwned,
{
    match storage.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Serialization {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

pub fn save_json<S, T>(storage: &mut S, key: &str, value: &T) -> Result<(), StorageError>
where
    S: Storage + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialization {
        key: key.to_string(),
        source,
    })?;
    storage.put(key, &raw)
}
