use gridbook_core::{CoreError, GridField, RowId};
use gridbook_storage::StorageError;
use thiserror::Error;

use crate::import::ImportError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("row {index} out of range (grid has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("{0} is derived and cannot be edited")]
    ReadOnlyField(GridField),

    #[error("duplicate row id: {0}")]
    DuplicateRowId(RowId),
}
