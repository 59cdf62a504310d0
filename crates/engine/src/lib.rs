pub mod access;
pub mod config;
pub mod decode;
pub mod derive;
pub mod error;
pub mod grid;
pub mod import;
pub mod reference;

pub use access::Role;
pub use config::{EngineConfig, StorageLocation};
pub use decode::{CsvDecoder, DecodeError, TabularDecoder, WorkbookDecoder, decode_upload};
pub use derive::{DeriveReport, Resolution, derive_row, derived, format_total, parse_quantity};
pub use error::EngineError;
pub use grid::GridState;
pub use import::{ColumnMapping, ColumnSource, ImportError, TabularPayload, reconcile};
pub use reference::{ReferenceStore, TableCounts, Upsert};

use gridbook_core::{
    CoreError, GridField, GridRow, Record, RecordRef, RecordSet, RowId, RowIdGenerator, Scalar,
    TableName,
};
use gridbook_storage::{SqliteStorage, Storage};

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub tables: TableCounts,
    pub grid_rows: usize,
}

/// Application state: reference tables, the working grid and the storage
/// both are persisted to.
///
/// Reference-table changes are persisted immediately. Grid edits stay in the
/// working grid until [`Engine::commit_grid`] or [`Engine::save_grid`].
pub struct Engine {
    config: EngineConfig,
    storage: SqliteStorage,
    reference: ReferenceStore,
    grid: GridState,
    import_ids: RowIdGenerator,
}

impl Engine {
    pub fn open(config: EngineConfig) -> Result<Self, EngineError> {
        let storage = match &config.storage {
            StorageLocation::InMemory => SqliteStorage::open_in_memory()?,
            StorageLocation::File(path) => SqliteStorage::open(path)?,
        };
        Self::new(storage, config)
    }

    /// Load both documents from `storage`, seeding and persisting defaults
    /// for whichever is missing.
    pub fn new(mut storage: SqliteStorage, config: EngineConfig) -> Result<Self, EngineError> {
        let reference = match storage.load_databases()? {
            Some(databases) => ReferenceStore::new(databases)?,
            None => {
                let seed = if config.seed_sample_data {
                    ReferenceStore::sample()
                } else {
                    ReferenceStore::default()
                };
                storage.save_databases(seed.databases())?;
                log::info!("seeded reference tables ({:?})", seed.counts());
                seed
            }
        };

        let rows = match storage.load_grid()? {
            Some(rows) => rows,
            None => {
                let rows = GridState::blank_rows(config.initial_rows, &config.row_id_prefix);
                storage.save_grid(&rows)?;
                log::info!("seeded grid with {} blank rows", rows.len());
                rows
            }
        };
        let grid = GridState::new(rows, &config.row_id_prefix)?;
        let import_ids = RowIdGenerator::new(config.import_id_prefix.as_str());

        Ok(Self {
            config,
            storage,
            reference,
            grid,
            import_ids,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn reference(&self) -> &ReferenceStore {
        &self.reference
    }

    // ========================================================================
    // Grid
    // ========================================================================

    /// The working grid, including uncommitted edits.
    pub fn grid_state(&self) -> &[GridRow] {
        self.grid.rows()
    }

    /// Edit one cell and re-derive its row. Not persisted until commit.
    pub fn set_cell(
        &mut self,
        row_index: usize,
        field: GridField,
        value: &str,
    ) -> Result<&[GridRow], EngineError> {
        self.grid.set_cell(row_index, field, value, &self.reference)?;
        Ok(self.grid.rows())
    }

    pub fn add_row(&mut self) -> RowId {
        self.grid.add_row()
    }

    /// Persist `rows` as the grid and make them the working state.
    pub fn commit_grid(&mut self, rows: Vec<GridRow>) -> Result<(), EngineError> {
        grid::ensure_unique_ids(&rows)?;
        self.storage.save_grid(&rows)?;
        log::info!("committed grid with {} rows", rows.len());
        self.grid.replace(rows)
    }

    /// Commit the working grid as it stands.
    pub fn save_grid(&mut self) -> Result<(), EngineError> {
        let rows = self.grid.rows().to_vec();
        self.commit_grid(rows)
    }

    /// The last committed grid.
    pub fn load_grid(&self) -> Result<Vec<GridRow>, EngineError> {
        Ok(self.storage.load_grid()?.unwrap_or_default())
    }

    /// Drop uncommitted edits.
    pub fn discard_changes(&mut self) -> Result<(), EngineError> {
        let rows = self.load_grid()?;
        self.grid.replace(rows)
    }

    pub fn has_unsaved_changes(&self) -> Result<bool, EngineError> {
        Ok(self.load_grid()? != self.grid.rows())
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Replace the working grid with rows reconciled from `payload`.
    /// Returns the number of imported rows. On error nothing changes.
    pub fn import_rows(
        &mut self,
        role: Role,
        payload: &TabularPayload,
        mapping: &ColumnMapping,
    ) -> Result<usize, EngineError> {
        if !role.may_import() {
            log::warn!("import refused for role {role:?}");
            return Err(ImportError::Forbidden.into());
        }
        let rows = match reconcile(payload, mapping, &self.reference, &mut self.import_ids) {
            Ok(rows) => rows,
            Err(err) => {
                log::warn!("import rejected: {err}");
                return Err(err.into());
            }
        };
        let count = rows.len();
        self.grid.replace(rows)?;
        log::info!("imported {count} rows into the working grid");
        Ok(count)
    }

    /// Decode an uploaded file by extension, then import it.
    pub fn import_upload(
        &mut self,
        role: Role,
        file_name: &str,
        bytes: &[u8],
        mapping: &ColumnMapping,
    ) -> Result<usize, EngineError> {
        if !role.may_import() {
            return Err(ImportError::Forbidden.into());
        }
        let payload = decode_upload(file_name, bytes).map_err(|err| {
            log::warn!("could not decode {file_name}: {err}");
            ImportError::from(err)
        })?;
        self.import_rows(role, &payload, mapping)
    }

    // ========================================================================
    // Reference tables
    // ========================================================================

    pub fn lookup(&self, table: TableName, field: &str, value: &Scalar) -> Option<RecordRef<'_>> {
        self.reference.lookup_dyn(table, field, value)
    }

    pub fn table(&self, table: TableName) -> RecordSet {
        self.reference.record_set(table)
    }

    pub fn records<R: Record>(&self) -> &[R] {
        self.reference.table::<R>()
    }

    pub fn replace_table<R: Record>(&mut self, records: Vec<R>) -> Result<(), EngineError> {
        self.update_reference(|store| store.replace_table(records))
    }

    pub fn replace_table_dyn(&mut self, records: RecordSet) -> Result<(), EngineError> {
        self.update_reference(|store| store.replace_record_set(records))
    }

    pub fn upsert_record<R: Record>(&mut self, record: R) -> Result<Upsert, EngineError> {
        self.update_reference(|store| store.upsert_record(record))
    }

    pub fn delete_record<R: Record>(&mut self, id: &str) -> Result<bool, EngineError> {
        self.update_reference(|store| Ok(store.delete_record::<R>(id)))
    }

    pub fn summary(&self) -> Summary {
        Summary {
            tables: self.reference.counts(),
            grid_rows: self.grid.len(),
        }
    }

    /// Apply `change` to a copy of the tables, persist it, then swap it in.
    /// A failed change or save leaves the current tables untouched.
    fn update_reference<T>(
        &mut self,
        change: impl FnOnce(&mut ReferenceStore) -> Result<T, CoreError>,
    ) -> Result<T, EngineError> {
        let mut next = self.reference.clone();
        let out = change(&mut next)?;
        self.storage.save_databases(next.databases())?;
        self.reference = next;
        log::debug!("reference tables saved ({:?})", self.reference.counts());
        Ok(out)
    }
}
