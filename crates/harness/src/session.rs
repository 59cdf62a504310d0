use std::path::PathBuf;

use gridbook_core::{GridField, GridRow, RowId};
use gridbook_engine::{Engine, EngineConfig, EngineError, StorageLocation};
use tempfile::TempDir;

/// An engine plus the scratch directory backing it, for tests that need to
/// close and reopen the same database.
pub struct TestSession {
    pub engine: Engine,
    _dir: Option<TempDir>,
}

impl TestSession {
    /// Seeded engine over in-memory storage.
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            engine: Engine::open(EngineConfig::default())?,
            _dir: None,
        })
    }

    /// Seeded engine over a database file in a fresh temp dir.
    pub fn on_disk() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let config = EngineConfig::with_file(dir.path().join("gridbook.db"));
        Ok(Self {
            engine: Engine::open(config)?,
            _dir: Some(dir),
        })
    }

    pub fn db_path(&self) -> Option<PathBuf> {
        match &self.engine.config().storage {
            StorageLocation::File(path) => Some(path.clone()),
            StorageLocation::InMemory => None,
        }
    }

    /// Drop the engine and open a new one over the same file, as a restart
    /// would. In-memory sessions start over from the seed.
    pub fn reopen(&mut self) -> Result<(), EngineError> {
        let config = self.engine.config().clone();
        self.engine = Engine::open(config)?;
        Ok(())
    }

    /// Fill one row's editable cells the way a user would, left to right.
    pub fn fill_row(
        &mut self,
        row_index: usize,
        product_id: &str,
        customer_id: &str,
        quantity: &str,
    ) -> Result<&GridRow, EngineError> {
        self.engine.set_cell(row_index, GridField::ProductId, product_id)?;
        self.engine.set_cell(row_index, GridField::CustomerId, customer_id)?;
        let rows = self.engine.set_cell(row_index, GridField::Quantity, quantity)?;
        Ok(&rows[row_index])
    }

    pub fn row(&self, row_index: usize) -> &GridRow {
        &self.engine.grid_state()[row_index]
    }

    pub fn row_ids(&self) -> Vec<RowId> {
        self.engine.grid_state().iter().map(|row| row.id.clone()).collect()
    }
}
