use std::collections::HashSet;

use gridbook_core::{GridField, GridRow, RowId, RowIdGenerator};

use crate::derive::{DeriveReport, derive_row};
use crate::error::EngineError;
use crate::reference::ReferenceStore;

/// The working (uncommitted) rows of the grid, in display order.
#[derive(Debug, Clone)]
pub struct GridState {
    rows: Vec<GridRow>,
    ids: RowIdGenerator,
}

impl GridState {
    pub fn new(rows: Vec<GridRow>, row_id_prefix: &str) -> Result<Self, EngineError> {
        ensure_unique_ids(&rows)?;
        Ok(Self {
            rows,
            ids: RowIdGenerator::new(row_id_prefix),
        })
    }

    /// `count` empty rows with ids `<prefix>_0`, `<prefix>_1`, ...
    pub fn blank_rows(count: usize, row_id_prefix: &str) -> Vec<GridRow> {
        (0..count)
            .map(|i| GridRow::empty(RowId::new(format!("{row_id_prefix}_{i}"))))
            .collect()
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_id(&self, id: &RowId) -> bool {
        self.rows.iter().any(|row| &row.id == id)
    }

    /// Write an editable cell, then re-derive that row.
    pub fn set_cell(
        &mut self,
        row_index: usize,
        field: GridField,
        value: impl Into<String>,
        store: &ReferenceStore,
    ) -> Result<DeriveReport, EngineError> {
        if field.is_derived() {
            return Err(EngineError::ReadOnlyField(field));
        }
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(row_index)
            .ok_or(EngineError::RowOutOfRange { index: row_index, len })?;
        row.set(field, value);
        Ok(derive_row(row, store))
    }

    /// Append an empty row with a fresh id.
    pub fn add_row(&mut self) -> RowId {
        let rows = &self.rows;
        let id = self.ids.next_id(|id| rows.iter().any(|row| &row.id == id));
        self.rows.push(GridRow::empty(id.clone()));
        id
    }

    pub fn replace(&mut self, rows: Vec<GridRow>) -> Result<(), EngineError> {
        ensure_unique_ids(&rows)?;
        self.rows = rows;
        Ok(())
    }
}

pub fn ensure_unique_ids(rows: &[GridRow]) -> Result<(), EngineError> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(&row.id) {
            return Err(EngineError::DuplicateRowId(row.id.clone()));
        }
    }
    Ok(())
}
