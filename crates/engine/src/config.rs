use std::path::PathBuf;

/// Where the engine keeps its persisted documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    InMemory,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub storage: StorageLocation,
    /// Blank rows created when no grid has been saved yet.
    pub initial_rows: usize,
    /// Prefix for ids minted by `add_row`.
    pub row_id_prefix: String,
    /// Prefix for ids minted during import.
    pub import_id_prefix: String,
    /// Seed the built-in products/customers/orders when no tables are saved.
    pub seed_sample_data: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage: StorageLocation::InMemory,
            initial_rows: 10,
            row_id_prefix: "row".to_string(),
            import_id_prefix: "imported".to_string(),
            seed_sample_data: true,
        }
    }
}

impl EngineConfig {
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageLocation::File(path.into()),
            ..Self::default()
        }
    }
}
