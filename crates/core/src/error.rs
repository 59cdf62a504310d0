use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid record in {table}: {reason}")]
    InvalidRecord { table: String, reason: String },

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown grid field: {0}")]
    UnknownField(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
