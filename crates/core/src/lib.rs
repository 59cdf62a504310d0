pub mod error;
pub mod ids;
pub mod records;
pub mod row;
pub mod scalar;

pub use error::CoreError;
pub use ids::*;
pub use records::*;
pub use row::{GridField, GridRow};
pub use scalar::Scalar;
