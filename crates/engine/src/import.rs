use std::collections::BTreeMap;

use gridbook_core::{GridField, GridRow, RowIdGenerator, Scalar};
use thiserror::Error;

use crate::decode::DecodeError;
use crate::derive::derive_row;
use crate::reference::ReferenceStore;

/// A decoded sheet: one header row plus data rows. Rows may be shorter or
/// longer than the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularPayload {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

impl TabularPayload {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Scalar>>) -> Self {
        Self { headers, rows }
    }

    /// Position of the first header with this exact name.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    Header(String),
    Unmapped,
}

/// Which source column feeds each editable grid field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    sources: BTreeMap<GridField, ColumnSource>,
}

/// Sentinel the mapping form uses for "skip this column".
pub const SKIP_COLUMN: &str = "none";

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(mut self, field: GridField, header: impl Into<String>) -> Self {
        self.sources.insert(field, ColumnSource::Header(header.into()));
        self
    }

    pub fn skip(mut self, field: GridField) -> Self {
        self.sources.insert(field, ColumnSource::Unmapped);
        self
    }

    /// Build from `field key -> header` pairs as a form submits them.
    /// An empty header or [`SKIP_COLUMN`] leaves the field unmapped.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ImportError> {
        let mut mapping = Self::new();
        for (key, header) in pairs {
            let field: GridField = key
                .parse()
                .map_err(|_| ImportError::UnknownField(key.to_string()))?;
            mapping = if header.is_empty() || header == SKIP_COLUMN {
                mapping.skip(field)
            } else {
                mapping.map(field, header)
            };
        }
        Ok(mapping)
    }

    pub fn source(&self, field: GridField) -> Option<&str> {
        match self.sources.get(&field) {
            Some(ColumnSource::Header(header)) => Some(header),
            _ => None,
        }
    }

    /// Number of fields actually fed from a header.
    pub fn mapped_count(&self) -> usize {
        self.sources
            .values()
            .filter(|source| matches!(source, ColumnSource::Header(_)))
            .count()
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("the sheet has no header columns")]
    NoHeaders,

    #[error("the sheet has no data rows")]
    NoDataRows,

    #[error("no columns mapped: map at least one column to import data")]
    EmptyMapping,

    #[error("unknown grid field: {0}")]
    UnknownField(String),

    #[error("{0} is derived and cannot be imported")]
    DerivedFieldMapped(GridField),

    #[error("column {header:?} mapped to {field} is not in the sheet")]
    UnknownHeader { field: GridField, header: String },

    #[error("importing is not permitted for this role")]
    Forbidden,

    #[error("could not read the uploaded file: {0}")]
    Decode(#[from] DecodeError),
}

/// Check a payload and mapping before anything is built. Returns the
/// resolved column index for every mapped field.
fn plan(
    payload: &TabularPayload,
    mapping: &ColumnMapping,
) -> Result<Vec<(GridField, usize)>, ImportError> {
    if payload.headers.is_empty() {
        return Err(ImportError::NoHeaders);
    }
    if payload.rows.is_empty() {
        return Err(ImportError::NoDataRows);
    }
    if mapping.mapped_count() == 0 {
        return Err(ImportError::EmptyMapping);
    }

    let mut columns = Vec::new();
    for (field, source) in &mapping.sources {
        let ColumnSource::Header(header) = source else {
            continue;
        };
        if field.is_derived() {
            return Err(ImportError::DerivedFieldMapped(*field));
        }
        let index = payload
            .column_index(header)
            .ok_or_else(|| ImportError::UnknownHeader {
                field: *field,
                header: header.clone(),
            })?;
        columns.push((*field, index));
    }
    Ok(columns)
}

/// Turn every data row into a fresh grid row and derive it against the
/// current tables. Nothing is built unless the whole input validates.
pub fn reconcile(
    payload: &TabularPayload,
    mapping: &ColumnMapping,
    store: &ReferenceStore,
    ids: &mut RowIdGenerator,
) -> Result<Vec<GridRow>, ImportError> {
    let columns = plan(payload, mapping)?;

    let mut rows: Vec<GridRow> = Vec::with_capacity(payload.rows.len());
    for source in &payload.rows {
        let id = ids.next_id(|id| rows.iter().any(|row| &row.id == id));
        let mut row = GridRow::empty(id);
        for &(field, index) in &columns {
            let cell = source.get(index).map(Scalar::to_cell_string).unwrap_or_default();
            row.set(field, cell);
        }
        derive_row(&mut row, store);
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn payload() -> TabularPayload {
        TabularPayload::new(
            vec!["SKU".into(), "Qty".into()],
            vec![vec![Scalar::text("P002"), Scalar::text("3")]],
        )
    }

    fn ids() -> RowIdGenerator {
        RowIdGenerator::with_session("imported", "00000000")
    }

    #[test]
    fn mapped_columns_are_copied_and_derived() {
        let store = ReferenceStore::sample();
        let mapping = ColumnMapping::new()
            .map(GridField::ProductId, "SKU")
            .map(GridField::Quantity, "Qty");

        let rows = reconcile(&payload(), &mapping, &store, &mut ids()).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.id.as_str(), "imported_00000000_0");
        assert_eq!(row.product_id, "P002");
        assert_eq!(row.quantity, "3");
        assert_eq!(row.customer_id, "");
        assert_eq!(row.notes, "");
        assert_eq!(row.product_name, "Wireless Mouse");
        assert_eq!(row.total_price, "89.97");
        assert_eq!(row.customer_name, "");
    }

    #[test]
    fn short_rows_and_numbers() {
        let store = ReferenceStore::sample();
        let payload = TabularPayload::new(
            vec!["Product".into(), "Customer".into(), "Amount".into(), "Comment".into()],
            vec![
                vec![Scalar::text("P004"), Scalar::text("C003"), Scalar::Number(2.0)],
                vec![Scalar::text("P404"), Scalar::Null, Scalar::Number(0.5), Scalar::text("rush")],
            ],
        );
        let mapping = ColumnMapping::new()
            .map(GridField::ProductId, "Product")
            .map(GridField::CustomerId, "Customer")
            .map(GridField::Quantity, "Amount")
            .map(GridField::Notes, "Comment");

        let rows = reconcile(&payload, &mapping, &store, &mut ids()).unwrap();
        assert_eq!(rows[0].quantity, "2");
        assert_eq!(rows[0].notes, "");
        assert_eq!(rows[0].customer_name, "Mike Chen");
        assert_eq!(rows[0].total_price, "99.98");

        // Unknown product: copied through, derived fields stay empty.
        assert_eq!(rows[1].product_id, "P404");
        assert_eq!(rows[1].quantity, "0.5");
        assert_eq!(rows[1].product_name, "");
        assert_eq!(rows[1].total_price, "");
        assert_eq!(rows[1].notes, "rush");
        assert_ne!(rows[0].id, rows[1].id);
    }

    #[test]
    fn empty_mapping_is_rejected() {
        let store = ReferenceStore::sample();
        let err = reconcile(&payload(), &ColumnMapping::new(), &store, &mut ids()).unwrap_err();
        assert!(matches!(err, ImportError::EmptyMapping));

        let skipped_only = ColumnMapping::new().skip(GridField::ProductId);
        let err = reconcile(&payload(), &skipped_only, &store, &mut ids()).unwrap_err();
        assert!(matches!(err, ImportError::EmptyMapping));
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        let store = ReferenceStore::sample();
        let mapping = ColumnMapping::new().map(GridField::ProductId, "SKU");

        let no_headers = TabularPayload::new(Vec::new(), vec![vec![Scalar::text("P001")]]);
        assert!(matches!(
            reconcile(&no_headers, &mapping, &store, &mut ids()),
            Err(ImportError::NoHeaders)
        ));

        let no_rows = TabularPayload::new(vec!["SKU".into()], Vec::new());
        assert!(matches!(
            reconcile(&no_rows, &mapping, &store, &mut ids()),
            Err(ImportError::NoDataRows)
        ));
    }

    #[test]
    fn mapping_errors() {
        let store = ReferenceStore::sample();

        let unknown = ColumnMapping::new().map(GridField::ProductId, "Product Code");
        let err = reconcile(&payload(), &unknown, &store, &mut ids()).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"column "Product Code" mapped to productId is not in the sheet"#
        );

        let derived = ColumnMapping::new().map(GridField::TotalPrice, "Qty");
        let err = reconcile(&payload(), &derived, &store, &mut ids()).unwrap_err();
        assert!(matches!(err, ImportError::DerivedFieldMapped(GridField::TotalPrice)));
    }

    #[test]
    fn mapping_from_form_pairs() {
        let mapping = ColumnMapping::from_pairs([
            ("productId", "SKU"),
            ("customerId", SKIP_COLUMN),
            ("notes", ""),
        ])
        .unwrap();
        assert_eq!(mapping.source(GridField::ProductId), Some("SKU"));
        assert_eq!(mapping.source(GridField::CustomerId), None);
        assert_eq!(mapping.mapped_count(), 1);

        assert!(matches!(
            ColumnMapping::from_pairs([("sku", "SKU")]),
            Err(ImportError::UnknownField(_))
        ));
    }

    #[test]
    fn duplicate_headers_use_the_first_column() {
        let store = ReferenceStore::sample();
        let payload = TabularPayload::new(
            vec!["id".into(), "id".into()],
            vec![vec![Scalar::text("P001"), Scalar::text("P002")]],
        );
        let mapping = ColumnMapping::new().map(GridField::ProductId, "id");
        let rows = reconcile(&payload, &mapping, &store, &mut ids()).unwrap();
        assert_eq!(rows[0].product_name, "Laptop Pro");
    }
}
