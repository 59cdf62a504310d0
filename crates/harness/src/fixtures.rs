use gridbook_core::{GridField, Product, Scalar};
use gridbook_engine::{ColumnMapping, TabularPayload};

/// Build a payload from string cells; `""` becomes an empty cell.
pub fn payload(headers: &[&str], rows: &[&[&str]]) -> TabularPayload {
    TabularPayload::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        if cell.is_empty() {
                            Scalar::Null
                        } else {
                            Scalar::text(*cell)
                        }
                    })
                    .collect()
            })
            .collect(),
    )
}

/// `SKU,Qty` sheet with one row for the wireless mouse.
pub fn sku_qty_payload() -> TabularPayload {
    payload(&["SKU", "Qty"], &[&["P002", "3"]])
}

pub fn sku_qty_mapping() -> ColumnMapping {
    ColumnMapping::new()
        .map(GridField::ProductId, "SKU")
        .map(GridField::Quantity, "Qty")
}

/// An order export as a spreadsheet tool would write it.
pub const ORDERS_CSV: &str = "\
Order,Product Code,Client,Units,Comment
1001,P001,C001,1,
1002,P003,C002,4,\"corner office, 3rd floor\"
1003,P999,C004,2,new product
1004,P004,,x,
";

pub fn orders_csv_mapping() -> ColumnMapping {
    ColumnMapping::new()
        .map(GridField::ProductId, "Product Code")
        .map(GridField::CustomerId, "Client")
        .map(GridField::Quantity, "Units")
        .map(GridField::Notes, "Comment")
}

pub fn product(id: &str, name: &str, price: f64) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: "Misc".to_string(),
        price,
        stock: 0.0,
    }
}
