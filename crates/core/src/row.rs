use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::RowId;

/// Columns of the data-entry grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GridField {
    ProductId,
    CustomerId,
    Quantity,
    Notes,
    ProductName,
    CustomerName,
    TotalPrice,
}

impl GridField {
    /// User-editable columns, in import-mapping order.
    pub const EDITABLE: [GridField; 4] = [
        Self::ProductId,
        Self::CustomerId,
        Self::Quantity,
        Self::Notes,
    ];

    pub const DERIVED: [GridField; 3] = [Self::ProductName, Self::CustomerName, Self::TotalPrice];

    pub fn key(&self) -> &'static str {
        match self {
            Self::ProductId => "productId",
            Self::CustomerId => "customerId",
            Self::Quantity => "quantity",
            Self::Notes => "notes",
            Self::ProductName => "productName",
            Self::CustomerName => "customerName",
            Self::TotalPrice => "totalPrice",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ProductId => "Product ID",
            Self::CustomerId => "Customer ID",
            Self::Quantity => "Quantity",
            Self::Notes => "Notes",
            Self::ProductName => "Product Name",
            Self::CustomerName => "Customer Name",
            Self::TotalPrice => "Total Price",
        }
    }

    /// Derived fields are owned by the derivation engine.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::ProductName | Self::CustomerName | Self::TotalPrice)
    }
}

impl FromStr for GridField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::EDITABLE
            .into_iter()
            .chain(Self::DERIVED)
            .find(|f| f.key() == s)
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for GridField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One line of the grid. Every cell is text, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub id: RowId,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub total_price: String,
    #[serde(default)]
    pub notes: String,
}

impl GridRow {
    /// A row with every editable and derived field empty.
    pub fn empty(id: RowId) -> Self {
        Self {
            id,
            product_id: String::new(),
            customer_id: String::new(),
            quantity: String::new(),
            product_name: String::new(),
            customer_name: String::new(),
            total_price: String::new(),
            notes: String::new(),
        }
    }

    pub fn get(&self, field: GridField) -> &str {
        match field {
            GridField::ProductId => &self.product_id,
            GridField::CustomerId => &self.customer_id,
            GridField::Quantity => &self.quantity,
            GridField::Notes => &self.notes,
            GridField::ProductName => &self.product_name,
            GridField::CustomerName => &self.customer_name,
            GridField::TotalPrice => &self.total_price,
        }
    }

    pub fn field_mut(&mut self, field: GridField) -> &mut String {
        match field {
            GridField::ProductId => &mut self.product_id,
            GridField::CustomerId => &mut self.customer_id,
            GridField::Quantity => &mut self.quantity,
            GridField::Notes => &mut self.notes,
            GridField::ProductName => &mut self.product_name,
            GridField::CustomerName => &mut self.customer_name,
            GridField::TotalPrice => &mut self.total_price,
        }
    }

    pub fn set(&mut self, field: GridField, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }
}
