use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::scalar::Scalar;

/// The fixed set of reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    Products,
    Customers,
    Orders,
}

impl TableName {
    pub const ALL: [TableName; 3] = [Self::Products, Self::Customers, Self::Orders];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Customers => "customers",
            Self::Orders => "orders",
        }
    }
}

impl FromStr for TableName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(Self::Products),
            "customers" => Ok(Self::Customers),
            "orders" => Ok(Self::Orders),
            _ => Err(CoreError::UnknownTable(s.to_string())),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Number,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn spec(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, label, kind }
}

/// A typed row of one reference table.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned {
    const TABLE: TableName;

    /// Field names, labels and kinds, primary key first.
    fn schema() -> &'static [FieldSpec];

    fn id(&self) -> &str;

    /// Value of a schema field, `None` for names outside the schema.
    fn field(&self, name: &str) -> Option<Scalar>;

    fn rows(db: &Databases) -> &Vec<Self>;

    fn rows_mut(db: &mut Databases) -> &mut Vec<Self>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(deserialize_with = "lenient_number")]
    pub price: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub stock: f64,
}

impl Record for Product {
    const TABLE: TableName = TableName::Products;

    fn schema() -> &'static [FieldSpec] {
        const SCHEMA: &[FieldSpec] = &[
            spec("id", "Product ID", FieldKind::Text),
            spec("name", "Product Name", FieldKind::Text),
            spec("category", "Category", FieldKind::Text),
            spec("price", "Price", FieldKind::Number),
            spec("stock", "Stock", FieldKind::Number),
        ];
        SCHEMA
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Scalar> {
        match name {
            "id" => Some(Scalar::text(&self.id)),
            "name" => Some(Scalar::text(&self.name)),
            "category" => Some(Scalar::text(&self.category)),
            "price" => Some(Scalar::Number(self.price)),
            "stock" => Some(Scalar::Number(self.stock)),
            _ => None,
        }
    }

    fn rows(db: &Databases) -> &Vec<Self> {
        &db.products
    }

    fn rows_mut(db: &mut Databases) -> &mut Vec<Self> {
        &mut db.products
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub city: String,
    pub country: String,
}

impl Record for Customer {
    const TABLE: TableName = TableName::Customers;

    fn schema() -> &'static [FieldSpec] {
        const SCHEMA: &[FieldSpec] = &[
            spec("id", "Customer ID", FieldKind::Text),
            spec("name", "Customer Name", FieldKind::Text),
            spec("email", "Email", FieldKind::Email),
            spec("city", "City", FieldKind::Text),
            spec("country", "Country", FieldKind::Text),
        ];
        SCHEMA
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Scalar> {
        match name {
            "id" => Some(Scalar::text(&self.id)),
            "name" => Some(Scalar::text(&self.name)),
            "email" => Some(Scalar::text(&self.email)),
            "city" => Some(Scalar::text(&self.city)),
            "country" => Some(Scalar::text(&self.country)),
            _ => None,
        }
    }

    fn rows(db: &Databases) -> &Vec<Self> {
        &db.customers
    }

    fn rows_mut(db: &mut Databases) -> &mut Vec<Self> {
        &mut db.customers
    }
}

/// Stored alongside the lookup tables; not read by derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub product_id: String,
    #[serde(deserialize_with = "lenient_number")]
    pub quantity: f64,
    pub date: String,
    pub status: String,
}

impl Record for Order {
    const TABLE: TableName = TableName::Orders;

    fn schema() -> &'static [FieldSpec] {
        const SCHEMA: &[FieldSpec] = &[
            spec("id", "Order ID", FieldKind::Text),
            spec("customerId", "Customer ID", FieldKind::Text),
            spec("productId", "Product ID", FieldKind::Text),
            spec("quantity", "Quantity", FieldKind::Number),
            spec("date", "Date", FieldKind::Date),
            spec("status", "Status", FieldKind::Text),
        ];
        SCHEMA
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Scalar> {
        match name {
            "id" => Some(Scalar::text(&self.id)),
            "customerId" => Some(Scalar::text(&self.customer_id)),
            "productId" => Some(Scalar::text(&self.product_id)),
            "quantity" => Some(Scalar::Number(self.quantity)),
            "date" => Some(Scalar::text(&self.date)),
            "status" => Some(Scalar::text(&self.status)),
            _ => None,
        }
    }

    fn rows(db: &Databases) -> &Vec<Self> {
        &db.orders
    }

    fn rows_mut(db: &mut Databases) -> &mut Vec<Self> {
        &mut db.orders
    }
}

/// The persisted `databases` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Databases {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl Databases {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_table(&self.products)?;
        validate_table(&self.customers)?;
        validate_table(&self.orders)
    }

    pub fn len_of(&self, table: TableName) -> usize {
        match table {
            TableName::Products => self.products.len(),
            TableName::Customers => self.customers.len(),
            TableName::Orders => self.orders.len(),
        }
    }
}

/// Check that every record has a non-empty id unique within the table.
pub fn validate_table<R: Record>(records: &[R]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if record.id().is_empty() {
            return Err(CoreError::InvalidRecord {
                table: R::TABLE.to_string(),
                reason: format!("record at position {index} has an empty id"),
            });
        }
        if !seen.insert(record.id()) {
            return Err(CoreError::InvalidRecord {
                table: R::TABLE.to_string(),
                reason: format!("duplicate id {}", record.id()),
            });
        }
    }
    Ok(())
}

/// Borrowed view of a record from any table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordRef<'a> {
    Product(&'a Product),
    Customer(&'a Customer),
    Order(&'a Order),
}

impl RecordRef<'_> {
    pub fn table(&self) -> TableName {
        match self {
            Self::Product(_) => TableName::Products,
            Self::Customer(_) => TableName::Customers,
            Self::Order(_) => TableName::Orders,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Product(r) => r.id(),
            Self::Customer(r) => r.id(),
            Self::Order(r) => r.id(),
        }
    }

    pub fn field(&self, name: &str) -> Option<Scalar> {
        match self {
            Self::Product(r) => r.field(name),
            Self::Customer(r) => r.field(name),
            Self::Order(r) => r.field(name),
        }
    }
}

/// Owned copy of a whole table, as exchanged with the admin layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSet {
    Products(Vec<Product>),
    Customers(Vec<Customer>),
    Orders(Vec<Order>),
}

impl RecordSet {
    pub fn table(&self) -> TableName {
        match self {
            Self::Products(_) => TableName::Products,
            Self::Customers(_) => TableName::Customers,
            Self::Orders(_) => TableName::Orders,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Products(r) => r.len(),
            Self::Customers(r) => r.len(),
            Self::Orders(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Admin forms historically stored numeric inputs as strings; accept both.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) if s.trim().is_empty() => Ok(0.0),
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("not a number: {s:?}"))),
    }
}
