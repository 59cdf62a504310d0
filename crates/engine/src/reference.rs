use gridbook_core::{
    CoreError, Customer, Databases, Order, Product, Record, RecordRef, RecordSet, Scalar,
    TableName, validate_table,
};

/// In-memory lookup tables.
///
/// Lookups are linear scans; the tables are small and the first match wins.
/// Nothing here checks grid rows for references into a table, so replacing
/// or deleting records can leave dangling keys behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceStore {
    db: Databases,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableCounts {
    pub products: usize,
    pub customers: usize,
    pub orders: usize,
}

impl ReferenceStore {
    pub fn new(db: Databases) -> Result<Self, CoreError> {
        db.validate()?;
        Ok(Self { db })
    }

    /// The built-in dataset used when nothing has been saved yet.
    pub fn sample() -> Self {
        let product = |id: &str, name: &str, category: &str, price: f64, stock: f64| Product {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            price,
            stock,
        };
        let customer = |id: &str, name: &str, email: &str, city: &str, country: &str| Customer {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            city: city.into(),
            country: country.into(),
        };
        let order = |id: &str, customer_id: &str, product_id: &str, quantity: f64, date: &str, status: &str| Order {
            id: id.into(),
            customer_id: customer_id.into(),
            product_id: product_id.into(),
            quantity,
            date: date.into(),
            status: status.into(),
        };

        Self {
            db: Databases {
                products: vec![
                    product("P001", "Laptop Pro", "Electronics", 1299.99, 50.0),
                    product("P002", "Wireless Mouse", "Electronics", 29.99, 200.0),
                    product("P003", "Office Chair", "Furniture", 199.99, 30.0),
                    product("P004", "Desk Lamp", "Furniture", 49.99, 75.0),
                ],
                customers: vec![
                    customer("C001", "John Smith", "john@example.com", "New York", "USA"),
                    customer("C002", "Sarah Johnson", "sarah@example.com", "London", "UK"),
                    customer("C003", "Mike Chen", "mike@example.com", "Tokyo", "Japan"),
                    customer("C004", "Emma Wilson", "emma@example.com", "Sydney", "Australia"),
                ],
                orders: vec![
                    order("O001", "C001", "P001", 1.0, "2024-01-15", "Completed"),
                    order("O002", "C002", "P002", 2.0, "2024-01-16", "Processing"),
                    order("O003", "C003", "P003", 1.0, "2024-01-17", "Shipped"),
                    order("O004", "C004", "P004", 3.0, "2024-01-18", "Pending"),
                ],
            },
        }
    }

    pub fn databases(&self) -> &Databases {
        &self.db
    }

    pub fn table<R: Record>(&self) -> &[R] {
        R::rows(&self.db)
    }

    /// First record whose `field` equals `value` exactly. Unknown field names
    /// never match.
    pub fn lookup<R: Record>(&self, field: &str, value: &Scalar) -> Option<&R> {
        self.table::<R>()
            .iter()
            .find(|record| record.field(field).as_ref() == Some(value))
    }

    pub fn lookup_dyn(&self, table: TableName, field: &str, value: &Scalar) -> Option<RecordRef<'_>> {
        match table {
            TableName::Products => self.lookup::<Product>(field, value).map(RecordRef::Product),
            TableName::Customers => self.lookup::<Customer>(field, value).map(RecordRef::Customer),
            TableName::Orders => self.lookup::<Order>(field, value).map(RecordRef::Order),
        }
    }

    pub fn record_set(&self, table: TableName) -> RecordSet {
        match table {
            TableName::Products => RecordSet::Products(self.db.products.clone()),
            TableName::Customers => RecordSet::Customers(self.db.customers.clone()),
            TableName::Orders => RecordSet::Orders(self.db.orders.clone()),
        }
    }

    /// Swap a whole table. On error the table is left as it was.
    pub fn replace_table<R: Record>(&mut self, records: Vec<R>) -> Result<(), CoreError> {
        validate_table(&records)?;
        *R::rows_mut(&mut self.db) = records;
        Ok(())
    }

    pub fn replace_record_set(&mut self, set: RecordSet) -> Result<(), CoreError> {
        match set {
            RecordSet::Products(records) => self.replace_table(records),
            RecordSet::Customers(records) => self.replace_table(records),
            RecordSet::Orders(records) => self.replace_table(records),
        }
    }

    /// Replace the record with the same id in place, or append it.
    pub fn upsert_record<R: Record>(&mut self, record: R) -> Result<Upsert, CoreError> {
        if record.id().is_empty() {
            return Err(CoreError::InvalidRecord {
                table: R::TABLE.to_string(),
                reason: "record has an empty id".to_string(),
            });
        }
        let rows = R::rows_mut(&mut self.db);
        match rows.iter_mut().find(|existing| existing.id() == record.id()) {
            Some(existing) => {
                *existing = record;
                Ok(Upsert::Updated)
            }
            None => {
                rows.push(record);
                Ok(Upsert::Inserted)
            }
        }
    }

    /// Returns whether a record was removed.
    pub fn delete_record<R: Record>(&mut self, id: &str) -> bool {
        let rows = R::rows_mut(&mut self.db);
        let before = rows.len();
        rows.retain(|record| record.id() != id);
        rows.len() != before
    }

    pub fn counts(&self) -> TableCounts {
        TableCounts {
            products: self.db.len_of(TableName::Products),
            customers: self.db.len_of(TableName::Customers),
            orders: self.db.len_of(TableName::Orders),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_primary_key() {
        let store = ReferenceStore::sample();
        let product = store.lookup::<Product>("id", &Scalar::text("P002")).unwrap();
        assert_eq!(product.name, "Wireless Mouse");
        assert_eq!(product.price, 29.99);

        assert!(store.lookup::<Product>("id", &Scalar::text("P999")).is_none());
        assert!(store.lookup::<Customer>("id", &Scalar::text("P002")).is_none());
    }

    #[test]
    fn lookup_is_strict() {
        let store = ReferenceStore::sample();
        assert!(store.lookup::<Product>("stock", &Scalar::Number(50.0)).is_some());
        assert!(store.lookup::<Product>("stock", &Scalar::text("50")).is_none());
        assert!(store.lookup::<Product>("id", &Scalar::text("p001")).is_none());
        assert!(store.lookup::<Product>("sku", &Scalar::text("P001")).is_none());
    }

    #[test]
    fn lookup_returns_first_match() {
        let store = ReferenceStore::sample();
        let furniture = store
            .lookup::<Product>("category", &Scalar::text("Furniture"))
            .unwrap();
        assert_eq!(furniture.id, "P003");
    }

    #[test]
    fn dynamic_lookup_covers_every_table() {
        let store = ReferenceStore::sample();
        let order = store
            .lookup_dyn(TableName::Orders, "customerId", &Scalar::text("C004"))
            .unwrap();
        assert_eq!(order.id(), "O004");
        assert_eq!(order.table(), TableName::Orders);
        assert_eq!(order.field("quantity"), Some(Scalar::Number(3.0)));

        let customer = store
            .lookup_dyn(TableName::Customers, "city", &Scalar::text("Tokyo"))
            .unwrap();
        assert_eq!(customer.field("name"), Some(Scalar::text("Mike Chen")));
    }

    #[test]
    fn replace_table_validates_keys() {
        let mut store = ReferenceStore::sample();
        let mut products = store.table::<Product>().to_vec();
        products[1].id = products[0].id.clone();

        assert!(store.replace_table(products).is_err());
        assert_eq!(store.table::<Product>().len(), 4);

        store.replace_table::<Product>(Vec::new()).unwrap();
        assert!(store.table::<Product>().is_empty());
        assert_eq!(store.table::<Customer>().len(), 4);
    }

    #[test]
    fn upsert_updates_in_place_or_appends() {
        let mut store = ReferenceStore::sample();
        let mut lamp = store.table::<Product>()[3].clone();
        lamp.price = 59.99;
        assert_eq!(store.upsert_record(lamp).unwrap(), Upsert::Updated);
        assert_eq!(store.table::<Product>()[3].price, 59.99);

        let mut cable = store.table::<Product>()[0].clone();
        cable.id = "P005".into();
        assert_eq!(store.upsert_record(cable).unwrap(), Upsert::Inserted);
        assert_eq!(store.table::<Product>()[4].id, "P005");

        let mut nameless = store.table::<Product>()[0].clone();
        nameless.id.clear();
        assert!(store.upsert_record(nameless).is_err());
    }

    #[test]
    fn delete_and_count() {
        let mut store = ReferenceStore::sample();
        assert!(store.delete_record::<Customer>("C002"));
        assert!(!store.delete_record::<Customer>("C002"));
        assert_eq!(
            store.counts(),
            TableCounts {
                products: 4,
                customers: 3,
                orders: 4
            }
        );
    }

    #[test]
    fn record_set_round_trip() {
        let mut store = ReferenceStore::sample();
        let set = store.record_set(TableName::Customers);
        assert_eq!(set.len(), 4);

        store.replace_record_set(RecordSet::Customers(Vec::new())).unwrap();
        assert!(store.record_set(TableName::Customers).is_empty());

        store.replace_record_set(set).unwrap();
        assert_eq!(store.table::<Customer>()[0].name, "John Smith");
    }
}
