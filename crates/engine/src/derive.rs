//! Recomputes the derived columns of a grid row from its key columns.
//!
//! A lookup miss or an unparsable quantity leaves the previous derived
//! values in place rather than clearing them. Users type ids one character
//! at a time, and a half-typed key must not wipe a row's names and totals.

use gridbook_core::{Customer, GridRow, Product, Scalar};

use crate::reference::ReferenceStore;

/// Outcome of resolving one foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The key column was empty.
    Skipped,
    Resolved,
    /// No record has that id; dependent fields were left alone.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeriveReport {
    pub product: Resolution,
    pub customer: Resolution,
    pub total_recomputed: bool,
}

pub fn derive_row(row: &mut GridRow, store: &ReferenceStore) -> DeriveReport {
    let mut report = DeriveReport {
        product: Resolution::Skipped,
        customer: Resolution::Skipped,
        total_recomputed: false,
    };

    if !row.product_id.is_empty() {
        match store.lookup::<Product>("id", &Scalar::text(&row.product_id)) {
            Some(product) => {
                report.product = Resolution::Resolved;
                row.product_name = product.name.clone();
                if let Some(quantity) = parse_quantity(&row.quantity) {
                    row.total_price = format_total(product.price * quantity);
                    report.total_recomputed = true;
                }
            }
            None => report.product = Resolution::Missing,
        }
    }

    if !row.customer_id.is_empty() {
        match store.lookup::<Customer>("id", &Scalar::text(&row.customer_id)) {
            Some(customer) => {
                report.customer = Resolution::Resolved;
                row.customer_name = customer.name.clone();
            }
            None => report.customer = Resolution::Missing,
        }
    }

    log::debug!(
        "derived row {}: product {:?}, customer {:?}, total recomputed: {}",
        row.id,
        report.product,
        report.customer,
        report.total_recomputed
    );
    report
}

/// By-value form of [`derive_row`].
pub fn derived(mut row: GridRow, store: &ReferenceStore) -> GridRow {
    derive_row(&mut row, store);
    row
}

/// Finite decimal number, or `None` for anything else (including empty).
pub fn parse_quantity(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|q| q.is_finite())
}

/// Two fixed decimals, halves rounded away from zero.
pub fn format_total(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0.00".to_string();
    }
    format!("{rounded:.2}")
}
