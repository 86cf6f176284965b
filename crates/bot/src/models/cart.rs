//! Cart domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use chefport_core::Money;

/// One cart position: a product with its catalog name and price captured
/// at read time, and the accumulated quantity.
///
/// Order line items share this shape: an order stores a copy of the cart
/// snapshot, decoupled from later catalog price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog code of the product.
    pub product_code: String,
    /// Product name at capture time.
    pub name: String,
    /// Price per unit (per kilogram for weighted products).
    pub unit_price: Money,
    /// Quantity; fractional for weighted products (kilograms).
    pub quantity: Decimal,
}

impl CartLine {
    /// Price of this line: `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}
