//! Ruble amounts backed by decimal arithmetic.
//!
//! Prices, line totals, and order totals all use [`Money`]. Quantities
//! stay plain `Decimal` (weighted products sell in fractional kilograms),
//! so `price × quantity` is exact and never drifts the way binary floats
//! would.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money in rubles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero rubles.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal ruble value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from a whole number of rubles.
    #[must_use]
    pub fn rubles(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply a unit price by a quantity (possibly fractional, for
    /// weighted products).
    #[must_use]
    pub fn times(&self, quantity: Decimal) -> Self {
        Self(self.0 * quantity)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Money {
    /// Formats as "890 ₽", dropping a zero fractional part the way the
    /// shop prints prices.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let normalized = self.0.normalize();
        write!(f, "{normalized} ₽")
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_weighted_line_total_is_exact() {
        // 1780 ₽/kg × 0.5 kg must be exactly 890, not 889.999…
        let total = Money::rubles(1780).times(dec!(0.5));
        assert_eq!(total, Money::rubles(890));
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::rubles(890), Money::rubles(1300), Money::rubles(10)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::rubles(2200));
    }

    #[test]
    fn test_display_drops_zero_fraction() {
        assert_eq!(Money::rubles(890).to_string(), "890 ₽");
        assert_eq!(Money::new(dec!(890.00)).to_string(), "890 ₽");
        assert_eq!(Money::new(dec!(12.50)).to_string(), "12.5 ₽");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Money::rubles(890)).unwrap();
        assert_eq!(json, "\"890\"");
    }
}
