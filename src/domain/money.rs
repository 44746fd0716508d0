use crate::error::OrderError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A currency value carried with exactly two decimal places.
///
/// Thin wrapper around [`rust_decimal::Decimal`] so money arithmetic is
/// exact. Anything that ends up on an order (subtotals, totals) travels as
/// `Money`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(dec!(0.00));

    /// Rescales `value` to two decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut value = value;
        value.rescale(2);
        Self(value)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// A catalog unit price.
///
/// Construction enforces the pricing rules: strictly positive, at most two
/// decimal places, capped at 99999999.99. A `Price` that exists is valid.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    const MAX: Decimal = dec!(99999999.99);

    pub fn new(value: Decimal) -> Result<Self, OrderError> {
        if value <= Decimal::ZERO {
            return Err(OrderError::Validation(
                "price must be greater than zero".to_string(),
            ));
        }
        if value > Self::MAX {
            return Err(OrderError::Validation(
                "price cannot exceed 99999999.99".to_string(),
            ));
        }
        if value.normalize().scale() > 2 {
            return Err(OrderError::Validation(
                "price cannot have more than two decimal places".to_string(),
            ));
        }
        let mut value = value;
        value.rescale(2);
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Extends the unit price over a quantity. Decimal multiplication, so the
    /// result is exact.
    pub fn times(&self, quantity: u32) -> Money {
        Money(self.0 * Decimal::from(quantity))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = OrderError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
