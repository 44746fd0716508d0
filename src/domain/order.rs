use crate::domain::catalog::ProductId;
use crate::domain::money::Money;
use crate::error::OrderError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of the customer placing an order. Customers themselves are
/// owned by an external identity system; only the id travels through here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CustomerId(pub u64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CustomerId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identifier of an order. Allocated by the datastore on insert.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identifier of a single order line. Allocated by the datastore on insert.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OrderItemId(pub u64);

impl fmt::Display for OrderItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Fulfillment status of an order.
///
/// Any status may be set from any other one; there is no enforced ordering
/// between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            other => Err(OrderError::InvalidStatus(other.to_string())),
        }
    }
}

/// A customer order.
///
/// `total` is derived state: it always equals the sum of the line subtotals
/// and is only ever written by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer: CustomerId,
    pub date: NaiveDate,
    pub status: OrderStatus,
    pub total: Money,
}

impl Order {
    pub(crate) fn from_new(id: OrderId, new: NewOrder) -> Self {
        Self {
            id,
            customer: new.customer,
            date: new.date,
            status: OrderStatus::Pending,
            total: Money::ZERO,
        }
    }
}

/// Payload for creating an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewOrder {
    pub customer: CustomerId,
    pub date: NaiveDate,
}

impl NewOrder {
    /// Date rule applied at the call surface: an order cannot be dated before
    /// the day it is placed. The engine itself accepts any date.
    pub fn validate(&self, today: NaiveDate) -> Result<(), OrderError> {
        if self.date < today {
            return Err(OrderError::Validation(
                "order date cannot be earlier than today".to_string(),
            ));
        }
        Ok(())
    }
}

/// Upper bound on the quantity of a single order line.
pub const MAX_QUANTITY: u32 = 9_999_999;

/// A single line on an order.
///
/// `subtotal` snapshots the product price as of the last mutating operation
/// that touched this line; a later catalog price change does not move it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order: OrderId,
    pub product: ProductId,
    pub quantity: u32,
    pub subtotal: Money,
}

impl OrderItem {
    /// Quantity rule applied at the call surface. The engine only rejects
    /// zero; the upper bound mirrors what order forms accept.
    pub fn validate_quantity(quantity: u32) -> Result<(), OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity(quantity));
        }
        if quantity > MAX_QUANTITY {
            return Err(OrderError::Validation(format!(
                "quantity cannot exceed {MAX_QUANTITY}"
            )));
        }
        Ok(())
    }
}

/// Payload for inserting an order line. The datastore allocates the id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewOrderItem {
    pub order: OrderId,
    pub product: ProductId,
    pub quantity: u32,
    pub subtotal: Money,
}
