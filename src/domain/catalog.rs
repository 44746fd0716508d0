use crate::domain::money::Price;
use crate::error::OrderError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a catalog product. Allocated by the datastore on insert.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Upper bound on units a product can hold.
pub const MAX_STOCK: u32 = 9_999_999;

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), OrderError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(OrderError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

fn check_stock(stock: u32) -> Result<(), OrderError> {
    if stock > MAX_STOCK {
        return Err(OrderError::Validation(format!(
            "stock cannot exceed {MAX_STOCK}"
        )));
    }
    Ok(())
}

/// A catalog row.
///
/// `stock` is the number of units on hand. Engine operations only ever
/// subtract what they previously checked, so it cannot go negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Price,
    pub stock: u32,
}

impl Product {
    pub(crate) fn from_new(id: ProductId, new: NewProduct) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            category: new.category,
            price: new.price,
            stock: new.stock,
        }
    }

    /// Re-checks the field rules on an edited row. The price needs no check
    /// since a [`Price`] is valid by construction.
    pub fn validate(&self) -> Result<(), OrderError> {
        check_length("product name", &self.name, 3, 100)?;
        check_length("product description", &self.description, 1, 500)?;
        check_length("product category", &self.category, 3, 100)?;
        check_stock(self.stock)
    }
}

/// Payload for inserting a product. The datastore allocates the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Price,
    pub stock: u32,
}

impl NewProduct {
    /// Validates the field rules and builds the payload.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
        stock: u32,
    ) -> Result<Self, OrderError> {
        let name = name.into();
        let description = description.into();
        let category = category.into();
        check_length("product name", &name, 3, 100)?;
        check_length("product description", &description, 1, 500)?;
        check_length("product category", &category, 3, 100)?;
        check_stock(stock)?;
        let price = Price::new(price)?;
        Ok(Self {
            name,
            description,
            category,
            price,
            stock,
        })
    }
}
