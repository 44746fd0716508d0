use crate::domain::catalog::ProductId;
use crate::domain::order::{OrderId, OrderItemId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrderError>;

/// Shorthand for operations that can only fail inside a storage adapter.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Faults raised by a storage backend, as opposed to business rules.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("stored data is inconsistent: {0}")]
    Corrupted(String),
}

impl StorageError {
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("order {0} not found")]
    OrderNotFound(OrderId),
    #[error("order item {0} not found")]
    ItemNotFound(OrderItemId),
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("insufficient stock for product {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductId,
        requested: u32,
        available: u32,
    },
    #[error("invalid order status {0:?}")]
    InvalidStatus(String),
    #[error("product {0} is referenced by order items")]
    ProductInUse(ProductId),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
