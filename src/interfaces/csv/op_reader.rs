use crate::application::engine::OrderEngine;
use crate::domain::catalog::ProductId;
use crate::domain::order::{CustomerId, NewOrder, OrderId, OrderItem, OrderItemId};
use crate::error::{OrderError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::io::Read;

/// Kind of an operation row.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum OpKind {
    CreateOrder,
    AddItem,
    UpdateItem,
    RemoveItem,
    DeleteOrder,
    SetStatus,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateOrder => "create-order",
            Self::AddItem => "add-item",
            Self::UpdateItem => "update-item",
            Self::RemoveItem => "remove-item",
            Self::DeleteOrder => "delete-order",
            Self::SetStatus => "set-status",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the operations CSV.
///
/// Columns are `op, order, product, customer, item, quantity, status, date`;
/// each kind of operation reads the subset it needs and ignores the rest.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationRecord {
    pub op: OpKind,
    pub order: Option<u64>,
    pub product: Option<u64>,
    pub customer: Option<u64>,
    pub item: Option<u64>,
    pub quantity: Option<u32>,
    pub status: Option<String>,
    pub date: Option<NaiveDate>,
}

impl OperationRecord {
    /// Applies this row to the engine. `today` anchors the order-date rule.
    pub async fn apply(&self, engine: &OrderEngine, today: NaiveDate) -> Result<()> {
        match self.op {
            OpKind::CreateOrder => {
                let new = NewOrder {
                    customer: CustomerId(self.required("customer", &self.customer)?),
                    date: self.required("date", &self.date)?,
                };
                new.validate(today)?;
                engine.create_order(new).await?;
                Ok(())
            }
            OpKind::AddItem => {
                let quantity = self.required("quantity", &self.quantity)?;
                OrderItem::validate_quantity(quantity)?;
                engine
                    .add_item(
                        OrderId(self.required("order", &self.order)?),
                        ProductId(self.required("product", &self.product)?),
                        quantity,
                    )
                    .await?;
                Ok(())
            }
            OpKind::UpdateItem => {
                let quantity = self.required("quantity", &self.quantity)?;
                OrderItem::validate_quantity(quantity)?;
                engine
                    .update_item_quantity(
                        OrderItemId(self.required("item", &self.item)?),
                        quantity,
                    )
                    .await
            }
            OpKind::RemoveItem => {
                engine
                    .remove_item(OrderItemId(self.required("item", &self.item)?))
                    .await
            }
            OpKind::DeleteOrder => {
                engine
                    .delete_order(OrderId(self.required("order", &self.order)?))
                    .await
            }
            OpKind::SetStatus => {
                let status = self.required("status", &self.status)?;
                engine
                    .set_status(OrderId(self.required("order", &self.order)?), &status)
                    .await
            }
        }
    }

    fn required<T: Clone>(&self, field: &'static str, value: &Option<T>) -> Result<T> {
        value.clone().ok_or_else(|| {
            OrderError::Validation(format!(
                "{} operation requires the '{field}' column",
                self.op
            ))
        })
    }
}

/// Reads operation rows from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<OperationRecord>`.
/// Whitespace trimming and flexible record lengths are handled automatically.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    /// Creates a new `OperationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes operation rows.
    pub fn operations(self) -> impl Iterator<Item = Result<OperationRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(OrderError::from))
    }
}
