use super::catalog::{NewProduct, Product, ProductId};
use super::order::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderItemId};
use crate::error::StorageResult;
use async_trait::async_trait;

/// Transactional view of the product catalog.
#[async_trait]
pub trait CatalogStore: Send {
    async fn product(&self, id: ProductId) -> StorageResult<Option<Product>>;
    async fn insert_product(&mut self, product: NewProduct) -> StorageResult<Product>;
    async fn put_product(&mut self, product: Product) -> StorageResult<()>;
    async fn delete_product(&mut self, id: ProductId) -> StorageResult<()>;
}

/// Transactional view of orders and their line items.
#[async_trait]
pub trait OrderStore: Send {
    async fn order(&self, id: OrderId) -> StorageResult<Option<Order>>;
    async fn insert_order(&mut self, order: NewOrder) -> StorageResult<Order>;
    async fn put_order(&mut self, order: Order) -> StorageResult<()>;
    /// Deletes the order and every item that belongs to it.
    async fn delete_order(&mut self, id: OrderId) -> StorageResult<()>;

    async fn item(&self, id: OrderItemId) -> StorageResult<Option<OrderItem>>;
    async fn items_by_order(&self, order: OrderId) -> StorageResult<Vec<OrderItem>>;
    async fn insert_item(&mut self, item: NewOrderItem) -> StorageResult<OrderItem>;
    async fn put_item(&mut self, item: OrderItem) -> StorageResult<()>;
    async fn delete_item(&mut self, id: OrderItemId) -> StorageResult<()>;
    /// True while any order item, staged or committed, references the product.
    async fn product_referenced(&self, id: ProductId) -> StorageResult<bool>;
}

/// A transaction spanning the catalog and order stores.
///
/// Writes stage inside the transaction and are visible to its own reads, but
/// nothing reaches committed state until [`UnitOfWork::commit`]. Dropping the
/// value without committing discards every staged write.
#[async_trait]
pub trait UnitOfWork: CatalogStore + OrderStore + Sync {
    async fn commit(self: Box<Self>) -> StorageResult<()>;
}

/// Entry point a storage backend exposes.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Opens a transaction. Writers serialize: this waits until any earlier
    /// transaction commits or is dropped.
    async fn begin(&self) -> StorageResult<Box<dyn UnitOfWork>>;

    async fn product(&self, id: ProductId) -> StorageResult<Option<Product>>;
    /// Committed catalog snapshot, ordered by id.
    async fn products(&self) -> StorageResult<Vec<Product>>;
    async fn order(&self, id: OrderId) -> StorageResult<Option<Order>>;
    /// Committed orders snapshot, ordered by id.
    async fn orders(&self) -> StorageResult<Vec<Order>>;
    /// Committed items of one order, ordered by item id.
    async fn order_items(&self, order: OrderId) -> StorageResult<Vec<OrderItem>>;
}

pub type DatastoreBox = Box<dyn Datastore>;
pub type DatastoreFactory = Box<dyn Fn() -> DatastoreBox + Send + Sync>;
