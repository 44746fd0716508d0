use super::staging::{Sequences, WriteSet};
use crate::domain::catalog::{NewProduct, Product, ProductId};
use crate::domain::order::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderItemId};
use crate::domain::ports::{CatalogStore, Datastore, OrderStore, UnitOfWork};
use crate::error::StorageResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

#[derive(Debug, Default)]
struct MemState {
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    items: HashMap<OrderItemId, OrderItem>,
}

/// A thread-safe in-memory datastore.
///
/// Committed state lives behind an `Arc<RwLock<..>>` for shared concurrent
/// access; transactions serialize on a dedicated mutex and stage writes until
/// commit. Ideal for tests and one-shot runs where persistence is not
/// required.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemState>>,
    tx_lock: Arc<Mutex<()>>,
    ids: Arc<Sequences>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory datastore.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Datastore for InMemoryStore {
    async fn begin(&self) -> StorageResult<Box<dyn UnitOfWork>> {
        let guard = self.tx_lock.clone().lock_owned().await;
        Ok(Box::new(InMemoryTx {
            _guard: guard,
            state: self.state.clone(),
            ids: self.ids.clone(),
            staged: WriteSet::default(),
        }))
    }

    async fn product(&self, id: ProductId) -> StorageResult<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn products(&self) -> StorageResult<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by_key(|product| product.id);
        Ok(products)
    }

    async fn order(&self, id: OrderId) -> StorageResult<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn orders(&self) -> StorageResult<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state.orders.values().cloned().collect();
        orders.sort_by_key(|order| order.id);
        Ok(orders)
    }

    async fn order_items(&self, order: OrderId) -> StorageResult<Vec<OrderItem>> {
        let state = self.state.read().await;
        let mut items: Vec<OrderItem> = state
            .items
            .values()
            .filter(|item| item.order == order)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }
}

/// An open transaction against an [`InMemoryStore`]. Holds the writer lock
/// for its whole lifetime.
struct InMemoryTx {
    _guard: OwnedMutexGuard<()>,
    state: Arc<RwLock<MemState>>,
    ids: Arc<Sequences>,
    staged: WriteSet,
}

#[async_trait]
impl CatalogStore for InMemoryTx {
    async fn product(&self, id: ProductId) -> StorageResult<Option<Product>> {
        let base = self.state.read().await.products.get(&id).cloned();
        Ok(self.staged.product(id, base))
    }

    async fn insert_product(&mut self, product: NewProduct) -> StorageResult<Product> {
        let id = ProductId(Sequences::next(&self.ids.product));
        let product = Product::from_new(id, product);
        self.staged.stage_product(product.clone());
        Ok(product)
    }

    async fn put_product(&mut self, product: Product) -> StorageResult<()> {
        self.staged.stage_product(product);
        Ok(())
    }

    async fn delete_product(&mut self, id: ProductId) -> StorageResult<()> {
        self.staged.delete_product(id);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryTx {
    async fn order(&self, id: OrderId) -> StorageResult<Option<Order>> {
        let base = self.state.read().await.orders.get(&id).cloned();
        Ok(self.staged.order(id, base))
    }

    async fn insert_order(&mut self, order: NewOrder) -> StorageResult<Order> {
        let id = OrderId(Sequences::next(&self.ids.order));
        let order = Order::from_new(id, order);
        self.staged.stage_order(order.clone());
        Ok(order)
    }

    async fn put_order(&mut self, order: Order) -> StorageResult<()> {
        self.staged.stage_order(order);
        Ok(())
    }

    async fn delete_order(&mut self, id: OrderId) -> StorageResult<()> {
        for item in self.items_by_order(id).await? {
            self.staged.delete_item(item.id);
        }
        self.staged.delete_order(id);
        Ok(())
    }

    async fn item(&self, id: OrderItemId) -> StorageResult<Option<OrderItem>> {
        let base = self.state.read().await.items.get(&id).cloned();
        Ok(self.staged.item(id, base))
    }

    async fn items_by_order(&self, order: OrderId) -> StorageResult<Vec<OrderItem>> {
        let base: Vec<OrderItem> = self
            .state
            .read()
            .await
            .items
            .values()
            .filter(|item| item.order == order)
            .cloned()
            .collect();
        Ok(self.staged.items_by_order(order, base))
    }

    async fn insert_item(&mut self, item: NewOrderItem) -> StorageResult<OrderItem> {
        let item = OrderItem {
            id: OrderItemId(Sequences::next(&self.ids.item)),
            order: item.order,
            product: item.product,
            quantity: item.quantity,
            subtotal: item.subtotal,
        };
        self.staged.stage_item(item.clone());
        Ok(item)
    }

    async fn put_item(&mut self, item: OrderItem) -> StorageResult<()> {
        self.staged.stage_item(item);
        Ok(())
    }

    async fn delete_item(&mut self, id: OrderItemId) -> StorageResult<()> {
        self.staged.delete_item(id);
        Ok(())
    }

    async fn product_referenced(&self, id: ProductId) -> StorageResult<bool> {
        let base: Vec<OrderItem> = self.state.read().await.items.values().cloned().collect();
        Ok(self.staged.product_referenced(id, &base))
    }
}

#[async_trait]
impl UnitOfWork for InMemoryTx {
    async fn commit(self: Box<Self>) -> StorageResult<()> {
        let this = *self;
        let mut state = this.state.write().await;
        let staged = this.staged;
        for (id, product) in staged.products {
            state.products.insert(id, product);
        }
        for (id, order) in staged.orders {
            state.orders.insert(id, order);
        }
        for (id, item) in staged.items {
            state.items.insert(id, item);
        }
        for id in staged.product_deletes {
            state.products.remove(&id);
        }
        for id in staged.order_deletes {
            state.orders.remove(&id);
        }
        for id in staged.item_deletes {
            state.items.remove(&id);
        }
        Ok(())
        // this._guard drops here, releasing the writer lock.
    }
}
