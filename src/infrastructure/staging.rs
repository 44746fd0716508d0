//! Transaction bookkeeping shared by the storage adapters: the staged write
//! overlay and the id sequences.

use crate::domain::catalog::{Product, ProductId};
use crate::domain::order::{Order, OrderId, OrderItem, OrderItemId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// Writes staged by one open transaction.
///
/// Reads inside the transaction overlay this on committed state, so a
/// transaction sees its own writes. At commit the adapter applies the whole
/// set to the backend as a single batch; on drop it simply goes away.
#[derive(Debug, Default)]
pub(crate) struct WriteSet {
    pub(crate) products: HashMap<ProductId, Product>,
    pub(crate) product_deletes: HashSet<ProductId>,
    pub(crate) orders: HashMap<OrderId, Order>,
    pub(crate) order_deletes: HashSet<OrderId>,
    pub(crate) items: HashMap<OrderItemId, OrderItem>,
    pub(crate) item_deletes: HashSet<OrderItemId>,
}

impl WriteSet {
    pub(crate) fn stage_product(&mut self, product: Product) {
        self.product_deletes.remove(&product.id);
        self.products.insert(product.id, product);
    }

    pub(crate) fn delete_product(&mut self, id: ProductId) {
        self.products.remove(&id);
        self.product_deletes.insert(id);
    }

    pub(crate) fn stage_order(&mut self, order: Order) {
        self.order_deletes.remove(&order.id);
        self.orders.insert(order.id, order);
    }

    pub(crate) fn delete_order(&mut self, id: OrderId) {
        self.orders.remove(&id);
        self.order_deletes.insert(id);
    }

    pub(crate) fn stage_item(&mut self, item: OrderItem) {
        self.item_deletes.remove(&item.id);
        self.items.insert(item.id, item);
    }

    pub(crate) fn delete_item(&mut self, id: OrderItemId) {
        self.items.remove(&id);
        self.item_deletes.insert(id);
    }

    /// Overlay lookup: the staged version wins, a tombstone hides `base`.
    pub(crate) fn product(&self, id: ProductId, base: Option<Product>) -> Option<Product> {
        if let Some(product) = self.products.get(&id) {
            return Some(product.clone());
        }
        if self.product_deletes.contains(&id) {
            return None;
        }
        base
    }

    pub(crate) fn order(&self, id: OrderId, base: Option<Order>) -> Option<Order> {
        if let Some(order) = self.orders.get(&id) {
            return Some(order.clone());
        }
        if self.order_deletes.contains(&id) {
            return None;
        }
        base
    }

    pub(crate) fn item(&self, id: OrderItemId, base: Option<OrderItem>) -> Option<OrderItem> {
        if let Some(item) = self.items.get(&id) {
            return Some(item.clone());
        }
        if self.item_deletes.contains(&id) {
            return None;
        }
        base
    }

    /// Merges the staged view over the committed items of one order,
    /// returning them ordered by id.
    pub(crate) fn items_by_order(&self, order: OrderId, base: Vec<OrderItem>) -> Vec<OrderItem> {
        let mut merged: Vec<OrderItem> = base
            .into_iter()
            .filter(|item| {
                !self.item_deletes.contains(&item.id) && !self.items.contains_key(&item.id)
            })
            .collect();
        merged.extend(
            self.items
                .values()
                .filter(|item| item.order == order)
                .cloned(),
        );
        merged.sort_by_key(|item| item.id);
        merged
    }

    /// Whether any item in the merged view references the product. `base` is
    /// the full committed item set.
    pub(crate) fn product_referenced(&self, product: ProductId, base: &[OrderItem]) -> bool {
        if self.items.values().any(|item| item.product == product) {
            return true;
        }
        base.iter().any(|item| {
            item.product == product
                && !self.item_deletes.contains(&item.id)
                && !self.items.contains_key(&item.id)
        })
    }
}

/// Monotonic id allocators, one per entity. Ids start at 1 and are never
/// reused, even when the allocating transaction rolls back.
#[derive(Debug, Default)]
pub(crate) struct Sequences {
    pub(crate) product: AtomicU64,
    pub(crate) order: AtomicU64,
    pub(crate) item: AtomicU64,
}

impl Sequences {
    pub(crate) fn next(seq: &AtomicU64) -> u64 {
        seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}
