use super::staging::{Sequences, WriteSet};
use crate::domain::catalog::{NewProduct, Product, ProductId};
use crate::domain::order::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderItemId};
use crate::domain::ports::{CatalogStore, Datastore, OrderStore, UnitOfWork};
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Column Family for catalog products.
pub const CF_PRODUCTS: &str = "products";
/// Column Family for orders.
pub const CF_ORDERS: &str = "orders";
/// Column Family for order line items.
pub const CF_ITEMS: &str = "order_items";

fn cf<'a>(db: &'a DB, name: &'static str) -> StorageResult<&'a ColumnFamily> {
    db.cf_handle(name).ok_or_else(|| {
        StorageError::backend(std::io::Error::other(format!(
            "{name} column family not found"
        )))
    })
}

fn encode<T: Serialize>(value: &T) -> StorageResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(StorageError::backend)
}

fn decode<T: DeserializeOwned>(cf_name: &str, bytes: &[u8]) -> StorageResult<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        StorageError::Corrupted(format!("undecodable row in {cf_name} column family: {e}"))
    })
}

fn get<T: DeserializeOwned>(db: &DB, cf_name: &'static str, key: u64) -> StorageResult<Option<T>> {
    let handle = cf(db, cf_name)?;
    match db
        .get_cf(handle, key.to_be_bytes())
        .map_err(StorageError::backend)?
    {
        Some(bytes) => Ok(Some(decode(cf_name, &bytes)?)),
        None => Ok(None),
    }
}

/// Full scan of one column family. Keys are big-endian ids, so rows come out
/// already ordered by id.
fn scan<T: DeserializeOwned>(db: &DB, cf_name: &'static str) -> StorageResult<Vec<T>> {
    let handle = cf(db, cf_name)?;
    let mut rows = Vec::new();
    for entry in db.iterator_cf(handle, IteratorMode::Start) {
        let (_key, value) = entry.map_err(StorageError::backend)?;
        rows.push(decode(cf_name, &value)?);
    }
    Ok(rows)
}

/// Highest allocated id in a column family, 0 when empty.
fn last_key(db: &DB, cf_name: &'static str) -> StorageResult<u64> {
    let handle = cf(db, cf_name)?;
    match db.iterator_cf(handle, IteratorMode::End).next() {
        Some(entry) => {
            let (key, _value) = entry.map_err(StorageError::backend)?;
            let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                StorageError::Corrupted(format!("malformed key in {cf_name} column family"))
            })?;
            Ok(u64::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

/// A persistent datastore backed by RocksDB.
///
/// Products, orders, and order items live in separate Column Families, keyed
/// by their big-endian id. A transaction stages writes in memory and commits
/// them through a single `WriteBatch`, so a commit is all-or-nothing even
/// across entity kinds. Id sequences are recovered from the highest stored
/// key on open.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    tx_lock: Arc<Mutex<()>>,
    ids: Arc<Sequences>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_products = ColumnFamilyDescriptor::new(CF_PRODUCTS, Options::default());
        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_items = ColumnFamilyDescriptor::new(CF_ITEMS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_products, cf_orders, cf_items])
            .map_err(StorageError::backend)?;

        let ids = Sequences::default();
        ids.product
            .store(last_key(&db, CF_PRODUCTS)?, Ordering::Relaxed);
        ids.order.store(last_key(&db, CF_ORDERS)?, Ordering::Relaxed);
        ids.item.store(last_key(&db, CF_ITEMS)?, Ordering::Relaxed);

        Ok(Self {
            db: Arc::new(db),
            tx_lock: Arc::new(Mutex::new(())),
            ids: Arc::new(ids),
        })
    }
}

#[async_trait]
impl Datastore for RocksDbStore {
    async fn begin(&self) -> StorageResult<Box<dyn UnitOfWork>> {
        let guard = self.tx_lock.clone().lock_owned().await;
        Ok(Box::new(RocksDbTx {
            _guard: guard,
            db: self.db.clone(),
            ids: self.ids.clone(),
            staged: WriteSet::default(),
        }))
    }

    async fn product(&self, id: ProductId) -> StorageResult<Option<Product>> {
        get(&self.db, CF_PRODUCTS, id.0)
    }

    async fn products(&self) -> StorageResult<Vec<Product>> {
        scan(&self.db, CF_PRODUCTS)
    }

    async fn order(&self, id: OrderId) -> StorageResult<Option<Order>> {
        get(&self.db, CF_ORDERS, id.0)
    }

    async fn orders(&self) -> StorageResult<Vec<Order>> {
        scan(&self.db, CF_ORDERS)
    }

    async fn order_items(&self, order: OrderId) -> StorageResult<Vec<OrderItem>> {
        let items: Vec<OrderItem> = scan(&self.db, CF_ITEMS)?;
        Ok(items.into_iter().filter(|item| item.order == order).collect())
    }
}

/// An open transaction against a [`RocksDbStore`]. Holds the writer lock for
/// its whole lifetime.
struct RocksDbTx {
    _guard: OwnedMutexGuard<()>,
    db: Arc<DB>,
    ids: Arc<Sequences>,
    staged: WriteSet,
}

#[async_trait]
impl CatalogStore for RocksDbTx {
    async fn product(&self, id: ProductId) -> StorageResult<Option<Product>> {
        let base = get(&self.db, CF_PRODUCTS, id.0)?;
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
impl OrderStore for RocksDbTx {
    async fn order(&self, id: OrderId) -> StorageResult<Option<Order>> {
        let base = get(&self.db, CF_ORDERS, id.0)?;
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
        let base = get(&self.db, CF_ITEMS, id.0)?;
        Ok(self.staged.item(id, base))
    }

    async fn items_by_order(&self, order: OrderId) -> StorageResult<Vec<OrderItem>> {
        let base: Vec<OrderItem> = scan::<OrderItem>(&self.db, CF_ITEMS)?
            .into_iter()
            .filter(|item| item.order == order)
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
        let base: Vec<OrderItem> = scan(&self.db, CF_ITEMS)?;
        Ok(self.staged.product_referenced(id, &base))
    }
}

#[async_trait]
impl UnitOfWork for RocksDbTx {
    async fn commit(self: Box<Self>) -> StorageResult<()> {
        let mut batch = WriteBatch::default();

        let products = cf(&self.db, CF_PRODUCTS)?;
        for (id, product) in &self.staged.products {
            batch.put_cf(products, id.0.to_be_bytes(), encode(product)?);
        }
        for id in &self.staged.product_deletes {
            batch.delete_cf(products, id.0.to_be_bytes());
        }

        let orders = cf(&self.db, CF_ORDERS)?;
        for (id, order) in &self.staged.orders {
            batch.put_cf(orders, id.0.to_be_bytes(), encode(order)?);
        }
        for id in &self.staged.order_deletes {
            batch.delete_cf(orders, id.0.to_be_bytes());
        }

        let items = cf(&self.db, CF_ITEMS)?;
        for (id, item) in &self.staged.items {
            batch.put_cf(items, id.0.to_be_bytes(), encode(item)?);
        }
        for id in &self.staged.item_deletes {
            batch.delete_cf(items, id.0.to_be_bytes());
        }

        self.db.write(batch).map_err(StorageError::backend)
    }
}
