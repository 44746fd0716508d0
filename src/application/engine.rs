use crate::domain::catalog::{NewProduct, Product, ProductId};
use crate::domain::money::Money;
use crate::domain::order::{
    NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderItemId, OrderStatus,
};
use crate::domain::ports::{DatastoreBox, UnitOfWork};
use crate::error::{OrderError, Result, StorageError};

/// The main entry point for order processing.
///
/// `OrderEngine` is the single writer of product stock, order lines, and
/// order totals. Each mutating operation validates first, then stages its
/// writes inside one unit of work and commits; any error path drops the
/// transaction with nothing applied, so the two stores can never drift
/// apart.
pub struct OrderEngine {
    store: DatastoreBox,
}

impl OrderEngine {
    /// Creates a new `OrderEngine` over a storage backend.
    pub fn new(store: DatastoreBox) -> Self {
        Self { store }
    }

    /// Opens an empty `Pending` order for a customer.
    ///
    /// Customer existence and the order-date rule are the caller's concern
    /// (see [`NewOrder::validate`]); creation itself cannot fail a business
    /// check.
    #[tracing::instrument(skip(self))]
    pub async fn create_order(&self, new: NewOrder) -> Result<Order> {
        let mut tx = self.store.begin().await?;
        let order = tx.insert_order(new).await?;
        tx.commit().await?;
        Ok(order)
    }

    /// Adds a line to an order, reserving stock and repricing the total.
    ///
    /// The subtotal snapshots the product's current price. Checks run in a
    /// fixed sequence: quantity, order, product, stock; the first failure
    /// aborts before anything is staged.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<OrderItem> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity(quantity));
        }

        let mut tx = self.store.begin().await?;
        tx.order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        let mut product = tx
            .product(product_id)
            .await?
            .ok_or(OrderError::ProductNotFound(product_id))?;
        if product.stock < quantity {
            tracing::debug!(available = product.stock, "rejecting add, stock short");
            return Err(OrderError::InsufficientStock {
                product: product_id,
                requested: quantity,
                available: product.stock,
            });
        }

        let subtotal = product.price.times(quantity);
        let item = tx
            .insert_item(NewOrderItem {
                order: order_id,
                product: product_id,
                quantity,
                subtotal,
            })
            .await?;
        product.stock -= quantity;
        tx.put_product(product).await?;
        Self::recalculate_total(tx.as_mut(), order_id).await?;
        tx.commit().await?;
        Ok(item)
    }

    /// Changes a line's quantity, settling the stock difference and
    /// repricing the subtotal at the product's current price.
    ///
    /// Growing the line consumes stock and fails with `InsufficientStock` if
    /// the difference is not available; shrinking it returns stock. Keeping
    /// the quantity equal still reprices the line.
    #[tracing::instrument(skip(self))]
    pub async fn update_item_quantity(&self, item_id: OrderItemId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity(quantity));
        }

        let mut tx = self.store.begin().await?;
        let mut item = tx
            .item(item_id)
            .await?
            .ok_or(OrderError::ItemNotFound(item_id))?;
        let mut product = tx.product(item.product).await?.ok_or_else(|| {
            StorageError::Corrupted(format!(
                "order item {} references missing product {}",
                item.id, item.product
            ))
        })?;

        if quantity > item.quantity {
            let needed = quantity - item.quantity;
            if product.stock < needed {
                tracing::debug!(needed, available = product.stock, "rejecting update, stock short");
                return Err(OrderError::InsufficientStock {
                    product: product.id,
                    requested: needed,
                    available: product.stock,
                });
            }
            product.stock -= needed;
        } else {
            product.stock += item.quantity - quantity;
        }

        item.quantity = quantity;
        item.subtotal = product.price.times(quantity);
        let order_id = item.order;
        tx.put_product(product).await?;
        tx.put_item(item).await?;
        Self::recalculate_total(tx.as_mut(), order_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Removes a line, returning its reserved units to stock.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, item_id: OrderItemId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        let item = tx
            .item(item_id)
            .await?
            .ok_or(OrderError::ItemNotFound(item_id))?;
        let mut product = tx.product(item.product).await?.ok_or_else(|| {
            StorageError::Corrupted(format!(
                "order item {} references missing product {}",
                item.id, item.product
            ))
        })?;

        product.stock += item.quantity;
        tx.put_product(product).await?;
        tx.delete_item(item_id).await?;
        Self::recalculate_total(tx.as_mut(), item.order).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Deletes an order, returning every line's reserved units to stock and
    /// cascading to the lines themselves.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        tx.order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        for item in tx.items_by_order(order_id).await? {
            // A line whose product row vanished only skips its restore.
            if let Some(mut product) = tx.product(item.product).await? {
                product.stock += item.quantity;
                tx.put_product(product).await?;
            }
        }
        tx.delete_order(order_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Overwrites an order's status.
    ///
    /// The status string must name one of the enumerated statuses; it is
    /// checked before the order is looked up. Any status may follow any
    /// other.
    #[tracing::instrument(skip(self))]
    pub async fn set_status(&self, order_id: OrderId, status: &str) -> Result<()> {
        let status: OrderStatus = status.parse()?;
        let mut tx = self.store.begin().await?;
        let mut order = tx
            .order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        order.status = status;
        tx.put_order(order).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Inserts a product into the catalog. Field rules were already enforced
    /// when the [`NewProduct`] was built.
    #[tracing::instrument(skip(self, new))]
    pub async fn create_product(&self, new: NewProduct) -> Result<Product> {
        let mut tx = self.store.begin().await?;
        let product = tx.insert_product(new).await?;
        tx.commit().await?;
        Ok(product)
    }

    /// Rewrites a catalog row after re-checking its field rules.
    ///
    /// Changing the price does not move existing line subtotals; those are
    /// repriced only when their own quantity is next edited.
    #[tracing::instrument(skip(self, product), fields(product = %product.id))]
    pub async fn update_product(&self, product: Product) -> Result<()> {
        product.validate()?;
        let mut tx = self.store.begin().await?;
        tx.product(product.id)
            .await?
            .ok_or(OrderError::ProductNotFound(product.id))?;
        tx.put_product(product).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Deletes a catalog row, refusing while any order line references it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, product_id: ProductId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        tx.product(product_id)
            .await?
            .ok_or(OrderError::ProductNotFound(product_id))?;
        if tx.product_referenced(product_id).await? {
            return Err(OrderError::ProductInUse(product_id));
        }
        tx.delete_product(product_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// One committed product row.
    pub async fn product(&self, product_id: ProductId) -> Result<Product> {
        self.store
            .product(product_id)
            .await?
            .ok_or(OrderError::ProductNotFound(product_id))
    }

    /// Committed catalog snapshot, ordered by id.
    pub async fn catalog(&self) -> Result<Vec<Product>> {
        Ok(self.store.products().await?)
    }

    /// Committed orders snapshot, ordered by id.
    pub async fn orders(&self) -> Result<Vec<Order>> {
        Ok(self.store.orders().await?)
    }

    /// One committed order with its lines, ordered by line id.
    pub async fn order_details(&self, order_id: OrderId) -> Result<(Order, Vec<OrderItem>)> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        let items = self.store.order_items(order_id).await?;
        Ok((order, items))
    }

    /// Recomputes an order's total as the sum of its line subtotals. Runs
    /// inside the caller's transaction so lines staged there are counted.
    async fn recalculate_total(tx: &mut dyn UnitOfWork, order_id: OrderId) -> Result<()> {
        let items = tx.items_by_order(order_id).await?;
        let total = items
            .iter()
            .map(|item| item.subtotal)
            .fold(Money::ZERO, |acc, subtotal| acc + subtotal);
        let mut order = tx
            .order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        order.total = total;
        tx.put_order(order).await?;
        Ok(())
    }
}
