//! Order-history collaborator interface and in-memory implementation.
//!
//! Market-basket analysis needs three lookups over completed orders:
//! a user's purchase set, the orders containing given products, and the
//! line items of given orders.

use crate::error::Result;
use crate::types::{OrderId, ProductId, UserId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Read-only view of completed-order history.
pub trait OrderReader: Send + Sync {
    /// Distinct products a user has ever ordered, ascending id order
    fn get_purchases(&self, user_id: UserId) -> Result<Vec<ProductId>>;

    /// Distinct orders containing at least one of the given products,
    /// ascending id order
    fn get_orders_containing(&self, product_ids: &[ProductId]) -> Result<Vec<OrderId>>;

    /// Line items of the given orders as `(order_id, product_id)` pairs
    fn get_order_items(&self, order_ids: &[OrderId]) -> Result<Vec<(OrderId, ProductId)>>;
}

#[derive(Debug, Default)]
struct OrdersInner {
    /// Line items per order, in insertion order
    items: HashMap<OrderId, Vec<ProductId>>,
    /// Orders containing each product
    by_product: HashMap<ProductId, Vec<OrderId>>,
    /// Orders placed by each user
    by_user: HashMap<UserId, Vec<OrderId>>,
}

/// In-memory order-history index.
#[derive(Debug, Default)]
pub struct InMemoryOrders {
    inner: RwLock<OrdersInner>,
}

impl InMemoryOrders {
    /// Create an empty order history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed order with its line items
    pub fn insert_order(&self, order_id: OrderId, user_id: UserId, product_ids: &[ProductId]) {
        let mut inner = self.inner.write();
        inner.by_user.entry(user_id).or_default().push(order_id);
        for &product_id in product_ids {
            inner.by_product.entry(product_id).or_default().push(order_id);
        }
        inner.items.insert(order_id, product_ids.to_vec());
    }
}

impl OrderReader for InMemoryOrders {
    fn get_purchases(&self, user_id: UserId) -> Result<Vec<ProductId>> {
        let inner = self.inner.read();
        let mut products: Vec<ProductId> = inner
            .by_user
            .get(&user_id)
            .map(|orders| {
                orders
                    .iter()
                    .filter_map(|order_id| inner.items.get(order_id))
                    .flatten()
                    .copied()
                    .collect::<HashSet<_>>()
            })
            .unwrap_or_default()
            .into_iter()
            .collect();
        products.sort_unstable();
        Ok(products)
    }

    fn get_orders_containing(&self, product_ids: &[ProductId]) -> Result<Vec<OrderId>> {
        let inner = self.inner.read();
        let mut orders: Vec<OrderId> = product_ids
            .iter()
            .filter_map(|product_id| inner.by_product.get(product_id))
            .flatten()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        orders.sort_unstable();
        Ok(orders)
    }

    fn get_order_items(&self, order_ids: &[OrderId]) -> Result<Vec<(OrderId, ProductId)>> {
        let inner = self.inner.read();
        let mut items = Vec::new();
        for &order_id in order_ids {
            if let Some(products) = inner.items.get(&order_id) {
                items.extend(products.iter().map(|&product_id| (order_id, product_id)));
            }
        }
        Ok(items)
    }
}
