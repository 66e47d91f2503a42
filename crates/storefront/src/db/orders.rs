//! Order repository.

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;

use afrovibz_core::{OrderId, OrderStatus, PaymentStatus, UserId};

use super::RepositoryError;
use crate::models::{NewOrder, Order};

/// Repository for placed orders.
pub struct OrderRepository {
    table: RwLock<OrderTable>,
}

struct OrderTable {
    orders: Vec<Order>,
    next_id: OrderId,
}

impl Default for OrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RwLock::new(OrderTable {
                orders: Vec::new(),
                next_id: OrderId::new(1),
            }),
        }
    }

    /// Record a new order in `pending` status.
    #[instrument(skip(self, new), fields(user_id = %new.user_id, total = %new.total))]
    pub async fn create(&self, new: NewOrder) -> Order {
        let mut table = self.table.write().await;
        let id = table.next_id;
        let now = Utc::now();

        let order = Order {
            id,
            number: Order::number_for(id),
            user_id: new.user_id,
            email: new.email,
            lines: new.lines,
            shipping_address: new.shipping_address,
            delivery: new.delivery,
            payment_method: new.payment_method,
            payment_status: new.payment_method.initial_status(),
            currency: new.currency,
            subtotal: new.subtotal,
            shipping: new.shipping,
            tax: new.tax,
            total: new.total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        table.orders.push(order.clone());
        table.next_id = id.next();
        tracing::info!(order = %order.number, "Order recorded");
        order
    }

    /// Get an order by ID.
    pub async fn get(&self, id: OrderId) -> Option<Order> {
        let table = self.table.read().await;
        table.orders.iter().find(|o| o.id == id).cloned()
    }

    /// A user's orders, newest first.
    pub async fn list_for_user(&self, user_id: UserId) -> Vec<Order> {
        let table = self.table.read().await;
        table
            .orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect()
    }

    /// All orders, newest first, optionally limited to one status.
    pub async fn list_all(&self, status: Option<OrderStatus>) -> Vec<Order> {
        let table = self.table.read().await;
        table
            .orders
            .iter()
            .rev()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect()
    }

    /// Move an order to a new status.
    ///
    /// Cancelling a paid order marks the payment refunded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Conflict` if the transition is not allowed.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut table = self.table.write().await;
        let order = table
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("order {id}")))?;

        if !order.status.can_transition_to(next) {
            return Err(RepositoryError::Conflict(format!(
                "cannot move order from {} to {next}",
                order.status
            )));
        }

        order.status = next;
        if next == OrderStatus::Cancelled && order.payment_status == PaymentStatus::Paid {
            order.payment_status = PaymentStatus::Refunded;
        }
        order.updated_at = Utc::now();

        tracing::info!(order = %order.number, status = %next, "Order status changed");
        Ok(order.clone())
    }
}
