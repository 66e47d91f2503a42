//! Order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use afrovibz_core::{
    CurrencyCode, Email, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId,
};

use super::Address;

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    #[default]
    Standard,
    Express,
    Pickup,
}

impl DeliveryMethod {
    /// All methods, in display order.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Express, Self::Pickup];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Standard => "Standard Delivery",
            Self::Express => "Express Delivery",
            Self::Pickup => "Store Pickup",
        }
    }

    /// Business-day delivery window.
    #[must_use]
    pub const fn estimated_days(&self) -> (u8, u8) {
        match self {
            Self::Standard => (5, 7),
            Self::Express => (1, 2),
            Self::Pickup => (0, 1),
        }
    }

    /// Whether a street address is needed.
    #[must_use]
    pub const fn requires_address(&self) -> bool {
        !matches!(self, Self::Pickup)
    }
}

/// A purchased line, frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
}

impl OrderLine {
    /// Variant description such as `M / Gold`, if any.
    #[must_use]
    pub fn variant(&self) -> Option<String> {
        match (self.size.as_deref(), self.color.as_deref()) {
            (Some(size), Some(color)) => Some(format!("{size} / {color}")),
            (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
            (None, None) => None,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Customer-facing order number, e.g. `AFV-000042`.
    pub number: String,
    pub user_id: UserId,
    pub email: Email,
    pub lines: Vec<OrderLine>,
    pub shipping_address: Address,
    pub delivery: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub currency: CurrencyCode,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Format the customer-facing number for an order ID.
    #[must_use]
    pub fn number_for(id: OrderId) -> String {
        format!("AFV-{:06}", id.as_u32())
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// `(product, quantity)` pairs for stock bookkeeping.
    #[must_use]
    pub fn stock_items(&self) -> Vec<(ProductId, u32)> {
        self.lines
            .iter()
            .map(|line| (line.product_id, line.quantity))
            .collect()
    }
}

/// A priced order ready to be recorded.
///
/// The repository assigns the ID, number, status and timestamps.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub email: Email,
    pub lines: Vec<OrderLine>,
    pub shipping_address: Address,
    pub delivery: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub currency: CurrencyCode,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}
