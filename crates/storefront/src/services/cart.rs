//! Shopping cart.
//!
//! The cart is a plain value stored in the visitor's session. Lines are
//! identified by [`LineKey`] (product, size, color); adding the same key
//! again merges quantities. Units of a product, summed over all of its
//! lines, never exceed the product's stock.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use afrovibz_core::{CurrencyCode, ProductId, round_money};

use crate::models::Product;

/// Upper bound on a single line regardless of stock.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Errors from cart operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("product is out of stock")]
    OutOfStock,

    #[error("only {available} available")]
    StockLimit { available: u32 },

    #[error("product is not available")]
    ProductUnavailable,

    #[error("{0}")]
    InvalidVariant(String),

    #[error("cart line not found")]
    LineNotFound,

    #[error("invalid cart line key: {0}")]
    InvalidLineKey(String),
}

/// Identity of a cart line.
///
/// Rendered as `{product_id}:{size}:{color}` with empty parts for absent
/// options, e.g. `2:M:Gold` or `9::Black`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.product_id,
            self.size.as_deref().unwrap_or_default(),
            self.color.as_deref().unwrap_or_default()
        )
    }
}

impl FromStr for LineKey {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let product_id = parts
            .next()
            .and_then(|id| id.parse::<ProductId>().ok())
            .ok_or_else(|| CartError::InvalidLineKey(s.to_string()))?;
        let non_empty = |part: Option<&str>| part.filter(|p| !p.is_empty()).map(str::to_string);

        Ok(Self {
            product_id,
            size: non_empty(parts.next()),
            color: non_empty(parts.next()),
        })
    }
}

/// One product variant in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartLine {
    /// The key this line is stored under.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id,
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        round_money(self.unit_price * Decimal::from(self.quantity))
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.size == key.size && self.color == key.color
    }
}

/// Result of adding to the cart.
#[derive(Debug, Clone)]
pub struct Added {
    pub line: CartLine,
    /// The requested quantity was reduced to what is in stock.
    pub capped: bool,
}

/// A visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Units of `product_id` held in lines other than `except`.
    fn units_elsewhere(&self, product_id: ProductId, except: &LineKey) -> u32 {
        self.lines
            .iter()
            .filter(|l| l.product_id == product_id && !l.matches(except))
            .map(|l| l.quantity)
            .sum()
    }

    /// Add `quantity` of a product variant, merging with an existing line.
    ///
    /// The line is capped at the stock not already held by the product's
    /// other variants in this cart. Size and color are matched case-insensitively against the product's
    /// options and stored in the product's spelling. A product with sizes
    /// requires one; color falls back to the first offered.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for zero, `OutOfStock` when
    /// nothing is left, `StockLimit` when the cart already holds all of it,
    /// `ProductUnavailable` for inactive products, and `InvalidVariant` for
    /// unknown sizes or colors.
    pub fn add(
        &mut self,
        product: &Product,
        quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<Added, CartError> {
        if !product.is_visible() {
            return Err(CartError::ProductUnavailable);
        }
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if !product.in_stock() {
            return Err(CartError::OutOfStock);
        }

        let key = LineKey {
            product_id: product.id,
            size: pick_option(&product.sizes, size, "size")?,
            color: pick_option(&product.colors, color, "color")?,
        };
        let limit = product
            .stock
            .saturating_sub(self.units_elsewhere(product.id, &key))
            .min(MAX_LINE_QUANTITY);

        if let Some(line) = self.lines.iter_mut().find(|l| l.matches(&key)) {
            if line.quantity >= limit {
                return Err(CartError::StockLimit { available: limit });
            }
            let wanted = line.quantity.saturating_add(quantity);
            line.quantity = wanted.min(limit);
            line.unit_price = product.price;
            line.name.clone_from(&product.name);
            return Ok(Added {
                line: line.clone(),
                capped: wanted > limit,
            });
        }
        if limit == 0 {
            return Err(CartError::StockLimit { available: 0 });
        }

        let line = CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: quantity.min(limit),
            size: key.size,
            color: key.color,
            image: product.primary_image().map(str::to_string),
        };
        self.lines.push(line.clone());
        Ok(Added {
            line,
            capped: quantity > limit,
        })
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if no line has this key, or
    /// `CartError::StockLimit` if `quantity` exceeds what `stock` leaves
    /// after the product's other lines.
    pub fn update(&mut self, key: &LineKey, quantity: u32, stock: u32) -> Result<(), CartError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.matches(key))
            .ok_or(CartError::LineNotFound)?;

        if quantity == 0 {
            self.lines.remove(index);
            return Ok(());
        }

        let limit = stock
            .saturating_sub(self.units_elsewhere(key.product_id, key))
            .min(MAX_LINE_QUANTITY);
        if quantity > limit {
            return Err(CartError::StockLimit { available: limit });
        }
        if let Some(line) = self.lines.get_mut(index) {
            line.quantity = quantity;
        }
        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if no line has this key.
    pub fn remove(&mut self, key: &LineKey) -> Result<CartLine, CartError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.matches(key))
            .ok_or(CartError::LineNotFound)?;
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Bring the cart in line with the current catalog.
    ///
    /// Lines for missing, inactive or sold-out products are dropped, as are
    /// lines whose size or color is no longer offered. Names, prices and
    /// images are refreshed. Stock is shared out over a product's lines in
    /// cart order; a line left with nothing is dropped. Returns whether
    /// anything changed.
    pub fn reprice(&mut self, products: &[Product]) -> bool {
        let before = self.clone();
        let mut held: BTreeMap<ProductId, u32> = BTreeMap::new();

        self.lines.retain_mut(|line| {
            let Some(product) = products.iter().find(|p| {
                p.id == line.product_id
                    && p.is_visible()
                    && p.offers_variant(line.size.as_deref(), line.color.as_deref())
            }) else {
                return false;
            };
            let taken = held.entry(product.id).or_insert(0);
            let remaining = product
                .stock
                .saturating_sub(*taken)
                .min(MAX_LINE_QUANTITY);
            if remaining == 0 {
                return false;
            }
            line.name.clone_from(&product.name);
            line.unit_price = product.price;
            line.image = product.primary_image().map(str::to_string);
            line.quantity = line.quantity.min(remaining);
            *taken += line.quantity;
            true
        });

        *self != before
    }

    /// Totals and per-line data for the API.
    #[must_use]
    pub fn summary(&self, currency: CurrencyCode) -> CartSummary {
        CartSummary {
            items: self
                .lines
                .iter()
                .map(|line| CartLineView {
                    key: line.key().to_string(),
                    line_total: line.line_total(),
                    line: line.clone(),
                })
                .collect(),
            item_count: self.item_count(),
            subtotal: self.subtotal(),
            currency,
        }
    }
}

/// Resolve a requested option against a product's offered values.
fn pick_option(
    offered: &[String],
    requested: Option<&str>,
    label: &str,
) -> Result<Option<String>, CartError> {
    let requested = requested.map(str::trim).filter(|r| !r.is_empty());
    match (offered.is_empty(), requested) {
        (true, None) => Ok(None),
        (true, Some(value)) => Err(CartError::InvalidVariant(format!(
            "this product has no {label} options (got {value})"
        ))),
        (false, Some(value)) => offered
            .iter()
            .find(|o| o.eq_ignore_ascii_case(value))
            .cloned()
            .map(Some)
            .ok_or_else(|| CartError::InvalidVariant(format!("{label} {value} is not offered"))),
        (false, None) if label == "size" => {
            Err(CartError::InvalidVariant("size is required".to_string()))
        }
        (false, None) => Ok(offered.first().cloned()),
    }
}

/// Cart as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub items: Vec<CartLineView>,
    pub item_count: u32,
    pub subtotal: Decimal,
    pub currency: CurrencyCode,
}

/// A cart line with its key and total.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub key: String,
    #[serde(flatten)]
    pub line: CartLine,
    pub line_total: Decimal,
}
