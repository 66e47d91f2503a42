//! Checkout: delivery options, quotes and order placement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use afrovibz_core::{AddressId, CurrencyCode, PaymentMethod, ProductId, round_money};

use super::cart::Cart;
use crate::config::{ShippingConfig, StorefrontConfig};
use crate::db::RepositoryError;
use crate::db::accounts::AccountRepository;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::models::{
    Address, AddressInput, CurrentUser, DeliveryMethod, NewOrder, Order, OrderLine, Product,
};

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("a shipping address is required")]
    MissingAddress,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("address not found")]
    AddressNotFound,

    #[error("{0} is no longer available")]
    ProductUnavailable(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Fees, tax and currency applied to every quote.
#[derive(Debug, Clone, Copy)]
pub struct Pricing {
    pub shipping: ShippingConfig,
    pub tax_rate: Decimal,
    pub currency: CurrencyCode,
}

impl From<&StorefrontConfig> for Pricing {
    fn from(config: &StorefrontConfig) -> Self {
        Self {
            shipping: config.shipping,
            tax_rate: config.tax_rate,
            currency: config.currency,
        }
    }
}

impl Pricing {
    /// Delivery fee for a method at a given subtotal.
    #[must_use]
    pub fn shipping_cost(&self, method: DeliveryMethod, subtotal: Decimal) -> Decimal {
        match method {
            DeliveryMethod::Standard if subtotal >= self.shipping.free_shipping_threshold => {
                Decimal::ZERO
            }
            DeliveryMethod::Standard => self.shipping.standard_fee,
            DeliveryMethod::Express => self.shipping.express_fee,
            DeliveryMethod::Pickup => Decimal::ZERO,
        }
    }

    /// Tax on a subtotal, rounded to cents.
    #[must_use]
    pub fn tax(&self, subtotal: Decimal) -> Decimal {
        round_money(subtotal * self.tax_rate)
    }

    /// Every delivery method priced for `subtotal`.
    #[must_use]
    pub fn delivery_options(&self, subtotal: Decimal) -> Vec<DeliveryOption> {
        DeliveryMethod::ALL
            .into_iter()
            .map(|method| {
                let (min_days, max_days) = method.estimated_days();
                DeliveryOption {
                    method,
                    label: method.label(),
                    min_days,
                    max_days,
                    fee: self.shipping_cost(method, subtotal),
                    free_over: (method == DeliveryMethod::Standard)
                        .then_some(self.shipping.free_shipping_threshold),
                    requires_address: method.requires_address(),
                }
            })
            .collect()
    }

    /// Totals for a subtotal and delivery method.
    #[must_use]
    pub fn quote(&self, subtotal: Decimal, delivery: DeliveryMethod) -> Quote {
        let shipping = self.shipping_cost(delivery, subtotal);
        let tax = self.tax(subtotal);
        Quote {
            delivery,
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
            currency: self.currency,
        }
    }
}

/// A delivery method with its fee for the current cart.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOption {
    pub method: DeliveryMethod,
    pub label: &'static str,
    pub min_days: u8,
    pub max_days: u8,
    pub fee: Decimal,
    /// Subtotal at which this method becomes free.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_over: Option<Decimal>,
    pub requires_address: bool,
}

/// Order totals before placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub delivery: DeliveryMethod,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub currency: CurrencyCode,
}

/// Checkout form.
///
/// Either `address_id` (a saved address) or `address` (entered at checkout)
/// must be given.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub delivery: DeliveryMethod,
    #[serde(default)]
    pub address_id: Option<AddressId>,
    #[serde(default)]
    pub address: Option<AddressInput>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Save an entered address to the account's address book.
    #[serde(default)]
    pub save_address: bool,
}

/// Order placement over the repositories.
pub struct CheckoutService<'a> {
    products: &'a ProductRepository,
    accounts: &'a AccountRepository,
    orders: &'a OrderRepository,
    pricing: Pricing,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(
        products: &'a ProductRepository,
        accounts: &'a AccountRepository,
        orders: &'a OrderRepository,
        pricing: Pricing,
    ) -> Self {
        Self {
            products,
            accounts,
            orders,
            pricing,
        }
    }

    /// Place an order for the cart.
    ///
    /// Stock is reserved for every line or none, and lines are priced from
    /// the products as they stood under the reservation's write lock. The
    /// caller clears the cart on success.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart, address errors
    /// when the shipping address is missing or invalid,
    /// `ProductUnavailable` when a product or variant left the catalog, and
    /// `Repository(InsufficientStock)` when stock ran out.
    #[instrument(skip(self, user, cart, request), fields(user_id = %user.id, delivery = ?request.delivery))]
    pub async fn place_order(
        &self,
        user: &CurrentUser,
        cart: &Cart,
        request: PlaceOrderRequest,
    ) -> Result<Order, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let shipping_address = self.resolve_address(user, &request).await?;

        let stock_items: Vec<_> = cart
            .lines()
            .iter()
            .map(|l| (l.product_id, l.quantity))
            .collect();
        let reserved = self
            .products
            .reserve_stock(&stock_items)
            .await
            .map_err(|e| match e {
                RepositoryError::Unavailable(id) => {
                    CheckoutError::ProductUnavailable(line_name(cart, id))
                }
                other => CheckoutError::Repository(other),
            })?;

        let lines = match order_lines(cart, &reserved) {
            Ok(lines) => lines,
            Err(err) => {
                self.products.release_stock(&stock_items).await;
                return Err(err);
            }
        };

        let subtotal: Decimal = lines.iter().map(|l| l.line_total).sum();
        let quote = self.pricing.quote(subtotal, request.delivery);

        let order = self
            .orders
            .create(NewOrder {
                user_id: user.id,
                email: user.email.clone(),
                lines,
                shipping_address,
                delivery: request.delivery,
                payment_method: request.payment_method,
                currency: quote.currency,
                subtotal: quote.subtotal,
                shipping: quote.shipping,
                tax: quote.tax,
                total: quote.total,
            })
            .await;

        sentry::add_breadcrumb(sentry::Breadcrumb {
            category: Some("checkout".into()),
            message: Some(format!("Order {} placed", order.number)),
            level: sentry::Level::Info,
            ..Default::default()
        });

        Ok(order)
    }

    async fn resolve_address(
        &self,
        user: &CurrentUser,
        request: &PlaceOrderRequest,
    ) -> Result<Address, CheckoutError> {
        if let Some(address_id) = request.address_id {
            return self
                .accounts
                .address(user.id, address_id)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound(_) => CheckoutError::AddressNotFound,
                    other => CheckoutError::Repository(other),
                });
        }

        let Some(input) = request.address.clone() else {
            return Err(CheckoutError::MissingAddress);
        };
        let requires_street = request.delivery.requires_address();
        input
            .validate(requires_street)
            .map_err(CheckoutError::InvalidAddress)?;

        if request.save_address && requires_street {
            return Ok(self.accounts.add_address(user.id, input).await?);
        }
        Ok(input.into_address(AddressId::new(0)))
    }
}

/// Price cart lines from the reserved products.
fn order_lines(cart: &Cart, reserved: &[Product]) -> Result<Vec<OrderLine>, CheckoutError> {
    cart.lines()
        .iter()
        .map(|line| {
            let product = reserved
                .iter()
                .find(|p| {
                    p.id == line.product_id
                        && p.offers_variant(line.size.as_deref(), line.color.as_deref())
                })
                .ok_or_else(|| CheckoutError::ProductUnavailable(line.name.clone()))?;
            Ok(OrderLine {
                product_id: product.id,
                name: product.name.clone(),
                size: line.size.clone(),
                color: line.color.clone(),
                unit_price: product.price,
                quantity: line.quantity,
                line_total: round_money(product.price * Decimal::from(line.quantity)),
            })
        })
        .collect()
}

fn line_name(cart: &Cart, product_id: ProductId) -> String {
    cart.lines()
        .iter()
        .find(|l| l.product_id == product_id)
        .map_or_else(|| format!("product {product_id}"), |l| l.name.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use afrovibz_core::{Email, PaymentStatus, ProductStatus, UserRole};
    use tokio::task::JoinSet;

    use super::*;
    use crate::db::seed::demo_products;
    use crate::models::ProductUpdate;

    fn pricing() -> Pricing {
        Pricing::from(&StorefrontConfig::default())
    }

    struct Fixture {
        products: ProductRepository,
        accounts: AccountRepository,
        orders: OrderRepository,
        user: CurrentUser,
    }

    impl Fixture {
        async fn new() -> Self {
            let accounts = AccountRepository::new();
            let user = accounts
                .create(
                    Email::parse("esi@example.com").unwrap(),
                    "Esi",
                    UserRole::Customer,
                    "hash".to_string(),
                )
                .await
                .unwrap();
            Self {
                products: ProductRepository::new(demo_products()),
                accounts,
                orders: OrderRepository::new(),
                user: CurrentUser::from(&user),
            }
        }

        fn service(&self) -> CheckoutService<'_> {
            CheckoutService::new(&self.products, &self.accounts, &self.orders, pricing())
        }

        async fn product(&self, id: u32) -> Product {
            self.products.get(ProductId::new(id)).await.unwrap()
        }
    }

    fn address() -> AddressInput {
        AddressInput {
            full_name: "Esi Owusu".to_string(),
            phone: "0240000000".to_string(),
            line1: "7 Cantonments Rd".to_string(),
            city: "Accra".to_string(),
            region: "Greater Accra".to_string(),
            country: "Ghana".to_string(),
            ..AddressInput::default()
        }
    }

    fn request(delivery: DeliveryMethod) -> PlaceOrderRequest {
        PlaceOrderRequest {
            delivery,
            address_id: None,
            address: Some(address()),
            payment_method: PaymentMethod::Card,
            save_address: false,
        }
    }

    #[test]
    fn test_standard_free_at_threshold() {
        let pricing = pricing();
        let threshold = pricing.shipping.free_shipping_threshold;
        assert_eq!(
            pricing.shipping_cost(DeliveryMethod::Standard, threshold),
            Decimal::ZERO
        );
        assert_eq!(
            pricing.shipping_cost(DeliveryMethod::Standard, threshold - Decimal::new(1, 2)),
            pricing.shipping.standard_fee
        );
        assert_eq!(
            pricing.shipping_cost(DeliveryMethod::Express, threshold),
            pricing.shipping.express_fee
        );
        assert_eq!(
            pricing.shipping_cost(DeliveryMethod::Pickup, Decimal::ONE),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_quote_total_and_tax_rounding() {
        let mut pricing = pricing();
        pricing.tax_rate = Decimal::new(125, 3);
        let quote = pricing.quote(Decimal::new(4_500, 2), DeliveryMethod::Express);
        // 45.00 * 0.125 = 5.625 -> 5.63
        assert_eq!(quote.tax, Decimal::new(563, 2));
        assert_eq!(quote.total, quote.subtotal + quote.shipping + quote.tax);
    }

    #[test]
    fn test_delivery_options_list_all_methods() {
        let options = pricing().delivery_options(Decimal::new(2_000, 2));
        assert_eq!(options.len(), 3);
        let standard = options.first().unwrap();
        assert_eq!(standard.method, DeliveryMethod::Standard);
        assert_eq!((standard.min_days, standard.max_days), (5, 7));
        assert!(standard.free_over.is_some());
        assert!(!options.last().unwrap().requires_address);
    }

    #[tokio::test]
    async fn test_place_order_decrements_stock() {
        let fx = Fixture::new().await;
        let jacket = fx.product(2).await;
        let mut cart = Cart::default();
        cart.add(&jacket, 2, Some("M"), None).unwrap();

        let order = fx
            .service()
            .place_order(&fx.user, &cart, request(DeliveryMethod::Standard))
            .await
            .unwrap();

        assert_eq!(order.subtotal, Decimal::new(24_000, 2));
        assert_eq!(order.shipping, Decimal::ZERO);
        assert_eq!(order.total, order.subtotal + order.shipping + order.tax);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(fx.product(2).await.stock, jacket.stock - 2);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let fx = Fixture::new().await;
        let err = fx
            .service()
            .place_order(&fx.user, &Cart::default(), request(DeliveryMethod::Standard))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_oversell_fails_without_partial_decrement() {
        let fx = Fixture::new().await;
        let jacket = fx.product(2).await;
        let speaker = fx.product(10).await;
        let mut cart = Cart::default();
        cart.add(&jacket, 1, Some("M"), None).unwrap();
        cart.add(&speaker, 4, None, None).unwrap();

        fx.products
            .reserve_stock(&[(speaker.id, 3)])
            .await
            .unwrap();

        let err = fx
            .service()
            .place_order(&fx.user, &cart, request(DeliveryMethod::Express))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Repository(RepositoryError::InsufficientStock { .. })
        ));
        assert_eq!(fx.product(2).await.stock, jacket.stock);
        assert!(fx.orders.list_all(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_address_required_for_delivery() {
        let fx = Fixture::new().await;
        let mut cart = Cart::default();
        cart.add(&fx.product(7).await, 1, None, None).unwrap();

        let mut req = request(DeliveryMethod::Standard);
        req.address = None;
        assert!(matches!(
            fx.service().place_order(&fx.user, &cart, req).await,
            Err(CheckoutError::MissingAddress)
        ));

        let mut req = request(DeliveryMethod::Standard);
        if let Some(a) = req.address.as_mut() {
            a.line1 = String::new();
        }
        assert!(matches!(
            fx.service().place_order(&fx.user, &cart, req).await,
            Err(CheckoutError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_pickup_needs_contact_only() {
        let fx = Fixture::new().await;
        let mut cart = Cart::default();
        cart.add(&fx.product(7).await, 1, None, None).unwrap();

        let mut req = request(DeliveryMethod::Pickup);
        req.address = Some(AddressInput {
            full_name: "Esi Owusu".to_string(),
            phone: "0240000000".to_string(),
            ..AddressInput::default()
        });
        req.payment_method = PaymentMethod::PayOnDelivery;

        let order = fx.service().place_order(&fx.user, &cart, req).await.unwrap();
        assert_eq!(order.shipping, Decimal::ZERO);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_saved_address_and_save_flag() {
        let fx = Fixture::new().await;
        let mut cart = Cart::default();
        cart.add(&fx.product(7).await, 1, None, None).unwrap();

        let mut req = request(DeliveryMethod::Standard);
        req.save_address = true;
        let order = fx.service().place_order(&fx.user, &cart, req).await.unwrap();
        let saved = fx.accounts.addresses(fx.user.id).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(order.shipping_address.id, saved.first().unwrap().id);

        let req = PlaceOrderRequest {
            address_id: Some(saved.first().unwrap().id),
            address: None,
            ..request(DeliveryMethod::Express)
        };
        assert!(fx.service().place_order(&fx.user, &cart, req).await.is_ok());

        let req = PlaceOrderRequest {
            address_id: Some(AddressId::new(404)),
            ..request(DeliveryMethod::Express)
        };
        assert!(matches!(
            fx.service().place_order(&fx.user, &cart, req).await,
            Err(CheckoutError::AddressNotFound)
        ));
    }

    #[tokio::test]
    async fn test_unavailable_product_rejected() {
        let fx = Fixture::new().await;
        let mut cart = Cart::default();
        cart.add(&fx.product(7).await, 1, None, None).unwrap();
        fx.products.delete(ProductId::new(7)).await.unwrap();

        assert!(matches!(
            fx.service()
                .place_order(&fx.user, &cart, request(DeliveryMethod::Standard))
                .await,
            Err(CheckoutError::ProductUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_product_hidden_after_carting_is_unavailable() {
        let fx = Fixture::new().await;
        let necklace = fx.product(7).await;
        let mut cart = Cart::default();
        cart.add(&necklace, 1, None, None).unwrap();
        fx.products
            .set_status(necklace.id, ProductStatus::Draft)
            .await
            .unwrap();

        let err = fx
            .service()
            .place_order(&fx.user, &cart, request(DeliveryMethod::Standard))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::ProductUnavailable(name) if name == necklace.name));
        assert_eq!(fx.product(7).await.stock, necklace.stock);
    }

    #[tokio::test]
    async fn test_order_uses_price_at_reservation() {
        let fx = Fixture::new().await;
        let necklace = fx.product(7).await;
        let mut cart = Cart::default();
        cart.add(&necklace, 2, None, None).unwrap();

        let update = ProductUpdate {
            price: Some(Decimal::new(1_950, 2)),
            ..ProductUpdate::default()
        };
        fx.products.update(necklace.id, update).await.unwrap();

        let order = fx
            .service()
            .place_order(&fx.user, &cart, request(DeliveryMethod::Pickup))
            .await
            .unwrap();
        assert_eq!(order.subtotal, Decimal::new(3_900, 2));
    }

    #[tokio::test]
    async fn test_withdrawn_variant_releases_reservation() {
        let fx = Fixture::new().await;
        let jacket = fx.product(2).await;
        let mut cart = Cart::default();
        cart.add(&jacket, 1, Some("XL"), None).unwrap();
        cart.add(&fx.product(7).await, 1, None, None).unwrap();

        let update = ProductUpdate {
            sizes: Some(vec!["S".to_string(), "M".to_string()]),
            ..ProductUpdate::default()
        };
        fx.products.update(jacket.id, update).await.unwrap();

        let err = fx
            .service()
            .place_order(&fx.user, &cart, request(DeliveryMethod::Standard))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::ProductUnavailable(_)));
        assert_eq!(fx.product(2).await.stock, jacket.stock);
        assert_eq!(fx.product(7).await.stock, 55);
        assert!(fx.orders.list_all(None).await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_never_oversell() {
        let fx = Arc::new(Fixture::new().await);
        let kimono = fx.product(4).await;
        assert_eq!(kimono.stock, 3);

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let fx = Arc::clone(&fx);
            let mut cart = Cart::default();
            cart.add(&kimono, 1, Some("One Size"), None).unwrap();
            tasks.spawn(async move {
                fx.service()
                    .place_order(&fx.user, &cart, request(DeliveryMethod::Pickup))
                    .await
                    .map(|order| order.number)
            });
        }

        let mut placed = Vec::new();
        let mut rejected = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(number) => placed.push(number),
                Err(CheckoutError::Repository(RepositoryError::InsufficientStock { .. })) => {
                    rejected += 1;
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(placed.len(), 3);
        assert_eq!(rejected, 5);
        assert_eq!(fx.product(4).await.stock, 0);
        assert_eq!(fx.orders.list_all(None).await.len(), 3);
        placed.sort();
        placed.dedup();
        assert_eq!(placed.len(), 3);
    }
}
