//! Invoice preview.

use std::io::Write;

use chrono::Utc;
use rust_decimal::Decimal;

use afrovibz_core::{AddressId, Email, PaymentMethod, UserId};
use afrovibz_storefront::config::StorefrontConfig;
use afrovibz_storefront::db::orders::OrderRepository;
use afrovibz_storefront::db::seed;
use afrovibz_storefront::models::{Address, DeliveryMethod, NewOrder, Order, OrderLine};
use afrovibz_storefront::services::checkout::Pricing;
use afrovibz_storefront::services::invoice;

/// Sample purchase: `(product id, quantity)` from the demo catalog.
const SAMPLE_LINES: &[(u32, u32)] = &[(2, 1), (7, 2), (9, 1)];

/// Print a rendered invoice for a sample order on stdout.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub async fn preview(store_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let order = sample_order().await?;
    let text = invoice::render(&order, store_url, Utc::now())?;
    std::io::stdout().lock().write_all(text.as_bytes())?;
    Ok(())
}

async fn sample_order() -> Result<Order, Box<dyn std::error::Error>> {
    let products = seed::demo_products();
    let lines = SAMPLE_LINES
        .iter()
        .map(|&(id, quantity)| {
            let product = products
                .iter()
                .find(|p| p.id.as_u32() == id)
                .ok_or_else(|| format!("demo product {id} missing"))?;
            Ok(OrderLine {
                product_id: product.id,
                name: product.name.clone(),
                size: product.sizes.first().cloned(),
                color: product.colors.first().cloned(),
                unit_price: product.price,
                quantity,
                line_total: product.price * Decimal::from(quantity),
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    let pricing = Pricing::from(&StorefrontConfig::default());
    let subtotal = lines.iter().map(|l| l.line_total).sum();
    let quote = pricing.quote(subtotal, DeliveryMethod::Express);

    let orders = OrderRepository::new();
    Ok(orders
        .create(NewOrder {
            user_id: UserId::new(1),
            email: Email::parse("customer@afrovibz.com")?,
            lines,
            shipping_address: Address {
                id: AddressId::new(1),
                full_name: "Ama Mensah".to_string(),
                phone: "+233 20 123 4567".to_string(),
                line1: "14 Oxford Street".to_string(),
                line2: Some("Osu".to_string()),
                city: "Accra".to_string(),
                region: "Greater Accra".to_string(),
                postal_code: None,
                country: "Ghana".to_string(),
                is_default: true,
            },
            delivery: DeliveryMethod::Express,
            payment_method: PaymentMethod::MobileMoney,
            currency: quote.currency,
            subtotal: quote.subtotal,
            shipping: quote.shipping,
            tax: quote.tax,
            total: quote.total,
        })
        .await)
}
