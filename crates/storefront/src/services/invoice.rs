//! Plain-text invoices rendered from `templates/invoice.txt`.

use askama::Template;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use afrovibz_core::Price;

use crate::models::Order;

/// Store name printed in the invoice header.
pub const STORE_NAME: &str = "AFROVIBZ";

const WIDTH: usize = 72;
const DESCRIPTION_WIDTH: usize = 38;

#[derive(Template)]
#[template(path = "invoice.txt")]
struct InvoiceTemplate {
    store_name: &'static str,
    store_url: String,
    rule: String,
    thin_rule: String,
    invoice_number: String,
    order_number: String,
    order_date: String,
    issued_on: String,
    status: String,
    bill_to: Vec<String>,
    email: String,
    delivery: &'static str,
    payment_method: &'static str,
    payment_status: String,
    header: String,
    rows: Vec<String>,
    totals: Vec<String>,
}

/// Invoice number for an order, e.g. `INV-AFV-000001`.
#[must_use]
pub fn invoice_number(order: &Order) -> String {
    format!("INV-{}", order.number)
}

/// Download filename for an order's invoice.
#[must_use]
pub fn filename(order: &Order) -> String {
    format!("invoice-{}.txt", order.number)
}

/// Render the invoice for `order`.
///
/// # Errors
///
/// Returns the template engine's error if rendering fails.
pub fn render(order: &Order, store_url: &str, issued_at: DateTime<Utc>) -> Result<String, askama::Error> {
    let money = |amount: Decimal| Price::new(amount, order.currency).display();

    let rows = order
        .lines
        .iter()
        .map(|line| {
            let description = match line.variant() {
                Some(variant) => format!("{} ({variant})", line.name),
                None => line.name.clone(),
            };
            format!(
                "{:<width$} {:>5} {:>12} {:>14}",
                truncate(&description, DESCRIPTION_WIDTH),
                line.quantity,
                money(line.unit_price),
                money(line.line_total),
                width = DESCRIPTION_WIDTH
            )
        })
        .collect();

    let totals = [
        ("Subtotal", order.subtotal),
        ("Shipping", order.shipping),
        ("Tax", order.tax),
        ("TOTAL", order.total),
    ]
    .into_iter()
    .map(|(label, amount)| total_row(label, &money(amount)))
    .collect();

    InvoiceTemplate {
        store_name: STORE_NAME,
        store_url: store_url.to_string(),
        rule: "=".repeat(WIDTH),
        thin_rule: "-".repeat(WIDTH),
        invoice_number: invoice_number(order),
        order_number: order.number.clone(),
        order_date: order.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        issued_on: issued_at.format("%Y-%m-%d").to_string(),
        status: order.status.to_string(),
        bill_to: order.shipping_address.lines(),
        email: order.email.to_string(),
        delivery: order.delivery.label(),
        payment_method: order.payment_method.label(),
        payment_status: order.payment_status.to_string(),
        header: format!(
            "{:<width$} {:>5} {:>12} {:>14}",
            "Item",
            "Qty",
            "Unit",
            "Amount",
            width = DESCRIPTION_WIDTH
        ),
        rows,
        totals,
    }
    .render()
}

fn total_row(label: &str, amount: &str) -> String {
    format!("{label:>width$} {amount:>14}", width = WIDTH - 15)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
