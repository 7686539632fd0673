//! # Receipt
//!
//! Display-ready snapshot of a sale for printing.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale ──► Receipt::from_sale(&sale, &store) ──► Receipt                 │
//! │                                                   │                     │
//! │                       ┌───────────────────────────┴──────────┐          │
//! │                       ▼                                      ▼          │
//! │               render_text(width)                      serde JSON        │
//! │               ticket printers                         HTML formatter    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are rounded to cents here and only here. The sale keeps full
//! precision.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, DISPLAY_DECIMALS};
use crate::types::{PaymentMethod, PaymentStatus, ProductType, Sale, TaxRate};

/// Narrowest slip `render_text` will produce.
pub const MIN_RECEIPT_WIDTH: usize = 24;

/// Widest slip `render_text` will produce (80-column printers).
pub const MAX_RECEIPT_WIDTH: usize = 80;

/// Store details printed in the receipt header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoreProfile {
    pub name: String,
    pub address_lines: Vec<String>,
    pub phone: Option<String>,
    pub currency_symbol: String,
}

impl Default for StoreProfile {
    fn default() -> Self {
        StoreProfile {
            name: "Optica".to_string(),
            address_lines: Vec::new(),
            phone: None,
            currency_symbol: "$".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptLine {
    pub description: String,
    pub product_type: ProductType,
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptPayment {
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub method: PaymentMethod,
    pub method_label: String,
    pub amount: Money,
    pub notes: Option<String>,
}

/// Flattened sale ready for a formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Receipt {
    pub store: StoreProfile,
    pub sale_number: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub client_label: String,
    pub client_email: Option<String>,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Money,
    #[ts(type = "string")]
    pub discount_percent: Decimal,
    pub discount: Money,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub total: Money,
    pub payments: Vec<ReceiptPayment>,
    pub paid_amount: Money,
    pub remaining_amount: Money,
    pub status: PaymentStatus,
    pub notes: Option<String>,
}

impl Receipt {
    pub fn from_sale(sale: &Sale, store: &StoreProfile) -> Self {
        let lines = sale
            .items()
            .iter()
            .map(|item| ReceiptLine {
                description: item.product_name().to_string(),
                product_type: item.product_type(),
                quantity: item.quantity(),
                unit_price: item.unit_price().rounded(),
                total: item.total_price().rounded(),
            })
            .collect();

        let payments = sale
            .payments()
            .iter()
            .map(|p| ReceiptPayment {
                date: p.date,
                method: p.method,
                method_label: p.method.label().to_string(),
                amount: p.amount.rounded(),
                notes: p.notes.clone(),
            })
            .collect();

        Receipt {
            store: store.clone(),
            sale_number: sale.sale_number.clone(),
            created_at: sale.created_at,
            client_label: sale.client_label().to_string(),
            client_email: sale.client_email.clone(),
            lines,
            subtotal: sale.subtotal().rounded(),
            discount_percent: sale.discount_percent(),
            discount: sale.discount().rounded(),
            tax_rate: sale.tax_rate(),
            tax: sale.tax().rounded(),
            total: sale.total().rounded(),
            payments,
            paid_amount: sale.paid_amount().rounded(),
            remaining_amount: sale.remaining_amount().rounded(),
            status: sale.status(),
            notes: sale.notes.clone(),
        }
    }

    /// Formats an amount with the store's currency symbol.
    pub fn format_money(&self, amount: Money) -> String {
        let rounded = amount.rounded().amount();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!(
            "{}{}{:.prec$}",
            sign,
            self.store.currency_symbol,
            rounded.abs(),
            prec = DISPLAY_DECIMALS as usize
        )
    }

    /// Renders a fixed-width plain-text slip. Every line fits in `width`
    /// characters, clamped to [`MIN_RECEIPT_WIDTH`]..=[`MAX_RECEIPT_WIDTH`].
    pub fn render_text(&self, width: usize) -> String {
        let width = width.clamp(MIN_RECEIPT_WIDTH, MAX_RECEIPT_WIDTH);
        let rule = "-".repeat(width);
        let mut out: Vec<String> = Vec::new();

        out.push(center(&self.store.name, width));
        for line in &self.store.address_lines {
            out.push(center(line, width));
        }
        if let Some(phone) = &self.store.phone {
            out.push(center(&format!("Tel. {}", phone), width));
        }
        out.push(rule.clone());

        out.push(fit(&format!("Sale: {}", self.sale_number), width));
        out.push(fit(
            &format!("Date: {}", self.created_at.format("%Y-%m-%d %H:%M")),
            width,
        ));
        out.push(fit(&format!("Client: {}", self.client_label), width));
        out.push(rule.clone());

        for line in &self.lines {
            out.push(fit(&format!("{} x {}", line.quantity, line.description), width));
            out.push(row(
                &format!("   @ {}", self.format_money(line.unit_price)),
                &self.format_money(line.total),
                width,
            ));
        }
        out.push(rule.clone());

        out.push(row("Subtotal", &self.format_money(self.subtotal), width));
        if !self.discount.is_zero() {
            out.push(row(
                &format!("Discount ({}%)", self.discount_percent.normalize()),
                &format!("-{}", self.format_money(self.discount)),
                width,
            ));
        }
        out.push(row(
            &format!("Tax ({})", self.tax_rate),
            &self.format_money(self.tax),
            width,
        ));
        out.push(row("TOTAL", &self.format_money(self.total), width));

        if !self.payments.is_empty() {
            out.push(rule.clone());
            out.push("Payments".to_string());
            for p in &self.payments {
                out.push(row(
                    &format!("{} {}", p.date.format("%Y-%m-%d"), p.method_label),
                    &self.format_money(p.amount),
                    width,
                ));
            }
        }
        out.push(row("Paid", &self.format_money(self.paid_amount), width));
        out.push(row(
            "Balance due",
            &self.format_money(self.remaining_amount),
            width,
        ));

        if let Some(notes) = &self.notes {
            out.push(rule);
            for chunk in wrap(&format!("Notes: {}", notes), width) {
                out.push(chunk);
            }
        }

        let mut text = out.join("\n");
        text.push('\n');
        text
    }
}

// =============================================================================
// Layout Helpers
// =============================================================================

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn fit(s: &str, width: usize) -> String {
    truncate(s, width)
}

fn center(s: &str, width: usize) -> String {
    let s = truncate(s, width);
    let pad = (width - s.chars().count()) / 2;
    format!("{}{}", " ".repeat(pad), s)
}

/// Left label, right-aligned value. The label gives way when space runs out.
fn row(left: &str, right: &str, width: usize) -> String {
    let right_len = right.chars().count();
    let room = width.saturating_sub(right_len + 1);
    let left = truncate(left, room);
    let gap = width.saturating_sub(left.chars().count() + right_len);
    truncate(&format!("{}{}{}", left, " ".repeat(gap), right), width)
}

fn wrap(s: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
