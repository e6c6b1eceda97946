//! # Receipt
//!
//! Receipt documents for a cart preview or a committed checkout.
//!
//! ## Rendered Layout
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Receipt                              │
//! │ Date: 2025-03-14 10:32:05            │
//! │ Items:                               │
//! │ Paracetamol x 5: Tsh.2500.00         │
//! │ Ibuprofen x 1: Tsh.800.00            │
//! │ Total: Tsh.3300.00                   │
//! │ Payment Method: cash                 │
//! │ Medicine Dose:                       │
//! │ Welcome back                         │
//! └──────────────────────────────────────┘
//! ```
//!
//! Building a receipt never touches stored state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLine};
use crate::checkout::CheckoutPlan;
use crate::money::Money;
use crate::types::PaymentMethod;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptLine {
    pub medicine_id: i64,
    pub name: String,
    pub quantity: i64,
    #[ts(type = "number")]
    pub unit_price: Money,
    #[ts(type = "number")]
    pub line_total: Money,
}

impl From<&CartLine> for ReceiptLine {
    fn from(line: &CartLine) -> Self {
        ReceiptLine {
            medicine_id: line.medicine_id,
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total,
        }
    }
}

/// A receipt plus its printable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Receipt {
    /// Set once the sale is committed; previews have none.
    pub receipt_number: Option<String>,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
    #[ts(type = "number")]
    pub total: Money,
    pub payment_method: PaymentMethod,
    /// Printable lines, top to bottom.
    pub text: Vec<String>,
}

impl Receipt {
    /// Preview of the current cart. An empty cart yields a receipt with no
    /// lines and a zero total.
    pub fn preview(
        cart: &Cart,
        payment_method: PaymentMethod,
        timestamp: DateTime<Utc>,
        currency_prefix: &str,
    ) -> Self {
        Self::build(
            None,
            cart.lines().iter().map(ReceiptLine::from).collect(),
            payment_method,
            timestamp,
            currency_prefix,
        )
    }

    /// Receipt of a committed checkout.
    pub fn settled(
        plan: &CheckoutPlan,
        receipt_number: String,
        timestamp: DateTime<Utc>,
        currency_prefix: &str,
    ) -> Self {
        Self::build(
            Some(receipt_number),
            plan.lines.iter().map(ReceiptLine::from).collect(),
            plan.payment_method,
            timestamp,
            currency_prefix,
        )
    }

    fn build(
        receipt_number: Option<String>,
        lines: Vec<ReceiptLine>,
        payment_method: PaymentMethod,
        timestamp: DateTime<Utc>,
        currency_prefix: &str,
    ) -> Self {
        let total = lines.iter().map(|l| l.line_total).sum();
        let mut receipt = Receipt {
            receipt_number,
            timestamp,
            lines,
            total,
            payment_method,
            text: Vec::new(),
        };
        receipt.text = receipt.render(currency_prefix);
        receipt
    }

    /// Renders the printable lines.
    pub fn render(&self, currency_prefix: &str) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines.len() + 8);
        out.push("Receipt".to_string());
        if let Some(number) = &self.receipt_number {
            out.push(format!("Receipt No: {}", number));
        }
        out.push(format!("Date: {}", self.timestamp.format(DATE_FORMAT)));
        out.push("Items:".to_string());

        if self.lines.is_empty() {
            out.push("No items in cart.".to_string());
        }
        for line in &self.lines {
            out.push(format!(
                "{} x {}: {}",
                line.name,
                line.quantity,
                line.line_total.with_prefix(currency_prefix)
            ));
        }

        out.push(format!("Total: {}", self.total.with_prefix(currency_prefix)));
        out.push(format!("Payment Method: {}", self.payment_method));
        out.push("Medicine Dose:".to_string());
        out.push("Welcome back".to_string());
        out
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
