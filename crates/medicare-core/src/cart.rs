//! # Cart
//!
//! The in-progress sale of one session: an ordered list of lines.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Front End Action         REST Route              Cart Change           │
//! │  ────────────────         ──────────              ───────────           │
//! │                                                                         │
//! │  Add to Cart ───────────► POST /cart/items ─────► lines.push(line)     │
//! │                                                                         │
//! │  Remove ────────────────► DELETE /cart/items/i ─► lines.remove(i)      │
//! │                                                                         │
//! │  Cancel ────────────────► DELETE /cart ─────────► lines.clear()        │
//! │                                                                         │
//! │  Print Receipt ─────────► POST /cart/checkout ──► cleared on success   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are appended, never merged: adding the same medicine twice yields
//!   two lines, as the counter screen shows them
//! - Every line has `1 ..= MAX_LINE_QUANTITY` units
//! - A failed add leaves the cart exactly as it was
//! - The stock check here is advisory; the commit transaction re-checks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::checkout::CheckoutPhase;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Medicine;
use crate::validation::{validate_cart_size, validate_line_quantity};

/// One line of the cart.
///
/// Name and unit price are captured when the line is added, so the cart and
/// its receipt stay consistent if the catalog row is edited afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub medicine_id: i64,
    pub name: String,
    pub quantity: i64,
    #[ts(type = "number")]
    pub unit_price: Money,
    #[ts(type = "number")]
    pub line_total: Money,
}

impl CartLine {
    /// Freezes name and price of `medicine` into a line.
    ///
    /// ## Errors
    /// `AmountOverflow` if `price * quantity` does not fit.
    pub fn from_medicine(medicine: &Medicine, quantity: i64) -> CoreResult<Self> {
        let line_total = medicine
            .price
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| CoreError::AmountOverflow {
                context: format!("{} x {}", medicine.name, quantity),
            })?;

        Ok(CartLine {
            medicine_id: medicine.id,
            name: medicine.name.clone(),
            quantity,
            unit_price: medicine.price,
            line_total,
        })
    }
}

/// The cart of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,

    /// When the cart was created or last cleared.
    created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Appends a line for `quantity` units of `medicine`.
    ///
    /// ## Errors
    /// - `Validation` if `quantity` is not in `1..=999` or the cart already
    ///   holds 100 lines
    /// - `InsufficientStock` if `quantity` plus what the cart already holds
    ///   for this medicine exceeds the catalog quantity
    /// - `AmountOverflow` if the line or the cart total does not fit
    ///
    /// ## Example
    /// ```rust
    /// # use chrono::{NaiveDate, Utc};
    /// # use medicare_core::{Cart, Medicine, Money};
    /// # let now = Utc::now();
    /// # let paracetamol = Medicine {
    /// #     id: 1, name: "Paracetamol".into(), manufacturer: "ABC Pharma".into(),
    /// #     expiry_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
    /// #     price: Money::from_major_minor(500, 0), quantity: 100, version: 1,
    /// #     created_at: now, updated_at: now,
    /// # };
    /// let mut cart = Cart::new();
    /// let line = cart.add(&paracetamol, 5).unwrap();
    /// assert_eq!(line.line_total, Money::from_major_minor(2500, 0));
    /// ```
    pub fn add(&mut self, medicine: &Medicine, quantity: i64) -> CoreResult<&CartLine> {
        validate_line_quantity(quantity)?;
        validate_cart_size(self.lines.len())?;

        let already_held = self.quantity_of(medicine.id);
        let available = (medicine.quantity - already_held).max(0);
        if quantity > available {
            return Err(CoreError::InsufficientStock {
                medicine: medicine.name.clone(),
                available,
                requested: quantity,
            });
        }

        let line = CartLine::from_medicine(medicine, quantity)?;
        if self.total().checked_add(line.line_total).is_none() {
            return Err(CoreError::AmountOverflow {
                context: "cart total".to_string(),
            });
        }

        self.lines.push(line);
        let index = self.lines.len() - 1;
        Ok(&self.lines[index])
    }

    /// Removes the line at `index`, shifting later lines down.
    pub fn remove(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CoreError::CartLineNotFound { index });
        }
        Ok(self.lines.remove(index))
    }

    /// Discards every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Units of `medicine_id` across all lines.
    pub fn quantity_of(&self, medicine_id: i64) -> i64 {
        self.lines
            .iter()
            .filter(|l| l.medicine_id == medicine_id)
            .map(|l| l.quantity)
            .sum()
    }

    /// Units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.line_total).sum()
    }

    /// Where the cart is in its lifecycle, ignoring an in-flight commit.
    pub fn phase(&self) -> CheckoutPhase {
        if self.is_empty() {
            CheckoutPhase::Empty
        } else {
            CheckoutPhase::Building
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

/// Cart contents and totals for API responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub lines: Vec<CartLine>,
    #[ts(type = "number")]
    pub total: Money,
    /// Number of lines.
    pub item_count: usize,
    pub total_quantity: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            lines: cart.lines.clone(),
            total: cart.total(),
            item_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
