//! # Checkout Planning
//!
//! Turns a cart into the set of stock decrements a commit must apply.
//!
//! ## Checkout Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌───────┐  add   ┌──────────┐ checkout ┌────────────┐  ok  ┌────────┐ │
//! │  │ Empty │──────► │ Building │────────► │ Committing │────► │Settled │ │
//! │  └───────┘        └──────────┘          └────────────┘      └────────┘ │
//! │                     │  ▲  │                   │                         │
//! │                     │  └──┘ add/remove        │ abort: rollback,        │
//! │                     │                         │ cart kept               │
//! │                     │ DELETE /cart, logout    ▼                         │
//! │                     └──────────────► Abandoned   Building               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The plan is pure. `medicare-db` applies it inside one transaction with a
//! conditional decrement per [`StockDelta`], so the authoritative stock check
//! happens where the write happens.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLine};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentMethod;

/// Lifecycle state of a session's cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CheckoutPhase {
    Empty,
    Building,
    Committing,
    Settled,
    Abandoned,
}

/// Units to take from one medicine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDelta {
    pub medicine_id: i64,

    /// Sum over every cart line for this medicine.
    pub quantity: i64,

    /// Index of the first cart line naming this medicine.
    pub first_line_index: usize,
}

/// Everything a commit needs, computed from the cart.
#[derive(Debug, Clone)]
pub struct CheckoutPlan {
    pub lines: Vec<CartLine>,
    pub deltas: Vec<StockDelta>,
    pub total: Money,
    pub payment_method: PaymentMethod,
}

impl CheckoutPlan {
    /// Builds the plan, aggregating deltas in order of first appearance.
    ///
    /// ## Errors
    /// `EmptyCart` when there is nothing to commit.
    ///
    /// ## Example
    /// ```text
    /// lines:  [0] Paracetamol x2   [1] Ibuprofen x1   [2] Paracetamol x3
    /// deltas: Paracetamol 5 (first line 0), Ibuprofen 1 (first line 1)
    /// ```
    pub fn from_cart(cart: &Cart, payment_method: PaymentMethod) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let mut deltas: Vec<StockDelta> = Vec::new();
        for (index, line) in cart.lines().iter().enumerate() {
            match deltas.iter_mut().find(|d| d.medicine_id == line.medicine_id) {
                Some(delta) => delta.quantity += line.quantity,
                None => deltas.push(StockDelta {
                    medicine_id: line.medicine_id,
                    quantity: line.quantity,
                    first_line_index: index,
                }),
            }
        }

        Ok(CheckoutPlan {
            lines: cart.lines().to_vec(),
            deltas,
            total: cart.total(),
            payment_method,
        })
    }

    /// The error reported when `delta` cannot be applied.
    ///
    /// `available` is `None` when the medicine row no longer exists.
    pub fn abort(delta: &StockDelta, available: Option<i64>) -> CoreError {
        CoreError::CheckoutAborted {
            line_index: delta.first_line_index,
            medicine_id: delta.medicine_id,
            available,
            requested: delta.quantity,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Medicine;
    use chrono::{NaiveDate, Utc};

    fn medicine(id: i64, name: &str) -> Medicine {
        let now = Utc::now();
        Medicine {
            id,
            name: name.to_string(),
            manufacturer: "Health Corp".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
            price: Money::from_major_minor(100, 0),
            quantity: 50,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let cart = Cart::new();
        assert!(matches!(
            CheckoutPlan::from_cart(&cart, PaymentMethod::Cash),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_deltas_aggregate_per_medicine() {
        let mut cart = Cart::new();
        let paracetamol = medicine(1, "Paracetamol");
        let ibuprofen = medicine(3, "Ibuprofen");
        cart.add(&paracetamol, 2).unwrap();
        cart.add(&ibuprofen, 1).unwrap();
        cart.add(&paracetamol, 3).unwrap();

        let plan = CheckoutPlan::from_cart(&cart, PaymentMethod::Mobile).unwrap();

        assert_eq!(plan.lines.len(), 3);
        assert_eq!(
            plan.deltas,
            vec![
                StockDelta {
                    medicine_id: 1,
                    quantity: 5,
                    first_line_index: 0
                },
                StockDelta {
                    medicine_id: 3,
                    quantity: 1,
                    first_line_index: 1
                },
            ]
        );
        assert_eq!(plan.total, Money::from_major_minor(600, 0));
        assert_eq!(plan.payment_method, PaymentMethod::Mobile);
    }

    #[test]
    fn test_abort_names_first_line() {
        let delta = StockDelta {
            medicine_id: 3,
            quantity: 4,
            first_line_index: 2,
        };
        match CheckoutPlan::abort(&delta, Some(1)) {
            CoreError::CheckoutAborted {
                line_index,
                medicine_id,
                available,
                requested,
            } => {
                assert_eq!(line_index, 2);
                assert_eq!(medicine_id, 3);
                assert_eq!(available, Some(1));
                assert_eq!(requested, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
