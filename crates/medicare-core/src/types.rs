//! # Domain Types
//!
//! Core domain types used throughout the Medicare POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Medicine     │   │      Sale       │   │    Employee     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │◄──│  medicine_id    │   │  id (i64)       │       │
//! │  │  name           │   │  quantity       │──►│  username (uniq)│       │
//! │  │  manufacturer   │   │  total_price    │   │  role           │       │
//! │  │  expiry_date    │   │  receipt_number │   │  password_hash  │       │
//! │  │  price, quantity│   │  payment_method │   │  (never sent)   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │  EmployeeRole   │   │ PaymentMethod   │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  Admin          │   │  Cash           │                              │
//! │  │  Pharmacist     │   │  Credit         │                              │
//! │  │  Cashier, Staff │   │  Mobile         │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! Every type serializes with camelCase field names, matching what the browser
//! front end already sends (`expiryDate`, `medicineId`, `totalPrice`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Medicine
// =============================================================================

/// A medicine in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Medicine {
    /// Autoincrement identifier.
    pub id: i64,

    /// Display name shown at the counter and on receipts.
    pub name: String,

    pub manufacturer: String,

    /// Expiry date (`YYYY-MM-DD` on the wire).
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,

    /// Unit price.
    #[ts(type = "number")]
    pub price: Money,

    /// Units in stock. Never negative.
    pub quantity: i64,

    /// Incremented on every mutation.
    pub version: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Medicine {
    /// Checks if `quantity` more units can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }

    /// Value of the stock on hand (price × quantity).
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// True when the medicine expires on or before `date`.
    #[inline]
    pub fn expires_by(&self, date: NaiveDate) -> bool {
        self.expiry_date <= date
    }
}

/// Mutable medicine fields, as submitted by the inventory form.
///
/// Used for both create and full-replace update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MedicineInput {
    pub name: String,
    pub manufacturer: String,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
    #[ts(type = "number")]
    pub price: Money,
    pub quantity: i64,
}

// =============================================================================
// Employee
// =============================================================================

/// Role of an employee.
///
/// Only `Admin` may manage the employee roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum EmployeeRole {
    Admin,
    Pharmacist,
    Cashier,
    Staff,
}

impl EmployeeRole {
    pub const ALL: [EmployeeRole; 4] = [
        EmployeeRole::Admin,
        EmployeeRole::Pharmacist,
        EmployeeRole::Cashier,
        EmployeeRole::Staff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeRole::Admin => "admin",
            EmployeeRole::Pharmacist => "pharmacist",
            EmployeeRole::Cashier => "cashier",
            EmployeeRole::Staff => "staff",
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, EmployeeRole::Admin)
    }
}

impl fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmployeeRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmployeeRole::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: EmployeeRole::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            })
    }
}

/// An employee as exposed to clients.
///
/// The password hash lives only in the database layer's row type and is
/// never part of this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub role: EmployeeRole,
    pub username: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields for creating an employee.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmployeeInput {
    pub name: String,
    pub role: EmployeeRole,
    pub username: String,
    pub password: String,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a checkout was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Credit,
    Mobile,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Cash, PaymentMethod::Credit, PaymentMethod::Mobile];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Mobile => "mobile",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "paymentMethod".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One committed line item. Immutable once written.
///
/// Lines written by the same checkout share a `receipt_number`. Rows recorded
/// directly through `POST /sales` carry no receipt, employee or payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    pub medicine_id: i64,

    /// Name of the medicine at read time, joined in for listings.
    pub medicine_name: Option<String>,

    pub quantity: i64,

    #[ts(type = "number")]
    pub total_price: Money,

    /// Business date of the sale.
    #[ts(as = "String")]
    pub date: NaiveDate,

    pub employee_id: Option<i64>,
    pub receipt_number: Option<String>,
    pub payment_method: Option<PaymentMethod>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields of a directly recorded sale (`POST /sales`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleInput {
    pub medicine_id: i64,
    pub quantity: i64,
    #[ts(type = "number")]
    pub total_price: Money,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

// =============================================================================
// Unit Tests
// =============================================================================
