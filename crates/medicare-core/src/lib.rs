//! # medicare-core: Pure Business Logic for the Medicare Pharmacy POS
//!
//! This crate is the **heart** of the pharmacy POS. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Medicare POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser Front End                            │   │
//! │  │   Login ──► Inventory ──► Sales/Cart ──► Receipt ──► Reports   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST (JSON)                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    medicare-api (axum)                          │   │
//! │  │    /login, /medicines, /cart, /cart/checkout, /reports, ...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ medicare-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌────────┐ ┌───────┐ ┌────────┐ ┌──────────┐ ┌────────────┐   │   │
//! │  │  │ types  │ │ money │ │  cart  │ │ checkout │ │   report   │   │   │
//! │  │  │Medicine│ │ Money │ │  Cart  │ │   Plan   │ │ ReportTable│   │   │
//! │  │  │ Sale   │ │       │ │CartLine│ │ Receipt  │ │            │   │   │
//! │  │  └────────┘ └───────┘ └────────┘ └──────────┘ └────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 medicare-db (Database Layer)                    │   │
//! │  │         SQLite queries, migrations, checkout transaction        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Medicine, Employee, Sale, PaymentMethod)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Session cart accumulation
//! - [`checkout`] - Commit planning (aggregated stock deltas)
//! - [`receipt`] - Receipt document generation
//! - [`report`] - Report projections (sales, inventory, collection, dispensed)
//! - [`password`] - Credential hashing and verification
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use medicare_core::money::Money;
//!
//! // Paracetamol at 500.00 a unit, five units
//! let price = Money::from_major_minor(500, 0);
//! let line_total = price.multiply_quantity(5);
//!
//! assert_eq!(line_total, Money::from_major_minor(2500, 0));
//! assert_eq!(line_total.to_string(), "2500.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod password;
pub mod receipt;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use checkout::{CheckoutPhase, CheckoutPlan, StockDelta};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use receipt::{Receipt, ReceiptLine};
pub use report::{DateRange, RangePreset, ReportKind, ReportTable, SaleFact};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// Guards against typing 1000 instead of 10 at the counter.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Highest stock level a catalog row may hold.
pub const MAX_STOCK_QUANTITY: i64 = 1_000_000;

/// Highest unit price a catalog row may carry (10,000,000.00).
///
/// With `MAX_STOCK_QUANTITY` this keeps every stock value, line total and
/// report sum far inside the i64 cent range.
pub const MAX_PRICE: Money = Money::from_cents(1_000_000_000);

/// Highest total accepted for a directly recorded sale.
pub const MAX_SALE_TOTAL: Money = MAX_PRICE.multiply_quantity(MAX_LINE_QUANTITY);

/// Currency prefix used on receipts and reports when none is configured.
pub const DEFAULT_CURRENCY_PREFIX: &str = "Tsh.";
