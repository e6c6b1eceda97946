//! # Error Types
//!
//! Domain-specific error types for medicare-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  medicare-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  medicare-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  medicare-api errors (in app)                                          │
//! │  └── ApiError         - What the browser sees (status + JSON body)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Browser      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations in the cart, checkout and
/// reporting flows. The API layer maps each variant to an HTTP status.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Medicine cannot be found.
    ///
    /// ## When This Occurs
    /// - Adding a medicine id to the cart that is not in the catalog
    /// - The medicine was deleted between cart add and checkout
    #[error("Medicine not found: {0}")]
    MedicineNotFound(i64),

    /// Insufficient stock to add a line to the cart.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (Paracetamol, qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3 (minus what the cart already holds)
    ///      │
    ///      ▼
    /// InsufficientStock { medicine: "Paracetamol", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Paracetamol in stock"
    /// ```
    #[error("Insufficient stock for {medicine}: available {available}, requested {requested}")]
    InsufficientStock {
        medicine: String,
        available: i64,
        requested: i64,
    },

    /// Cart line index is out of range.
    #[error("Cart line not found: {index}")]
    CartLineNotFound { index: usize },

    /// An amount left the representable range.
    ///
    /// ## When This Occurs
    /// A line total or cart total built from rows written before the price
    /// and stock ceilings were enforced.
    #[error("Amount too large: {context}")]
    AmountOverflow { context: String },

    /// Checkout was attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The checkout transaction was rolled back.
    ///
    /// ## When This Occurs
    /// The authoritative stock check inside the commit transaction failed for
    /// one line. Nothing was written; the cart is kept as it was.
    ///
    /// `available` is `None` when the medicine no longer exists.
    #[error(
        "Checkout aborted at line {line_index} (medicine {medicine_id}): available {}, requested {requested}",
        .available.map(|a| a.to_string()).unwrap_or_else(|| "none".to_string())
    )]
    CheckoutAborted {
        line_index: usize,
        medicine_id: i64,
        available: Option<i64>,
        requested: i64,
    },

    /// Deleting this employee would leave no administrator.
    #[error("Cannot delete the last administrator")]
    LastAdministrator,

    /// The password hasher rejected its input.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value is above its ceiling.
    #[error("{field} must not exceed {max}")]
    TooLarge { field: String, max: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid date, non-numeric price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
