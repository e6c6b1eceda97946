//! # Validation Module
//!
//! Input validation utilities for the Medicare POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser form                                                 │
//! │  └── Basic required-field checks                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: REST handler (Rust)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (quantity >= 0)                                  │
//! │  ├── UNIQUE (employees.username)                                       │
//! │  └── Foreign keys (sales.medicine_id)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use medicare_core::validation::{validate_line_quantity, validate_stock_quantity};
//!
//! assert!(validate_line_quantity(5).is_ok());
//! assert!(validate_stock_quantity(0).is_ok());
//! assert!(validate_stock_quantity(-1).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{EmployeeInput, MedicineInput, SaleInput};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY, MAX_PRICE, MAX_SALE_TOTAL, MAX_STOCK_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_USERNAME_LEN: usize = 50;
const MIN_PASSWORD_LEN: usize = 4;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most `max` characters
///
/// ## Example
/// ```rust
/// use medicare_core::validation::validate_required;
///
/// assert!(validate_required("name", "Paracetamol", 200).is_ok());
/// assert!(validate_required("name", "   ", 200).is_err());
/// ```
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a login username.
///
/// ## Rules
/// - Required, at most 50 characters
/// - No whitespace inside
pub fn validate_username(username: &str) -> ValidationResult<()> {
    validate_required("username", username, MAX_USERNAME_LEN)?;

    if username.trim().chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }

    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::InvalidFormat {
            field: "password".to_string(),
            reason: format!("must be at least {} characters", MIN_PASSWORD_LEN),
        });
    }

    Ok(())
}

/// Parses a `YYYY-MM-DD` business date.
///
/// ## Example
/// ```rust
/// use medicare_core::validation::parse_date;
///
/// assert!(parse_date("expiryDate", "2025-12-31").is_ok());
/// assert!(parse_date("expiryDate", "31/12/2025").is_err());
/// ```
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        }
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Sales screen: Add to cart                                              │
/// │                                                                         │
/// │  User enters quantity: 5                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_line_quantity(5) ← THIS FUNCTION                             │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       └── OK → stock check against the catalog                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_line_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level: `0 ..= MAX_STOCK_QUANTITY`.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_STOCK_QUANTITY {
        return Err(ValidationError::TooLarge {
            field: "quantity".to_string(),
            max: MAX_STOCK_QUANTITY.to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price: `0 ..= MAX_PRICE`. Zero is allowed (free samples).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    validate_amount(field, price, MAX_PRICE)
}

/// Validates a non-negative amount against a ceiling.
///
/// ## Example
/// ```rust
/// use medicare_core::money::Money;
/// use medicare_core::validation::validate_amount;
///
/// let max = Money::from_major_minor(100, 0);
/// assert!(validate_amount("price", Money::from_major_minor(100, 0), max).is_ok());
/// assert!(validate_amount("price", Money::from_major_minor(100, 1), max).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money, max: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if amount > max {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: max.to_string(),
        });
    }

    Ok(())
}

/// Validates cart size (number of lines) before appending another line.
pub fn validate_cart_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_CART_LINES {
        return Err(ValidationError::TooLarge {
            field: "cart lines".to_string(),
            max: MAX_CART_LINES.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates the inventory form before create or update.
pub fn validate_medicine_input(input: &MedicineInput) -> ValidationResult<()> {
    validate_required("name", &input.name, MAX_NAME_LEN)?;
    validate_required("manufacturer", &input.manufacturer, MAX_NAME_LEN)?;
    validate_price("price", input.price)?;
    validate_stock_quantity(input.quantity)?;
    Ok(())
}

pub fn validate_employee_input(input: &EmployeeInput) -> ValidationResult<()> {
    validate_required("name", &input.name, MAX_NAME_LEN)?;
    validate_username(&input.username)?;
    validate_password(&input.password)?;
    Ok(())
}

/// Validates a directly recorded sale.
pub fn validate_sale_input(input: &SaleInput) -> ValidationResult<()> {
    if input.quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if input.quantity > MAX_STOCK_QUANTITY {
        return Err(ValidationError::TooLarge {
            field: "quantity".to_string(),
            max: MAX_STOCK_QUANTITY.to_string(),
        });
    }
    validate_amount("totalPrice", input.total_price, MAX_SALE_TOTAL)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmployeeRole;

    fn medicine_input() -> MedicineInput {
        MedicineInput {
            name: "Amoxicillin".to_string(),
            manufacturer: "XYZ Labs".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            price: Money::from_major_minor(1200, 0),
            quantity: 50,
        }
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Paracetamol", 200).is_ok());
        assert!(matches!(
            validate_required("name", "", 200),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_required("name", &"A".repeat(201), 200),
            Err(ValidationError::TooLong { max: 200, .. })
        ));
    }

    #[test]
    fn test_validate_line_quantity() {
        assert!(validate_line_quantity(1).is_ok());
        assert!(validate_line_quantity(999).is_ok());

        assert!(validate_line_quantity(0).is_err());
        assert!(validate_line_quantity(-1).is_err());
        assert!(validate_line_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_stock_quantity() {
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(100).is_ok());
        assert!(validate_stock_quantity(-5).is_err());
        assert!(validate_stock_quantity(MAX_STOCK_QUANTITY).is_ok());
        assert!(matches!(
            validate_stock_quantity(MAX_STOCK_QUANTITY + 1),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_price_ceiling() {
        assert!(validate_price("price", MAX_PRICE).is_ok());
        assert!(matches!(
            validate_price("price", Money::from_major_minor(100_000_000_000_000, 0)),
            Err(ValidationError::TooLarge { .. })
        ));

        // The largest row the catalog accepts still values without overflow
        assert!(MAX_PRICE
            .checked_multiply_quantity(MAX_STOCK_QUANTITY)
            .is_some());
    }

    #[test]
    fn test_validate_sale_input_bounds() {
        let sale = SaleInput {
            medicine_id: 1,
            quantity: 5,
            total_price: Money::from_major_minor(2500, 0),
            date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        };
        assert!(validate_sale_input(&sale).is_ok());

        let huge_total = SaleInput {
            total_price: Money::from_cents(i64::MAX),
            ..sale.clone()
        };
        assert!(validate_sale_input(&huge_total).is_err());

        let huge_quantity = SaleInput {
            quantity: MAX_STOCK_QUANTITY + 1,
            ..sale
        };
        assert!(validate_sale_input(&huge_quantity).is_err());
    }

    #[test]
    fn test_validate_medicine_input() {
        assert!(validate_medicine_input(&medicine_input()).is_ok());

        let mut blank = medicine_input();
        blank.manufacturer = "  ".to_string();
        assert!(validate_medicine_input(&blank).is_err());

        let mut negative_price = medicine_input();
        negative_price.price = Money::from_cents(-1);
        assert!(validate_medicine_input(&negative_price).is_err());

        let mut negative_qty = medicine_input();
        negative_qty.quantity = -1;
        assert!(validate_medicine_input(&negative_qty).is_err());
    }

    #[test]
    fn test_validate_employee_input() {
        let input = EmployeeInput {
            name: "Jane Doe".to_string(),
            role: EmployeeRole::Pharmacist,
            username: "jane".to_string(),
            password: "secret".to_string(),
        };
        assert!(validate_employee_input(&input).is_ok());

        let spaced = EmployeeInput {
            username: "jane doe".to_string(),
            ..input.clone()
        };
        assert!(validate_employee_input(&spaced).is_err());

        let short = EmployeeInput {
            password: "abc".to_string(),
            ..input
        };
        assert!(validate_employee_input(&short).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("date", "2025-06-30").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
        );
        assert!(parse_date("date", "2025-13-01").is_err());
        assert!(parse_date("date", "").is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_LINES - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_LINES).is_err());
    }
}
