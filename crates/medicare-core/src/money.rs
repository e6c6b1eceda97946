//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    Tsh. 5.99 is stored as 599 and summed as integers                   │
//! │    Only the wire boundary sees a decimal number                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! The browser front end sends and receives prices as plain decimal numbers
//! in major units (`500`, `5.99`). `Money` serializes to and deserializes from
//! that form, rounding to the nearest minor unit on the way in. The database
//! stores the integer (`price_cents`, `total_price_cents`).
//!
//! ## Usage
//! ```rust
//! use medicare_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//!
//! let doubled = price * 2;                    // 21.98
//! let total = price + Money::from_cents(500); // 15.99
//!
//! assert_eq!(doubled.cents(), 2198);
//! assert_eq!(total.to_string(), "15.99");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Medicine.price ──► CartLine.unit_price ──► CartLine.line_total         │
/// │                                                  │                      │
/// │                                                  ▼                      │
/// │                       Cart total ──► Receipt ──► Sale.total_price       │
/// │                                                  │                      │
/// │                                                  ▼                      │
/// │                              Reports ("Tsh. 2500.00")                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use medicare_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use medicare_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99);
    /// assert_eq!(price.cents(), 1099);
    ///
    /// let negative = Money::from_major_minor(-5, 50);
    /// assert_eq!(negative.cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a decimal major-unit amount, rounding to the nearest minor unit.
    ///
    /// Returns `None` for NaN, infinities and values outside the i64 range.
    ///
    /// ## Example
    /// ```rust
    /// use medicare_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_f64(5.99), Some(Money::from_cents(599)));
    /// assert_eq!(Money::from_major_f64(500.0), Some(Money::from_cents(50000)));
    /// assert_eq!(Money::from_major_f64(f64::NAN), None);
    /// ```
    pub fn from_major_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents > i64::MAX as f64 || cents < i64::MIN as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Returns the value as a decimal major-unit number (for the wire only).
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// ## Example
    /// ```rust
    /// use medicare_core::money::Money;
    ///
    /// let unit_price = Money::from_major_minor(500, 0);
    /// let line_total = unit_price.multiply_quantity(5);
    /// assert_eq!(line_total, Money::from_major_minor(2500, 0));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies money by a quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use medicare_core::money::Money;
    ///
    /// let price = Money::from_major_minor(500, 0);
    /// assert_eq!(price.checked_multiply_quantity(5), Some(Money::from_major_minor(2500, 0)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Formats the amount directly after a currency prefix, receipt style.
    ///
    /// ## Example
    /// ```rust
    /// use medicare_core::money::Money;
    ///
    /// let total = Money::from_major_minor(2500, 0);
    /// assert_eq!(total.with_prefix("Tsh."), "Tsh.2500.00");
    /// ```
    pub fn with_prefix(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self)
    }

    /// Formats the amount as a report cell: prefix, a space, the amount.
    ///
    /// ## Example
    /// ```rust
    /// use medicare_core::money::Money;
    ///
    /// let total = Money::from_major_minor(2500, 0);
    /// assert_eq!(total.report_cell("Tsh."), "Tsh. 2500.00");
    /// ```
    pub fn report_cell(&self, prefix: &str) -> String {
        format!("{} {}", prefix, self)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain `major.minor` with two digits, no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Operators saturate at the i64 bounds. Validated inputs never get near
// them; paths that must reject overflow use the `checked_*` methods.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Serde (decimal major units on the wire)
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::from_major_f64(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {}", value)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
