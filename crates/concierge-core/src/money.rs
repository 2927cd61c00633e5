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
//! │  An invoice that sums dozens of fee columns in floats will drift.       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every price, fee, and total is an i64 number of cents.               │
//! │    Percentage rates are basis points applied with integer math.         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use concierge_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(2500); // $25.00
//!
//! // Arithmetic operations
//! let doubled = price * 2;                      // $50.00
//! let total = price + Money::from_cents(500);   // $30.00
//!
//! // NEVER do this:
//! // let bad = Money::from_float(25.00); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::{FeeRate, ItemCategory};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// RequestItem.found_price ──► InvoiceLineItem.unit_price ──► line total
///                                       │
///                  tax + pickup + shipping + custom fees
///                                       │
///                                       ▼
///            Invoice subtotal ──► CC surcharge ──► Invoice.total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use concierge_core::money::Money;
    ///
    /// let price = Money::from_cents(2599); // Represents $25.99
    /// assert_eq!(price.cents(), 2599);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -$5.50, not -$4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a percentage rate with half-up rounding.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5), matching the
    /// two-decimal rounding a cashier would do by hand.
    ///
    /// ## Example
    /// ```rust
    /// use concierge_core::money::Money;
    /// use concierge_core::types::FeeRate;
    ///
    /// let subtotal = Money::from_cents(5825); // $58.25
    /// let rate = FeeRate::from_bps(300);      // 3.0% card surcharge
    ///
    /// // $58.25 × 3% = $1.7475 → rounds to $1.75
    /// assert_eq!(subtotal.apply_rate(rate).cents(), 175);
    /// ```
    pub fn apply_rate(&self, rate: FeeRate) -> Money {
        // Use i128 to prevent overflow on large amounts
        // rate.bps() is basis points: 650 = 6.5%
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use concierge_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(2500); // $25.00
    /// let line_subtotal = unit_price.multiply_quantity(2);
    /// assert_eq!(line_subtotal.cents(), 5000); // $50.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Tax and Fee Helpers
// =============================================================================

/// Computes the tax to store on a line item.
///
/// `auto_tax(qty, price, rate) = round((qty × price) × rate)`
///
/// ## Write-Time Semantics
/// This is called when a line item is created or edited, and the result is
/// STORED on the line item. Reads never recompute it, so invoices issued
/// under an older rate constant keep their historical amounts.
///
/// ## Example
/// ```rust
/// use concierge_core::money::{auto_tax, Money};
/// use concierge_core::types::FeeRate;
///
/// // 2 × $79.99 × 6.5% = $10.3987 → $10.40
/// let tax = auto_tax(2, Money::from_cents(7999), FeeRate::from_bps(650));
/// assert_eq!(tax.cents(), 1040);
/// ```
pub fn auto_tax(quantity: i64, unit_price: Money, rate: FeeRate) -> Money {
    unit_price.multiply_quantity(quantity).apply_rate(rate)
}

/// Returns the default in-park pickup fee for an item.
///
/// Used only when the operator has NOT set an explicit pickup fee.
/// The fee covers the runner's time retrieving the item from the park.
///
/// ## Schedule
/// - Flat fee per category (bulkier categories cost more to carry out)
/// - Collectibles take `max(flat, 5% of line price)` since high-value
///   pieces need insured handling
pub fn pickup_fee(category: ItemCategory, line_price: Money) -> Money {
    let flat = Money::from_cents(category.pickup_fee_cents());

    if category == ItemCategory::Collectibles {
        let pct = line_price.apply_rate(FeeRate::from_bps(500));
        if pct > flat {
            return pct;
        }
    }

    flat
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(2599);
        assert_eq!(money.cents(), 2599);
        assert_eq!(money.dollars(), 25);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(25, 99);
        assert_eq!(money.cents(), 2599);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(2599)), "$25.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_apply_rate_basic() {
        // $10.00 at 10% = $1.00
        let amount = Money::from_cents(1000);
        let rate = FeeRate::from_bps(1000);
        assert_eq!(amount.apply_rate(rate).cents(), 100);
    }

    #[test]
    fn test_apply_rate_rounds_half_up() {
        // $58.25 at 3% = $1.7475 → $1.75
        let amount = Money::from_cents(5825);
        let rate = FeeRate::from_bps(300);
        assert_eq!(amount.apply_rate(rate).cents(), 175);
    }

    #[test]
    fn test_auto_tax_florida() {
        // 2 × $79.99 × 6.5% = $10.3987 → $10.40
        let tax = auto_tax(2, Money::from_cents(7999), FeeRate::from_bps(650));
        assert_eq!(tax.cents(), 1040);

        // 2 × $25.00 × 6.5% = $3.25 exactly
        let tax = auto_tax(2, Money::from_cents(2500), FeeRate::from_bps(650));
        assert_eq!(tax.cents(), 325);
    }

    #[test]
    fn test_auto_tax_zero_rate() {
        let tax = auto_tax(3, Money::from_cents(1000), FeeRate::zero());
        assert!(tax.is_zero());
    }

    #[test]
    fn test_pickup_fee_flat() {
        // Apparel has a flat fee regardless of price
        let fee = pickup_fee(ItemCategory::Apparel, Money::from_cents(100_000));
        assert_eq!(fee.cents(), ItemCategory::Apparel.pickup_fee_cents());
    }

    #[test]
    fn test_pickup_fee_collectibles_floor() {
        // Cheap collectible: flat fee wins
        let cheap = pickup_fee(ItemCategory::Collectibles, Money::from_cents(2000));
        assert_eq!(cheap.cents(), ItemCategory::Collectibles.pickup_fee_cents());

        // $500 collectible: 5% = $25.00 beats the flat fee
        let pricey = pickup_fee(ItemCategory::Collectibles, Money::from_cents(50_000));
        assert_eq!(pricey.cents(), 2500);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    }
}
