//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    31.98 × 0.16 = 5.116800000000001  ❌ WRONG!                          │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal                                          │
//! │    31.98 × 16 / 100 = 5.1168 exactly                                    │
//! │    Nothing is rounded until the value is displayed                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale totals keep full precision (a 16% tax on $31.98 is $5.1168, not
//! $5.12). Rounding to cents happens only in [`Money::rounded`] and in
//! `Display`, so the ledger identities hold exactly.
//!
//! ## Usage
//! ```rust
//! use optica_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let price = Money::new(Decimal::new(1599, 2)); // $15.99
//! let line = price.checked_mul_quantity(2);      // $31.98
//! assert_eq!(line.map(|m| m.to_string()), Some("$31.98".to_string()));
//! ```

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

/// Number of decimal places shown to people.
pub const DISPLAY_DECIMALS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the store currency.
///
/// ## Design Decisions
/// - **Decimal (signed)**: exact base-10 arithmetic, negative values allowed
///   for intermediate differences
/// - **Transparent serde**: serialized as a decimal string (`"37.0968"`)
/// - **No implicit rounding**: arithmetic keeps every digit
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  SaleItem.unit_price ──► SaleItem.total_price ──► Sale.subtotal         │
/// │                                                                         │
/// │  Sale.subtotal ──► discount ──► tax ──► Sale.total                      │
/// │                                                                         │
/// │  PaymentRecord.amount ──► Sale.paid_amount ──► Sale.remaining_amount    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Converts a float coming from a loosely typed boundary (JSON form
    /// fields, CSV imports).
    ///
    /// Returns `None` for NaN and infinities.
    ///
    /// ## Example
    /// ```rust
    /// use optica_core::money::Money;
    ///
    /// assert_eq!(Money::from_f64(15.99).unwrap().to_string(), "$15.99");
    /// assert!(Money::from_f64(f64::NAN).is_none());
    /// ```
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Decimal::from_f64(value).map(Money)
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Lossy conversion for charts and logs.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is strictly negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        if other < self {
            other
        } else {
            self
        }
    }

    /// Clamps negative amounts to zero.
    ///
    /// ## Example
    /// ```rust
    /// use optica_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let diff = Money::new(Decimal::new(-5, 0));
    /// assert!(diff.non_negative().is_zero());
    /// ```
    #[inline]
    pub fn non_negative(self) -> Money {
        if self.is_negative() {
            Money::zero()
        } else {
            self
        }
    }

    /// Returns `percent`% of this amount (`amount × percent / 100`).
    ///
    /// Used for both the discount and the tax step of sale pricing.
    /// `None` if the result does not fit in a `Decimal`.
    ///
    /// ## Example
    /// ```rust
    /// use optica_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let subtotal = Money::new(Decimal::new(3198, 2)); // $31.98
    /// let tax = subtotal.checked_percent(Decimal::new(16, 0)); // 16%
    /// assert_eq!(tax.map(|t| t.amount()), Some(Decimal::new(51168, 4))); // $5.1168
    /// ```
    pub fn checked_percent(&self, percent: Decimal) -> Option<Money> {
        self.0
            .checked_mul(percent)?
            .checked_div(Decimal::ONE_HUNDRED)
            .map(Money)
    }

    /// Multiplies money by a quantity. `None` on overflow.
    #[inline]
    pub fn checked_mul_quantity(&self, qty: i64) -> Option<Money> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Adds two amounts. `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Rounds to cents, half away from zero, for display and printing.
    pub fn rounded(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money rounded to cents with a dollar sign.
///
/// ## Note
/// The app formats with the configured currency symbol; this is for logs,
/// error messages and tests.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded().0;
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        write!(
            f,
            "{}${:.prec$}",
            sign,
            rounded.abs(),
            prec = DISPLAY_DECIMALS as usize
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
