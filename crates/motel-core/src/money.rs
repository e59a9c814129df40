//! # Money Module
//!
//! Provides the `Money` type used for room rent, payments and till cash.
//!
//! ## Integer Cents Everywhere
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TILL ARITHMETIC                                                        │
//! │                                                                         │
//! │  opening  500.00  ──►  50000 cents                                      │
//! │  + in     123.45  ──►  12345 cents                                      │
//! │  - out     23.45  ──►   2345 cents                                      │
//! │  ─────────────────────────────────                                      │
//! │  balance  600.00  ◄──  60000 cents   (exact, every time)               │
//! │                                                                         │
//! │  API, database and arithmetic all carry cents. Only Display            │
//! │  formats them as major units.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use motel_core::money::Money;
//!
//! let rent = Money::from_cents(25000); // $250.00
//! let two_blocks = rent * 2;
//! let balance = Money::from_cents(50000) + Money::from_cents(12345) - Money::from_cents(2345);
//!
//! assert_eq!(two_blocks.cents(), 50000);
//! assert_eq!(balance.to_string(), "$600.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Room.rent_price_cents ──► default occupy amount                        │
/// │                                                                         │
/// │  Payment.amount_cents ──► CashMovement(in).amount_cents                 │
/// │                                                                         │
/// │  Till.opening_amount_cents ──┬──► TillSummary.balance                   │
/// │  CashMovement.amount_cents ──┘                                          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Signed so that intermediate balances may go negative (a till that paid
/// out more than it took in).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use motel_core::money::Money;
    ///
    /// let price = Money::from_cents(12345);
    /// assert_eq!(price.cents(), 12345);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
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
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain `$1234.56` rendering used in turn reports and logs.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

/// Multiplication by a block count (e.g. rent per block × blocks).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
