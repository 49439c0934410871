//! Lenient monetary amounts backed by decimal arithmetic.
//!
//! Order payloads arrive from a browser checkout flow and their numeric
//! fields are not trustworthy: amounts show up as JSON numbers, numeric
//! strings, `null`, or are missing entirely. Rendering must never fail on a
//! malformed money field, so deserialization degrades to zero instead of
//! erroring. This module is the single definition of that coercion.

use core::fmt;
use core::ops::{Add, Sub};

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

/// A monetary amount in rupees.
///
/// Deserializes leniently: JSON numbers, numeric strings, `null`, and absent
/// fields (via `#[serde(default)]`) are all accepted. `NaN`, infinities, and
/// non-numeric strings coerce to zero rather than failing the request.
///
/// Displays with a literal `Rs.` prefix and two decimal places, which is the
/// canonical currency rendering for both the PDF invoice and the email body.
///
/// ## Examples
///
/// ```
/// use parampare_core::Money;
///
/// let m: Money = serde_json::from_str("19.5").unwrap();
/// assert_eq!(m.to_string(), "Rs. 19.50");
///
/// // Numeric strings are accepted, garbage degrades to zero.
/// let m: Money = serde_json::from_str("\"200\"").unwrap();
/// assert_eq!(m.to_string(), "Rs. 200.00");
/// let m: Money = serde_json::from_str("\"free\"").unwrap();
/// assert_eq!(m.to_string(), "Rs. 0.00");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a money value from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    ///
    /// Used for the discount line, which is only shown for positive amounts.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Multiply by an integer quantity (line total = quantity x price).
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rs. {:.2}", self.0.round_dp(2))
    }
}

/// Parse a numeric string, accepting plain and scientific notation.
fn decimal_from_str(s: &str) -> Decimal {
    let trimmed = s.trim();
    trimmed
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(trimmed).ok())
        .unwrap_or(Decimal::ZERO)
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a number, a numeric string, or null")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        // NaN and infinities have no decimal representation; treat as zero.
        Ok(Money(Decimal::from_f64(v).unwrap_or(Decimal::ZERO)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Ok(Money(decimal_from_str(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::ZERO)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Money, D::Error> {
        deserializer.deserialize_any(Self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}
